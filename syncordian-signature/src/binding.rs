//! The binding message format and the top-level sign/verify contract.

use ed25519_dalek::Signer as _;

use crate::keys::{Signature, SigningKey, VerifyingKey};

/// Builds the length-prefixed message that a line's signature covers:
/// `(left_parent_id, content, line_id, right_parent_id)` (§4.2).
///
/// Fields are length-prefixed (4-byte big-endian length + bytes) so that
/// concatenation can never make two different `(left, content, id, right)`
/// tuples hash to the same message.
fn binding_message(left_parent_id: &[u8], content: &[u8], line_id: &[u8], right_parent_id: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(16 + left_parent_id.len() + content.len() + line_id.len() + right_parent_id.len());
    for field in [left_parent_id, content, line_id, right_parent_id] {
        msg.extend_from_slice(&(field.len() as u32).to_be_bytes());
        msg.extend_from_slice(field);
    }
    msg
}

/// Signs the binding `(left_parent_id, content, line_id, right_parent_id)`.
#[must_use]
pub fn sign_binding(
    signing_key: &SigningKey,
    left_parent_id: &[u8],
    content: &[u8],
    line_id: &[u8],
    right_parent_id: &[u8],
) -> Signature {
    let message = binding_message(left_parent_id, content, line_id, right_parent_id);
    Signature::from(signing_key.inner().sign(&message))
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Signature::from_bytes(&sig.to_bytes())
    }
}

/// Verifies that `signature` is exactly the signature `verifying_key`'s
/// owner produced over `(left_parent_id, content, line_id, right_parent_id)`.
///
/// Any mismatch — a different neighbour pair, forged content, or the
/// wrong signer — yields `false` (§4.2). This function never panics.
#[must_use]
pub fn verify_binding(
    verifying_key: &VerifyingKey,
    left_parent_id: &[u8],
    content: &[u8],
    line_id: &[u8],
    right_parent_id: &[u8],
    signature: &Signature,
) -> bool {
    let message = binding_message(left_parent_id, content, line_id, right_parent_id);
    verifying_key.verify_raw(&message, signature)
}
