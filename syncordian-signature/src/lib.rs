//! Byzantine binding signatures.
//!
//! Every line is signed against the exact pair of neighbours it was
//! inserted between. An attacker who tries to "re-home" a forged line
//! between different neighbours invalidates the signature, because the
//! signed message binds `(left_parent_id, content, line_id, right_parent_id)`
//! together (§4.2).
//!
//! The signing primitive is Ed25519, via `ed25519-dalek`.

mod binding;
mod keys;

pub use binding::{sign_binding, verify_binding};
pub use keys::{KeyPair, Signature, SigningKey, VerifyingKey};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, SignatureError>;

/// Errors constructing or checking signatures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Raw key bytes were not a valid Ed25519 key.
    #[error("invalid key bytes")]
    InvalidKeyBytes,

    /// Raw bytes were not a valid Ed25519 signature.
    #[error("invalid signature bytes")]
    InvalidSignatureBytes,
}
