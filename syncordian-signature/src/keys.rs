//! Ed25519 key and signature wrappers.
//!
//! Newtypes around the `ed25519-dalek` types so the rest of the
//! workspace never names `ed25519_dalek` directly.

use ed25519_dalek::{
    Signature as DalekSignature, SigningKey as DalekSigningKey, Verifier as _,
    VerifyingKey as DalekVerifyingKey,
};
use rand::rngs::OsRng;

use crate::SignatureError;

/// Ed25519 signing (secret) key. Used to sign line bindings.
#[derive(Clone)]
pub struct SigningKey(DalekSigningKey);

/// Ed25519 verifying (public) key. Used to verify line bindings.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(DalekVerifyingKey);

/// An Ed25519 signature over a binding message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(DalekSignature);

/// A signing/verifying keypair for one peer.
pub struct KeyPair {
    /// The secret half, used to sign lines this peer originates.
    pub signing_key: SigningKey,
    /// The public half, published so other peers can verify this peer's lines.
    pub verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a new random Ed25519 keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing = DalekSigningKey::generate(&mut OsRng);
        let verifying = signing.verifying_key();
        Self {
            signing_key: SigningKey(signing),
            verifying_key: VerifyingKey(verifying),
        }
    }
}

impl SigningKey {
    /// Creates a signing key from a raw 32-byte secret.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(DalekSigningKey::from_bytes(bytes))
    }

    /// Returns the corresponding verifying key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    pub(crate) fn inner(&self) -> &DalekSigningKey {
        &self.0
    }
}

impl VerifyingKey {
    /// Creates a verifying key from a raw 32-byte public key.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        DalekVerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| SignatureError::InvalidKeyBytes)
    }

    /// Returns the raw 32-byte public key.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub(crate) fn verify_raw(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify(message, &signature.0).is_ok()
    }
}

impl Signature {
    /// Creates a signature from a raw 64-byte value.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(DalekSignature::from_bytes(bytes))
    }

    /// An all-zero signature, used only for the infimum/supremum
    /// sentinels, which are never transmitted or signature-checked.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::from_bytes(&[0u8; 64])
    }

    /// Returns the raw 64-byte signature.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.to_bytes()))
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.to_bytes()))
    }
}

// Signature and VerifyingKey need to round-trip through serde so they can
// travel in broadcast messages (§6).
impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = serde::Deserialize::deserialize(deserializer)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))?;
        Ok(Self::from_bytes(&arr))
    }
}

impl serde::Serialize for VerifyingKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> serde::Deserialize<'de> for VerifyingKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = serde::Deserialize::deserialize(deserializer)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("verifying key must be 32 bytes"))?;
        Self::from_bytes(&arr).map_err(serde::de::Error::custom)
    }
}
