use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

const PUBLIC_KEY_BYTE_COUNT: usize = 32;
const SIGNATURE_BYTE_COUNT: usize = 64;

/// Ed25519 public key that claims a transaction output.
/// Only the owner of the matching private key can authorize spending the output.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTE_COUNT]);

impl PublicKey {
    pub const fn from_raw(raw_bytes: [u8; PUBLIC_KEY_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.as_slice()))
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature([u8; SIGNATURE_BYTE_COUNT]);

impl Signature {
    pub const fn from_raw(raw_bytes: [u8; SIGNATURE_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.as_slice()))
    }
}

/// A private/public key pair owned by a wallet.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Derives the key pair deterministically from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

/// Returns true iff the signature over the message was produced by the owner of the public key.
/// Keys that are not valid curve points never verify.
pub fn verify_signature(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    match VerifyingKey::from_bytes(&public_key.0) {
        Ok(verifying_key) => {
            let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
            verifying_key.verify_strict(message, &signature).is_ok()
        }
        Err(_) => false,
    }
}
