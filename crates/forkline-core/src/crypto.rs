//! Ed25519 signing and verification for Forkline transactions.
//!
//! A transaction's signature covers its canonical body plus `tx_number`
//! (see [`crate::canonical::tx_signing_bytes`]), so a signature can't be
//! replayed onto a forged `tx_number` over the same inputs/outputs.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;

use crate::types::{PubKeyBytes, Transaction};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")]
    InvalidPublicKey,
    #[error("invalid signature bytes")]
    InvalidSignature,
    #[error("signature verification failed")]
    VerificationFailed,
}

/// An Ed25519 keypair. Use [`KeyPair::generate`] for tests and harnesses;
/// actual key generation by end users is out of scope.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self { signing_key: ed25519_dalek::SigningKey::generate(&mut csprng) }
    }

    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self { signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes) }
    }

    pub fn public_key(&self) -> PubKeyBytes {
        PubKeyBytes(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    /// Sign a transaction's canonical body and set `tx_number` and `sig`.
    pub fn finalize_transaction(&self, mut tx: Transaction) -> Transaction {
        tx.tx_number = tx.compute_number();
        tx.sig = self.sign(&tx.signing_message());
        tx
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("public_key", &self.public_key()).finish()
    }
}

/// Verify an Ed25519 signature given a raw 32-byte public key.
pub fn verify(pub_key: &PubKeyBytes, message: &[u8], sig: &[u8]) -> Result<(), CryptoError> {
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(pub_key.as_bytes())
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig_bytes: [u8; 64] = sig.try_into().map_err(|_| CryptoError::InvalidSignature)?;
    let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}
