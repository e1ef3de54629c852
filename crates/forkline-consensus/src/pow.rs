//! Proof-of-work mining and validation.
//!
//! A block's `pow` field must equal SHA-256(tx || prev || nonce) and, read
//! as a big-endian 256-bit integer, must not exceed the fixed difficulty
//! target.

use forkline_core::canonical::{pow_message_bytes, tx_full_bytes};
use forkline_core::constants::DIFFICULTY_TARGET;
use forkline_core::error::BlockError;
use forkline_core::logging::LogSink;
use forkline_core::types::{Hash256, Transaction};
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub struct PowEngine {
    log: Arc<dyn LogSink>,
    target: [u8; 32],
}

impl PowEngine {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log, target: DIFFICULTY_TARGET }
    }

    /// Build an engine that mines and verifies against `target` instead
    /// of the protocol-wide constant, for tests that need mining to
    /// converge quickly.
    pub fn with_target(log: Arc<dyn LogSink>, target: [u8; 32]) -> Self {
        Self { log, target }
    }

    fn digest(tx_bytes: &[u8], prev: &Hash256, nonce: u64) -> Hash256 {
        let message = pow_message_bytes(tx_bytes, prev, nonce);
        let mut hasher = Sha256::new();
        hasher.update(&message);
        Hash256(hasher.finalize().into())
    }

    /// Search nonces starting at 0 until the digest satisfies the
    /// difficulty target, returning the winning `(nonce, pow)` pair.
    pub fn mine(&self, tx: &Transaction, prev: &Hash256) -> (u64, Hash256) {
        let tx_bytes = tx_full_bytes(tx);
        let mut nonce: u64 = 0;
        loop {
            let pow = Self::digest(&tx_bytes, prev, nonce);
            if pow.as_bytes() <= &self.target {
                return (nonce, pow);
            }
            nonce += 1;
        }
    }

    /// Validate that `pow` really is SHA-256(tx || prev || nonce) and
    /// that it satisfies the difficulty target.
    pub fn verify(&self, tx: &Transaction, prev: &Hash256, nonce: u64, pow: &Hash256) -> Result<(), BlockError> {
        let tx_bytes = tx_full_bytes(tx);
        let expected = Self::digest(&tx_bytes, prev, nonce);
        if &expected != pow {
            self.log.log_error("bad_pow", "recomputed digest does not match claimed pow");
            return Err(BlockError::BadPoW);
        }
        if pow.as_bytes() > &self.target {
            self.log.log_error("bad_pow", "digest exceeds difficulty target");
            return Err(BlockError::BadPoW);
        }
        Ok(())
    }
}
