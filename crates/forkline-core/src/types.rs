//! Core protocol types: transactions, blocks, and the block tree node
//! that anchors a block into the tree of all known forks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 digest.
///
/// Used for transaction numbers (content hash of a transaction body) and
/// block proof-of-work / previous-block links.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let digest: [u8; 32] = hasher.finalize().into();
        Self(digest)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for PubKeyBytes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PubKeyBytes {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("pubkey must be 32 bytes"))?;
        Ok(PubKeyBytes(arr))
    }
}

/// A raw Ed25519 public key, wrapped so it serializes as hex rather than
/// a byte array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PubKeyBytes(pub [u8; 32]);

impl PubKeyBytes {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A transaction output: a value paid to a named recipient public key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxOutput {
    pub value: u64,
    #[serde(rename = "pubKey")]
    pub pub_key: PubKeyBytes,
}

impl TxOutput {
    pub fn is_equal(&self, other: &TxOutput) -> bool {
        self == other
    }
}

/// A reference to a prior transaction's output: the transaction number it
/// belongs to, plus a copy of the output content itself (spec's data model
/// names the output inline on the input, not just an index).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxInput {
    pub number: Hash256,
    pub output: TxOutput,
}

impl TxInput {
    pub fn is_equal(&self, other: &TxInput) -> bool {
        self == other
    }
}

/// A single Forkline transaction. Exactly one of these is carried per
/// block (see [`Block`]).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    #[serde(rename = "txNumber")]
    pub tx_number: Hash256,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Hex-encoded Ed25519 signature over the canonical signing message.
    pub sig: Vec<u8>,
}

impl Transaction {
    /// Recompute the content hash that `tx_number` must equal for the
    /// transaction to be considered well-formed.
    pub fn compute_number(&self) -> Hash256 {
        Hash256::of(&crate::canonical::tx_body_bytes(&self.inputs, &self.outputs))
    }

    /// The message that was Ed25519-signed: the transaction body plus its
    /// `tx_number`, excluding the signature field itself.
    pub fn signing_message(&self) -> Vec<u8> {
        crate::canonical::tx_signing_bytes(self)
    }

    pub fn input_value_sum(&self) -> u128 {
        self.inputs.iter().map(|i| i.output.value as u128).sum()
    }

    pub fn output_value_sum(&self) -> u128 {
        self.outputs.iter().map(|o| o.value as u128).sum()
    }
}

/// A mined block: one transaction, a link to its parent, and the
/// proof-of-work that makes it valid.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub tx: Transaction,
    pub prev: Hash256,
    pub nonce: u64,
    pub pow: Hash256,
}

impl Block {
    /// Hash used by a child block to link to this one as `prev`.
    pub fn block_hash(&self) -> Hash256 {
        Hash256::of(&crate::canonical::block_link_bytes(self))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tx": {
                "txNumber": self.tx.tx_number.to_hex(),
                "inputs": self.tx.inputs.iter().map(|i| serde_json::json!({
                    "number": i.number.to_hex(),
                    "output": {
                        "value": i.output.value,
                        "pubKey": hex::encode(i.output.pub_key.0),
                    }
                })).collect::<Vec<_>>(),
                "outputs": self.tx.outputs.iter().map(|o| serde_json::json!({
                    "value": o.value,
                    "pubKey": hex::encode(o.pub_key.0),
                })).collect::<Vec<_>>(),
                "sig": hex::encode(&self.tx.sig),
            },
            "prev": self.prev.to_hex(),
            "nonce": self.nonce.to_string(),
            "pow": self.pow.to_hex(),
        })
    }
}

/// A node in the block tree: a block plus a pointer to its parent node and
/// its height (genesis is height 1, per the original ledger's convention).
#[derive(Clone, Debug)]
pub struct BlockTreeNode {
    pub block: Block,
    pub parent: Option<usize>,
    pub height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_display_roundtrips_through_hex() {
        let h = Hash256::of(b"hello");
        let s = h.to_hex();
        assert_eq!(Hash256::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn zero_hash_is_all_zero_bytes() {
        assert_eq!(Hash256::ZERO.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn tx_output_equality_is_structural() {
        let a = TxOutput { value: 5, pub_key: PubKeyBytes([1; 32]) };
        let b = TxOutput { value: 5, pub_key: PubKeyBytes([1; 32]) };
        let c = TxOutput { value: 6, pub_key: PubKeyBytes([1; 32]) };
        assert!(a.is_equal(&b));
        assert!(!a.is_equal(&c));
    }
}
