//! Canonical, fixed-width byte encodings used everywhere a message needs
//! to be hashed or signed.
//!
//! The protocol calls for "a stable, byte-identical-across-nodes encoding
//! of a fixed field order." A literal string concatenation of
//! variable-length decimal/hex text is ambiguous at field boundaries
//! (e.g. value `12` followed by value `3` encodes the same as value `1`
//! followed by `23`). Every field here is therefore encoded at a fixed
//! width: 32 bytes for hashes and public keys, 8 bytes big-endian for
//! u64 values, a length-prefixed byte string for the variable-length
//! signature.

use crate::types::{Block, Hash256, TxInput, TxOutput};

fn push_output(buf: &mut Vec<u8>, out: &TxOutput) {
    buf.extend_from_slice(&out.value.to_be_bytes());
    buf.extend_from_slice(out.pub_key.as_bytes());
}

fn push_input(buf: &mut Vec<u8>, input: &TxInput) {
    buf.extend_from_slice(input.number.as_bytes());
    push_output(buf, &input.output);
}

/// Encodes a transaction's inputs and outputs (everything but the
/// signature and the `tx_number` field itself). This is both the message
/// that gets SHA-256 hashed to produce `tx_number`, and the message that
/// gets Ed25519-signed.
pub fn tx_body_bytes(inputs: &[TxInput], outputs: &[TxOutput]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + inputs.len() * 72 + outputs.len() * 40);
    buf.extend_from_slice(&(inputs.len() as u64).to_be_bytes());
    for input in inputs {
        push_input(&mut buf, input);
    }
    buf.extend_from_slice(&(outputs.len() as u64).to_be_bytes());
    for out in outputs {
        push_output(&mut buf, out);
    }
    buf
}

/// Encodes the message that gets Ed25519-signed: the transaction body
/// plus its `tx_number`, in that order. `tx_number` itself is the hash of
/// the body alone (it can't include itself), but the signature commits to
/// the number as well so a forged `tx_number` on an otherwise-untouched
/// body can't carry a stolen signature.
pub fn tx_signing_bytes(tx: &crate::types::Transaction) -> Vec<u8> {
    let mut buf = tx_body_bytes(&tx.inputs, &tx.outputs);
    buf.extend_from_slice(tx.tx_number.as_bytes());
    buf
}

/// Encodes an entire block's fixed prior-state content: used by a child
/// block to compute the hash it must cite as `prev`.
pub fn block_link_bytes(block: &Block) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&tx_full_bytes(&block.tx));
    buf.extend_from_slice(block.prev.as_bytes());
    buf.extend_from_slice(&block.nonce.to_be_bytes());
    buf.extend_from_slice(block.pow.as_bytes());
    buf
}

/// Encodes a transaction in full, including `tx_number` and `sig`. This is
/// the message mined and checked against the proof-of-work target: it is
/// what makes the PoW commit to a *specific* signed transaction rather
/// than just its unsigned body.
pub fn tx_full_bytes(tx: &crate::types::Transaction) -> Vec<u8> {
    let mut buf = tx_body_bytes(&tx.inputs, &tx.outputs);
    buf.extend_from_slice(tx.tx_number.as_bytes());
    buf.extend_from_slice(&(tx.sig.len() as u64).to_be_bytes());
    buf.extend_from_slice(&tx.sig);
    buf
}

/// Encodes exactly the message that gets hashed against a nonce to
/// produce a block's proof-of-work: the transaction, the previous block's
/// hash, and the candidate nonce.
pub fn pow_message_bytes(tx_bytes: &[u8], prev: &Hash256, nonce: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tx_bytes.len() + 32 + 8);
    buf.extend_from_slice(tx_bytes);
    buf.extend_from_slice(prev.as_bytes());
    buf.extend_from_slice(&nonce.to_be_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PubKeyBytes;

    #[test]
    fn tx_body_bytes_differ_on_field_boundary_cases() {
        let out_a = TxOutput { value: 12, pub_key: PubKeyBytes([0; 32]) };
        let out_b = TxOutput { value: 1, pub_key: PubKeyBytes([0; 32]) };
        let a = tx_body_bytes(&[], &[out_a.clone(), out_b.clone()]);
        // Swapping which output carries which value changes the encoding even
        // though a naive string concatenation of "12" + "1" could equal "1" + "21".
        let swapped = TxOutput { value: 121, pub_key: PubKeyBytes([0; 32]) };
        let b = tx_body_bytes(&[], &[swapped]);
        assert_ne!(a, b);
    }

    #[test]
    fn pow_message_bytes_is_deterministic() {
        let tx_bytes = vec![1, 2, 3];
        let prev = Hash256::of(b"prev");
        let a = pow_message_bytes(&tx_bytes, &prev, 7);
        let b = pow_message_bytes(&tx_bytes, &prev, 7);
        assert_eq!(a, b);
        let c = pow_message_bytes(&tx_bytes, &prev, 8);
        assert_ne!(a, c);
    }
}
