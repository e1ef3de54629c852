//! Error types for the Forkline protocol, matching the transaction and
//! block verification taxonomy exactly.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction is already on the chain")]
    TxAlreadyOnChain,
    #[error("transaction number hash does not match its body")]
    BadTxNumberHash,
    #[error("one or more inputs do not resolve against chain history")]
    InputsUnresolved,
    #[error("inputs do not share a single uniform sender public key")]
    NonUniformSender,
    #[error("signature verification failed")]
    BadSignature,
    #[error("input has already been spent (double spend)")]
    DoubleSpend,
    #[error("sum of input values does not equal sum of output values")]
    ValueMismatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("proof-of-work does not satisfy the difficulty target")]
    BadPoW,
    /// The block's `prev` field does not match any block hash this node
    /// knows about. A node looks up a block's parent by hash equality
    /// against its tree, so "prev points nowhere" and "this is an
    /// orphan" are the same observation; see `OrphanBlock`.
    #[error("block's parent is not present in the tree (orphan)")]
    OrphanBlock,
}
