//! Peer transport: how a node delivers mined blocks and re-pooled
//! transactions to its peers.
//!
//! `Node` never talks to other nodes directly; it only ever calls through
//! an injected [`PeerTransport`], so the actual delivery mechanism
//! (in-process queues here, a real network transport elsewhere) is never
//! a concern of the consensus logic.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use forkline_core::types::{Block, Transaction};

pub type PeerId = String;

pub trait PeerTransport: Send + Sync {
    /// Deliver a newly mined or forwarded block to `peer`'s inbox.
    fn deliver(&self, peer: &PeerId, block: Block);
    /// Append a displaced transaction to `peer`'s global tx pool.
    fn append_pool(&self, peer: &PeerId, tx: Transaction);
    /// Pop the next block waiting in `peer`'s inbox, FIFO, if any.
    fn pop_inbox(&self, peer: &PeerId) -> Option<Block>;
    /// Snapshot of everything currently in `peer`'s tx pool.
    fn pool_snapshot(&self, peer: &PeerId) -> Vec<Transaction>;
}

/// Reference single-process implementation: a registry of per-peer
/// inboxes and pools behind a mutex, standing in for a real network.
#[derive(Default)]
pub struct InProcessTransport {
    inboxes: Mutex<HashMap<PeerId, VecDeque<Block>>>,
    pools: Mutex<HashMap<PeerId, Vec<Transaction>>>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeerTransport for InProcessTransport {
    fn deliver(&self, peer: &PeerId, block: Block) {
        self.inboxes.lock().unwrap().entry(peer.clone()).or_default().push_back(block);
    }

    fn append_pool(&self, peer: &PeerId, tx: Transaction) {
        self.pools.lock().unwrap().entry(peer.clone()).or_default().push(tx);
    }

    fn pop_inbox(&self, peer: &PeerId) -> Option<Block> {
        self.inboxes.lock().unwrap().get_mut(peer).and_then(|q| q.pop_front())
    }

    fn pool_snapshot(&self, peer: &PeerId) -> Vec<Transaction> {
        self.pools.lock().unwrap().get(peer).cloned().unwrap_or_default()
    }
}
