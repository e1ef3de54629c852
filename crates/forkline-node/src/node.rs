//! Node: composes the block tree, chain head tracker, transaction
//! verifier and PoW engine into the single-threaded, driver-invoked
//! operations a harness calls directly (`mine`, `receive`,
//! `process_one_inbound`).

use std::sync::Arc;

use forkline_consensus::head::ChainHead;
use forkline_consensus::pow::PowEngine;
use forkline_consensus::tree::BlockTree;
use forkline_consensus::verify::TransactionVerifier;
use forkline_core::logging::{default_sink, LogSink};
use forkline_core::types::{Block, Hash256, Transaction};
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::transport::{PeerId, PeerTransport};

pub struct Node {
    id: PeerId,
    peers: Vec<PeerId>,
    tree: BlockTree,
    head: ChainHead,
    verifier: TransactionVerifier,
    pow: PowEngine,
    transport: Arc<dyn PeerTransport>,
    log: Arc<dyn LogSink>,
}

impl Node {
    pub fn new(config: NodeConfig, genesis: Block, transport: Arc<dyn PeerTransport>) -> Self {
        Self::with_log_sink(config, genesis, transport, default_sink())
    }

    pub fn with_log_sink(
        config: NodeConfig,
        genesis: Block,
        transport: Arc<dyn PeerTransport>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let tree = BlockTree::new(genesis);
        let head = ChainHead::new(tree.genesis_index());
        #[cfg(any(test, feature = "testing"))]
        let pow = match config.difficulty_target_override {
            Some(target) => PowEngine::with_target(log.clone(), target),
            None => PowEngine::new(log.clone()),
        };
        #[cfg(not(any(test, feature = "testing")))]
        let pow = PowEngine::new(log.clone());
        Self {
            id: config.node_id,
            peers: config.peers,
            tree,
            head,
            verifier: TransactionVerifier::new(log.clone()),
            pow,
            transport,
            log,
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn chain_tip(&self) -> &Block {
        &self.tree.node(self.head.tip_index()).block
    }

    pub fn chain_height(&self) -> u64 {
        self.tree.node(self.head.tip_index()).height
    }

    /// This node's own view of its global tx pool: transactions displaced
    /// from other peers' reorgs that have been re-pooled to this node.
    /// Never populated by this node's own reorgs, and never consumed by
    /// `mine`.
    pub fn my_pool(&self) -> Vec<Transaction> {
        self.transport.pool_snapshot(&self.id)
    }

    /// Verify `tx` against the current head, mine a block for it, append
    /// it locally, and broadcast it to every peer. No-op if verification
    /// fails.
    pub fn mine(&mut self, tx: Transaction) {
        if let Err(err) = self.verifier.verify_tx(&self.tree, self.head.tip_index(), &tx) {
            warn!(node = %self.id, error = %err, "mine: transaction rejected");
            return;
        }

        let prev_block = self.chain_tip().clone();
        let prev_hash = prev_block.block_hash();
        let (nonce, pow) = self.pow.mine(&tx, &prev_hash);
        let block = Block { tx, prev: prev_hash, nonce, pow };

        let parent_index = self.head.tip_index();
        let new_index = self.tree.append(block.clone(), parent_index);
        let displaced = self.head.consider(&self.tree, new_index);
        self.repool_to_peers(displaced);

        info!(node = %self.id, height = self.chain_height(), "mined block");
        self.broadcast(block);
    }

    fn broadcast(&self, block: Block) {
        for peer in &self.peers {
            if peer != &self.id {
                self.transport.deliver(peer, block.clone());
            }
        }
    }

    fn repool_to_peers(&self, displaced: Vec<Transaction>) {
        for tx in displaced {
            for peer in &self.peers {
                if peer != &self.id {
                    self.transport.append_pool(peer, tx.clone());
                }
            }
        }
    }

    /// Pop and process one block from this node's inbox, if any is
    /// waiting. Returns `true` if a block was processed (accepted or
    /// rejected), `false` if the inbox was empty.
    pub fn process_one_inbound(&mut self) -> bool {
        let Some(block) = self.transport.pop_inbox(&self.id) else {
            return false;
        };
        self.receive(block);
        true
    }

    /// Validate and, if valid, connect an inbound block: PoW, parent
    /// linkage, and the transaction it carries. Blocks whose parent is
    /// unknown are silently dropped (orphans), matching the single-pass
    /// no-retry policy.
    pub fn receive(&mut self, block: Block) {
        let Some(parent_index) = self.tree.find_parent_of(&block) else {
            let err = forkline_core::error::BlockError::OrphanBlock;
            self.log.log_error("orphan_block", &err.to_string());
            debug!(node = %self.id, "dropped orphan block");
            return;
        };

        let prev_hash = self.tree.node(parent_index).block.block_hash();
        if let Err(err) = self.pow.verify(&block.tx, &prev_hash, block.nonce, &block.pow) {
            warn!(node = %self.id, error = %err, "receive: bad proof-of-work");
            return;
        }

        if let Err(err) = self.verifier.verify_tx(&self.tree, self.head.tip_index(), &block.tx) {
            warn!(node = %self.id, error = %err, "receive: transaction rejected");
            return;
        }

        let new_index = self.tree.append(block, parent_index);
        let displaced = self.head.consider(&self.tree, new_index);
        self.repool_to_peers(displaced);
        info!(node = %self.id, height = self.chain_height(), "connected block");
    }

    /// Export the full ledger (every block this node has ever accepted,
    /// in ledger insertion order) as the external JSON shape.
    pub fn ledger_json(&self) -> serde_json::Value {
        let blocks: Vec<serde_json::Value> =
            self.tree.nodes_in_ledger_order().map(|n| n.block.to_json()).collect();
        serde_json::json!({ "Blocks": blocks })
    }

    pub fn genesis_hash(&self) -> Hash256 {
        self.tree.node(self.tree.genesis_index()).block.block_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InProcessTransport;
    use forkline_core::crypto::KeyPair;
    use forkline_core::types::{TxInput, TxOutput};

    fn genesis_for(key: &KeyPair, value: u64) -> Block {
        let tx = key.finalize_transaction(Transaction {
            tx_number: Hash256::ZERO,
            inputs: vec![],
            outputs: vec![TxOutput { value, pub_key: key.public_key() }],
            sig: vec![],
        });
        Block { tx, prev: Hash256::ZERO, nonce: 0, pow: Hash256::ZERO }
    }

    #[test]
    fn difficulty_target_override_is_actually_used_by_mining() {
        let key = KeyPair::generate();
        let genesis = genesis_for(&key, 100);
        let transport = Arc::new(InProcessTransport::new());
        let mut cfg = NodeConfig::new("a", vec!["a".into()]);
        cfg.difficulty_target_override = Some([0xFF; 32]);
        let mut node = Node::new(cfg, genesis.clone(), transport);

        let tx = key.finalize_transaction(Transaction {
            tx_number: Hash256::ZERO,
            inputs: vec![TxInput { number: genesis.tx.tx_number, output: genesis.tx.outputs[0].clone() }],
            outputs: vec![TxOutput { value: 100, pub_key: key.public_key() }],
            sig: vec![],
        });
        node.mine(tx);
        assert_eq!(node.chain_tip().nonce, 0, "an all-0xFF target should accept the first nonce tried");
    }

    #[test]
    fn mining_and_broadcasting_converges_two_nodes() {
        let key = KeyPair::generate();
        let genesis = genesis_for(&key, 100);
        let transport = Arc::new(InProcessTransport::new());

        let cfg_a = NodeConfig::new("a", vec!["a".into(), "b".into()]);
        let cfg_b = NodeConfig::new("b", vec!["a".into(), "b".into()]);
        let mut node_a = Node::new(cfg_a, genesis.clone(), transport.clone());
        let mut node_b = Node::new(cfg_b, genesis.clone(), transport.clone());

        let spend_tx = key.finalize_transaction(Transaction {
            tx_number: Hash256::ZERO,
            inputs: vec![TxInput { number: genesis.tx.tx_number, output: genesis.tx.outputs[0].clone() }],
            outputs: vec![TxOutput { value: 100, pub_key: key.public_key() }],
            sig: vec![],
        });

        node_a.mine(spend_tx);
        assert!(node_b.process_one_inbound());
        assert_eq!(node_a.chain_tip().block_hash(), node_b.chain_tip().block_hash());
        assert_eq!(node_b.chain_height(), 2);
    }

    #[test]
    fn orphan_block_is_silently_dropped() {
        let key = KeyPair::generate();
        let genesis = genesis_for(&key, 100);
        let transport = Arc::new(InProcessTransport::new());
        let cfg = NodeConfig::new("a", vec!["a".into()]);
        let mut node = Node::new(cfg, genesis, transport);

        let orphan_tx = key.finalize_transaction(Transaction {
            tx_number: Hash256::ZERO,
            inputs: vec![],
            outputs: vec![TxOutput { value: 1, pub_key: key.public_key() }],
            sig: vec![],
        });
        let orphan = Block { tx: orphan_tx, prev: Hash256::of(b"unknown parent"), nonce: 0, pow: Hash256::ZERO };
        let height_before = node.chain_height();
        node.receive(orphan);
        assert_eq!(node.chain_height(), height_before);
    }
}
