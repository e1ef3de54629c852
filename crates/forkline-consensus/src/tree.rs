//! The block tree: every block ever accepted by this node, including
//! abandoned forks. Nodes are appended, never removed, and reference
//! their parent by index so the tree can be walked without shared
//! ownership bookkeeping.

use forkline_core::constants::GENESIS_HEIGHT;
use forkline_core::types::{Block, BlockTreeNode, Hash256};

/// Append-only store of every block a node has ever accepted, genesis
/// included. Blocks are linked into a tree (not a single chain) via
/// each node's `parent` index, so concurrent forks are all retained.
#[derive(Debug, Clone)]
pub struct BlockTree {
    nodes: Vec<BlockTreeNode>,
}

impl BlockTree {
    /// Start a new tree rooted at `genesis`.
    pub fn new(genesis: Block) -> Self {
        let root = BlockTreeNode { block: genesis, parent: None, height: GENESIS_HEIGHT };
        Self { nodes: vec![root] }
    }

    pub fn genesis_index(&self) -> usize {
        0
    }

    pub fn node(&self, index: usize) -> &BlockTreeNode {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in insertion (ledger) order; used for ledger export.
    pub fn nodes_in_ledger_order(&self) -> impl Iterator<Item = &BlockTreeNode> {
        self.nodes.iter()
    }

    /// Find the tree index of the node whose block hash equals `hash`.
    pub fn find_index_by_hash(&self, hash: &Hash256) -> Option<usize> {
        self.nodes.iter().position(|n| &n.block.block_hash() == hash)
    }

    /// Find the tree index of the node this block's `prev` field links to.
    pub fn find_parent_of(&self, block: &Block) -> Option<usize> {
        self.find_index_by_hash(&block.prev)
    }

    /// Append `block` as a child of `parent_index`, returning the new
    /// node's index.
    pub fn append(&mut self, block: Block, parent_index: usize) -> usize {
        let height = self.nodes[parent_index].height + 1;
        self.nodes.push(BlockTreeNode { block, parent: Some(parent_index), height });
        self.nodes.len() - 1
    }

    /// Walk from `index` back to genesis, yielding each node's index,
    /// starting with `index` itself.
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors { tree: self, current: Some(index) }
    }

    /// Does any transaction in the chain ending at `tip_index` (inclusive)
    /// have the given transaction number?
    pub fn chain_contains_tx_number(&self, tip_index: usize, tx_number: &Hash256) -> bool {
        self.ancestors(tip_index).any(|i| &self.nodes[i].block.tx.tx_number == tx_number)
    }
}

pub struct Ancestors<'a> {
    tree: &'a BlockTree,
    current: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let idx = self.current?;
        self.current = self.tree.nodes[idx].parent;
        Some(idx)
    }
}
