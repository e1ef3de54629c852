//! Chain head tracking and reorg detection.
//!
//! The head only ever advances to a strictly greater height (first-seen
//! wins on ties). When the new head's branch doesn't contain the old
//! head as an ancestor, every transaction on the abandoned side of the
//! fork (from the old head back to, but not including, the common
//! ancestor) is returned so the caller can re-pool it for other peers.

use forkline_core::types::Transaction;

use crate::tree::BlockTree;

#[derive(Debug, Clone)]
pub struct ChainHead {
    tip: usize,
}

impl ChainHead {
    pub fn new(genesis_index: usize) -> Self {
        Self { tip: genesis_index }
    }

    pub fn tip_index(&self) -> usize {
        self.tip
    }

    /// Consider `candidate_index` as the new chain head. Returns the
    /// transactions displaced by a reorg, if any, in root-to-tip-ward
    /// removal order starting from the old head.
    pub fn consider(&mut self, tree: &BlockTree, candidate_index: usize) -> Vec<Transaction> {
        let old_tip = self.tip;
        let candidate_height = tree.node(candidate_index).height;
        let old_height = tree.node(old_tip).height;

        if candidate_height <= old_height {
            return Vec::new();
        }

        self.tip = candidate_index;

        let candidate_parent = tree.node(candidate_index).parent;
        if candidate_parent == Some(old_tip) {
            return Vec::new();
        }

        let lca = lowest_common_ancestor(tree, old_tip, candidate_index);
        let mut displaced = Vec::new();
        let mut cursor = Some(old_tip);
        while let Some(idx) = cursor {
            if Some(idx) == lca {
                break;
            }
            displaced.push(tree.node(idx).block.tx.clone());
            cursor = tree.node(idx).parent;
        }
        displaced
    }
}

/// Two-pointer lowest common ancestor: walk both branches toward the
/// root in lockstep, and when a pointer runs off the root, restart it at
/// the other branch's starting node. Both pointers have then walked the
/// combined length of both branches, so they meet at the LCA.
fn lowest_common_ancestor(tree: &BlockTree, a: usize, b: usize) -> Option<usize> {
    let (mut p1, mut p2) = (Some(a), Some(b));
    loop {
        match (p1, p2) {
            (Some(x), Some(y)) if x == y => return Some(x),
            _ => {}
        }
        p1 = match p1 {
            Some(x) => tree.node(x).parent,
            None => None,
        };
        p2 = match p2 {
            Some(x) => tree.node(x).parent,
            None => None,
        };
        if p1 == p2 {
            return p1;
        }
        if p1.is_none() {
            p1 = Some(b);
        }
        if p2.is_none() {
            p2 = Some(a);
        }
    }
}
