//! Node configuration.
//!
//! No file or environment loading layer: a node is always constructed
//! programmatically by its driver, so `NodeConfig` is a plain
//! constructor-time struct rather than a config-file schema.

use crate::transport::PeerId;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: PeerId,
    pub peers: Vec<PeerId>,
    /// Overrides the difficulty target the node's `PowEngine` mines and
    /// verifies against. Only meant for tests that need mining to
    /// converge quickly; production use always goes through the
    /// protocol-wide constant. Consumed by `Node::with_log_sink`.
    #[cfg(any(test, feature = "testing"))]
    pub difficulty_target_override: Option<[u8; 32]>,
}

impl NodeConfig {
    pub fn new(node_id: impl Into<PeerId>, peers: Vec<PeerId>) -> Self {
        Self {
            node_id: node_id.into(),
            peers,
            #[cfg(any(test, feature = "testing"))]
            difficulty_target_override: None,
        }
    }
}
