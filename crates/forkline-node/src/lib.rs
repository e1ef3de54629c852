//! # forkline-node: node composition: block tree, head tracker, verifier,
//! PoW engine and peer transport wired into a single driver-facing [`Node`].

pub mod config;
pub mod node;
pub mod transport;

pub use config::NodeConfig;
pub use node::Node;
pub use transport::{InProcessTransport, PeerId, PeerTransport};
