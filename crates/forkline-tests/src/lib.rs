//! Scenario tests for the Forkline node, exercised end to end through
//! `forkline_node::Node` rather than its individual components.

pub mod helpers;
