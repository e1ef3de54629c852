//! Shared scenario-test helpers: keypairs, signed transactions, nodes.

use std::sync::{Arc, Once};

use forkline_core::crypto::KeyPair;
use forkline_core::types::{Block, Hash256, Transaction, TxInput, TxOutput};
use forkline_node::{InProcessTransport, Node, NodeConfig};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber once per test binary, so scenario runs
/// can be inspected with `RUST_LOG` the same way a real node's logs would
/// be read. Idempotent; safe to call from every test.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A genesis block paying `value` to `key`'s own public key.
pub fn genesis_block(key: &KeyPair, value: u64) -> Block {
    genesis_block_with_outputs(key, &[value])
}

/// A genesis block paying out `values` as independent outputs, all to
/// `key`'s own public key. Useful for building competing forks that spend
/// disjoint funds rather than racing over the same output.
pub fn genesis_block_with_outputs(key: &KeyPair, values: &[u64]) -> Block {
    let outputs = values.iter().map(|&value| TxOutput { value, pub_key: key.public_key() }).collect();
    let tx = key.finalize_transaction(Transaction {
        tx_number: Hash256::ZERO,
        inputs: vec![],
        outputs,
        sig: vec![],
    });
    Block { tx, prev: Hash256::ZERO, nonce: 0, pow: Hash256::ZERO }
}

/// A transaction spending genesis (or any prior transaction)'s output at
/// `output_index` back to `key`'s own key, conserving that output's value.
pub fn spend_output(key: &KeyPair, from: &Transaction, output_index: usize, to_value: u64) -> Transaction {
    let input = TxInput { number: from.tx_number, output: from.outputs[output_index].clone() };
    key.finalize_transaction(Transaction {
        tx_number: Hash256::ZERO,
        inputs: vec![input],
        outputs: vec![TxOutput { value: to_value, pub_key: key.public_key() }],
        sig: vec![],
    })
}

/// A transaction spending every output of `from`'s transaction back to
/// `key`'s own key, conserving total value.
pub fn spend_all(key: &KeyPair, from: &Transaction, to_value: u64) -> Transaction {
    let inputs = from
        .outputs
        .iter()
        .map(|out| TxInput { number: from.tx_number, output: out.clone() })
        .collect();
    key.finalize_transaction(Transaction {
        tx_number: Hash256::ZERO,
        inputs,
        outputs: vec![TxOutput { value: to_value, pub_key: key.public_key() }],
        sig: vec![],
    })
}

/// Stand up `n` nodes sharing one in-process transport and one genesis
/// block, named "node-0", "node-1", ...
pub fn test_network(genesis: &Block, n: usize) -> (Vec<Node>, Arc<InProcessTransport>) {
    let transport = Arc::new(InProcessTransport::new());
    let ids: Vec<String> = (0..n).map(|i| format!("node-{i}")).collect();
    let nodes = ids
        .iter()
        .map(|id| {
            let cfg = NodeConfig::new(id.clone(), ids.clone());
            Node::new(cfg, genesis.clone(), transport.clone())
        })
        .collect();
    (nodes, transport)
}

/// Drain every node's inbox until none has anything left to process.
pub fn settle(nodes: &mut [Node]) {
    loop {
        let mut processed_any = false;
        for node in nodes.iter_mut() {
            while node.process_one_inbound() {
                processed_any = true;
            }
        }
        if !processed_any {
            break;
        }
    }
}
