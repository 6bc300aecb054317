//! Circuit signal hypergraph.
//!
//! Each signal net fans out from one source node to any number of sink nodes.
//! The engine only ever asks "which nodes are affected when this node is
//! placed", so the hypergraph is stored as per-node adjacency in both
//! directions: `drives` (nets leaving the node) and `driven_by` (nets
//! arriving at it).

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// One directed fan-out signal net: `source` drives every node in `sinks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalNet {
    /// The driving node.
    pub source: NodeId,
    /// The driven nodes. May be empty (a net with no recorded sinks).
    pub sinks: Vec<NodeId>,
}

/// Per-node fan-in/fan-out adjacency over all signal nets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitHypergraph {
    /// `drives[n]`: nodes that `n` drives, one entry per (net, sink) pair.
    drives: Vec<Vec<NodeId>>,
    /// `driven_by[n]`: nodes driving `n`, one entry per (net, sink) pair.
    driven_by: Vec<Vec<NodeId>>,
}

impl CircuitHypergraph {
    /// Builds the adjacency from a list of fan-out nets.
    ///
    /// Node ids must be in range; [`PartitionInstance`] validates this before
    /// construction.
    ///
    /// [`PartitionInstance`]: crate::instance::PartitionInstance
    pub fn from_nets(num_nodes: u32, nets: &[SignalNet]) -> Self {
        let n = num_nodes as usize;
        let mut drives: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut driven_by: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for net in nets {
            debug_assert!(net.source.index() < n, "net source out of range");
            for &sink in &net.sinks {
                debug_assert!(sink.index() < n, "net sink out of range");
                drives[net.source.index()].push(sink);
                driven_by[sink.index()].push(net.source);
            }
        }
        Self { drives, driven_by }
    }

    /// Returns the number of circuit nodes.
    pub fn node_count(&self) -> usize {
        self.drives.len()
    }

    /// Returns the nodes driven by `node`.
    pub fn drives(&self, node: NodeId) -> &[NodeId] {
        &self.drives[node.index()]
    }

    /// Returns the nodes driving `node`.
    pub fn driven_by(&self, node: NodeId) -> &[NodeId] {
        &self.driven_by[node.index()]
    }

    /// Iterates every hyperedge neighbor of `node`: all driven nodes, then
    /// all driving nodes. A node connected through several nets appears once
    /// per connection, as the engine's narrowing expects.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.drives(node)
            .iter()
            .chain(self.driven_by(node))
            .copied()
    }
}
