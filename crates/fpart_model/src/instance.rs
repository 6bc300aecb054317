//! The validated input to a partitioning run.
//!
//! [`PartitionInstance::new`] is the fail-fast boundary: every id that enters
//! the system is range-checked here, and the total device capacity is checked
//! against the node count, so the engine can index freely and its completion
//! guarantee holds. Downstream code treats an instance as trusted.

use crate::hypergraph::{CircuitHypergraph, SignalNet};
use crate::ids::{DeviceId, NodeId};
use crate::topology::DeviceTopology;
use serde::{Deserialize, Serialize};

/// A seed constraint: `node` starts with `device` as one of its candidate
/// devices. Several pairs may target the same node; the seeded candidate set
/// is the union of their devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPair {
    /// The constrained circuit node.
    pub node: NodeId,
    /// The seeded candidate device.
    pub device: DeviceId,
}

/// Validation errors for a partitioning instance.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A channel endpoint names a device outside `0..num_devices`.
    #[error("channel {index}: device {device} out of range (have {num_devices} devices)")]
    ChannelOutOfRange {
        /// Zero-based index of the offending channel.
        index: usize,
        /// The out-of-range device id.
        device: DeviceId,
        /// The declared device count.
        num_devices: u32,
    },

    /// A net endpoint names a node outside `0..num_nodes`.
    #[error("net {index}: node {node} out of range (have {num_nodes} nodes)")]
    NetNodeOutOfRange {
        /// Zero-based index of the offending net.
        index: usize,
        /// The out-of-range node id.
        node: NodeId,
        /// The declared node count.
        num_nodes: u32,
    },

    /// A fixed pair names a node outside `0..num_nodes`.
    #[error("fixed pair {index}: node {node} out of range (have {num_nodes} nodes)")]
    PairNodeOutOfRange {
        /// Zero-based index of the offending pair.
        index: usize,
        /// The out-of-range node id.
        node: NodeId,
        /// The declared node count.
        num_nodes: u32,
    },

    /// A fixed pair names a device outside `0..num_devices`.
    #[error("fixed pair {index}: device {device} out of range (have {num_devices} devices)")]
    PairDeviceOutOfRange {
        /// Zero-based index of the offending pair.
        index: usize,
        /// The out-of-range device id.
        device: DeviceId,
        /// The declared device count.
        num_devices: u32,
    },

    /// The devices cannot hold every node even when packed full.
    #[error(
        "insufficient capacity: {num_devices} devices x {capacity} < {num_nodes} nodes"
    )]
    InsufficientCapacity {
        /// The declared device count.
        num_devices: u32,
        /// The per-device capacity.
        capacity: u32,
        /// The declared node count.
        num_nodes: u32,
    },
}

/// A validated partitioning problem: topology, hypergraph, capacity, seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInstance {
    /// Maximum number of nodes per device.
    pub capacity: u32,
    /// The device channel topology with derived reachability.
    pub topology: DeviceTopology,
    /// The circuit signal hypergraph.
    pub hypergraph: CircuitHypergraph,
    /// The seed constraints.
    pub fixed_pairs: Vec<FixedPair>,
}

impl PartitionInstance {
    /// Validates the raw problem data and builds the instance.
    ///
    /// Checks every channel, net, and pair id against the declared counts and
    /// requires `num_devices * capacity >= num_nodes` so a complete
    /// assignment always exists.
    pub fn new(
        num_devices: u32,
        capacity: u32,
        num_nodes: u32,
        channels: &[(DeviceId, DeviceId)],
        nets: &[SignalNet],
        fixed_pairs: Vec<FixedPair>,
    ) -> Result<Self, ModelError> {
        for (index, &(a, b)) in channels.iter().enumerate() {
            for device in [a, b] {
                if device.as_raw() >= num_devices {
                    return Err(ModelError::ChannelOutOfRange {
                        index,
                        device,
                        num_devices,
                    });
                }
            }
        }

        for (index, net) in nets.iter().enumerate() {
            for node in std::iter::once(net.source).chain(net.sinks.iter().copied()) {
                if node.as_raw() >= num_nodes {
                    return Err(ModelError::NetNodeOutOfRange {
                        index,
                        node,
                        num_nodes,
                    });
                }
            }
        }

        for (index, pair) in fixed_pairs.iter().enumerate() {
            if pair.node.as_raw() >= num_nodes {
                return Err(ModelError::PairNodeOutOfRange {
                    index,
                    node: pair.node,
                    num_nodes,
                });
            }
            if pair.device.as_raw() >= num_devices {
                return Err(ModelError::PairDeviceOutOfRange {
                    index,
                    device: pair.device,
                    num_devices,
                });
            }
        }

        if (num_devices as u64) * (capacity as u64) < num_nodes as u64 {
            return Err(ModelError::InsufficientCapacity {
                num_devices,
                capacity,
                num_nodes,
            });
        }

        Ok(Self {
            capacity,
            topology: DeviceTopology::from_channels(num_devices, channels),
            hypergraph: CircuitHypergraph::from_nets(num_nodes, nets),
            fixed_pairs,
        })
    }

    /// Returns the number of devices.
    pub fn device_count(&self) -> usize {
        self.topology.device_count()
    }

    /// Returns the number of circuit nodes.
    pub fn node_count(&self) -> usize {
        self.hypergraph.node_count()
    }
}
