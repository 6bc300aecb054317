//! Final placement result and quality summary.

use fpart_model::{DeviceId, NodeId, PartitionInstance};
use serde::{Deserialize, Serialize};

/// Quality counters for a finished placement.
///
/// A "connection" is one (driver, sink) pair of a signal net. A connection is
/// *cut* when its endpoints sit on different devices, and *violating* when
/// those devices additionally share no direct channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    /// Number of devices in the instance.
    pub num_devices: usize,
    /// Number of circuit nodes placed.
    pub num_nodes: usize,
    /// Per-device node capacity.
    pub capacity: u32,
    /// Nodes placed by the fallback pass rather than the greedy pass.
    pub fallback_placed: usize,
    /// Connections whose endpoints sit on different devices.
    pub cut_connections: usize,
    /// Cut connections whose devices share no direct channel.
    pub violating_connections: usize,
    /// Highest final occupancy across all devices.
    pub max_occupancy: usize,
}

/// The output of a partitioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionResult {
    /// Final device of every node, in node-id order.
    pub assignments: Vec<DeviceId>,
    /// Nodes held by each device, in placement order.
    pub device_nodes: Vec<Vec<NodeId>>,
    /// Quality counters.
    pub summary: PartitionSummary,
}

impl PartitionResult {
    /// Returns the assigned device of `node`.
    pub fn device_of(&self, node: NodeId) -> DeviceId {
        self.assignments[node.index()]
    }
}

/// Computes the quality counters for a complete assignment.
///
/// Adjacency checks use the instance's pristine topology — the working
/// copy's partitions lose devices as they fill, but the wiring itself never
/// changes.
pub fn summarize(
    instance: &PartitionInstance,
    assignments: &[DeviceId],
    fallback_placed: usize,
) -> PartitionSummary {
    let mut cut_connections = 0;
    let mut violating_connections = 0;
    for i in 0..assignments.len() {
        let driver = NodeId::from_raw(i as u32);
        let from = assignments[driver.index()];
        for &sink in instance.hypergraph.drives(driver) {
            let to = assignments[sink.index()];
            if from != to {
                cut_connections += 1;
                if !instance.topology.is_adjacent(from, to) {
                    violating_connections += 1;
                }
            }
        }
    }

    let mut occupancy = vec![0usize; instance.device_count()];
    for &device in assignments {
        occupancy[device.index()] += 1;
    }

    PartitionSummary {
        num_devices: instance.device_count(),
        num_nodes: assignments.len(),
        capacity: instance.capacity,
        fallback_placed,
        cut_connections,
        violating_connections,
        max_occupancy: occupancy.iter().copied().max().unwrap_or(0),
    }
}
