//! FPGA device topology and its derived reachability partition.
//!
//! Devices are connected by undirected channels. For every device `d`, the
//! full device id range splits into `reachable(d)` — `d` itself plus every
//! device wired directly to it — and `violating(d)` — every device that can
//! only be reached by crossing a channel boundary. The engine consults these
//! sequences constantly, so they are derived once at construction time and
//! mutated only by [`DeviceTopology::remove_device`] when a device fills up.

use crate::ids::DeviceId;
use serde::{Deserialize, Serialize};

/// The reachability split for one device: both halves sorted ascending,
/// disjoint, and jointly covering the full device range (until devices are
/// removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachPartition {
    /// The device itself plus directly wired devices.
    pub reachable: Vec<DeviceId>,
    /// Devices only reachable across an unwired channel boundary.
    pub violating: Vec<DeviceId>,
}

/// The device-to-device channel graph with per-device reachability partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTopology {
    /// Per-device sorted, deduplicated channel adjacency.
    adjacency: Vec<Vec<DeviceId>>,
    /// Per-device reachability partition, derived at construction.
    reach: Vec<ReachPartition>,
}

impl DeviceTopology {
    /// Builds the topology from undirected channel edges.
    ///
    /// Each channel is recorded on both endpoints. Adjacency lists are sorted
    /// and deduplicated, then every id in `0..num_devices` is classified into
    /// the reachable or violating half of each device's partition.
    ///
    /// Channel endpoints must be in range; [`PartitionInstance`] validates
    /// this before construction.
    ///
    /// [`PartitionInstance`]: crate::instance::PartitionInstance
    pub fn from_channels(num_devices: u32, channels: &[(DeviceId, DeviceId)]) -> Self {
        let n = num_devices as usize;
        let mut adjacency: Vec<Vec<DeviceId>> = vec![Vec::new(); n];
        for &(a, b) in channels {
            debug_assert!(a.index() < n && b.index() < n, "channel endpoint out of range");
            adjacency[a.index()].push(b);
            adjacency[b.index()].push(a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }

        let reach = (0..n)
            .map(|d| {
                let device = DeviceId::from_raw(d as u32);
                let mut reachable = Vec::with_capacity(adjacency[d].len() + 1);
                let mut violating = Vec::new();
                for id in 0..n {
                    let other = DeviceId::from_raw(id as u32);
                    if other == device || adjacency[d].binary_search(&other).is_ok() {
                        reachable.push(other);
                    } else {
                        violating.push(other);
                    }
                }
                ReachPartition {
                    reachable,
                    violating,
                }
            })
            .collect();

        Self { adjacency, reach }
    }

    /// Returns the number of devices.
    pub fn device_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the sorted channel adjacency of `device`.
    pub fn adjacent(&self, device: DeviceId) -> &[DeviceId] {
        &self.adjacency[device.index()]
    }

    /// Returns whether `a` and `b` share a direct channel.
    pub fn is_adjacent(&self, a: DeviceId, b: DeviceId) -> bool {
        self.adjacency[a.index()].binary_search(&b).is_ok()
    }

    /// Returns the devices reachable from `device` without a channel
    /// violation (including `device` itself), sorted ascending.
    pub fn reachable(&self, device: DeviceId) -> &[DeviceId] {
        &self.reach[device.index()].reachable
    }

    /// Returns the devices requiring a channel violation to reach from
    /// `device`, sorted ascending.
    pub fn violating(&self, device: DeviceId) -> &[DeviceId] {
        &self.reach[device.index()].violating
    }

    /// Removes a full device from every device's reachability partition so no
    /// further node considers it. Called exactly once per device, when it
    /// reaches capacity. Channel adjacency is left untouched — locality masks
    /// are built from the raw wiring.
    pub fn remove_device(&mut self, device: DeviceId) {
        for part in &mut self.reach {
            if let Ok(pos) = part.reachable.binary_search(&device) {
                part.reachable.remove(pos);
            } else if let Ok(pos) = part.violating.binary_search(&device) {
                part.violating.remove(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(id: u32) -> DeviceId {
        DeviceId::from_raw(id)
    }

    fn line_topology() -> DeviceTopology {
        // 0 - 1 - 2 - 3
        DeviceTopology::from_channels(4, &[(dev(0), dev(1)), (dev(1), dev(2)), (dev(2), dev(3))])
    }

    #[test]
    fn partition_covers_all_devices_disjointly() {
        let topo = line_topology();
        for d in 0..4 {
            let device = dev(d);
            let mut all: Vec<_> = topo
                .reachable(device)
                .iter()
                .chain(topo.violating(device))
                .copied()
                .collect();
            all.sort_unstable();
            let expected: Vec<_> = (0..4).map(dev).collect();
            assert_eq!(all, expected);
            for v in topo.violating(device) {
                assert!(!topo.reachable(device).contains(v));
            }
        }
    }

    #[test]
    fn reachable_includes_self_and_neighbors() {
        let topo = line_topology();
        assert_eq!(topo.reachable(dev(1)), &[dev(0), dev(1), dev(2)]);
        assert_eq!(topo.violating(dev(1)), &[dev(3)]);
        assert_eq!(topo.reachable(dev(0)), &[dev(0), dev(1)]);
        assert_eq!(topo.violating(dev(0)), &[dev(2), dev(3)]);
    }

    #[test]
    fn isolated_device_reaches_only_itself() {
        let topo = DeviceTopology::from_channels(3, &[(dev(0), dev(1))]);
        assert_eq!(topo.reachable(dev(2)), &[dev(2)]);
        assert_eq!(topo.violating(dev(2)), &[dev(0), dev(1)]);
    }

    #[test]
    fn adjacency_is_sorted_and_deduplicated() {
        let topo = DeviceTopology::from_channels(
            3,
            &[(dev(2), dev(0)), (dev(0), dev(1)), (dev(1), dev(0))],
        );
        assert_eq!(topo.adjacent(dev(0)), &[dev(1), dev(2)]);
        assert!(topo.is_adjacent(dev(0), dev(2)));
        assert!(!topo.is_adjacent(dev(1), dev(2)));
    }

    #[test]
    fn derivation_is_deterministic() {
        let channels = [(dev(0), dev(2)), (dev(1), dev(3)), (dev(2), dev(3))];
        let a = DeviceTopology::from_channels(5, &channels);
        let b = DeviceTopology::from_channels(5, &channels);
        assert_eq!(a, b);
    }

    #[test]
    fn remove_device_strips_both_halves() {
        let mut topo = line_topology();
        topo.remove_device(dev(1));
        // 1 was reachable from 0 and 2, violating from 3.
        assert_eq!(topo.reachable(dev(0)), &[dev(0)]);
        assert_eq!(topo.reachable(dev(2)), &[dev(2), dev(3)]);
        assert_eq!(topo.violating(dev(3)), &[dev(0)]);
        // Raw adjacency is preserved.
        assert_eq!(topo.adjacent(dev(0)), &[dev(1)]);
    }

    #[test]
    fn serde_roundtrip() {
        let topo = line_topology();
        let json = serde_json::to_string(&topo).unwrap();
        let restored: DeviceTopology = serde_json::from_str(&json).unwrap();
        assert_eq!(topo, restored);
    }
}
