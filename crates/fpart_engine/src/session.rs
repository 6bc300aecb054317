//! The mutable state of one partitioning run.
//!
//! All shared state — the working topology copy, node states, candidate
//! sets, per-device node lists, the work queue, and the deferred list —
//! lives in a single [`PartitionSession`] so the passes can be exercised in
//! isolation. Mutations that carry invariants (committing, deferring,
//! closing a full device) go through methods; breaking one of those
//! invariants is a bug and panics.

use crate::candidate::CandidateSet;
use fpart_model::{DeviceId, DeviceTopology, NodeId, PartitionInstance};
use serde::{Deserialize, Serialize};

/// The assignment state of a circuit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Not yet placed.
    Unassigned,
    /// The greedy pass could not place this node without a violation; it
    /// waits for the fallback pass.
    Deferred,
    /// Placed on a device. Terminal.
    Assigned(DeviceId),
}

/// Mutable per-run partitioning state.
pub struct PartitionSession<'a> {
    /// The validated problem being solved.
    pub instance: &'a PartitionInstance,
    /// Working copy of the topology; full devices are removed from its
    /// reachability partitions as they close.
    pub topology: DeviceTopology,
    pub(crate) node_states: Vec<NodeState>,
    pub(crate) candidates: Vec<CandidateSet>,
    pub(crate) device_nodes: Vec<Vec<NodeId>>,
    pub(crate) queue: Vec<NodeId>,
    pub(crate) deferred: Vec<NodeId>,
}

impl<'a> PartitionSession<'a> {
    /// Creates a session with candidate sets seeded from the fixed pairs.
    ///
    /// Every seeded node is enqueued; all other nodes start unconstrained
    /// and enter the queue once propagation or a re-seed touches them.
    pub fn new(instance: &'a PartitionInstance) -> Self {
        let num_nodes = instance.node_count();
        let mut seeds: Vec<Vec<DeviceId>> = vec![Vec::new(); num_nodes];
        for pair in &instance.fixed_pairs {
            seeds[pair.node.index()].push(pair.device);
        }

        let mut candidates = Vec::with_capacity(num_nodes);
        let mut queue = Vec::new();
        for (i, devices) in seeds.into_iter().enumerate() {
            if devices.is_empty() {
                candidates.push(CandidateSet::Unconstrained);
            } else {
                candidates.push(CandidateSet::seeded(devices));
                queue.push(NodeId::from_raw(i as u32));
            }
        }

        Self {
            instance,
            topology: instance.topology.clone(),
            node_states: vec![NodeState::Unassigned; num_nodes],
            candidates,
            device_nodes: vec![Vec::new(); instance.device_count()],
            queue,
            deferred: Vec::new(),
        }
    }

    /// Returns the state of `node`.
    pub fn state(&self, node: NodeId) -> NodeState {
        self.node_states[node.index()]
    }

    /// Returns whether `node` is still unassigned (not deferred either).
    pub fn is_unassigned(&self, node: NodeId) -> bool {
        matches!(self.state(node), NodeState::Unassigned)
    }

    /// Returns the device of `node` if it has been assigned one.
    pub fn assigned_device(&self, node: NodeId) -> Option<DeviceId> {
        match self.state(node) {
            NodeState::Assigned(device) => Some(device),
            _ => None,
        }
    }

    /// Returns the candidate set of `node`.
    pub fn candidate(&self, node: NodeId) -> &CandidateSet {
        &self.candidates[node.index()]
    }

    /// Returns the current occupancy of `device`.
    pub fn occupancy(&self, device: DeviceId) -> usize {
        self.device_nodes[device.index()].len()
    }

    /// Returns whether `device` has reached capacity.
    pub fn is_full(&self, device: DeviceId) -> bool {
        self.occupancy(device) >= self.instance.capacity as usize
    }

    /// Returns every device with remaining capacity, ascending.
    pub fn open_devices(&self) -> Vec<DeviceId> {
        (0..self.instance.device_count() as u32)
            .map(DeviceId::from_raw)
            .filter(|&d| !self.is_full(d))
            .collect()
    }

    /// Adds `node` to the work queue.
    pub(crate) fn enqueue(&mut self, node: NodeId) {
        self.queue.push(node);
    }

    /// Pops the most-constrained queued node: fewest candidate devices,
    /// ties broken toward the lowest node id. Nodes that reached a terminal
    /// state while queued are discarded. Returns `None` when the queue is
    /// effectively empty.
    pub(crate) fn pop_most_constrained(&mut self) -> Option<NodeId> {
        let states = &self.node_states;
        self.queue
            .retain(|&n| matches!(states[n.index()], NodeState::Unassigned));
        let best = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|&(_, &n)| {
                let size = self.candidates[n.index()]
                    .as_allowed()
                    .map(|d| d.len())
                    .unwrap_or(usize::MAX);
                (size, n)
            })
            .map(|(pos, _)| pos)?;
        Some(self.queue.swap_remove(best))
    }

    /// Commits `node` to `device`.
    ///
    /// Panics if the node is not unassigned or the device is already full —
    /// both indicate a broken engine invariant, not bad input. Closes the
    /// device when this placement fills it.
    pub(crate) fn commit(&mut self, node: NodeId, device: DeviceId) {
        assert!(
            self.is_unassigned(node),
            "commit of node {node} in state {:?}",
            self.state(node)
        );
        assert!(!self.is_full(device), "commit of node {node} to full device {device}");
        self.device_nodes[device.index()].push(node);
        self.node_states[node.index()] = NodeState::Assigned(device);
        self.candidates[node.index()].clear();
        if self.is_full(device) {
            self.close_device(device);
        }
    }

    /// Defers `node` to the fallback pass.
    pub(crate) fn defer(&mut self, node: NodeId) {
        assert!(
            self.is_unassigned(node),
            "defer of node {node} in state {:?}",
            self.state(node)
        );
        self.node_states[node.index()] = NodeState::Deferred;
        self.candidates[node.index()].clear();
        self.deferred.push(node);
    }

    /// Places a deferred node during the fallback pass.
    pub(crate) fn place_deferred(&mut self, node: NodeId, device: DeviceId) {
        assert!(
            matches!(self.state(node), NodeState::Deferred),
            "fallback placement of node {node} in state {:?}",
            self.state(node)
        );
        assert!(!self.is_full(device), "fallback placement to full device {device}");
        self.device_nodes[device.index()].push(node);
        self.node_states[node.index()] = NodeState::Assigned(device);
    }

    /// Removes a device that reached capacity from the reachability
    /// partitions and from every remaining candidate set.
    fn close_device(&mut self, device: DeviceId) {
        self.topology.remove_device(device);
        for (i, candidate) in self.candidates.iter_mut().enumerate() {
            if matches!(self.node_states[i], NodeState::Unassigned) {
                candidate.remove(device);
            }
        }
    }

    /// Re-seeds every unassigned node with all open devices and enqueues it.
    ///
    /// Runs when the queue drains while unassigned nodes remain; newly freed
    /// propagation then continues instead of leaving isolated nodes stuck.
    /// Returns the number of re-seeded nodes.
    pub(crate) fn reseed_unassigned(&mut self) -> usize {
        let open = self.open_devices();
        let mut count = 0;
        for i in 0..self.node_states.len() {
            if matches!(self.node_states[i], NodeState::Unassigned) {
                debug_assert!(!open.is_empty(), "no open device for unassigned node {i}");
                self.candidates[i] = CandidateSet::Allowed(open.clone());
                self.queue.push(NodeId::from_raw(i as u32));
                count += 1;
            }
        }
        count
    }

    /// Drains the deferred list for the fallback pass.
    pub(crate) fn take_deferred(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.deferred)
    }

    /// Returns the final per-node device assignment, node-id order.
    ///
    /// Panics if any node is not in a terminal assigned state — after the
    /// fallback pass that would be an engine bug.
    pub fn final_assignment(&self) -> Vec<DeviceId> {
        self.node_states
            .iter()
            .enumerate()
            .map(|(i, state)| match state {
                NodeState::Assigned(device) => *device,
                other => panic!("node {i} finished in non-terminal state {other:?}"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpart_model::{FixedPair, SignalNet};

    fn dev(id: u32) -> DeviceId {
        DeviceId::from_raw(id)
    }

    fn node(id: u32) -> NodeId {
        NodeId::from_raw(id)
    }

    fn pair(n: u32, d: u32) -> FixedPair {
        FixedPair {
            node: node(n),
            device: dev(d),
        }
    }

    fn small_instance() -> PartitionInstance {
        // 0 - 1, capacity 2, nodes 0 -> 1, 2 isolated.
        PartitionInstance::new(
            2,
            2,
            3,
            &[(dev(0), dev(1))],
            &[SignalNet {
                source: node(0),
                sinks: vec![node(1)],
            }],
            vec![pair(0, 0)],
        )
        .unwrap()
    }

    #[test]
    fn seeding_enqueues_fixed_nodes_only() {
        let instance = small_instance();
        let session = PartitionSession::new(&instance);
        assert_eq!(session.queue, vec![node(0)]);
        assert_eq!(
            session.candidate(node(0)).as_allowed().unwrap(),
            &[dev(0)]
        );
        assert!(session.candidate(node(1)).is_unconstrained());
        assert!(session.candidate(node(2)).is_unconstrained());
    }

    #[test]
    fn multiple_pairs_union_their_devices() {
        let instance = PartitionInstance::new(
            3,
            1,
            1,
            &[],
            &[],
            vec![pair(0, 2), pair(0, 0), pair(0, 2)],
        )
        .unwrap();
        let session = PartitionSession::new(&instance);
        assert_eq!(
            session.candidate(node(0)).as_allowed().unwrap(),
            &[dev(0), dev(2)]
        );
    }

    #[test]
    fn commit_updates_occupancy_and_state() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        assert_eq!(session.state(node(0)), NodeState::Assigned(dev(0)));
        assert_eq!(session.occupancy(dev(0)), 1);
        assert!(!session.is_full(dev(0)));
    }

    #[test]
    fn filling_a_device_closes_it() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        // Give node 2 a candidate set that includes device 0.
        session.candidates[2] = CandidateSet::Allowed(vec![dev(0), dev(1)]);
        session.commit(node(0), dev(0));
        session.commit(node(1), dev(0));
        assert!(session.is_full(dev(0)));
        // Device 0 left every reachability partition and candidate set.
        assert_eq!(session.topology.reachable(dev(1)), &[dev(1)]);
        assert_eq!(
            session.candidate(node(2)).as_allowed().unwrap(),
            &[dev(1)]
        );
        assert_eq!(session.open_devices(), vec![dev(1)]);
    }

    #[test]
    #[should_panic(expected = "full device")]
    fn commit_to_full_device_panics() {
        let instance = PartitionInstance::new(2, 1, 2, &[], &[], vec![]).unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        session.commit(node(1), dev(0));
    }

    #[test]
    #[should_panic(expected = "commit of node")]
    fn double_commit_panics() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        session.commit(node(0), dev(1));
    }

    #[test]
    fn pop_prefers_fewest_candidates() {
        let instance = PartitionInstance::new(
            3,
            2,
            2,
            &[],
            &[],
            vec![pair(0, 0), pair(0, 1), pair(1, 2)],
        )
        .unwrap();
        let mut session = PartitionSession::new(&instance);
        // Node 1 has one candidate, node 0 has two.
        assert_eq!(session.pop_most_constrained(), Some(node(1)));
        assert_eq!(session.pop_most_constrained(), Some(node(0)));
        assert_eq!(session.pop_most_constrained(), None);
    }

    #[test]
    fn pop_skips_terminal_nodes() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(1));
        assert_eq!(session.pop_most_constrained(), None);
    }

    #[test]
    fn defer_records_node() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        session.defer(node(0));
        assert_eq!(session.state(node(0)), NodeState::Deferred);
        assert_eq!(session.take_deferred(), vec![node(0)]);
        assert!(session.take_deferred().is_empty());
    }

    #[test]
    fn reseed_targets_unassigned_only() {
        let instance = small_instance();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        session.defer(node(1));
        let count = session.reseed_unassigned();
        assert_eq!(count, 1);
        assert_eq!(
            session.candidate(node(2)).as_allowed().unwrap(),
            &[dev(0), dev(1)]
        );
        assert_eq!(session.pop_most_constrained(), Some(node(2)));
    }

    #[test]
    #[should_panic(expected = "non-terminal state")]
    fn final_assignment_requires_completion() {
        let instance = small_instance();
        let session = PartitionSession::new(&instance);
        let _ = session.final_assignment();
    }
}
