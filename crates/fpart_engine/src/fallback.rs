//! The violation fallback pass.
//!
//! Every node the greedy pass deferred is guaranteed a device here. Each
//! deferred node gets an affinity table weighting the non-full devices that
//! already hold its hyperedge neighbors; an isolated node (or one whose
//! neighbors all sit on full devices) falls back to every open device at
//! weight one. Nodes are resolved most-constrained-first, each onto its
//! highest-affinity device, and tables are maintained as devices fill.

use crate::session::PartitionSession;
use fpart_diagnostics::{Diagnostic, DiagnosticSink};
use fpart_model::{DeviceId, NodeId};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Places every deferred node. Runs exactly one outer iteration per node.
pub(crate) fn resolve_deferred(session: &mut PartitionSession, sink: &DiagnosticSink) {
    let deferred = session.take_deferred();
    if deferred.is_empty() {
        return;
    }

    let mut tables: Vec<Vec<(DeviceId, u32)>> = deferred
        .iter()
        .map(|&node| build_affinity_table(session, node))
        .collect();
    for table in &mut tables {
        sort_table(table, session);
    }

    let mut remaining: Vec<usize> = (0..deferred.len()).collect();
    while !remaining.is_empty() {
        // Most urgent first: fewest candidate devices, then the node whose
        // best device carries the highest conflict weight, then lowest id.
        let pos = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &i)| {
                let table = &tables[i];
                let best_weight = table.last().map(|entry| entry.1).unwrap_or(0);
                (table.len(), Reverse(best_weight), deferred[i])
            })
            .map(|(pos, _)| pos)
            .expect("remaining is non-empty");
        let i = remaining.swap_remove(pos);

        let node = deferred[i];
        let device = tables[i].last().expect("affinity table is never empty").0;
        session.place_deferred(node, device);

        let filled = session.is_full(device);
        for &j in &remaining {
            if filled {
                tables[j].retain(|entry| entry.0 != device);
                if tables[j].is_empty() {
                    tables[j] = open_devices_table(session);
                }
            }
            sort_table(&mut tables[j], session);
        }
    }

    sink.emit(Diagnostic::note(format!(
        "fallback pass placed {} node(s)",
        deferred.len()
    )));
}

/// Builds the device-to-weight table for one deferred node.
///
/// Fan-out neighbors register their device at weight 1 without stacking;
/// fan-in neighbors stack. Full devices never enter the table. An empty
/// table falls back to every open device at weight 1.
fn build_affinity_table(session: &PartitionSession, node: NodeId) -> Vec<(DeviceId, u32)> {
    let hypergraph = &session.instance.hypergraph;
    let mut weights: BTreeMap<DeviceId, u32> = BTreeMap::new();

    for &sink_node in hypergraph.drives(node) {
        if let Some(device) = session.assigned_device(sink_node) {
            if !session.is_full(device) {
                weights.entry(device).or_insert(1);
            }
        }
    }
    for &source in hypergraph.driven_by(node) {
        if let Some(device) = session.assigned_device(source) {
            if !session.is_full(device) {
                weights.entry(device).and_modify(|w| *w += 1).or_insert(1);
            }
        }
    }

    if weights.is_empty() {
        return open_devices_table(session);
    }
    weights.into_iter().collect()
}

/// Every open device at weight 1, ascending.
fn open_devices_table(session: &PartitionSession) -> Vec<(DeviceId, u32)> {
    session
        .open_devices()
        .into_iter()
        .map(|device| (device, 1))
        .collect()
}

/// Keeps a table sorted ascending by `(weight, occupancy descending)`, so
/// the last entry is the placement choice: highest weight, and among equal
/// weights the device with the most room.
fn sort_table(table: &mut [(DeviceId, u32)], session: &PartitionSession) {
    table.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| session.occupancy(b.0).cmp(&session.occupancy(a.0)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NodeState;
    use fpart_model::{PartitionInstance, SignalNet};

    fn dev(id: u32) -> DeviceId {
        DeviceId::from_raw(id)
    }

    fn node(id: u32) -> NodeId {
        NodeId::from_raw(id)
    }

    fn net(source: u32, sinks: &[u32]) -> SignalNet {
        SignalNet {
            source: node(source),
            sinks: sinks.iter().map(|&s| node(s)).collect(),
        }
    }

    #[test]
    fn isolated_node_goes_to_an_open_device() {
        let instance = PartitionInstance::new(2, 1, 2, &[], &[], vec![]).unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        session.defer(node(1));

        let sink = DiagnosticSink::new();
        resolve_deferred(&mut session, &sink);
        // Device 0 is full, so the open-devices fallback yields device 1.
        assert_eq!(session.state(node(1)), NodeState::Assigned(dev(1)));
    }

    #[test]
    fn node_joins_its_heaviest_neighbor_device() {
        // Node 3 is driven by nodes 0 and 1 (device 1) and drives node 2
        // (device 0): weight 2 for device 1, weight 1 for device 0.
        let instance = PartitionInstance::new(
            2,
            4,
            4,
            &[],
            &[net(0, &[3]), net(1, &[3]), net(3, &[2])],
            vec![],
        )
        .unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(1));
        session.commit(node(1), dev(1));
        session.commit(node(2), dev(0));
        session.defer(node(3));

        let table = build_affinity_table(&session, node(3));
        assert_eq!(table, vec![(dev(0), 1), (dev(1), 2)]);

        let sink = DiagnosticSink::new();
        resolve_deferred(&mut session, &sink);
        assert_eq!(session.state(node(3)), NodeState::Assigned(dev(1)));
    }

    #[test]
    fn fanout_neighbors_do_not_stack_weight() {
        // Node 0 drives nodes 1 and 2, both on device 0; fan-out contributes
        // a flat weight of 1.
        let instance =
            PartitionInstance::new(2, 4, 3, &[], &[net(0, &[1, 2])], vec![]).unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(1), dev(0));
        session.commit(node(2), dev(0));
        session.defer(node(0));

        let table = build_affinity_table(&session, node(0));
        assert_eq!(table, vec![(dev(0), 1)]);
    }

    #[test]
    fn full_devices_are_excluded_from_tables() {
        let instance = PartitionInstance::new(2, 1, 2, &[], &[net(0, &[1])], vec![]).unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(1), dev(0));
        session.defer(node(0));

        // Node 0's only neighbor sits on the (now full) device 0.
        let table = build_affinity_table(&session, node(0));
        assert_eq!(table, vec![(dev(1), 1)]);
    }

    #[test]
    fn equal_weight_prefers_the_emptier_device() {
        let instance = PartitionInstance::new(
            3,
            4,
            4,
            &[],
            &[net(0, &[3]), net(1, &[3])],
            vec![],
        )
        .unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(0), dev(0));
        session.commit(node(1), dev(1));
        session.commit(node(2), dev(0));
        session.defer(node(3));

        // Devices 0 and 1 both weigh 1; device 1 holds fewer nodes.
        let mut table = build_affinity_table(&session, node(3));
        sort_table(&mut table, &session);
        assert_eq!(table.last().unwrap().0, dev(1));
    }

    #[test]
    fn places_every_deferred_node_under_capacity() {
        let instance = PartitionInstance::new(2, 2, 4, &[], &[], vec![]).unwrap();
        let mut session = PartitionSession::new(&instance);
        for i in 0..4 {
            session.defer(node(i));
        }

        let sink = DiagnosticSink::new();
        resolve_deferred(&mut session, &sink);
        for i in 0..4 {
            assert!(matches!(session.state(node(i)), NodeState::Assigned(_)));
        }
        assert_eq!(session.occupancy(dev(0)), 2);
        assert_eq!(session.occupancy(dev(1)), 2);
    }

    #[test]
    fn tables_follow_devices_that_fill_mid_pass() {
        // Three deferred nodes all attracted to device 0 (capacity 2): the
        // third must spill to device 1 once 0 fills.
        let instance = PartitionInstance::new(
            2,
            2,
            4,
            &[],
            &[net(3, &[0]), net(3, &[1]), net(3, &[2])],
            vec![],
        )
        .unwrap();
        let mut session = PartitionSession::new(&instance);
        session.commit(node(3), dev(0));
        for i in 0..3 {
            session.defer(node(i));
        }

        let sink = DiagnosticSink::new();
        resolve_deferred(&mut session, &sink);
        let on_zero = (0..4)
            .filter(|&i| session.state(node(i)) == NodeState::Assigned(dev(0)))
            .count();
        let on_one = (0..4)
            .filter(|&i| session.state(node(i)) == NodeState::Assigned(dev(1)))
            .count();
        assert_eq!(on_zero, 2);
        assert_eq!(on_one, 2);
    }
}
