//! The greedy assignment pass.
//!
//! Repeatedly pops the most-constrained node from the work queue and tries
//! to place it. A node with a single candidate device takes the fast path:
//! its hyperedge neighbors are narrowed by the device's reachable set and it
//! commits immediately. A node with several candidates has each one scored
//! by a conflict penalty, then tried in order against a locality mask until
//! one leaves every still-unassigned neighbor at least one compatible
//! device. Nodes for which every route fails are deferred to the fallback
//! pass. When the queue drains with unassigned nodes remaining, every such
//! node is re-seeded from the open devices and the loop continues.

use crate::candidate::CandidateSet;
use crate::session::PartitionSession;
use fpart_diagnostics::{Diagnostic, DiagnosticSink};
use fpart_model::{DeviceId, NodeId};
use std::collections::BTreeSet;

/// Runs the greedy pass to completion: afterwards every node is either
/// assigned or deferred.
pub(crate) fn run_greedy(session: &mut PartitionSession, sink: &DiagnosticSink) {
    loop {
        let node = match session.pop_most_constrained() {
            Some(node) => node,
            None => {
                // The queue drained. Re-seed stuck unconstrained nodes (or
                // finish if none remain). Also covers inputs with no fixed
                // pairs at all, where the queue starts empty.
                if session.reseed_unassigned() == 0 {
                    break;
                }
                continue;
            }
        };
        place_node(session, node);
    }

    if !session.deferred.is_empty() {
        sink.emit(
            Diagnostic::warning(format!(
                "{} node(s) could not be placed without a channel violation",
                session.deferred.len()
            ))
            .with_note("deferred to the fallback pass"),
        );
    }
}

/// Attempts to place one popped node, ending in a commit or a deferral.
fn place_node(session: &mut PartitionSession, node: NodeId) {
    let candidates = match session.candidate(node).as_allowed() {
        Some(devices) => devices.to_vec(),
        None => unreachable!("queued node {node} has no candidate set"),
    };

    match candidates.as_slice() {
        [] => session.defer(node),
        &[device] => place_sole_candidate(session, node, device),
        _ => {
            let scored = score_candidates(session, node, &candidates);
            if !try_scored_candidates(session, node, &scored) {
                session.defer(node);
            }
        }
    }
}

/// Fast path for a node whose candidate set has exactly one device: narrow
/// every still-unassigned hyperedge neighbor by the device's reachable set,
/// then commit. Defers instead if the device is already full.
fn place_sole_candidate(session: &mut PartitionSession, node: NodeId, device: DeviceId) {
    if session.is_full(device) {
        session.defer(node);
        return;
    }

    let reachable = session.topology.reachable(device).to_vec();
    let hypergraph = &session.instance.hypergraph;
    let neighbors: Vec<NodeId> = hypergraph.neighbors(node).collect();
    for neighbor in neighbors {
        if !session.is_unassigned(neighbor) {
            continue;
        }
        let was_unconstrained = session.candidate(neighbor).is_unconstrained();
        session.candidates[neighbor.index()].narrow_to(&reachable);
        if was_unconstrained {
            session.enqueue(neighbor);
        }
    }
    session.commit(node, device);
}

/// Scores every candidate device by its conflict penalty and sorts ascending
/// by `(penalty, occupancy)`; the sort is stable, so equal keys keep the
/// ascending device order they arrived in.
///
/// The penalty counts, per hyperedge group, whether the candidate would join
/// assigned neighbors on other devices: one aggregate group over all fan-out
/// neighbors, plus one group per fan-in source (that source's device and the
/// devices of its other assigned sinks — the shared-sink conflict). A group
/// that already has assigned devices charges 1 when the candidate is not
/// among them, and 1 more when the candidate makes it exactly two distinct
/// devices: the moment a net definitely crosses a boundary.
fn score_candidates(
    session: &PartitionSession,
    node: NodeId,
    candidates: &[DeviceId],
) -> Vec<(DeviceId, u32)> {
    let hypergraph = &session.instance.hypergraph;
    let mut scored: Vec<(DeviceId, u32)> = candidates
        .iter()
        .map(|&candidate| {
            let mut penalty = 0;

            let mut group: BTreeSet<DeviceId> = hypergraph
                .drives(node)
                .iter()
                .filter_map(|&j| session.assigned_device(j))
                .collect();
            penalty += group_penalty(&mut group, candidate);

            for &source in hypergraph.driven_by(node) {
                let mut group: BTreeSet<DeviceId> =
                    session.assigned_device(source).into_iter().collect();
                group.extend(
                    hypergraph
                        .drives(source)
                        .iter()
                        .filter_map(|&k| session.assigned_device(k)),
                );
                penalty += group_penalty(&mut group, candidate);
            }

            (candidate, penalty)
        })
        .collect();

    scored.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| session.occupancy(a.0).cmp(&session.occupancy(b.0)))
    });
    scored
}

/// The penalty contribution of one hyperedge group for `candidate`.
fn group_penalty(group: &mut BTreeSet<DeviceId>, candidate: DeviceId) -> u32 {
    if group.is_empty() || !group.insert(candidate) {
        return 0;
    }
    if group.len() == 2 {
        2
    } else {
        1
    }
}

/// Walks the scored candidates and commits the first one compatible with
/// every still-unassigned hyperedge neighbor. Returns `false` if every
/// candidate was rejected.
fn try_scored_candidates(
    session: &mut PartitionSession,
    node: NodeId,
    scored: &[(DeviceId, u32)],
) -> bool {
    let num_devices = session.instance.device_count();

    'candidates: for &(device, _) in scored {
        // Locality mask: the candidate plus its raw channel adjacency. The
        // unmutated wiring is deliberate — a full device can still relay
        // locality even though no node may land on it.
        let mut mask = vec![false; num_devices];
        mask[device.index()] = true;
        for &adj in session.instance.topology.adjacent(device) {
            mask[adj.index()] = true;
        }

        let mut narrowings: Vec<(NodeId, Vec<DeviceId>)> = Vec::new();
        let mut newly_constrained: BTreeSet<NodeId> = BTreeSet::new();

        let hypergraph = &session.instance.hypergraph;
        for neighbor in hypergraph.neighbors(node) {
            if !session.is_unassigned(neighbor) {
                continue;
            }
            let compatible: Vec<DeviceId> = match session.candidate(neighbor).as_allowed() {
                Some(devices) => devices
                    .iter()
                    .copied()
                    .filter(|d| mask[d.index()])
                    .collect(),
                None => {
                    newly_constrained.insert(neighbor);
                    (0..num_devices as u32)
                        .map(DeviceId::from_raw)
                        .filter(|&d| mask[d.index()] && !session.is_full(d))
                        .collect()
                }
            };
            if compatible.is_empty() {
                continue 'candidates;
            }
            narrowings.push((neighbor, compatible));
        }

        for (neighbor, compatible) in narrowings {
            session.candidates[neighbor.index()] = CandidateSet::Allowed(compatible);
        }
        for neighbor in newly_constrained {
            session.enqueue(neighbor);
        }
        session.commit(node, device);
        return true;
    }

    false
}
