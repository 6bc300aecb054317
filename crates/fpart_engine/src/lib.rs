//! Candidate-propagation and greedy-assignment partitioning engine.
//!
//! This crate assigns every circuit node of a [`PartitionInstance`] to an
//! FPGA device in three steps:
//!
//! 1. **Seed** — each fixed-paired node starts with its seeded candidate
//!    devices; everything else is unconstrained.
//! 2. **Greedy pass** — most-constrained nodes are placed first, narrowing
//!    their hyperedge neighbors' candidate sets through the device
//!    reachability partition; nodes that cannot be placed without a channel
//!    violation are deferred.
//! 3. **Fallback pass** — every deferred node is placed onto the open device
//!    holding the most of its already-placed neighbors.
//!
//! The run always completes: every node ends with a concrete device and no
//! device exceeds its capacity.
//!
//! # Usage
//!
//! ```ignore
//! use fpart_engine::partition;
//!
//! let result = partition(&instance, &sink);
//! assert_eq!(result.assignments.len(), instance.node_count());
//! ```

#![warn(missing_docs)]

pub mod candidate;
mod fallback;
mod greedy;
pub mod session;
pub mod summary;

pub use candidate::CandidateSet;
pub use session::{NodeState, PartitionSession};
pub use summary::{summarize, PartitionResult, PartitionSummary};

use fpart_diagnostics::{Diagnostic, DiagnosticSink};
use fpart_model::PartitionInstance;

/// Partitions every node of `instance` onto a device.
///
/// Runs the greedy pass followed by the fallback pass and returns the
/// complete assignment with quality counters. Non-fatal findings (deferred
/// nodes, pass notes) are emitted into `sink`.
///
/// # Panics
///
/// Panics if an internal invariant breaks (a node left unassigned, a device
/// over capacity) — these are engine bugs, not input errors; inputs are
/// validated by [`PartitionInstance::new`].
pub fn partition(instance: &PartitionInstance, sink: &DiagnosticSink) -> PartitionResult {
    let mut session = PartitionSession::new(instance);
    sink.emit(Diagnostic::note(format!(
        "seeded {} node(s) from {} fixed pair(s)",
        session.queue.len(),
        instance.fixed_pairs.len()
    )));

    greedy::run_greedy(&mut session, sink);
    let fallback_placed = session.deferred.len();
    fallback::resolve_deferred(&mut session, sink);

    let assignments = session.final_assignment();
    for (device, nodes) in session.device_nodes.iter().enumerate() {
        assert!(
            nodes.len() <= instance.capacity as usize,
            "device {device} over capacity: {} > {}",
            nodes.len(),
            instance.capacity
        );
    }
    let placed: usize = session.device_nodes.iter().map(Vec::len).sum();
    assert_eq!(placed, instance.node_count(), "placement count mismatch");

    let summary = summary::summarize(instance, &assignments, fallback_placed);
    PartitionResult {
        assignments,
        device_nodes: std::mem::take(&mut session.device_nodes),
        summary,
    }
}
