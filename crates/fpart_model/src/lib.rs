//! Problem model for the fpart multi-FPGA partitioner.
//!
//! This crate defines the immutable inputs of a partitioning run: the
//! device-to-device channel topology (with its derived reachability
//! partition), the circuit signal hypergraph, and the fixed seed pairs. The
//! [`PartitionInstance`] constructor is the validation boundary — every id is
//! range-checked and the capacity is checked against the node count before
//! any engine code runs.

#![warn(missing_docs)]

pub mod hypergraph;
pub mod ids;
pub mod instance;
pub mod topology;

pub use hypergraph::{CircuitHypergraph, SignalNet};
pub use ids::{DeviceId, NodeId};
pub use instance::{FixedPair, ModelError, PartitionInstance};
pub use topology::DeviceTopology;
