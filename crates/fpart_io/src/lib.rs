//! Text input/output adapters for the fpart partitioner.
//!
//! The input format is a whitespace-separated text file: a six-integer
//! header (`numDevices numChannels capacity numNodes numNets numFixedPairs`),
//! the channel pairs, one line per signal net (`source sink…`), and the
//! fixed pairs. The output is one `nodeId deviceId` line per node, in
//! node-id order. Neither side contains algorithmic content; both fail fast
//! with typed errors on malformed data.

#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{ReadError, WriteError};
pub use reader::{parse_instance, read_instance};
pub use writer::{format_assignment, write_assignment};
