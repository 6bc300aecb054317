//! Error types for reading problem files and writing assignments.

use fpart_model::ModelError;

/// Errors that can occur while reading a partitioning problem file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// An I/O error occurred while reading the file.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// A token could not be parsed as the expected integer.
    #[error("line {line}: expected {expected}, found '{found}'")]
    Malformed {
        /// One-based line number of the offending token.
        line: usize,
        /// What the parser was looking for.
        expected: &'static str,
        /// The token actually found.
        found: String,
    },

    /// The file ended before all declared items were read.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// The declared counts were consistent but the data failed validation.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors that can occur while writing an assignment file.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// An I/O error occurred while writing the file.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
