use thiserror::Error;

/// Result alias for `socgraph`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the graph store, queries, and community detection.
///
/// Data-quality problems found while ingesting records are never errors; they
/// are counted in [`IngestStats`](crate::store::IngestStats). Everything here is
/// caller misuse or an I/O failure.
#[derive(Debug, Error)]
pub enum Error {
    /// A node index (or external id) was outside the graph.
    #[error("index {index} out of range for graph with {len} nodes")]
    IndexOutOfRange {
        /// Offending index, as passed by the caller.
        index: u64,
        /// Number of nodes in the graph.
        len: usize,
    },

    /// An operation was attempted before its preconditions were met.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Length mismatch between a per-node buffer and the graph.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Unrecoverable input error (reading the underlying file failed mid-record).
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: u64,
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be decoded.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_range(index: impl TryInto<u64>, len: usize) -> Self {
        Error::IndexOutOfRange {
            index: index.try_into().unwrap_or(u64::MAX),
            len,
        }
    }
}
