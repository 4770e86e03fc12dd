//! Harness error types.

use std::fmt;

use thiserror::Error;

/// Boxed error produced by a failing workload.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where in a trial session a workload failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Untimed warmup executions.
    Warmup,
    /// Timed sample windows.
    Sample,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Warmup => f.write_str("warmup"),
            Stage::Sample => f.write_str("sample"),
        }
    }
}

/// Errors that can occur while measuring workloads.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A workload returned an error. No retry is attempted and the
    /// remaining repeats of the session are skipped.
    #[error("workload '{workload}' failed during {stage} {index}: {source}")]
    WorkloadFailure {
        /// Name of the failing workload.
        workload: String,
        /// Phase of the session the failure happened in.
        stage: Stage,
        /// Zero-based index of the execution within that phase.
        index: usize,
        /// The error returned by the workload.
        #[source]
        source: BoxError,
    },

    /// A repeat count, batch size, size sequence or exponent was rejected
    /// before any sample was taken.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Aggregation was attempted on zero samples.
    #[error("cannot summarize an empty sample set")]
    EmptyInput,

    /// Writing a report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a value for fingerprinting or reporting failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl HarnessError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HarnessError::InvalidConfiguration(msg.into())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for HarnessError {
    fn from(e: bincode::Error) -> Self {
        HarnessError::Serialization(e.to_string())
    }
}

/// Result alias used throughout the harness.
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
