//! Failure modes of trace loading, external tools and the base snapshot

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Loading or validating a trace file. Always fatal for the run.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Record {index}: invalid {field} address {value:?}")]
    InvalidAddress { index: usize, field: &'static str, value: String },

    #[error("Record {index}: unknown record type {value:?}")]
    UnknownRecordType { index: usize, value: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Running an external tool. Callers treat every variant as "try the next
/// strategy".
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed { program: String, status: String, stderr: String },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("Could not parse {program} output: {reason}")]
    Unparseable { program: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// True when the tool could not be started at all (usually not installed)
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ToolError::Spawn { .. })
    }
}

/// Reading the runtime base snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("No snapshot at {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime_base value {0:?}")]
    InvalidBase(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
