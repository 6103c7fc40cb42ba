//! Addresses, thread ids and the error types shared by the pipeline stages
//!
//! Runtime addresses travel as [`Address`] so they cannot be mixed up with
//! file-relative offsets or depths. Errors are split by who may fail: trace
//! loading is fatal, tool and snapshot errors only select the next fallback.

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{parse_hex, Address, ThreadId};

pub use errors::{SnapshotError, ToolError, TraceError};
