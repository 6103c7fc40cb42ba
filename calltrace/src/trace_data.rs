//! Trace data model
//!
//! Parses the tracer's JSON output into validated, immutable [`Record`]s.
//! The record schema is a closed contract with the tracer, so a malformed
//! record fails the whole load instead of being skipped.

use calltrace_common::{RawRecord, RawTraceFile, RECORD_ENTRY, RECORD_EXIT, UNITS_PER_MS};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::{Address, ThreadId, TraceError};

/// Function entry or exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Entry,
    Exit,
}

impl RecordKind {
    /// Label used in the trace file
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Entry => RECORD_ENTRY,
            RecordKind::Exit => RECORD_EXIT,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            RECORD_ENTRY => Ok(RecordKind::Entry),
            RECORD_EXIT => Ok(RecordKind::Exit),
            _ => Err(()),
        }
    }
}

/// One traced event, with timestamps already converted to milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: RecordKind,
    pub func_address: Address,
    pub caller_address: Address,
    pub timestamp_ms: f64,
    pub thread_id: ThreadId,
    pub cpu_usage: f64,
    pub depth: i64,
}

impl Record {
    fn from_raw(index: usize, raw: RawRecord) -> Result<Self, TraceError> {
        let kind = raw
            .kind
            .parse()
            .map_err(|()| TraceError::UnknownRecordType { index, value: raw.kind.clone() })?;
        let address = |field: &'static str, value: &str| {
            value.parse::<Address>().map_err(|_| TraceError::InvalidAddress {
                index,
                field,
                value: value.to_string(),
            })
        };

        Ok(Record {
            kind,
            func_address: address("func", &raw.func)?,
            caller_address: address("caller", &raw.caller)?,
            timestamp_ms: raw.timestamp / UNITS_PER_MS,
            thread_id: ThreadId(raw.thread_id),
            cpu_usage: raw.cpu_usage,
            depth: raw.depth,
        })
    }
}

/// Parsed trace file (immutable after loading)
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    pub total_time_ms: f64,
    pub records: Vec<Record>,
}

impl TraceData {
    /// Parse a trace file from disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// contains a malformed record
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| TraceError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&content)
    }

    /// Parse trace JSON
    ///
    /// # Errors
    /// Returns an error if the JSON does not match the trace schema
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let raw: RawTraceFile = serde_json::from_str(json)?;
        let records = raw
            .records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Record::from_raw(index, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TraceData { total_time_ms: raw.total_time / UNITS_PER_MS, records })
    }
}
