//! Call stack reconstruction from entry/exit records.
//!
//! Groups records by thread, pairs exits with their entries to compute call
//! durations, and aggregates per-thread time and CPU.
//!
//! # Architecture
//!
//! - **`group_by_thread()`** - Partition records, preserving arrival order
//! - **`CallTimingState`** - Open frames keyed by `(function, depth)`
//! - **`TraceReconstructor`** - Drives both and resolves names per record
//!
//! ## Exit Matching
//!
//! The tracer reports an entry at the depth *before* incrementing its counter
//! and an exit at the depth *after* decrementing it, yet exits are looked up
//! one level shallower than their own depth:
//!
//! ```text
//! entry  func=A depth=0 ts=1.0   → open (A, 0) = 1.0
//! exit   func=A depth=1 ts=2.0   → look up (A, 0) → elapsed 1.000ms
//! exit   func=A depth=0 ts=3.0   → look up (A, -1) → miss → elapsed 0.000ms
//! ```
//!
//! Reports keep this rule unchanged.

use calltrace_common::CPU_USAGE_SCALE;
use std::collections::HashMap;

use crate::domain::{Address, ThreadId};
use crate::symbolization::NameResolver;
use crate::trace_data::{Record, RecordKind};

// =============================================================================
// THREAD GROUPING
// =============================================================================

/// Records of one traced thread, in arrival order
#[derive(Debug)]
pub struct ThreadTrace<'a> {
    pub thread_id: &'a ThreadId,
    pub records: Vec<&'a Record>,
}

impl ThreadTrace<'_> {
    /// Time between the first and last record
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Sum of CPU samples, scaled to a percentage
    #[must_use]
    pub fn cpu_percent(&self) -> f64 {
        self.records.iter().map(|r| r.cpu_usage).sum::<f64>() / CPU_USAGE_SCALE
    }
}

/// Partition records by thread, in order of each thread's first record.
#[must_use]
pub fn group_by_thread(records: &[Record]) -> Vec<ThreadTrace<'_>> {
    let mut slots: HashMap<&ThreadId, usize> = HashMap::new();
    let mut threads: Vec<ThreadTrace<'_>> = Vec::new();

    for record in records {
        let slot = *slots.entry(&record.thread_id).or_insert_with(|| {
            threads.push(ThreadTrace { thread_id: &record.thread_id, records: Vec::new() });
            threads.len() - 1
        });
        threads[slot].records.push(record);
    }

    threads
}

// =============================================================================
// CALL TIMING
// =============================================================================

/// Entry timestamps of open frames for one reconstruction pass
#[derive(Debug, Default)]
pub struct CallTimingState {
    starts: HashMap<(Address, i64), f64>,
}

impl CallTimingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember when a frame opened. A later entry at the same key replaces it.
    pub fn open(&mut self, record: &Record) {
        self.starts.insert((record.func_address, record.depth), record.timestamp_ms);
    }

    /// Elapsed time for an exit, matched one depth level shallower.
    ///
    /// Zero when no entry matches. The entry is left in place.
    #[must_use]
    pub fn close(&self, record: &Record) -> f64 {
        let key = (record.func_address, record.depth.saturating_sub(1));
        let start = self.starts.get(&key).copied().unwrap_or(record.timestamp_ms);
        record.timestamp_ms - start
    }
}

// =============================================================================
// RECONSTRUCTED OUTPUT
// =============================================================================

/// One record, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct CallLine {
    pub kind: RecordKind,
    /// Nesting level used for display
    pub indent: usize,
    pub function: String,
    /// Entry records only
    pub caller: Option<String>,
    pub timestamp_ms: f64,
    /// Present when the record carries a positive CPU sample
    pub cpu_percent: Option<f64>,
    /// Exit records only
    pub elapsed_ms: Option<f64>,
}

/// Per-thread summary plus its lines
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadReport {
    pub thread_id: ThreadId,
    pub duration_ms: f64,
    pub cpu_percent: f64,
    pub lines: Vec<CallLine>,
}

/// Display indentation: occurrences of "exit" in the record's type label.
fn indent_for(kind: RecordKind) -> usize {
    kind.label().matches("exit").count()
}

// =============================================================================
// RECONSTRUCTOR
// =============================================================================

/// Turns a record stream into per-thread reports
pub struct TraceReconstructor<'a> {
    resolver: &'a dyn NameResolver,
}

impl<'a> TraceReconstructor<'a> {
    pub fn new(resolver: &'a dyn NameResolver) -> Self {
        Self { resolver }
    }

    /// Reconstruct every thread, in order of first appearance.
    #[must_use]
    pub fn reconstruct(&self, records: &[Record]) -> Vec<ThreadReport> {
        group_by_thread(records).iter().map(|thread| self.reconstruct_thread(thread)).collect()
    }

    fn reconstruct_thread(&self, thread: &ThreadTrace<'_>) -> ThreadReport {
        let mut timing = CallTimingState::new();
        let mut lines = Vec::with_capacity(thread.records.len());

        for record in &thread.records {
            let (caller, elapsed_ms) = match record.kind {
                RecordKind::Entry => {
                    timing.open(record);
                    (Some(self.resolver.resolve_name(record.caller_address)), None)
                }
                RecordKind::Exit => (None, Some(timing.close(record))),
            };

            lines.push(CallLine {
                kind: record.kind,
                indent: indent_for(record.kind),
                function: self.resolver.resolve_name(record.func_address),
                caller,
                timestamp_ms: record.timestamp_ms,
                cpu_percent: (record.cpu_usage > 0.0).then_some(record.cpu_usage / CPU_USAGE_SCALE),
                elapsed_ms,
            });
        }

        ThreadReport {
            thread_id: thread.thread_id.clone(),
            duration_ms: thread.duration_ms(),
            cpu_percent: thread.cpu_percent(),
            lines,
        }
    }
}
