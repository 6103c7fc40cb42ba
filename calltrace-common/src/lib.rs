//! # Shared Trace Schema (Tracer ↔ Analyzer)
//!
//! Defines the on-disk formats exchanged between the instrumentation runtime
//! that records function entry/exit events and the `calltrace` analyzer that
//! turns them into per-thread call stacks. Both sides must agree on these
//! field names and unit conventions.
//!
//! ## Files
//!
//! - **Trace file**: [`RawTraceFile`], a JSON object with a `total_time` and a
//!   flat `records` array of [`RawRecord`].
//! - **Runtime base snapshot**: [`RuntimeBaseSnapshot`], written by the tracer
//!   next to the trace as [`RUNTIME_BASE_FILE`] when it can observe the image
//!   load address of the traced program.
//!
//! ## Units
//!
//! Timestamps are integers in producer units; divide by [`UNITS_PER_MS`] to get
//! milliseconds. CPU samples are divided by [`CPU_USAGE_SCALE`] to get a
//! percentage.
//!
//! Serde derives are only compiled with the `serde` feature, so a tracer
//! runtime can depend on the constants without pulling in serde.

// ============================================================================
// Record Type Labels
// ============================================================================

/// **Function entry**: emitted by the tracer's enter hook
///
/// Paired with: `RECORD_EXIT` for the same function address
pub const RECORD_ENTRY: &str = "entry";

/// **Function exit**: emitted by the tracer's exit hook
///
/// The tracer decrements its depth counter before emitting, so an exit
/// carries the depth the matching entry was recorded one level above.
pub const RECORD_EXIT: &str = "exit";

// ============================================================================
// Unit Conventions
// ============================================================================

/// Producer time units per millisecond
///
/// Applies to both `total_time` and every record `timestamp`.
pub const UNITS_PER_MS: f64 = 1_000_000.0;

/// Divisor turning a raw `cpu_usage` sample into a percentage
pub const CPU_USAGE_SCALE: f64 = 10.0;

/// File name of the runtime base snapshot, looked up in the working directory
pub const RUNTIME_BASE_FILE: &str = "runtime_base.json";

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Top-level trace file written by the tracer
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTraceFile {
    /// Wall time covered by the trace, in producer units
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_time: f64,

    /// Events in emission order
    #[cfg_attr(feature = "serde", serde(default))]
    pub records: Vec<RawRecord>,
}

/// One function entry or exit as written by the tracer
///
/// Addresses are hex strings (`"0x100003f40"`) holding runtime addresses, i.e.
/// after the loader relocated the image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRecord {
    /// [`RECORD_ENTRY`] or [`RECORD_EXIT`]
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,

    /// Address of the instrumented function
    pub func: String,

    /// Call site inside the calling function
    pub caller: String,

    /// Producer time units (see [`UNITS_PER_MS`])
    pub timestamp: f64,

    /// Opaque thread identifier (typically a `pthread_t` rendered as hex)
    pub thread_id: String,

    /// CPU usage sample (see [`CPU_USAGE_SCALE`]), 0 when not sampled
    #[cfg_attr(feature = "serde", serde(default))]
    pub cpu_usage: f64,

    /// Call nesting depth as counted by the tracer
    #[cfg_attr(feature = "serde", serde(default))]
    pub depth: i64,
}

/// Runtime base address observed by the tracer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeBaseSnapshot {
    /// Hex string, e.g. `"0x104a3c000"`
    pub runtime_base: String,
}
