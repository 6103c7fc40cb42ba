//! # calltrace - Call Stack Reconstruction for Instrumented Binaries
//!
//! calltrace turns the flat entry/exit log written by a function
//! instrumentation runtime (`-finstrument-functions` style hooks) into a
//! readable, per-thread call stack with call durations and CPU usage.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Instrumented Application                        │
//! │     __cyg_profile_func_enter / __cyg_profile_func_exit          │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ trace.json (+ runtime_base.json)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    calltrace (This Crate)                       │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Trace Data  │──▶│   Analysis   │──▶│    Report    │         │
//! │  │   (JSON)     │   │ (call stack) │   │   (text)     │         │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘         │
//! │                            │ resolve_name()                     │
//! │                            ▼                                    │
//! │                    ┌──────────────┐    ┌──────────────┐         │
//! │                    │ Symbolization│───▶│    Tools     │         │
//! │                    │ (base, index)│    │ nm, atos ... │         │
//! │                    └──────────────┘    └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`trace_data`]: Parse and validate the tracer's JSON records
//! - [`symbolization`]: Convert runtime addresses to function names
//!   - `base_offset`: Find the image base (snapshot, `otool`, `nm`, `vmmap`, default)
//!   - `symbol_index`: Address-ordered code symbols from `nm -n`
//!   - `demangle`: Batch/single demangling
//!   - `address_resolver`: `atos` → nearest symbol → raw hex
//! - [`analysis`]: Group by thread, match exits to entries, aggregate time/CPU
//! - [`report`]: Indented text rendering
//! - [`tools`]: External command runner with per-call timeout
//! - [`pipeline`]: The end-to-end run used by the binary
//! - [`preflight`]: Early warnings about the target binary
//! - [`cli`]: Command-line arguments
//! - [`domain`]: Core domain types (Address, `ThreadId`) and errors
//!
//! ## Failure Model
//!
//! Only an unusable command line or trace file fails the run. Every external
//! tool may be missing, fail, or time out; each such failure falls through to
//! the next strategy, and in the worst case every name renders as its raw
//! runtime address.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Trace written by the instrumented program
//! ./tetris            # writes trace.json and runtime_base.json
//!
//! # Rebuild the call stacks
//! calltrace trace.json ./tetris
//! ```

// Expose modules for testing
pub mod analysis;
pub mod cli;
pub mod domain;
pub mod pipeline;
pub mod preflight;
pub mod report;
pub mod symbolization;
pub mod tools;
pub mod trace_data;
