//! End-to-end run: base offset → symbol index → reconstruction → report
//!
//! Kept separate from `main` so the whole flow can be driven with a scripted
//! [`ToolRunner`] and an in-memory writer.

use log::info;
use std::io::{self, Write};
use std::path::Path;

use crate::analysis::TraceReconstructor;
use crate::domain::Address;
use crate::report;
use crate::symbolization::{AddressResolver, BaseOffsetResolver, SymbolIndex};
use crate::tools::ToolRunner;
use crate::trace_data::TraceData;

/// Inputs that do not come from the trace itself
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig<'a> {
    pub binary_path: &'a str,
    /// Runtime base snapshot to try before discovery
    pub snapshot_path: &'a Path,
    /// Skip progress lines; the report is always written
    pub quiet: bool,
}

/// Symbolicate `trace` against the binary and write the report to `out`.
///
/// Symbolication problems only degrade names; the only error is a failed write.
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn run_pipeline<W: Write>(
    trace: &TraceData,
    config: &PipelineConfig<'_>,
    runner: &dyn ToolRunner,
    out: &mut W,
) -> io::Result<()> {
    if !config.quiet {
        writeln!(out, "Total records: {}", trace.records.len())?;
        writeln!(out, "Total time: {:.2}ms", trace.total_time_ms)?;
    }

    if trace.records.is_empty() {
        info!("Trace has no records, nothing to symbolicate");
        return Ok(());
    }

    let base = BaseOffsetResolver::new(runner, config.snapshot_path).resolve(config.binary_path);
    let index = SymbolIndex::load(runner, config.binary_path);

    if !config.quiet {
        writeln!(out, "Base offset: {} (from {})", Address(base.value), base.source)?;
        writeln!(out, "Loaded {} symbols", index.len())?;
        writeln!(out)?;
        writeln!(out, "Processing {} records...", trace.records.len())?;
    }

    let resolver = AddressResolver::new(runner, config.binary_path, &index, Some(base.value));
    let reports = TraceReconstructor::new(&resolver).reconstruct(&trace.records);

    report::render(&reports, out)
}
