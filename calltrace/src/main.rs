//! # calltrace - Main Entry Point
//!
//! `calltrace <TRACE_FILE> <BINARY>` loads the trace, symbolicates it against
//! the binary and prints the per-thread call stacks to stdout.
//!
//! Only a bad command line or an unusable trace file fail the run; every
//! symbolication problem degrades to raw addresses and exits 0.

use anyhow::{Context, Result};
use calltrace::cli::Args;
use calltrace::pipeline::{run_pipeline, PipelineConfig};
use calltrace::preflight::check_binary;
use calltrace::tools::SystemToolRunner;
use calltrace::trace_data::TraceData;
use clap::Parser;
use log::info;
use std::io::{self, Write};
use std::time::Duration;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 1;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also arrive here, on stdout
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            e.print().ok();
            std::process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run(args: &Args) -> Result<()> {
    let trace = TraceData::from_file(&args.trace_file)
        .with_context(|| format!("Error processing trace file {}", args.trace_file.display()))?;
    info!("Loaded {} records from {}", trace.records.len(), args.trace_file.display());

    if !trace.records.is_empty() {
        check_binary(&args.binary);
    }

    let runner = SystemToolRunner::new(Duration::from_secs(args.tool_timeout));
    let config = PipelineConfig {
        binary_path: &args.binary,
        snapshot_path: &args.base_file,
        quiet: args.quiet,
    };

    // Line-buffered, so progress lines interleave with warnings on stderr
    let mut out = io::stdout().lock();
    run_pipeline(&trace, &config, &runner, &mut out).context("Failed to write report")?;
    out.flush().context("Failed to write report")?;

    Ok(())
}
