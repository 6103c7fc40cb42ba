//! CLI argument definitions

use calltrace_common::RUNTIME_BASE_FILE;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "calltrace",
    version,
    about = "Rebuild per-thread call stacks from a function entry/exit trace",
    after_help = "\
EXAMPLES:
    calltrace trace.json ./tetris                 Symbolicate against ./tetris
    calltrace -q trace.json ./tetris > out.txt    Report only, no progress lines
    RUST_LOG=debug calltrace trace.json ./tetris  Show every tool invocation"
)]
pub struct Args {
    /// Trace file written by the instrumentation runtime
    #[arg(value_name = "TRACE_FILE")]
    pub trace_file: PathBuf,

    /// Binary the trace was recorded from (used for symbol resolution)
    #[arg(value_name = "BINARY")]
    pub binary: String,

    /// Runtime base snapshot written by the tracer
    #[arg(long, value_name = "FILE", default_value = RUNTIME_BASE_FILE)]
    pub base_file: PathBuf,

    /// Seconds before an external tool (nm, atos, ...) is abandoned
    #[arg(long, value_name = "SECS", default_value = "10")]
    pub tool_timeout: u64,

    /// Suppress progress output (the report is still printed)
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positionals() {
        let args = Args::try_parse_from(["calltrace", "trace.json", "./tetris"]).unwrap();
        assert_eq!(args.trace_file, PathBuf::from("trace.json"));
        assert_eq!(args.binary, "./tetris");
        assert_eq!(args.base_file, PathBuf::from("runtime_base.json"));
        assert_eq!(args.tool_timeout, 10);
        assert!(!args.quiet);
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(Args::try_parse_from(["calltrace", "trace.json"]).is_err());
        assert!(Args::try_parse_from(["calltrace", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_options() {
        let args = Args::try_parse_from([
            "calltrace",
            "-q",
            "--base-file",
            "/tmp/base.json",
            "--tool-timeout",
            "2",
            "trace.json",
            "./tetris",
        ])
        .unwrap();
        assert!(args.quiet);
        assert_eq!(args.base_file, PathBuf::from("/tmp/base.json"));
        assert_eq!(args.tool_timeout, 2);
    }
}
