mod common;

use calltrace::pipeline::{run_pipeline, PipelineConfig};
use calltrace::trace_data::TraceData;
use common::FakeTools;
use std::path::Path;

const SINGLE_CALL: &str = r#"{
    "total_time": 2000000,
    "records": [
        {"type": "entry", "func": "0x100000abc", "caller": "0x100000f00",
         "timestamp": 1000000, "thread_id": "0x1", "depth": 0},
        {"type": "exit", "func": "0x100000abc", "caller": "0x100000f00",
         "timestamp": 2000000, "thread_id": "0x1", "depth": 1}
    ]
}"#;

fn run(trace: &str, snapshot: &Path, tools: &FakeTools) -> String {
    let trace = TraceData::from_json(trace).unwrap();
    let config = PipelineConfig { binary_path: "./tetris", snapshot_path: snapshot, quiet: false };
    let mut out = Vec::new();
    run_pipeline(&trace, &config, tools, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn no_snapshot() -> &'static Path {
    Path::new("/nonexistent/calltrace-tests/runtime_base.json")
}

#[test]
fn test_every_tool_missing_falls_back_to_addresses() {
    let tools = FakeTools::none();

    let text = run(SINGLE_CALL, no_snapshot(), &tools);

    assert!(text.contains("Base offset: 0x100000000 (from default)"));
    assert!(text.contains("Loaded 0 symbols"));
    assert!(text.contains("Processing 2 records..."));
    assert!(text.contains("└─> 0x100000abc\n    caller: 0x100000f00\n"));
    assert!(text.contains("  └── 0x100000abc\n"));
    assert!(text.contains("[elapsed: 1.000ms]"));
}

#[test]
fn test_thread_summary_aggregates_time_and_cpu() {
    let trace = r#"{
        "total_time": 3000000,
        "records": [
            {"type": "entry", "func": "0x10", "caller": "0x20", "timestamp": 1000000,
             "thread_id": "0x1", "cpu_usage": 5, "depth": 0},
            {"type": "exit", "func": "0x10", "caller": "0x20", "timestamp": 3000000,
             "thread_id": "0x1", "cpu_usage": 7, "depth": 1}
        ]
    }"#;

    let text = run(trace, no_snapshot(), &FakeTools::none());

    assert!(text.contains("Thread 0x1:\n"));
    assert!(text.contains("Total duration: 2.00ms\n"));
    assert!(text.contains("CPU usage: 1.2%\n"));
    assert!(text.contains("(CPU: 0.5%)"));
    assert!(text.contains("(CPU: 0.7%)"));
}

#[test]
fn test_snapshot_skips_discovery_tools() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("runtime_base.json");
    let mut file = std::fs::File::create(&snapshot).unwrap();
    writeln!(file, r#"{{"runtime_base": "0x104a3c000"}}"#).unwrap();

    let tools = FakeTools::none();
    let text = run(SINGLE_CALL, &snapshot, &tools);

    assert!(text.contains("Base offset: 0x104a3c000 (from runtime snapshot)"));
    let programs = tools.programs_called();
    assert!(!programs.iter().any(|p| p == "otool" || p == "vmmap"));
}

#[test]
fn test_symbols_resolved_from_symbol_table() {
    let tools = FakeTools::none()
        .with("otool", "Load command 1\n      cmd LC_SEGMENT_64\n  segname __TEXT\n   vmaddr 0x0000000100000000\n")
        .with("nm", "0000000000000a00 T _init_board\n0000000000000f00 T _main\n");

    let text = run(SINGLE_CALL, no_snapshot(), &tools);

    assert!(text.contains("(from __TEXT segment vmaddr)"));
    assert!(text.contains("└─> _init_board\n    caller: _main\n"));
}

#[test]
fn test_multiple_threads_in_first_appearance_order() {
    let text = run(
        &std::fs::read_to_string("tests/fixtures/two_threads.json").unwrap(),
        no_snapshot(),
        &FakeTools::none(),
    );

    let first = text.find("Thread 0x16fe87000:").unwrap();
    let second = text.find("Thread 0x16ff13000:").unwrap();
    assert!(first < second);
    assert!(text.contains("[elapsed: 100.000ms]"));
    assert!(text.contains("[elapsed: 203.500ms]"));
}
