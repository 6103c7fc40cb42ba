use std::process::Command;

const TRACE: &str = r#"{
    "total_time": 2000000,
    "records": [
        {"type": "entry", "func": "0x100000abc", "caller": "0x100000f00",
         "timestamp": 1000000, "thread_id": "0x1", "depth": 0},
        {"type": "exit", "func": "0x100000abc", "caller": "0x100000f00",
         "timestamp": 2000000, "thread_id": "0x1", "depth": 1}
    ]
}"#;

fn calltrace() -> Command {
    Command::new(env!("CARGO_BIN_EXE_calltrace"))
}

#[test]
fn test_wrong_argument_count_exits_with_usage() {
    let output = calltrace().arg("trace.json").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_help_exits_cleanly() {
    let output = calltrace().arg("--help").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("TRACE_FILE"));
}

#[test]
fn test_missing_trace_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let output = calltrace()
        .current_dir(dir.path())
        .args(["missing.json", "./tetris"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error processing trace file"));
}

#[test]
fn test_malformed_trace_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("trace.json"), "{ not json").unwrap();

    let output = calltrace()
        .current_dir(dir.path())
        .args(["trace.json", "./tetris"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_binary_still_reports_raw_addresses() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("trace.json"), TRACE).unwrap();

    let output = calltrace()
        .current_dir(dir.path())
        .args(["trace.json", "./does-not-exist", "--tool-timeout", "5"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total records: 2"));
    assert!(stdout.contains("0x100000abc"));
    assert!(stdout.contains("[elapsed: 1.000ms]"));
}

#[test]
fn test_quiet_prints_report_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("trace.json"), TRACE).unwrap();

    let output = calltrace()
        .current_dir(dir.path())
        .args(["-q", "trace.json", "./does-not-exist"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Total records"));
    assert!(stdout.contains("Thread 0x1:"));
}
