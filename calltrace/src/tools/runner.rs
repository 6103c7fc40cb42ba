use log::debug;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::ToolError;

/// Per-call limit for external tools
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a running child is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a tool that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the tool was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout of a successful run.
    ///
    /// # Errors
    /// Returns [`ToolError::Failed`] when the tool exited non-zero
    pub fn into_stdout(self, program: &str) -> Result<String, ToolError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            let status = self.code.map_or_else(|| "signal".to_string(), |c| format!("exit code {c}"));
            Err(ToolError::Failed {
                program: program.to_string(),
                status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Capability to run an external command and capture its output
pub trait ToolRunner {
    /// Run `program` with `args`, feeding `stdin` if given.
    ///
    /// A non-zero exit is reported through [`ToolOutput::code`], not as an
    /// error.
    ///
    /// # Errors
    /// Returns an error if the program cannot be started, times out, or its
    /// pipes fail
    fn run(&self, program: &str, args: &[&str], stdin: Option<&str>)
        -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes with a bounded wall-clock time
pub struct SystemToolRunner {
    timeout: Duration,
}

impl SystemToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Poll the child until it exits or the deadline passes
    fn wait_with_deadline(&self, program: &str, child: &mut Child) -> Result<Option<i32>, ToolError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status.code()),
                Ok(None) => {}
                Err(e) => {
                    reap(child);
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                reap(child);
                return Err(ToolError::Timeout { program: program.to_string(), timeout: self.timeout });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for SystemToolRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_TIMEOUT)
    }
}

impl ToolRunner for SystemToolRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        debug!("running {program} {}", args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn { program: program.to_string(), source })?;

        // Pipes are drained on helper threads; a child blocked on a full
        // stdout pipe would otherwise never exit.
        let writer = match (child.stdin.take(), stdin) {
            (Some(mut pipe), Some(input)) => {
                let input = input.to_string();
                Some(thread::spawn(move || pipe.write_all(input.as_bytes())))
            }
            _ => None,
        };
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let code = self.wait_with_deadline(program, &mut child)?;

        if let Some(handle) = writer {
            if let Ok(Err(e)) = handle.join() {
                debug!("{program}: failed to write stdin: {e}");
            }
        }

        Ok(ToolOutput { code, stdout: collect(stdout), stderr: collect(stderr) })
    }
}

/// Kill the child and wait for it so it does not linger as a zombie
fn reap(child: &mut Child) {
    child.kill().ok();
    child.wait().ok();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).ok();
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
