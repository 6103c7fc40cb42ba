//! Scripted [`ToolRunner`] for unit tests

use std::cell::RefCell;
use std::collections::HashMap;

use super::{ToolOutput, ToolRunner, DEFAULT_TOOL_TIMEOUT};
use crate::domain::ToolError;

/// Canned behaviour for one command
#[derive(Clone)]
pub(crate) enum Script {
    /// Exit 0 with this stdout
    Stdout(String),
    /// Exit 0 with stdout computed from stdin
    Filter(fn(&str) -> String),
    /// Exit 1 with this stderr
    Fail(String),
    /// Never finishes within the deadline
    Timeout,
}

/// Answers commands from a table; anything unscripted behaves like a tool
/// that is not installed.
///
/// Rules are keyed either by the full command line (`"nm -n /bin/app"`) or by
/// the program name alone; the full command line wins.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    rules: HashMap<String, Script>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, command: &str, script: Script) -> Self {
        self.rules.insert(command.to_string(), script);
        self
    }

    /// Command lines seen so far, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn called(&self, program: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.split(' ').next() == Some(program))
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        let command_line =
            std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        self.calls.borrow_mut().push(command_line.clone());

        let script = self.rules.get(&command_line).or_else(|| self.rules.get(program));
        match script {
            Some(Script::Stdout(out)) => {
                Ok(ToolOutput { code: Some(0), stdout: out.clone(), stderr: String::new() })
            }
            Some(Script::Filter(f)) => Ok(ToolOutput {
                code: Some(0),
                stdout: f(stdin.unwrap_or_default()),
                stderr: String::new(),
            }),
            Some(Script::Fail(err)) => {
                Ok(ToolOutput { code: Some(1), stdout: String::new(), stderr: err.clone() })
            }
            Some(Script::Timeout) => Err(ToolError::Timeout {
                program: program.to_string(),
                timeout: DEFAULT_TOOL_TIMEOUT,
            }),
            None => Err(ToolError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}
