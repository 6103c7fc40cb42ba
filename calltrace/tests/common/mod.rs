#![allow(dead_code)]

use calltrace::domain::ToolError;
use calltrace::tools::{ToolOutput, ToolRunner};
use std::cell::RefCell;
use std::collections::HashMap;

/// Answers commands by program name; unknown programs behave as not installed.
#[derive(Default)]
pub struct FakeTools {
    stdout: HashMap<&'static str, String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTools {
    /// Every tool is missing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, program: &'static str, stdout: &str) -> Self {
        self.stdout.insert(program, stdout.to_string());
        self
    }

    pub fn programs_called(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.split(' ').next().unwrap_or("").to_string()).collect()
    }
}

impl ToolRunner for FakeTools {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        _stdin: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        self.calls.borrow_mut().push(format!("{program} {}", args.join(" ")));
        match self.stdout.get(program) {
            Some(out) => Ok(ToolOutput { code: Some(0), stdout: out.clone(), stderr: String::new() }),
            None => Err(ToolError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}
