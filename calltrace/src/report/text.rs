//! Indented per-thread call stack view
//!
//! ```text
//! ================================================================================
//! Thread 0x16fe87000:
//! ================================================================================
//! Total duration: 100.42ms
//! CPU usage: 1.2%
//! ================================================================================
//!
//! └─> test_function()
//!     caller: thread_func(void*)
//!     timestamp: 1.000ms
//!   └── test_function()
//!       timestamp: 101.420ms (CPU: 0.7%) [elapsed: 100.420ms]
//!       ────────────────────────────────────────
//! ```

use std::io::{self, Write};

use crate::analysis::{CallLine, ThreadReport};
use crate::trace_data::RecordKind;

const BANNER_WIDTH: usize = 80;
const SEPARATOR_WIDTH: usize = 40;
const INDENT: &str = "  ";

/// Render every thread in order
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn render<W: Write>(reports: &[ThreadReport], out: &mut W) -> io::Result<()> {
    for report in reports {
        render_thread(report, out)?;
    }
    Ok(())
}

/// Render one thread: banner, then one block per record
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn render_thread<W: Write>(report: &ThreadReport, out: &mut W) -> io::Result<()> {
    let banner = "=".repeat(BANNER_WIDTH);

    writeln!(out)?;
    writeln!(out, "{banner}")?;
    writeln!(out, "Thread {}:", report.thread_id)?;
    writeln!(out, "{banner}")?;
    writeln!(out, "Total duration: {:.2}ms", report.duration_ms)?;
    writeln!(out, "CPU usage: {:.1}%", report.cpu_percent)?;
    writeln!(out, "{banner}")?;
    writeln!(out)?;

    for line in &report.lines {
        render_line(line, out)?;
    }
    Ok(())
}

fn render_line<W: Write>(line: &CallLine, out: &mut W) -> io::Result<()> {
    let indent = INDENT.repeat(line.indent);
    let arrow = match line.kind {
        RecordKind::Entry => "└─>",
        RecordKind::Exit => "└──",
    };

    writeln!(out, "{indent}{arrow} {}", line.function)?;
    if let Some(caller) = &line.caller {
        writeln!(out, "{indent}    caller: {caller}")?;
    }

    let cpu = line.cpu_percent.map(|c| format!("(CPU: {c:.1}%)")).unwrap_or_default();
    let elapsed = line.elapsed_ms.map(|e| format!(" [elapsed: {e:.3}ms]")).unwrap_or_default();
    writeln!(out, "{indent}    timestamp: {:.3}ms {cpu}{elapsed}", line.timestamp_ms)?;

    if line.kind == RecordKind::Exit {
        writeln!(out, "{indent}    {}", "─".repeat(SEPARATOR_WIDTH))?;
    }
    Ok(())
}
