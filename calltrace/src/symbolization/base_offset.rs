//! Runtime base offset discovery
//!
//! The trace holds runtime addresses; the symbol table holds file-relative
//! ones. The difference is the image base, found by the first strategy that
//! succeeds:
//!
//! 1. Runtime snapshot written by the tracer (`runtime_base.json`)
//! 2. `__TEXT` segment `vmaddr` from `otool -l`
//! 3. Address of `__mh_execute_header` from `nm`
//! 4. `__TEXT` mapping of a live process from `vmmap`
//! 5. [`DEFAULT_BASE_OFFSET`]

use calltrace_common::RuntimeBaseSnapshot;
use log::{info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{parse_hex, Address, SnapshotError, ToolError};
use crate::tools::ToolRunner;

/// Typical load address of a 64-bit macOS executable
pub const DEFAULT_BASE_OFFSET: u64 = 0x1_0000_0000;

/// Symbol marking the Mach-O header of the main executable
const HEADER_SYMBOL: &str = "__mh_execute_header";

/// Lines after `segname __TEXT` searched for its `vmaddr`
const SEGMENT_SCAN_WINDOW: usize = 10;

/// Where a base offset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSource {
    Snapshot,
    SegmentHeader,
    HeaderSymbol,
    MemoryMap,
    Default,
}

impl fmt::Display for OffsetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OffsetSource::Snapshot => "runtime snapshot",
            OffsetSource::SegmentHeader => "__TEXT segment vmaddr",
            OffsetSource::HeaderSymbol => "__mh_execute_header symbol",
            OffsetSource::MemoryMap => "vmmap",
            OffsetSource::Default => "default",
        };
        f.write_str(s)
    }
}

/// Resolved base offset and its provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseOffset {
    pub value: u64,
    pub source: OffsetSource,
}

type Strategy = fn(&dyn ToolRunner, &str) -> Result<u64, ToolError>;

/// Runs the discovery chain for one binary
pub struct BaseOffsetResolver<'a> {
    runner: &'a dyn ToolRunner,
    snapshot_path: PathBuf,
}

impl<'a> BaseOffsetResolver<'a> {
    pub fn new(runner: &'a dyn ToolRunner, snapshot_path: impl Into<PathBuf>) -> Self {
        Self { runner, snapshot_path: snapshot_path.into() }
    }

    /// Determine the base offset; never fails.
    pub fn resolve(&self, binary_path: &str) -> BaseOffset {
        match read_snapshot(&self.snapshot_path) {
            Ok(value) => {
                info!("Runtime base 0x{value:x} from {}", self.snapshot_path.display());
                return BaseOffset { value, source: OffsetSource::Snapshot };
            }
            Err(SnapshotError::Missing(path)) => {
                info!("No runtime snapshot at {}, computing base offset", path.display());
            }
            Err(e) => warn!("Cannot use runtime snapshot: {e}"),
        }

        self.discover(binary_path)
    }

    /// Run the tool-based strategies, falling back to [`DEFAULT_BASE_OFFSET`].
    pub fn discover(&self, binary_path: &str) -> BaseOffset {
        let strategies: [(OffsetSource, Strategy); 3] = [
            (OffsetSource::SegmentHeader, from_segment_header),
            (OffsetSource::HeaderSymbol, from_header_symbol),
            (OffsetSource::MemoryMap, from_memory_map),
        ];

        for (source, strategy) in strategies {
            match strategy(self.runner, binary_path) {
                Ok(value) => {
                    info!("Found base offset 0x{value:x} from {source}");
                    return BaseOffset { value, source };
                }
                Err(e) => warn!("Base offset via {source} failed: {e}"),
            }
        }

        warn!("Using default base offset {}", Address(DEFAULT_BASE_OFFSET));
        BaseOffset { value: DEFAULT_BASE_OFFSET, source: OffsetSource::Default }
    }
}

/// Read `{"runtime_base": "<hex>"}`
///
/// # Errors
/// Returns [`SnapshotError::Missing`] if the file does not exist, or another
/// variant if it cannot be read or parsed
pub fn read_snapshot(path: &Path) -> Result<u64, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::Missing(path.to_path_buf())
        } else {
            SnapshotError::Read { path: path.to_path_buf(), source }
        }
    })?;
    let snapshot: RuntimeBaseSnapshot = serde_json::from_str(&content)?;
    parse_hex(&snapshot.runtime_base).map_err(|_| SnapshotError::InvalidBase(snapshot.runtime_base))
}

fn run_stdout(runner: &dyn ToolRunner, program: &str, args: &[&str]) -> Result<String, ToolError> {
    runner.run(program, args, None)?.into_stdout(program)
}

fn unparseable(program: &str, reason: &str) -> ToolError {
    ToolError::Unparseable { program: program.to_string(), reason: reason.to_string() }
}

fn from_segment_header(runner: &dyn ToolRunner, binary_path: &str) -> Result<u64, ToolError> {
    let out = run_stdout(runner, "otool", &["-l", binary_path])?;
    parse_segment_vmaddr(&out).ok_or_else(|| unparseable("otool", "no __TEXT vmaddr"))
}

fn from_header_symbol(runner: &dyn ToolRunner, binary_path: &str) -> Result<u64, ToolError> {
    let out = run_stdout(runner, "nm", &[binary_path])?;
    parse_header_symbol(&out).ok_or_else(|| unparseable("nm", "no __mh_execute_header"))
}

fn from_memory_map(runner: &dyn ToolRunner, binary_path: &str) -> Result<u64, ToolError> {
    let out = run_stdout(runner, "vmmap", &[binary_path])?;
    parse_memory_map(&out).ok_or_else(|| unparseable("vmmap", "no executable __TEXT region"))
}

/// `vmaddr` of the `__TEXT` segment in `otool -l` output
#[must_use]
pub fn parse_segment_vmaddr(otool_output: &str) -> Option<u64> {
    let lines: Vec<&str> = otool_output.lines().collect();

    // Section entries also name `segname __TEXT` but carry `addr`, not `vmaddr`
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| names_text_segment(line))
        .find_map(|(start, _)| {
            lines[start..].iter().take(SEGMENT_SCAN_WINDOW).find_map(|l| {
                let mut words = l.split_whitespace();
                if words.next() == Some("vmaddr") {
                    parse_hex(words.next()?).ok()
                } else {
                    None
                }
            })
        })
}

fn names_text_segment(line: &str) -> bool {
    let mut words = line.split_whitespace();
    words.next() == Some("segname") && words.next() == Some("__TEXT")
}

/// Address of `__mh_execute_header` in `nm` output
#[must_use]
pub fn parse_header_symbol(nm_output: &str) -> Option<u64> {
    nm_output
        .lines()
        .find(|l| l.split_whitespace().last() == Some(HEADER_SYMBOL))
        .and_then(|l| l.split_whitespace().next())
        .and_then(|addr| parse_hex(addr).ok())
}

/// Start of the executable `__TEXT` region in `vmmap` output
///
/// Region lines look like
/// `__TEXT  100000000-100004000  [ 16K 16K 0K 0K] r-x/r-x SM=COW  /path/app`.
#[must_use]
pub fn parse_memory_map(vmmap_output: &str) -> Option<u64> {
    vmmap_output
        .lines()
        .filter(|l| l.contains("__TEXT") && (l.contains("exec") || l.contains("r-x")))
        .find_map(|l| {
            l.split_whitespace().find_map(|word| {
                let start = word.split_once('-').map_or(word, |(start, _)| start);
                parse_hex(start).ok()
            })
        })
}
