//! Symbol demangling
//!
//! Itanium C++ names (`_Z…`, or `__Z…` with the Mach-O leading underscore)
//! go to `c++filt`. Rust v0 names (`_R…`/`__R…`) are not understood by every
//! `c++filt`, so they are demangled in-process with `rustc-demangle`.

use log::{debug, warn};
use rustc_demangle::try_demangle;

use crate::tools::ToolRunner;

/// External demangler; reads names from stdin when called without arguments
pub const DEMANGLER: &str = "c++filt";

/// True if `name` follows a mangling scheme this module can undo
#[must_use]
pub fn is_mangled(name: &str) -> bool {
    is_itanium(name) || is_rust_v0(name)
}

fn is_itanium(name: &str) -> bool {
    name.starts_with("_Z") || name.starts_with("__Z")
}

fn is_rust_v0(name: &str) -> bool {
    name.starts_with("_R") || name.starts_with("__R")
}

/// Demangle a Rust symbol in-process, without the hash suffix
fn demangle_rust(name: &str) -> Option<String> {
    try_demangle(name).ok().map(|d| format!("{d:#}"))
}

/// Demangle many names with at most one external call.
///
/// The result has the same length and order as `names`. Names that are not
/// mangled, or that the demangler could not handle, are returned unchanged;
/// a failing demangler never fails the batch.
pub fn demangle_batch(runner: &dyn ToolRunner, names: &[&str]) -> Vec<String> {
    let mut result: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();

    let mut itanium = Vec::new();
    for (slot, name) in names.iter().enumerate() {
        if is_rust_v0(name) {
            if let Some(demangled) = demangle_rust(name) {
                result[slot] = demangled;
            }
        } else if is_itanium(name) {
            itanium.push(slot);
        }
    }

    if itanium.is_empty() {
        return result;
    }

    let input = itanium.iter().map(|&slot| names[slot]).collect::<Vec<_>>().join("\n");
    let output = match runner
        .run(DEMANGLER, &[], Some(&input))
        .and_then(|out| out.into_stdout(DEMANGLER))
    {
        Ok(stdout) => stdout,
        Err(e) => {
            warn!("{DEMANGLER} failed, keeping {} mangled names: {e}", itanium.len());
            return result;
        }
    };

    // One line out per line in; a short answer leaves the tail mangled
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() != itanium.len() {
        warn!("{DEMANGLER} returned {} names for {} inputs", lines.len(), itanium.len());
    }
    for (&slot, line) in itanium.iter().zip(lines) {
        let line = line.trim();
        if !line.is_empty() {
            result[slot] = line.to_string();
        }
    }

    result
}

/// Demangle a single name, `None` if it cannot be demangled.
pub fn demangle_one(runner: &dyn ToolRunner, name: &str) -> Option<String> {
    if is_rust_v0(name) {
        return demangle_rust(name);
    }
    if !is_itanium(name) {
        return None;
    }

    match runner.run(DEMANGLER, &[name], None).and_then(|out| out.into_stdout(DEMANGLER)) {
        Ok(stdout) => Some(stdout.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) => {
            debug!("{DEMANGLER} {name}: {e}");
            None
        }
    }
}
