//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep runtime addresses apart from plain integers
//! such as depths and file-relative offsets.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Runtime virtual address as observed by the traced program
///
/// Displays as `0x<lowercase hex>` without padding, which is also the
/// fallback name for addresses that could not be symbolicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u64);

impl Address {
    /// Translate to a file-relative address given the image base.
    ///
    /// Wraps on underflow; an address below the base yields a huge offset
    /// that simply misses every symbol.
    #[must_use]
    pub fn file_relative(self, base_offset: u64) -> u64 {
        self.0.wrapping_sub(base_offset)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for Address {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Address)
    }
}

/// Parse a hex number with or without a `0x`/`0X` prefix.
///
/// # Errors
/// Returns an error if the remaining digits are not valid hex or overflow u64
pub fn parse_hex(s: &str) -> Result<u64, ParseIntError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(digits, 16)
}

/// Thread identifier as written by the tracer
///
/// Opaque: only compared for equality and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        ThreadId(s.to_string())
    }
}
