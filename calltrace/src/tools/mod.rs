//! External tool invocation
//!
//! Every piece of information the engine cannot compute itself comes from a
//! toolchain command: `nm` dumps the symbol table, `c++filt` demangles,
//! `otool`/`vmmap` locate the image base and `atos` symbolicates live
//! addresses. All of them go through the [`ToolRunner`] trait so the fallback
//! logic can be exercised with a scripted runner in tests.

pub mod runner;

#[cfg(test)]
pub(crate) mod scripted;

pub use runner::{SystemToolRunner, ToolOutput, ToolRunner, DEFAULT_TOOL_TIMEOUT};
