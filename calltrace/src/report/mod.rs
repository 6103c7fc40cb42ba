//! Report rendering
//!
//! This module lays reconstructed call stacks out as text. Currently supports
//! the indented per-thread view printed to stdout.

pub mod text;

pub use text::{render, render_thread};
