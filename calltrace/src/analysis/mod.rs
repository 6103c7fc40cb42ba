//! Analysis logic for trace records
//!
//! This module contains the pure call-stack reconstruction logic, separated
//! from symbol lookup (injected through [`NameResolver`]) and from the text
//! presentation layer.
//!
//! [`NameResolver`]: crate::symbolization::NameResolver

pub mod call_stack;

pub use call_stack::{
    group_by_thread, CallLine, CallTimingState, ThreadReport, ThreadTrace, TraceReconstructor,
};
