//! # Symbol Resolution and Address Translation
//!
//! This module converts the raw function and call-site addresses recorded by
//! the tracer into human-readable function names. This process is called
//! **symbolication**.
//!
//! ## The Symbolication Problem
//!
//! The tracer's enter/exit hooks record addresses like `0x104a3f3c0`. These
//! are **runtime** addresses: the loader placed the image at some base
//! address (randomized by ASLR), so they do not match the addresses stored in
//! the binary's own symbol table.
//!
//! ```text
//! Runtime Address = Base Offset + File Address
//! File Address    = Runtime Address - Base Offset
//! ```
//!
//! ## Components
//!
//! - **`base_offset`**: finds the base offset, preferring the snapshot the
//!   tracer wrote at runtime and falling back to inspecting the binary
//!   (`otool`, `nm`, `vmmap`) or a fixed default
//! - **`symbol_index`**: dumps code symbols with `nm -n` into an
//!   address-ordered index with floor lookup
//! - **`demangle`**: batch and single-name demangling (`c++filt` for C++,
//!   `rustc-demangle` for Rust v0 names)
//! - **`address_resolver`**: the per-address fallback chain
//!
//! ## Resolution Chain
//!
//! ```text
//! 1. No base offset known         → "0x<runtime address>"
//! 2. atos -o <bin> -l <base> <addr>   accepted unless empty / "not in"
//! 3. floor(file address) in index     demangled if mangled
//! 4. nothing found                → "0x<runtime address>"
//! ```
//!
//! Every step that shells out degrades to the next one on failure; resolution
//! itself never fails.
//!
//! ## Example
//!
//! ```rust,ignore
//! let runner = SystemToolRunner::default();
//! let base = BaseOffsetResolver::new(&runner, "runtime_base.json").resolve("./tetris");
//! let index = SymbolIndex::load(&runner, "./tetris");
//! let resolver = AddressResolver::new(&runner, "./tetris", &index, Some(base.value));
//!
//! let name = resolver.resolve_name(Address(0x1_0000_3f40));
//! // name == "main" (or "0x100003f40" if nothing matched)
//! ```

pub mod address_resolver;
pub mod base_offset;
pub mod demangle;
pub mod symbol_index;

pub use address_resolver::{AddressResolver, NameResolver};
pub use base_offset::{BaseOffset, BaseOffsetResolver, OffsetSource, DEFAULT_BASE_OFFSET};
pub use symbol_index::{SymbolEntry, SymbolIndex};
