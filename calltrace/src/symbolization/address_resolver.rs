use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::demangle::{demangle_one, is_mangled};
use super::symbol_index::SymbolIndex;
use crate::domain::{Address, ToolError};
use crate::tools::ToolRunner;

/// Live symbolicator, invoked as `atos -o <binary> -l <base> <address>`
pub const SYMBOLICATOR: &str = "atos";

/// Substring of symbolicator output for addresses outside the image
/// (`0x1234 (not in /path/app)`)
pub const UNMAPPED_MARKER: &str = "not in";

/// Anything that can turn a runtime address into a display name
pub trait NameResolver {
    /// Always returns a name; unresolvable addresses come back as `0x<hex>`.
    fn resolve_name(&self, address: Address) -> String;
}

/// Resolves runtime addresses through a fallback chain:
/// live symbolicator, then nearest symbol in the index, then raw hex.
///
/// Includes a cache so hot functions that appear in many records are only
/// resolved once.
pub struct AddressResolver<'a> {
    runner: &'a dyn ToolRunner,
    binary_path: &'a str,
    index: &'a SymbolIndex,
    /// `None` until a base offset is known; the resolver is inert without it
    base_offset: Option<u64>,
    /// Cleared the first time the symbolicator cannot be started or hangs
    symbolicator_available: Cell<bool>,
    cache: RefCell<HashMap<Address, String>>,
}

impl<'a> AddressResolver<'a> {
    pub fn new(
        runner: &'a dyn ToolRunner,
        binary_path: &'a str,
        index: &'a SymbolIndex,
        base_offset: Option<u64>,
    ) -> Self {
        Self {
            runner,
            binary_path,
            index,
            base_offset,
            symbolicator_available: Cell::new(true),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Ask the live symbolicator. Output is accepted only if non-empty and
    /// not the "not in image" answer.
    fn symbolicate(&self, base_offset: u64, address: Address) -> Option<String> {
        if !self.symbolicator_available.get() {
            return None;
        }

        let base = Address(base_offset).to_string();
        let addr = address.to_string();
        let args = ["-o", self.binary_path, "-l", base.as_str(), addr.as_str()];

        let output = match self.runner.run(SYMBOLICATOR, &args, None) {
            Ok(output) => output,
            Err(e) => {
                if e.is_unavailable() || matches!(e, ToolError::Timeout { .. }) {
                    warn!("{e}; falling back to the symbol table");
                    self.symbolicator_available.set(false);
                } else {
                    debug!("{SYMBOLICATOR} {address}: {e}");
                }
                return None;
            }
        };

        let name = output.stdout.trim();
        if !output.success() || name.is_empty() || name.contains(UNMAPPED_MARKER) {
            debug!("{SYMBOLICATOR} could not resolve {address}");
            return None;
        }
        Some(name.to_string())
    }

    /// Nearest symbol at or below the file-relative address
    fn lookup_index(&self, file_address: u64) -> Option<String> {
        let (_, name) = self.index.floor(file_address)?;
        if is_mangled(name) {
            return Some(demangle_one(self.runner, name).unwrap_or_else(|| name.to_string()));
        }
        Some(name.to_string())
    }
}

impl NameResolver for AddressResolver<'_> {
    fn resolve_name(&self, address: Address) -> String {
        let Some(base_offset) = self.base_offset else {
            return address.to_string();
        };

        if let Some(cached) = self.cache.borrow().get(&address) {
            return cached.clone();
        }

        let file_address = address.file_relative(base_offset);
        let name = self
            .symbolicate(base_offset, address)
            .or_else(|| self.lookup_index(file_address))
            .unwrap_or_else(|| {
                debug!("No symbol for {address} (file address 0x{file_address:x})");
                address.to_string()
            });

        self.cache.borrow_mut().insert(address, name.clone());
        name
    }
}
