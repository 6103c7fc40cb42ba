use log::{info, warn};
use std::collections::BTreeMap;

use super::demangle::{demangle_batch, is_mangled};
use crate::domain::parse_hex;
use crate::tools::ToolRunner;

/// Symbol table dumper, invoked as `nm -n <binary>`
pub const SYMBOL_DUMP_TOOL: &str = "nm";

/// One code symbol at a file-relative address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub address: u64,
    pub name: String,
}

/// Address-ordered map of code symbols
///
/// Built once per run and immutable afterwards. Supports exact lookup and
/// floor lookup (largest address not above the query).
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: BTreeMap<u64, String>,
}

impl SymbolIndex {
    /// Dump and index the code symbols of `binary_path`.
    ///
    /// Never fails: when `nm` is missing or rejects the binary, a warning is
    /// logged and the index is empty.
    pub fn load(runner: &dyn ToolRunner, binary_path: &str) -> Self {
        let dump = runner
            .run(SYMBOL_DUMP_TOOL, &["-n", binary_path], None)
            .and_then(|out| out.into_stdout(SYMBOL_DUMP_TOOL));

        match dump {
            Ok(dump) => {
                let index = Self::build(runner, &dump);
                info!("Indexed {} code symbols from {binary_path}", index.len());
                index
            }
            Err(e) => {
                warn!("Failed to get symbol table: {e}");
                Self::default()
            }
        }
    }

    /// Index a raw `address type name` dump, demangling in one batch.
    pub fn build(runner: &dyn ToolRunner, raw_dump: &str) -> Self {
        let entries = parse_code_symbols(raw_dump);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let demangled = if names.iter().any(|n| is_mangled(n)) {
            demangle_batch(runner, &names)
        } else {
            names.iter().map(|n| (*n).to_string()).collect()
        };

        Self::from_entries(
            entries.iter().zip(demangled).map(|(entry, name)| (entry.address, name)),
        )
    }

    /// Index pre-resolved entries; a later duplicate address replaces an earlier one.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        Self { symbols: entries.into_iter().map(|(addr, name)| (addr, name.into())).collect() }
    }

    /// Name of the symbol starting exactly at `address`
    #[must_use]
    pub fn get(&self, address: u64) -> Option<&str> {
        self.symbols.get(&address).map(String::as_str)
    }

    /// Symbol with the largest address `<= address`
    #[must_use]
    pub fn floor(&self, address: u64) -> Option<(u64, &str)> {
        self.symbols.range(..=address).next_back().map(|(addr, name)| (*addr, name.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Parse `nm` output, keeping text (`t`/`T`) and weak (`w`/`W`) symbols.
///
/// Lines without an address (undefined symbols) or with a malformed address
/// are skipped.
#[must_use]
pub fn parse_code_symbols(raw_dump: &str) -> Vec<SymbolEntry> {
    raw_dump
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let (addr, kind, name) = (parts.next()?, parts.next()?, parts.next()?);
            if !is_code_symbol(kind) {
                return None;
            }
            let address = parse_hex(addr).ok()?;
            Some(SymbolEntry { address, name: name.to_string() })
        })
        .collect()
}

fn is_code_symbol(kind: &str) -> bool {
    matches!(kind, "t" | "T" | "w" | "W")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolization::demangle::DEMANGLER;
    use crate::tools::scripted::{Script, ScriptedRunner};

    const DUMP: &str = "\
                 U _printf
0000000100000000 T __mh_execute_header
0000000100003e50 T __Z9draw_gridv
0000000100003f00 t _helper
0000000100003f40 T _main
0000000100004000 S _g_score
0000000100004008 D _g_board
0000000100004010 b _g_stack_depth
0000000100004020 W __Z4tickv
0000000000000001 A _absolute
0000000100004030 T
";

    fn fake_cxxfilt(input: &str) -> String {
        input
            .lines()
            .map(|l| match l {
                "__Z9draw_gridv" => "draw_grid()".to_string(),
                "__Z4tickv" => "tick()".to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_parse_keeps_only_code_symbols() {
        let entries = parse_code_symbols(DUMP);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["__mh_execute_header", "__Z9draw_gridv", "_helper", "_main", "__Z4tickv"]
        );
    }

    #[test]
    fn test_build_demangles_in_one_batch() {
        let runner = ScriptedRunner::new().on(DEMANGLER, Script::Filter(fake_cxxfilt));
        let index = SymbolIndex::build(&runner, DUMP);

        assert_eq!(index.len(), 5);
        assert_eq!(index.get(0x1_0000_3e50), Some("draw_grid()"));
        assert_eq!(index.get(0x1_0000_4020), Some("tick()"));
        assert_eq!(index.get(0x1_0000_3f40), Some("_main"));
        assert_eq!(index.get(0x1_0000_4000), None);
        assert_eq!(runner.calls(), vec!["c++filt"]);
    }

    #[test]
    fn test_build_survives_demangler_failure() {
        let runner = ScriptedRunner::new();
        let index = SymbolIndex::build(&runner, DUMP);
        assert_eq!(index.get(0x1_0000_3e50), Some("__Z9draw_gridv"));
    }

    #[test]
    fn test_floor_lookup() {
        let index = SymbolIndex::from_entries([(100, "a"), (200, "b"), (500, "c")]);

        assert_eq!(index.floor(50), None);
        assert_eq!(index.floor(100), Some((100, "a")));
        assert_eq!(index.floor(150), Some((100, "a")));
        assert_eq!(index.floor(999), Some((500, "c")));
    }

    #[test]
    fn test_empty_name_is_found() {
        let index = SymbolIndex::from_entries([(0x10, "")]);
        assert_eq!(index.get(0x10), Some(""));
        assert_eq!(index.get(0x11), None);
    }

    #[test]
    fn test_duplicate_address_last_wins() {
        let index = SymbolIndex::from_entries([(0x10, "first"), (0x10, "second")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(0x10), Some("second"));
    }

    #[test]
    fn test_load_failure_yields_empty_index() {
        let runner = ScriptedRunner::new()
            .on("nm", Script::Fail("nm: /missing: No such file or directory".to_string()));
        let index = SymbolIndex::load(&runner, "/missing");
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_uses_sorted_dump() {
        let runner = ScriptedRunner::new()
            .on("nm -n /bin/app", Script::Stdout(DUMP.to_string()))
            .on(DEMANGLER, Script::Filter(fake_cxxfilt));
        let index = SymbolIndex::load(&runner, "/bin/app");
        assert_eq!(index.len(), 5);
        assert_eq!(runner.calls(), vec!["nm -n /bin/app", "c++filt"]);
    }
}
