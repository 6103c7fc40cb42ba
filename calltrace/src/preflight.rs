//! Pre-flight checks for calltrace
//!
//! Looks at the target binary before symbolication starts and explains up
//! front why names may come out as raw addresses. Nothing here is fatal: a
//! missing or stripped binary only degrades the report.

use log::warn;
use object::Object;
use std::path::Path;

/// What the pre-flight check found out about the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryStatus {
    /// Parseable object file with a symbol table
    Ready,
    /// Parseable, but without symbols
    Stripped,
    /// Not an object format we recognize (the external tools may still cope)
    Unrecognized,
    NotAFile,
    Missing,
}

/// Check that the target binary exists and carries a symbol table
pub fn check_binary(binary_path: &str) -> BinaryStatus {
    let status = inspect(binary_path);
    match status {
        BinaryStatus::Missing => {
            warn!("Binary not found: {binary_path}; names will fall back to raw addresses");
        }
        BinaryStatus::NotAFile => {
            warn!("Not a file: {binary_path}; the binary path must point to an executable");
        }
        BinaryStatus::Unrecognized => {
            warn!("{binary_path} is not a recognized object file");
        }
        BinaryStatus::Stripped => {
            warn!("Binary stripped, calls will show addresses only unless atos can resolve them");
        }
        BinaryStatus::Ready => {}
    }
    status
}

fn inspect(binary_path: &str) -> BinaryStatus {
    let path = Path::new(binary_path);
    if !path.exists() {
        return BinaryStatus::Missing;
    }
    if !path.is_file() {
        return BinaryStatus::NotAFile;
    }

    let Ok(file_data) = std::fs::read(path) else {
        return BinaryStatus::Unrecognized;
    };
    let Ok(obj) = object::File::parse(&*file_data) else {
        return BinaryStatus::Unrecognized;
    };

    if obj.symbol_table().is_some() {
        BinaryStatus::Ready
    } else {
        BinaryStatus::Stripped
    }
}
