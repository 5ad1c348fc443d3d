//! rust-sqlscript: split SQL scripts into tagged, addressable statements
//!
//! A script is split on top-level `;` terminators. Each statement gets a
//! `(kind, name)` tag, taken from a `/*-kind~name-*/` comment directly above
//! it or derived from its leading keywords, and tags are made unique within
//! the script.

pub mod config;
pub mod error;
pub mod parser;
pub mod script;
mod util;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

pub use config::ScriptConfig;
pub use error::ScriptError;
pub use parser::{QaKind, Statement, Tag};
pub use script::{
    FilterField, Marker, Script, ScriptFilter, ScriptItem, StatementId, StatementRecord,
};

/// Minimum number of files to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// Parse a single script file
pub fn parse_script_file(path: &Path, config: &ScriptConfig) -> Result<Script> {
    Ok(Script::read(path, config)?)
}

/// Parse multiple script files, using parallel processing for larger file sets.
///
/// Scripts come back in the order of `files`; the first error is returned.
pub fn parse_script_files(files: &[PathBuf], config: &ScriptConfig) -> Result<Vec<Script>> {
    if files.len() >= PARALLEL_THRESHOLD {
        files
            .par_iter()
            .map(|file| parse_script_file(file, config))
            .collect()
    } else {
        files
            .iter()
            .map(|file| parse_script_file(file, config))
            .collect()
    }
}

/// Expand files and directories into the script files to parse.
///
/// Directories are walked recursively and keep files whose name matches
/// `pattern` (e.g. `*.sql`); files given directly are always kept.
pub fn collect_script_files(paths: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = glob::Pattern::new(pattern)
        .with_context(|| format!("Invalid file pattern '{}'", pattern))?;
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let name = entry.file_name().to_string_lossy();
                if matcher.matches(&name) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
