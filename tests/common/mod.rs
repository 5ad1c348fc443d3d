//! Common test utilities for rust-sqlscript tests

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_sqlscript::{Script, ScriptConfig};
use tempfile::{NamedTempFile, TempDir};

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Parse a fixture with the default configuration, panicking on failure
pub fn parse_fixture(name: &str) -> Script {
    parse_fixture_with(name, &ScriptConfig::default())
}

pub fn parse_fixture_with(name: &str, config: &ScriptConfig) -> Script {
    let path = fixture_path(name);
    Script::read(&path, config)
        .unwrap_or_else(|e| panic!("Failed to parse fixture '{}': {}", name, e))
}

/// Create a temp SQL file with content
pub fn create_sql_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".sql").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Write `content` to `dir/relative`, creating parent directories
pub fn write_file(dir: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Temp directory holding copies of every fixture script
pub fn fixture_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for name in ["generic_script.sql", "qa_script.sql", "markers_script.sql"] {
        let content = fs::read(fixture_path(name)).expect("Failed to read fixture");
        write_file(dir.path(), name, &content);
    }
    dir
}

/// Rendered tags of a script, in order
pub fn tags(script: &Script) -> Vec<String> {
    script
        .statements()
        .iter()
        .map(|s| s.tag.to_string())
        .collect()
}
