//! Fixture snapshot utilities for integration tests.

use luastub_core::symbols::SymbolSnapshot;
use std::path::{Path, PathBuf};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    assert!(path.exists(), "Fixture '{name}' not found at {}", path.display());
    path
}

/// Parse a fixture snapshot into memory.
pub fn load_snapshot(name: &str) -> SymbolSnapshot {
    let content = std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture");
    SymbolSnapshot::from_json(&content).expect("Fixture is not a valid snapshot")
}

/// Copy a fixture into `dir`, returning the copy's path.
pub fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
    let dst = dir.join(name);
    std::fs::copy(fixture_path(name), &dst).expect("Failed to copy fixture");
    dst
}
