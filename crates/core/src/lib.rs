//! luastub: Lua annotation stubs from a resolved C# symbol graph.
//!
//! A resolver dumps the public type surface of a C# solution as a JSON symbol
//! snapshot. This crate turns that snapshot into EmmyLua annotation files for a
//! Lua interop binding (xLua today), or into structured JSON for a client.
//!
//! # Modules
//!
//! - [`symbols`]: Snapshot model and the [`symbols::SymbolSource`] seam
//! - [`collect`]: Parallel namespace walk and public type discovery
//! - [`analyze`]: Per-type record building
//! - [`merge`]: Extension method attachment
//! - [`model`]: Binding-agnostic intermediate records
//! - [`docs`]: XML documentation comment parsing
//! - [`lua`]: Keyword escaping and type-name translation
//! - [`emit`]: Stub file writers per binding convention
//! - [`export`]: JSON document and JSON-RPC notification delivery
//! - [`pipeline`]: One generation run end to end
//! - [`types`]: Run options

pub mod analyze;
pub mod collect;
pub mod docs;
pub mod emit;
pub mod error;
pub mod export;
pub mod lua;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod symbols;
pub mod types;

pub use error::{AnalyzeError, GenerateError};
pub use pipeline::{run, RunSummary};
pub use types::{Binding, ExportMode, GenerateOptions};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// luastub.toml config loading
// ---------------------------------------------------------------------------

pub const CONFIG_FILE_NAME: &str = "luastub.toml";

/// Known keys in `luastub.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "namespaces",
    "include_global",
    "binding",
    "export",
    "output",
    "chunk_size",
    "parallel_threshold",
    "param_docs",
];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `luastub.toml` next to the snapshot file, if there is one.
pub fn find_config(snapshot: &Path) -> Option<PathBuf> {
    let dir = snapshot.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load run options from a `luastub.toml` file.
///
/// Missing or unparsable files give defaults with a warning. Unknown keys and
/// badly typed values are warned about and ignored.
pub fn load_stub_config(config_path: &Path) -> GenerateOptions {
    let mut options = GenerateOptions::default();

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %config_path.display(), "Could not read {CONFIG_FILE_NAME}: {e}");
            return options;
        }
    };
    let table = match content.parse::<toml::Table>() {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %config_path.display(), "Failed to parse {CONFIG_FILE_NAME}: {e}");
            return options;
        }
    };
    debug!(path = %config_path.display(), "Loading {CONFIG_FILE_NAME}");

    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        match KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k)) {
            Some(suggestion) if edit_distance(key, suggestion) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *suggestion,
                "Unknown key in {CONFIG_FILE_NAME}; did you mean '{suggestion}'?"
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in {CONFIG_FILE_NAME} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    // namespaces: array of prefixes, or one ';'-separated string
    match table.get("namespaces") {
        Some(toml::Value::Array(items)) => {
            options.namespaces =
                items.iter().filter_map(|v| v.as_str()).map(|s| s.trim().to_string()).collect();
        }
        Some(toml::Value::String(list)) => {
            options.namespaces = GenerateOptions::parse_namespaces(list);
        }
        Some(_) => warn!(key = "namespaces", "Expected an array of strings"),
        None => {}
    }

    if let Some(v) = table.get("include_global").and_then(|v| v.as_bool()) {
        options.include_global = v;
    }
    if let Some(v) = table.get("param_docs").and_then(|v| v.as_bool()) {
        options.param_docs = v;
    }

    if let Some(v) = table.get("binding").and_then(|v| v.as_str()) {
        match v.parse() {
            Ok(binding) => options.binding = binding,
            Err(e) => warn!(key = "binding", "{e}"),
        }
    }
    if let Some(v) = table.get("export").and_then(|v| v.as_str()) {
        match v.parse() {
            Ok(export) => options.export = export,
            Err(e) => warn!(key = "export", "{e}"),
        }
    }

    if let Some(v) = table.get("output").and_then(|v| v.as_str()) {
        options.output = PathBuf::from(v);
    }

    if let Some(v) = positive_integer(&table, "chunk_size") {
        options.chunk_size = v;
    }
    if let Some(v) = positive_integer(&table, "parallel_threshold") {
        options.parallel_threshold = v;
    }

    options
}

fn positive_integer(table: &toml::Table, key: &str) -> Option<usize> {
    let value = table.get(key)?;
    match value.as_integer().and_then(|n| usize::try_from(n).ok()).filter(|n| *n > 0) {
        Some(n) => Some(n),
        None => {
            warn!(key, "Expected a positive integer");
            None
        }
    }
}
