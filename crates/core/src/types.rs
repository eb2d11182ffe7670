//! Run options shared by the library and the CLI: which namespaces to export,
//! which binding convention to render, and where the result goes.

use crate::collect::DEFAULT_PARALLEL_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Byte threshold at which a stub chunk file is closed (500 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 500 * 1024;

// ---------------------------------------------------------------------------
// Binding convention
// ---------------------------------------------------------------------------

/// Scripting-runtime interop library the stubs are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    None,
    #[default]
    XLua,
    ToLua,
}

impl Binding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::XLua => "xlua",
            Self::ToLua => "tolua",
        }
    }
}

impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "xlua" => Ok(Self::XLua),
            "tolua" => Ok(Self::ToLua),
            other => Err(format!("unknown binding '{other}' (expected none, xlua or tolua)")),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// How analyzed records leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Binding-specific `.lua` stub files.
    #[default]
    Lua,
    /// One aggregate JSON document.
    Json,
    /// JSON-RPC notifications on stdout, one per record.
    Stream,
}

impl ExportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lua => "lua",
            Self::Json => "json",
            Self::Stream => "stream",
        }
    }
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lua" => Ok(Self::Lua),
            "json" => Ok(Self::Json),
            "stream" => Ok(Self::Stream),
            other => Err(format!("unknown export mode '{other}' (expected lua, json or stream)")),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Namespace prefixes to export, e.g. `UnityEngine`.
    pub namespaces: Vec<String>,
    /// Record types declared in the global namespace.
    pub include_global: bool,
    pub binding: Binding,
    pub export: ExportMode,
    /// Output directory, or `-` for stdout in JSON mode.
    pub output: PathBuf,
    pub chunk_size: usize,
    pub parallel_threshold: usize,
    pub param_docs: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            include_global: true,
            binding: Binding::default(),
            export: ExportMode::default(),
            output: PathBuf::from("."),
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            param_docs: true,
        }
    }
}

impl GenerateOptions {
    /// Split a `;`-separated namespace list, dropping empty entries.
    pub fn parse_namespaces(list: &str) -> Vec<String> {
        list.split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}
