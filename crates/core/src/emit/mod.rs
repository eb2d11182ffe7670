//! Stub emitters, one per binding convention.
//!
//! - `xlua`: EmmyLua annotations for xLua's `CS.*` namespace tables
//! - `tolua`: reserved; logs and writes nothing

pub mod xlua;

use crate::error::GenerateError;
use crate::model::TypeRecord;
use crate::types::Binding;
use std::path::{Path, PathBuf};
use tracing::warn;

pub use xlua::XLuaDumper;

/// What a dumper left on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpReport {
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
    /// Records that produced a block.
    pub rendered: usize,
}

/// Renders the final record list as files for one binding convention.
pub trait Dumper {
    fn name(&self) -> &'static str;

    fn dump(&self, records: &[TypeRecord], out_dir: &Path) -> Result<DumpReport, GenerateError>;
}

/// Dumper for `binding`, or `None` when no binding was chosen.
pub fn create_dumper(binding: Binding, chunk_size: usize) -> Option<Box<dyn Dumper>> {
    match binding {
        Binding::None => None,
        Binding::XLua => Some(Box::new(XLuaDumper::new(chunk_size))),
        Binding::ToLua => Some(Box::new(ToLuaDumper)),
    }
}

/// Placeholder for the toLua convention.
pub struct ToLuaDumper;

impl Dumper for ToLuaDumper {
    fn name(&self) -> &'static str {
        "ToLuaDumper"
    }

    fn dump(&self, records: &[TypeRecord], _out_dir: &Path) -> Result<DumpReport, GenerateError> {
        warn!(records = records.len(), "toLua stubs are not implemented; nothing written");
        Ok(DumpReport::default())
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), GenerateError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| GenerateError::Write { path: dir.to_path_buf(), source })
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), GenerateError> {
    std::fs::write(path, content)
        .map_err(|source| GenerateError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dumper_per_binding() {
        assert!(create_dumper(Binding::None, 1024).is_none());
        assert_eq!(create_dumper(Binding::XLua, 1024).map(|d| d.name()), Some("XLuaDumper"));
        assert_eq!(create_dumper(Binding::ToLua, 1024).map(|d| d.name()), Some("ToLuaDumper"));
    }

    #[test]
    fn test_tolua_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = ToLuaDumper.dump(&[], dir.path()).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
