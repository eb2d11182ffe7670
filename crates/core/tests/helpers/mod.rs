//! Test harness for pipeline integration tests.
//!
//! Runs the full generation pipeline against a fixture snapshot held in memory,
//! writing into a temp dir, and offers readers for what ended up on disk.

pub mod fixtures;

use luastub_core::pipeline::{build_records, run, RunSummary};
use luastub_core::model::TypeRecord;
use luastub_core::{Binding, ExportMode, GenerateOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GAME_FIXTURE: &str = "game_symbols.json";

/// Options the fixture tests start from: the `Game` namespace, xLua, stub files.
pub fn game_options(output: &Path) -> GenerateOptions {
    GenerateOptions {
        namespaces: vec!["Game".to_string()],
        binding: Binding::XLua,
        export: ExportMode::Lua,
        output: output.to_path_buf(),
        ..Default::default()
    }
}

/// Records the pipeline would deliver for `options`, without writing anything.
pub fn game_records(options: &GenerateOptions) -> Vec<TypeRecord> {
    let snapshot = fixtures::load_snapshot(GAME_FIXTURE);
    build_records(&snapshot, options).1
}

pub struct StubRun {
    pub summary: RunSummary,
    pub options: GenerateOptions,
    _temp_dir: TempDir,
}

impl StubRun {
    /// Run the pipeline on the game fixture. `configure` adjusts the default
    /// game options before the run.
    pub fn game(configure: impl FnOnce(&mut GenerateOptions)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut options = game_options(&temp_dir.path().join("out"));
        configure(&mut options);

        let snapshot = fixtures::load_snapshot(GAME_FIXTURE);
        let summary = run(&snapshot, &options).expect("Pipeline run failed");
        StubRun { summary, options, _temp_dir: temp_dir }
    }

    pub fn out_dir(&self) -> &Path {
        &self.options.output
    }

    /// Read one output file by name.
    pub fn read(&self, name: &str) -> String {
        let path = self.out_dir().join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    }

    /// Chunk files in numeric order.
    pub fn chunk_paths(&self) -> Vec<PathBuf> {
        let mut chunks: Vec<(usize, PathBuf)> = self
            .summary
            .files
            .iter()
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?;
                let index = name.strip_prefix("xlua_dump_")?.strip_suffix(".lua")?.parse().ok()?;
                Some((index, p.clone()))
            })
            .collect();
        chunks.sort();
        chunks.into_iter().map(|(_, p)| p).collect()
    }

    /// Every chunk concatenated in order.
    pub fn stubs(&self) -> String {
        self.chunk_paths()
            .iter()
            .map(|p| std::fs::read_to_string(p).expect("Failed to read chunk"))
            .collect()
    }
}
