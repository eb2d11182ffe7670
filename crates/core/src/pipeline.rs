//! One generation run: open the snapshot, collect, analyze, merge, deliver.

use crate::analyze::{AnalyzeOptions, Analyzer};
use crate::collect::{collect_types, NamespaceFilter};
use crate::docs::CommentStyle;
use crate::emit::create_dumper;
use crate::error::GenerateError;
use crate::export::{stream_records, write_document, NotificationSink};
use crate::model::TypeRecord;
use crate::symbols::{SymbolSnapshot, SymbolSource};
use crate::types::{ExportMode, GenerateOptions};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Public types that passed the namespace filter.
    pub collected: usize,
    /// Records that survived analysis.
    pub records: usize,
    pub files: Vec<PathBuf>,
    /// Notifications-mode `api/add` count.
    pub streamed: usize,
}

/// Collect, analyze and merge. Comment style follows the export mode: stub
/// files get the summary line, JSON delivery gets the rich rendering.
pub fn build_records(
    snapshot: &SymbolSnapshot,
    options: &GenerateOptions,
) -> (usize, Vec<TypeRecord>) {
    let filter = NamespaceFilter::new(options.namespaces.clone(), options.include_global);
    let descriptors = collect_types(&snapshot.compilations, &filter, options.parallel_threshold);

    let comment_style = match options.export {
        ExportMode::Lua => CommentStyle::Reduced,
        ExportMode::Json | ExportMode::Stream => CommentStyle::Rich,
    };
    let mut analyzer =
        Analyzer::new(AnalyzeOptions { comment_style, param_docs: options.param_docs });
    analyzer.analyze_all(&descriptors);
    if analyzer.failed_count() > 0 {
        warn!(failed = analyzer.failed_count(), "Some types could not be analyzed");
    }
    (descriptors.len(), analyzer.finish())
}

pub fn run(
    source: &dyn SymbolSource,
    options: &GenerateOptions,
) -> Result<RunSummary, GenerateError> {
    if options.chunk_size == 0 {
        return Err(GenerateError::InvalidOption("chunk size must be greater than zero".into()));
    }
    if options.namespaces.is_empty() && !options.include_global {
        warn!("No namespaces selected and global namespace excluded; output will be empty");
    }

    let start = Instant::now();
    info!(namespaces = %options.namespaces.join(";"), "Analyzing");
    let snapshot = source.open()?;
    debug!(
        compilations = snapshot.compilations.len(),
        types = snapshot.type_count(),
        "Snapshot loaded"
    );
    let (collected, records) = build_records(&snapshot, options);

    info!(types = records.len(), export = %options.export, "Generating");
    let mut summary = RunSummary { collected, records: records.len(), ..Default::default() };

    match options.export {
        ExportMode::Lua => match create_dumper(options.binding, options.chunk_size) {
            Some(dumper) => {
                let report = dumper.dump(&records, &options.output)?;
                info!(dumper = dumper.name(), files = report.files.len(), "Stubs written");
                summary.files = report.files;
            }
            None => info!("No binding selected; no stub files written"),
        },
        ExportMode::Json => {
            summary.files.extend(write_document(&records, &options.output)?);
        }
        ExportMode::Stream => {
            let stdout = std::io::stdout();
            let mut sink = NotificationSink::new(stdout.lock());
            summary.streamed = stream_records(&mut sink, &records)?;
        }
    }

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Done");
    Ok(summary)
}
