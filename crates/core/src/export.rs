//! Structured delivery: the analyzed records as JSON, either one aggregate
//! document or a stream of JSON-RPC notifications for a connected client.

use crate::emit::{ensure_dir, write_file};
use crate::error::GenerateError;
use crate::model::TypeRecord;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root table name every record hangs under on the Lua side.
pub const API_ROOT: &str = "CS";
pub const API_FILE: &str = "api.json";

pub const METHOD_BEGIN: &str = "api/begin";
pub const METHOD_ADD: &str = "api/add";
pub const METHOD_FINISH: &str = "api/finish";

#[derive(Debug, Serialize)]
pub struct ApiDocument<'a> {
    pub root: &'static str,
    pub classes: &'a [TypeRecord],
}

impl<'a> ApiDocument<'a> {
    pub fn new(classes: &'a [TypeRecord]) -> Self {
        Self { root: API_ROOT, classes }
    }
}

// ---------------------------------------------------------------------------
// Aggregate document
// ---------------------------------------------------------------------------

/// Write the aggregate document to `<output>/api.json`, or to stdout when
/// `output` is `-`. Returns the file written, if any.
pub fn write_document(
    records: &[TypeRecord],
    output: &Path,
) -> Result<Option<PathBuf>, GenerateError> {
    if output.as_os_str() == "-" {
        let stdout = std::io::stdout();
        write_document_to(records, &mut stdout.lock())?;
        return Ok(None);
    }

    ensure_dir(output)?;
    let path = output.join(API_FILE);
    let json = serde_json::to_string_pretty(&ApiDocument::new(records))?;
    write_file(&path, &json)?;
    debug!(path = %path.display(), classes = records.len(), "API document written");
    Ok(Some(path))
}

pub fn write_document_to<W: Write>(
    records: &[TypeRecord],
    out: &mut W,
) -> Result<(), GenerateError> {
    serde_json::to_writer(&mut *out, &ApiDocument::new(records))?;
    writeln!(out).map_err(GenerateError::Stream)?;
    out.flush().map_err(GenerateError::Stream)
}

// ---------------------------------------------------------------------------
// Notification stream
// ---------------------------------------------------------------------------

/// A channel that accepts JSON-RPC notifications.
pub trait RecordSink {
    fn notify(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), GenerateError>;
}

/// Newline-delimited JSON-RPC 2.0 notifications over any writer (stdout in the CLI).
pub struct NotificationSink<W: Write> {
    out: W,
}

impl<W: Write> NotificationSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for NotificationSink<W> {
    fn notify(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), GenerateError> {
        let mut msg = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
        });
        if let Some(params) = params {
            msg["params"] = params;
        }
        writeln!(self.out, "{msg}").map_err(GenerateError::Stream)?;
        self.out.flush().map_err(GenerateError::Stream)
    }
}

/// Send `api/begin`, one `api/add` per record, then `api/finish`. Finish is
/// sent even when an add fails; the first error is returned.
pub fn stream_records(
    sink: &mut dyn RecordSink,
    records: &[TypeRecord],
) -> Result<usize, GenerateError> {
    sink.notify(METHOD_BEGIN, None)?;

    let mut sent = 0;
    let mut failure = None;
    for record in records {
        let result = serde_json::to_value(record)
            .map_err(GenerateError::from)
            .and_then(|params| sink.notify(METHOD_ADD, Some(params)));
        if let Err(e) = result {
            failure = Some(e);
            break;
        }
        sent += 1;
    }

    let finished = sink.notify(METHOD_FINISH, None);
    if let Some(e) = failure {
        return Err(e);
    }
    finished?;
    debug!(sent, "API stream finished");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassRecord, TypeHeader};

    fn record(name: &str) -> TypeRecord {
        TypeRecord::Class(ClassRecord {
            header: TypeHeader { name: name.into(), namespace: "Game".into(), ..Default::default() },
            ..Default::default()
        })
    }

    /// Records every notification; optionally fails on the nth add.
    #[derive(Default)]
    struct Recorder {
        methods: Vec<String>,
        fail_on_add: Option<usize>,
        adds: usize,
    }

    impl RecordSink for Recorder {
        fn notify(
            &mut self,
            method: &str,
            _params: Option<serde_json::Value>,
        ) -> Result<(), GenerateError> {
            if method == METHOD_ADD {
                if self.fail_on_add == Some(self.adds) {
                    return Err(GenerateError::Stream(std::io::Error::other("client went away")));
                }
                self.adds += 1;
            }
            self.methods.push(method.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_stream_sequence() {
        let mut sink = NotificationSink::new(Vec::new());
        let sent = stream_records(&mut sink, &[record("A"), record("B")]).unwrap();
        assert_eq!(sent, 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["method"], METHOD_BEGIN);
        assert!(lines[0].get("params").is_none());
        assert_eq!(lines[1]["method"], METHOD_ADD);
        assert_eq!(lines[1]["params"]["name"], "A");
        assert_eq!(lines[2]["params"]["kind"], "class");
        assert_eq!(lines[3]["method"], METHOD_FINISH);
        assert_eq!(lines[3]["jsonrpc"], "2.0");
    }

    #[test]
    fn test_finish_sent_after_failed_add() {
        let mut sink = Recorder { fail_on_add: Some(1), ..Default::default() };
        let result = stream_records(&mut sink, &[record("A"), record("B"), record("C")]);
        assert!(result.is_err());
        assert_eq!(sink.methods, vec![METHOD_BEGIN, METHOD_ADD, METHOD_FINISH]);
    }

    #[test]
    fn test_document_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(&[record("A")], dir.path()).unwrap().unwrap();
        assert_eq!(path, dir.path().join(API_FILE));
        let text = std::fs::read_to_string(path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["root"], "CS");
        assert_eq!(doc["classes"][0]["namespace"], "Game");
    }

    #[test]
    fn test_document_to_writer_is_one_line() {
        let mut out = Vec::new();
        write_document_to(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"root\":\"CS\",\"classes\":[]}\n");
    }
}
