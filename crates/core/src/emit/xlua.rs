//! xLua convention: EmmyLua annotation stubs bound under the `CS` root table.
//!
//! Records are rendered one block each into size-bounded chunk files
//! (`xlua_dump_<n>.lua`). Every namespace seen on the way is declared in
//! `xlua_namespace.lua` so `CS.UnityEngine.GameObject` resolves in the editor.

use super::{ensure_dir, write_file, DumpReport, Dumper};
use crate::error::GenerateError;
use crate::lua::{escape_identifier, is_lua_keyword};
use crate::model::{
    ClassRecord, DelegateRecord, EnumRecord, FieldRecord, InterfaceRecord, MethodRecord,
    ParamRecord, PassingMode, TypeHeader, TypeRecord,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const META_HEADER: &str = "---@meta\n";
pub const NAMESPACE_ROOT: &str = "CS";
pub const NAMESPACE_FILE: &str = "xlua_namespace.lua";

const VOID: &str = "void";

pub fn chunk_file_name(index: usize) -> String {
    format!("xlua_dump_{index}.lua")
}

pub struct XLuaDumper {
    chunk_size: usize,
}

impl XLuaDumper {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

impl Dumper for XLuaDumper {
    fn name(&self) -> &'static str {
        "XLuaDumper"
    }

    fn dump(&self, records: &[TypeRecord], out_dir: &Path) -> Result<DumpReport, GenerateError> {
        ensure_dir(out_dir)?;

        let mut ordered: Vec<&TypeRecord> = records.iter().collect();
        ordered.sort_by(|a, b| (a.namespace(), a.name()).cmp(&(b.namespace(), b.name())));

        let mut chunks = ChunkWriter::new(out_dir, self.chunk_size);
        let mut namespaces = NamespaceTable::default();
        let mut rendered = 0;

        for record in ordered {
            let Some(block) = render_record(record) else {
                continue;
            };
            namespaces.register(record.header());
            chunks.push_block(&block)?;
            rendered += 1;
        }

        let mut files = chunks.finish()?;
        let ns_path = out_dir.join(NAMESPACE_FILE);
        write_file(&ns_path, &namespaces.render())?;
        files.push(ns_path);

        debug!(files = files.len(), rendered, "xLua stubs written");
        Ok(DumpReport { files, rendered })
    }
}

// ---------------------------------------------------------------------------
// Chunked output
// ---------------------------------------------------------------------------

/// Accumulates whole blocks and writes a numbered file when the next block
/// would push the buffer past the threshold.
struct ChunkWriter<'a> {
    out_dir: &'a Path,
    threshold: usize,
    buffer: String,
    blocks: usize,
    files: Vec<PathBuf>,
}

impl<'a> ChunkWriter<'a> {
    fn new(out_dir: &'a Path, threshold: usize) -> Self {
        Self {
            out_dir,
            threshold,
            buffer: String::from(META_HEADER),
            blocks: 0,
            files: Vec::new(),
        }
    }

    fn push_block(&mut self, block: &str) -> Result<(), GenerateError> {
        if self.blocks > 0 && self.buffer.len() + block.len() > self.threshold {
            self.flush()?;
        }
        self.buffer.push_str(block);
        self.blocks += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), GenerateError> {
        let path = self.out_dir.join(chunk_file_name(self.files.len()));
        write_file(&path, &self.buffer)?;
        self.files.push(path);
        self.buffer.clear();
        self.buffer.push_str(META_HEADER);
        self.blocks = 0;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<PathBuf>, GenerateError> {
        if self.blocks > 0 {
            self.flush()?;
        }
        Ok(self.files)
    }
}

// ---------------------------------------------------------------------------
// Namespace registration
// ---------------------------------------------------------------------------

/// Every namespace path seen, plus global types registered under their own name.
/// `true` marks a namespace, `false` a global type. A type entry is never
/// downgraded to a namespace.
#[derive(Default)]
struct NamespaceTable {
    entries: BTreeMap<String, bool>,
}

impl NamespaceTable {
    fn register(&mut self, header: &TypeHeader) {
        let namespace = header.declaring_namespace.as_deref().unwrap_or(&header.namespace);
        if namespace.is_empty() {
            // Nested global types resolve through their outermost type.
            let outer = header.namespace.split('.').next().filter(|s| !s.is_empty());
            self.entries.insert(outer.unwrap_or(&header.name).to_string(), false);
            return;
        }
        let mut end = 0;
        for segment in namespace.split('.') {
            end += segment.len();
            self.entries.entry(namespace[..end].to_string()).or_insert(true);
            end += 1;
        }
    }

    fn render(&self) -> String {
        let mut out = String::from(META_HEADER);
        let _ = writeln!(out, "{NAMESPACE_ROOT} = {{}}");
        for (name, is_namespace) in &self.entries {
            if *is_namespace {
                let _ = writeln!(out, "---@type namespace <\"{name}\">");
            } else {
                let _ = writeln!(out, "---@type {name}");
            }
            let _ = writeln!(out, "{NAMESPACE_ROOT}.{name} = {{}}");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Record rendering
// ---------------------------------------------------------------------------

/// One self-contained block, or `None` for kinds with no Lua shape.
pub fn render_record(record: &TypeRecord) -> Option<String> {
    let mut out = String::new();
    match record {
        TypeRecord::Class(class) => render_class(class, &mut out),
        TypeRecord::Interface(iface) => render_interface(iface, &mut out),
        TypeRecord::Enum(en) => render_enum(en, &mut out),
        TypeRecord::Delegate(del) => render_delegate(del, &mut out),
        TypeRecord::Other(_) => return None,
    }
    out.push('\n');
    Some(out)
}

fn render_class(class: &ClassRecord, out: &mut String) {
    let full_name = class.header.full_name();
    write_comment_and_source(&class.header.comment, &class.header.location, out);
    write_type_tag(
        out,
        "class",
        &full_name,
        &class.generic_params,
        &class.base_class,
        &class.interfaces,
    );

    if !class.is_static {
        let mut ctors = class.methods.iter().filter(|m| m.is_constructor()).peekable();
        if ctors.peek().is_none() {
            let _ = writeln!(out, "---@overload fun(): {full_name}");
        }
        for ctor in ctors {
            let params = signature_params(&ctor.params);
            let _ = writeln!(out, "---@overload fun({params}): {full_name}");
        }
    }

    let table = &class.header.name;
    let _ = writeln!(out, "local {table} = {{}}");
    write_fields(table, &class.fields, out, None);
    write_methods(table, &class.methods, out);
}

fn render_interface(iface: &InterfaceRecord, out: &mut String) {
    let full_name = iface.header.full_name();
    write_comment_and_source(&iface.header.comment, &iface.header.location, out);
    write_type_tag(out, "interface", &full_name, &iface.generic_params, "", &iface.interfaces);

    let table = &iface.header.name;
    let _ = writeln!(out, "local {table} = {{}}");
    write_fields(table, &iface.fields, out, None);
    write_methods(table, &iface.methods, out);
}

fn render_enum(en: &EnumRecord, out: &mut String) {
    let full_name = en.header.full_name();
    write_comment_and_source(&en.header.comment, &en.header.location, out);
    write_type_tag(out, "enum", &full_name, &[], "", &[]);

    let table = &en.header.name;
    let _ = writeln!(out, "local {table} = {{}}");
    write_fields(table, &en.fields, out, Some("integer"));
}

fn render_delegate(del: &DelegateRecord, out: &mut String) {
    write_comment_and_source(&del.header.comment, &del.header.location, out);
    let _ = writeln!(
        out,
        "---@alias {} fun({}): {}",
        del.header.full_name(),
        signature_params(&del.invoke.params),
        del.invoke.return_type
    );
}

fn write_comment_and_source(comment: &str, location: &str, out: &mut String) {
    if !comment.is_empty() {
        let _ = writeln!(out, "---{}", comment.replace('\n', "\n---"));
    }
    if location.starts_with("file://") {
        let _ = writeln!(out, "---@source \"{}\"", location.replace('"', "'"));
    }
}

/// `---@<tag> Full.Name<T, U>: Base, IFoo, IBar`
fn write_type_tag(
    out: &mut String,
    tag: &str,
    full_name: &str,
    generic_params: &[String],
    base: &str,
    interfaces: &[String],
) {
    let _ = write!(out, "---@{tag} {full_name}");
    if !generic_params.is_empty() {
        let _ = write!(out, "<{}>", generic_params.join(", "));
    }

    let supers: Vec<&str> = std::iter::once(base)
        .filter(|b| !b.is_empty())
        .chain(interfaces.iter().map(String::as_str))
        .collect();
    if !supers.is_empty() {
        let _ = write!(out, ": {}", supers.join(", "));
    }
    out.push('\n');
}

fn write_fields(table: &str, fields: &[FieldRecord], out: &mut String, forced_type: Option<&str>) {
    for field in fields {
        write_comment_and_source(&field.comment, &field.location, out);
        let _ = writeln!(out, "---@type {}", forced_type.unwrap_or(&field.type_name));
        let _ = writeln!(out, "{} = nil", member_path(table, &field.name));
        out.push('\n');
    }
}

fn write_methods(table: &str, methods: &[MethodRecord], out: &mut String) {
    for method in methods.iter().filter(|m| !m.is_any_constructor()) {
        write_comment_and_source(&method.comment, &method.location, out);

        for param in method.params.iter().filter(|p| p.passing != PassingMode::Out) {
            let optional = if param.is_optional { "?" } else { "" };
            let name = escape_identifier(&param.name);
            let _ = write!(out, "---@param {name}{optional} {}", param.type_name);
            if !param.comment.is_empty() {
                let _ = write!(out, " {}", param.comment.replace('\n', "\n---"));
            }
            out.push('\n');
        }

        let _ = writeln!(out, "---@return {}", return_list(method));

        let args: Vec<String> = method
            .params
            .iter()
            .filter(|p| p.passing != PassingMode::Out)
            .map(|p| escape_identifier(&p.name))
            .collect();
        let args = args.join(", ");

        if is_lua_keyword(&method.name) {
            let receiver = if method.is_static { String::new() } else { "self".to_string() };
            let all: Vec<&str> =
                [receiver.as_str(), args.as_str()].into_iter().filter(|s| !s.is_empty()).collect();
            let _ = writeln!(out, "{}[\"{}\"] = function({})", table, method.name, all.join(", "));
        } else {
            let sep = if method.is_static { "." } else { ":" };
            let _ = writeln!(out, "function {table}{sep}{}({args})", method.name);
        }
        out.push_str("end\n\n");
    }
}

/// Declared return type followed by every out/ref parameter type. A `void`
/// return is dropped once there is something else to return.
fn return_list(method: &MethodRecord) -> String {
    let outs: Vec<&str> = method
        .params
        .iter()
        .filter(|p| matches!(p.passing, PassingMode::Out | PassingMode::Ref))
        .map(|p| p.type_name.as_str())
        .collect();

    let mut list: Vec<&str> = Vec::with_capacity(outs.len() + 1);
    if method.return_type != VOID || outs.is_empty() {
        list.push(&method.return_type);
    }
    list.extend(outs);
    list.join(", ")
}

/// `a: T, b: U` for overload and alias signatures.
fn signature_params(params: &[ParamRecord]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", escape_identifier(&p.name), p.type_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn member_path(table: &str, name: &str) -> String {
    if is_lua_keyword(name) {
        format!("{table}[\"{name}\"]")
    } else {
        format!("{table}.{name}")
    }
}
