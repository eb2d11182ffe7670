//! The resolved symbol graph handed to us by an external compiler frontend.
//!
//! A resolver (for C#, typically a Roslyn-side dumper) writes a JSON snapshot of
//! every compilation's namespace tree with accessibility, inheritance, generics and
//! documentation already computed. Nothing here re-derives those facts.

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Snapshot root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSnapshot {
    #[serde(default)]
    pub compilations: Vec<Compilation>,
}

/// One project's compilation, rooted at its global namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compilation {
    #[serde(default)]
    pub name: String,
    pub global_namespace: NamespaceSymbol,
}

impl SymbolSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn type_count(&self) -> usize {
        fn count_ns(ns: &NamespaceSymbol) -> usize {
            ns.members
                .iter()
                .map(|m| match m {
                    NamespaceMember::Namespace(child) => count_ns(child),
                    NamespaceMember::Type(ty) => 1 + ty.nested_type_count(),
                })
                .sum()
        }
        self.compilations.iter().map(|c| count_ns(&c.global_namespace)).sum()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Anything that can produce a resolved symbol snapshot.
pub trait SymbolSource {
    fn open(&self) -> Result<SymbolSnapshot, GenerateError>;
}

/// Reads a snapshot previously written to disk by a resolver.
pub struct JsonSymbolSource {
    path: PathBuf,
}

impl JsonSymbolSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolSource for JsonSymbolSource {
    fn open(&self) -> Result<SymbolSnapshot, GenerateError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|source| GenerateError::ReadSnapshot { path: self.path.clone(), source })?;
        SymbolSnapshot::from_json(&content)
            .map_err(|source| GenerateError::ParseSnapshot { path: self.path.clone(), source })
    }
}

impl SymbolSource for SymbolSnapshot {
    fn open(&self) -> Result<SymbolSnapshot, GenerateError> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSymbol {
    /// Simple segment name; empty for the global namespace.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<NamespaceMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "symbol", rename_all = "camelCase")]
pub enum NamespaceMember {
    Namespace(NamespaceSymbol),
    Type(TypeSymbol),
}

impl NamespaceSymbol {
    pub fn is_global(&self) -> bool {
        self.name.is_empty()
    }

    /// Fully qualified name given the parent's qualified name.
    pub fn qualified_name(&self, parent: &str) -> String {
        match (parent.is_empty(), self.name.is_empty()) {
            (_, true) => parent.to_string(),
            (true, false) => self.name.clone(),
            (false, false) => format!("{parent}.{}", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Module,
    TypeParameter,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    Public,
    Protected,
    Internal,
    ProtectedInternal,
    PrivateProtected,
    #[default]
    Private,
    NotApplicable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSymbol {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub all_interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub type_arguments: Vec<TypeRef>,
    #[serde(default)]
    pub members: Vec<MemberSymbol>,
    #[serde(default)]
    pub nested_types: Vec<TypeSymbol>,
    #[serde(default)]
    pub delegate_invoke: Option<MethodSymbol>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl TypeSymbol {
    pub fn is_public(&self) -> bool {
        self.accessibility == Accessibility::Public
    }

    fn nested_type_count(&self) -> usize {
        self.nested_types.iter().map(|t| 1 + t.nested_type_count()).sum()
    }
}

/// Reference to a type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    /// Resolver display string, e.g. `System.Collections.Generic.List<int>`.
    pub display: String,
    /// Simple name without namespace or type arguments, e.g. `List`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: TypeRefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRefKind {
    #[default]
    Named,
    Array,
    Pointer,
    TypeParameter,
    Dynamic,
    Error,
}

impl TypeRef {
    pub fn named(display: &str) -> Self {
        Self {
            display: display.to_string(),
            name: simple_name_of(display).to_string(),
            kind: TypeRefKind::Named,
        }
    }

    /// Simple name, derived from the display string when the resolver left it out.
    pub fn simple_name(&self) -> &str {
        if self.name.is_empty() {
            simple_name_of(&self.display)
        } else {
            &self.name
        }
    }

    pub fn is_named(&self) -> bool {
        self.kind == TypeRefKind::Named
    }
}

fn simple_name_of(display: &str) -> &str {
    let without_args = display.split('<').next().unwrap_or(display);
    without_args.rsplit('.').next().unwrap_or(without_args)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "symbol", rename_all = "camelCase")]
pub enum MemberSymbol {
    Field(ValueMember),
    Property(ValueMember),
    Event(ValueMember),
    Method(MethodSymbol),
    #[serde(other)]
    Other,
}

/// Field, property or event: anything with a single declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMember {
    pub name: String,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSymbol {
    pub name: String,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_extension_method: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSymbol {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub ref_kind: RefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

impl MemberSymbol {
    pub fn accessibility(&self) -> Accessibility {
        match self {
            Self::Field(v) | Self::Property(v) | Self::Event(v) => v.accessibility,
            Self::Method(m) => m.accessibility,
            Self::Other => Accessibility::NotApplicable,
        }
    }

    pub fn is_public(&self) -> bool {
        self.accessibility() == Accessibility::Public
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Location {
    /// Declared in source. `line` and `column` are 0-based.
    Source { path: String, line: u32, column: u32 },
    /// Only known from a referenced binary.
    Metadata { module: String },
}

impl Location {
    /// Stable string form: `file:///path#line:column` (1-based) for source
    /// locations, the module identifier for metadata.
    pub fn render(&self) -> String {
        match self {
            Self::Source { path, line, column } => {
                format!("{}#{}:{}", file_uri(path), line + 1, column + 1)
            }
            Self::Metadata { module } => module.clone(),
        }
    }
}

/// Render the first location of a symbol, or an empty string.
pub fn render_location(locations: &[Location]) -> String {
    locations.first().map(Location::render).unwrap_or_default()
}

/// Convert a filesystem path into a `file://` URI. Windows drive paths and
/// backslashes are normalized; spaces, `#` and `%` are percent-encoded.
pub fn file_uri(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let mut encoded = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '#' => encoded.push_str("%23"),
            '%' => encoded.push_str("%25"),
            _ => encoded.push(c),
        }
    }
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}
