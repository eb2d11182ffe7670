//! Binding-agnostic intermediate model produced by the analyzer.
//!
//! One [`TypeRecord`] per discovered type. Type names inside records are already
//! translated to Lua annotation names; identifiers are kept as declared.

use serde::Serialize;

/// Method name the resolver gives instance constructors.
pub const CONSTRUCTOR_NAME: &str = ".ctor";
/// Method name the resolver gives static constructors.
pub const STATIC_CONSTRUCTOR_NAME: &str = ".cctor";

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PassingMode {
    #[default]
    Value,
    Ref,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamRecord {
    pub name: String,
    pub type_name: String,
    pub is_optional: bool,
    pub passing: PassingMode,
    pub comment: String,
}

/// Fields, properties and events all collapse into this.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub name: String,
    pub comment: String,
    pub location: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRecord {
    pub name: String,
    pub comment: String,
    pub location: String,
    pub return_type: String,
    pub is_static: bool,
    pub params: Vec<ParamRecord>,
}

impl MethodRecord {
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Constructors of either kind; never emitted as ordinary functions.
    pub fn is_any_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME || self.name == STATIC_CONSTRUCTOR_NAME
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Data every record carries regardless of kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHeader {
    pub name: String,
    pub comment: String,
    pub location: String,
    /// Empty for the global namespace. For nested types this is the
    /// qualified name of the containing type.
    pub namespace: String,
    /// Nested types only: the namespace of the outermost containing type.
    #[serde(skip)]
    pub declaring_namespace: Option<String>,
}

impl TypeHeader {
    /// `namespace.name`, or just `name` in the global namespace.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub base_class: String,
    pub interfaces: Vec<String>,
    pub generic_params: Vec<String>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRecord {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub interfaces: Vec<String>,
    pub generic_params: Vec<String>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumRecord {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub fields: Vec<FieldRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRecord {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub invoke: MethodRecord,
}

/// One analyzed type. Closed set: emitters match on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRecord {
    Class(ClassRecord),
    Interface(InterfaceRecord),
    Enum(EnumRecord),
    Delegate(DelegateRecord),
    /// A symbol of a kind we have no shape for. Kept, never rendered.
    Other(TypeHeader),
}

impl TypeRecord {
    pub fn header(&self) -> &TypeHeader {
        match self {
            Self::Class(c) => &c.header,
            Self::Interface(i) => &i.header,
            Self::Enum(e) => &e.header,
            Self::Delegate(d) => &d.header,
            Self::Other(h) => h,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn namespace(&self) -> &str {
        &self.header().namespace
    }

    pub fn full_name(&self) -> String {
        self.header().full_name()
    }

    pub fn methods(&self) -> Option<&[MethodRecord]> {
        match self {
            Self::Class(c) => Some(&c.methods),
            Self::Interface(i) => Some(&i.methods),
            _ => None,
        }
    }

    /// Method list for kinds that own one.
    pub fn methods_mut(&mut self) -> Option<&mut Vec<MethodRecord>> {
        match self {
            Self::Class(c) => Some(&mut c.methods),
            Self::Interface(i) => Some(&mut i.methods),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[FieldRecord]> {
        match self {
            Self::Class(c) => Some(&c.fields),
            Self::Interface(i) => Some(&i.fields),
            Self::Enum(e) => Some(&e.fields),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Interface(_) => "interface",
            Self::Enum(_) => "enum",
            Self::Delegate(_) => "delegate",
            Self::Other(_) => "other",
        }
    }
}
