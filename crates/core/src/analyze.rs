//! Type model builder: one [`TypeRecord`] per collected type descriptor.
//!
//! Analysis is sequential. Extension methods found while analyzing a type are
//! staged with that type and only enter the pending map if the whole type
//! analyzes cleanly; [`Analyzer::finish`] runs the merge pass.

use crate::collect::TypeDescriptor;
use crate::docs::{CommentStyle, DocComment};
use crate::error::AnalyzeError;
use crate::lua::lua_type_name;
use crate::merge::{merge_extensions, PendingExtensions};
use crate::model::{
    ClassRecord, DelegateRecord, EnumRecord, FieldRecord, InterfaceRecord, MethodRecord,
    ParamRecord, PassingMode, TypeHeader, TypeRecord,
};
use crate::symbols::{
    render_location, MemberSymbol, MethodSymbol, ParameterSymbol, RefKind, TypeKind, TypeRef,
    TypeSymbol, ValueMember,
};
use tracing::{debug, warn};

/// Method name prefixes of compiler-generated property and event accessors.
const ACCESSOR_PREFIXES: &[&str] = &["get_", "set_", "add_", "remove_"];

pub fn is_accessor_name(name: &str) -> bool {
    ACCESSOR_PREFIXES.iter().any(|p| name.starts_with(p))
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub comment_style: CommentStyle,
    /// Copy `<param>` descriptions onto parameter records.
    pub param_docs: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { comment_style: CommentStyle::Reduced, param_docs: true }
    }
}

/// Result of analyzing one type before it is committed.
struct Analyzed {
    record: TypeRecord,
    extensions: Vec<(String, MethodRecord)>,
}

/// Where a non-accessor method ends up.
enum Routed {
    Declared(MethodRecord),
    Extension { receiver: String, method: MethodRecord },
    Dropped,
}

/// One run's analysis state. Create per run; nothing is shared across runs.
#[derive(Debug, Default)]
pub struct Analyzer {
    options: AnalyzeOptions,
    records: Vec<TypeRecord>,
    pending: PendingExtensions,
    failed: usize,
}

impl Analyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self { options, ..Default::default() }
    }

    /// Analyze one descriptor and keep the record. Failures are logged and the
    /// type is dropped.
    pub fn analyze(&mut self, descriptor: &TypeDescriptor<'_>) {
        match self.analyze_type(descriptor) {
            Ok(Analyzed { record, extensions }) => {
                debug!(
                    ty = %descriptor.qualified_name(),
                    kind = record.kind_label(),
                    extensions = extensions.len(),
                    "Analyzed type"
                );
                self.pending.extend(extensions);
                self.records.push(record);
            }
            Err(e) => {
                self.failed += 1;
                warn!(ty = %descriptor.qualified_name(), "Dropping type: {e}");
            }
        }
    }

    pub fn analyze_all<'d, 'a: 'd>(
        &mut self,
        descriptors: impl IntoIterator<Item = &'d TypeDescriptor<'a>>,
    ) {
        for descriptor in descriptors {
            self.analyze(descriptor);
        }
    }

    pub fn records(&self) -> &[TypeRecord] {
        &self.records
    }

    pub fn pending_extension_count(&self) -> usize {
        self.pending.len()
    }

    /// Types dropped because their analysis failed.
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Run the extension merge and hand back the final record list.
    pub fn finish(self) -> Vec<TypeRecord> {
        let mut records = self.records;
        let stats = merge_extensions(&mut records, self.pending);
        debug!(
            records = records.len(),
            extensions = stats.attached,
            failed = self.failed,
            "Analysis finished"
        );
        records
    }

    fn analyze_type(&self, descriptor: &TypeDescriptor<'_>) -> Result<Analyzed, AnalyzeError> {
        let symbol = descriptor.symbol;
        if symbol.name.trim().is_empty() {
            return Err(AnalyzeError::MissingName);
        }

        let header = TypeHeader {
            name: symbol.name.clone(),
            comment: self.comment(symbol.documentation.as_deref()),
            location: render_location(&symbol.locations),
            namespace: descriptor
                .containing_type
                .clone()
                .unwrap_or_else(|| descriptor.namespace.clone()),
            declaring_namespace: descriptor
                .containing_type
                .as_ref()
                .map(|_| descriptor.namespace.clone()),
        };

        let mut extensions = Vec::new();
        let record = match symbol.kind {
            TypeKind::Class | TypeKind::Struct => {
                let (fields, methods) = self.members(symbol, &mut extensions)?;
                TypeRecord::Class(ClassRecord {
                    header,
                    base_class: symbol.base_type.as_ref().map(base_type_name).unwrap_or_default(),
                    interfaces: translate_all(&symbol.all_interfaces),
                    generic_params: translate_all(&symbol.type_arguments),
                    fields,
                    methods,
                    is_static: symbol.is_static,
                })
            }
            TypeKind::Interface => {
                let (fields, methods) = self.members(symbol, &mut extensions)?;
                TypeRecord::Interface(InterfaceRecord {
                    header,
                    interfaces: translate_all(&symbol.all_interfaces),
                    generic_params: translate_all(&symbol.type_arguments),
                    fields,
                    methods,
                })
            }
            TypeKind::Enum => {
                let mut fields = Vec::new();
                for member in symbol.members.iter().filter(|m| m.is_public()) {
                    if let MemberSymbol::Field(value) = member {
                        fields.push(self.field(&header.name, value)?);
                    }
                }
                TypeRecord::Enum(EnumRecord { header, fields })
            }
            TypeKind::Delegate => {
                let invoke = symbol
                    .delegate_invoke
                    .as_ref()
                    .ok_or_else(|| AnalyzeError::MissingInvoke(header.full_name()))?;
                let doc = DocComment::parse(symbol.documentation.as_deref());
                let invoke = MethodRecord {
                    name: invoke.name.clone(),
                    return_type: lua_type_name(&invoke.return_type.display),
                    params: self.params(&invoke.parameters, &doc),
                    ..Default::default()
                };
                TypeRecord::Delegate(DelegateRecord { header, invoke })
            }
            TypeKind::Module | TypeKind::TypeParameter | TypeKind::Error => {
                TypeRecord::Other(header)
            }
        };

        Ok(Analyzed { record, extensions })
    }

    /// Public fields and methods of a class-like type. Extension methods go to
    /// `extensions` instead of the returned list.
    fn members(
        &self,
        symbol: &TypeSymbol,
        extensions: &mut Vec<(String, MethodRecord)>,
    ) -> Result<(Vec<FieldRecord>, Vec<MethodRecord>), AnalyzeError> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for member in symbol.members.iter().filter(|m| m.is_public()) {
            match member {
                MemberSymbol::Field(value)
                | MemberSymbol::Property(value)
                | MemberSymbol::Event(value) => {
                    fields.push(self.field(&symbol.name, value)?);
                }
                MemberSymbol::Method(method) => match self.method(&symbol.name, method)? {
                    Routed::Declared(m) => methods.push(m),
                    Routed::Extension { receiver, method } => extensions.push((receiver, method)),
                    Routed::Dropped => {}
                },
                MemberSymbol::Other => {}
            }
        }

        Ok((fields, methods))
    }

    fn field(&self, owner: &str, value: &ValueMember) -> Result<FieldRecord, AnalyzeError> {
        if value.name.is_empty() {
            return Err(AnalyzeError::UnnamedMember(owner.to_string()));
        }
        Ok(FieldRecord {
            name: value.name.clone(),
            comment: self.comment(value.documentation.as_deref()),
            location: render_location(&value.locations),
            type_name: lua_type_name(&value.ty.display),
        })
    }

    fn method(&self, owner: &str, method: &MethodSymbol) -> Result<Routed, AnalyzeError> {
        if method.name.is_empty() {
            return Err(AnalyzeError::UnnamedMember(owner.to_string()));
        }
        if is_accessor_name(&method.name) {
            return Ok(Routed::Dropped);
        }

        let doc = DocComment::parse(method.documentation.as_deref());
        let mut record = MethodRecord {
            name: method.name.clone(),
            comment: doc.render(self.options.comment_style),
            location: render_location(&method.locations),
            return_type: lua_type_name(&method.return_type.display),
            is_static: method.is_static,
            params: Vec::new(),
        };

        if !method.is_extension_method {
            record.params = self.params(&method.parameters, &doc);
            return Ok(Routed::Declared(record));
        }

        // Receiver must be a named type; pointers, arrays and type parameters
        // have no record to attach to.
        let Some((receiver, rest)) = method.parameters.split_first() else {
            return Ok(Routed::Dropped);
        };
        if !receiver.ty.is_named() {
            return Ok(Routed::Dropped);
        }

        record.is_static = false;
        record.params = self.params(rest, &doc);
        Ok(Routed::Extension { receiver: receiver_key(&receiver.ty), method: record })
    }

    fn params(&self, parameters: &[ParameterSymbol], doc: &DocComment) -> Vec<ParamRecord> {
        parameters
            .iter()
            .map(|p| ParamRecord {
                name: p.name.clone(),
                type_name: lua_type_name(&p.ty.display),
                is_optional: p.is_optional,
                passing: passing_mode(p.ref_kind),
                comment: if self.options.param_docs {
                    doc.param(&p.name).unwrap_or_default().to_string()
                } else {
                    String::new()
                },
            })
            .collect()
    }

    fn comment(&self, raw: Option<&str>) -> String {
        DocComment::parse(raw).render(self.options.comment_style)
    }
}

fn passing_mode(kind: RefKind) -> PassingMode {
    match kind {
        RefKind::None | RefKind::In => PassingMode::Value,
        RefKind::Ref => PassingMode::Ref,
        RefKind::Out => PassingMode::Out,
    }
}

fn receiver_key(ty: &TypeRef) -> String {
    ty.simple_name().to_string()
}

fn translate_all(refs: &[TypeRef]) -> Vec<String> {
    refs.iter().map(|r| lua_type_name(&r.display)).collect()
}

/// Base type annotation name. The implicit `object` root is not written.
fn base_type_name(base: &TypeRef) -> String {
    match lua_type_name(&base.display).as_str() {
        "any" => String::new(),
        name => name.to_string(),
    }
}
