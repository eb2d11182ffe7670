//! Symbol collection: walk every compilation's namespace tree and gather the
//! public named types that pass the namespace filter.
//!
//! Sibling namespace branches are visited in parallel once a namespace has more
//! than `parallel_threshold` members. Results land in a concurrent map keyed by
//! qualified name and are sorted before they leave this module, so discovery
//! order never leaks into the output.

use crate::symbols::{Compilation, NamespaceMember, NamespaceSymbol, TypeSymbol};
use dashmap::DashMap;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Default member count above which a namespace's children are visited in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10;

// ---------------------------------------------------------------------------
// Namespace filter
// ---------------------------------------------------------------------------

/// Allow-list of namespace prefixes (plain string prefixes, as the resolver
/// prints qualified names).
#[derive(Debug, Clone, Default)]
pub struct NamespaceFilter {
    prefixes: Vec<String>,
    include_global: bool,
}

impl NamespaceFilter {
    pub fn new(prefixes: Vec<String>, include_global: bool) -> Self {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes, include_global }
    }

    /// Does a type directly inside `namespace` get collected?
    pub fn allows(&self, namespace: &str) -> bool {
        if namespace.is_empty() {
            return self.include_global;
        }
        self.prefixes.iter().any(|p| namespace.starts_with(p.as_str()))
    }

    /// Can anything below `namespace` still pass the filter?
    fn may_contain(&self, namespace: &str) -> bool {
        namespace.is_empty()
            || self
                .prefixes
                .iter()
                .any(|p| namespace.starts_with(p.as_str()) || p.starts_with(namespace))
    }
}

// ---------------------------------------------------------------------------
// Discovered types
// ---------------------------------------------------------------------------

/// A public type plus the context the walk resolved for it.
#[derive(Debug, Clone)]
pub struct TypeDescriptor<'a> {
    pub symbol: &'a TypeSymbol,
    /// Qualified name of the containing namespace; empty for global.
    pub namespace: String,
    /// Qualified name of the containing type, for nested types.
    pub containing_type: Option<String>,
}

impl TypeDescriptor<'_> {
    /// Qualified name of this type: containing type (if nested) or namespace, then name.
    pub fn qualified_name(&self) -> String {
        let prefix = self.containing_type.as_deref().unwrap_or(&self.namespace);
        if prefix.is_empty() {
            self.symbol.name.clone()
        } else {
            format!("{prefix}.{}", self.symbol.name)
        }
    }

    fn arity(&self) -> usize {
        self.symbol.type_arguments.len()
    }
}

struct Walk<'f> {
    filter: &'f NamespaceFilter,
    parallel_threshold: usize,
}

/// Concurrent discovery set: qualified name → (compilation index, descriptor).
/// Generic and non-generic types sharing a name collapse into one Lua table.
type Discovered<'a> = DashMap<String, (usize, TypeDescriptor<'a>)>;

impl Walk<'_> {
    fn visit_namespace<'a>(
        &self,
        ns: &'a NamespaceSymbol,
        parent: &str,
        compilation: usize,
        out: &Discovered<'a>,
    ) {
        let qualified = ns.qualified_name(parent);
        if !self.filter.may_contain(&qualified) {
            return;
        }

        let visit = |member: &'a NamespaceMember| match member {
            NamespaceMember::Namespace(child) => {
                self.visit_namespace(child, &qualified, compilation, out)
            }
            NamespaceMember::Type(ty) => {
                if self.filter.allows(&qualified) {
                    self.visit_type(ty, &qualified, None, compilation, out);
                }
            }
        };

        if ns.members.len() > self.parallel_threshold {
            ns.members.par_iter().for_each(visit);
        } else {
            ns.members.iter().for_each(visit);
        }
    }

    fn visit_type<'a>(
        &self,
        ty: &'a TypeSymbol,
        namespace: &str,
        containing_type: Option<String>,
        compilation: usize,
        out: &Discovered<'a>,
    ) {
        if !ty.is_public() {
            return;
        }
        if ty.name.trim().is_empty() {
            warn!(namespace, "Skipping unnamed type symbol");
            return;
        }

        let descriptor =
            TypeDescriptor { symbol: ty, namespace: namespace.to_string(), containing_type };
        let qualified = descriptor.qualified_name();

        // First compilation wins, then the lowest generic arity.
        out.entry(qualified.clone())
            .and_modify(|existing| {
                if (compilation, descriptor.arity()) < (existing.0, existing.1.arity()) {
                    *existing = (compilation, descriptor.clone());
                }
            })
            .or_insert_with(|| (compilation, descriptor.clone()));

        for nested in &ty.nested_types {
            self.visit_type(nested, namespace, Some(qualified.clone()), compilation, out);
        }
    }
}

/// Collect every public type that passes `filter` across all compilations,
/// sorted by qualified name.
pub fn collect_types<'a>(
    compilations: &'a [Compilation],
    filter: &NamespaceFilter,
    parallel_threshold: usize,
) -> Vec<TypeDescriptor<'a>> {
    let walk = Walk { filter, parallel_threshold };
    let discovered: Discovered<'a> = DashMap::new();

    for (index, compilation) in compilations.iter().enumerate() {
        debug!(compilation = compilation.name.as_str(), "Collecting types");
        walk.visit_namespace(&compilation.global_namespace, "", index, &discovered);
    }

    let mut found: Vec<TypeDescriptor<'a>> =
        discovered.into_iter().map(|(_, (_, descriptor))| descriptor).collect();
    found.sort_by_cached_key(|d| d.qualified_name());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Accessibility, TypeKind, TypeRef};

    fn ty(name: &str, accessibility: Accessibility) -> TypeSymbol {
        TypeSymbol {
            name: name.into(),
            kind: TypeKind::Class,
            accessibility,
            is_static: false,
            base_type: None,
            all_interfaces: vec![],
            type_arguments: vec![],
            members: vec![],
            nested_types: vec![],
            delegate_invoke: None,
            documentation: None,
            locations: vec![],
        }
    }

    fn public(name: &str) -> NamespaceMember {
        NamespaceMember::Type(ty(name, Accessibility::Public))
    }

    fn ns(name: &str, members: Vec<NamespaceMember>) -> NamespaceMember {
        NamespaceMember::Namespace(NamespaceSymbol { name: name.into(), members })
    }

    fn compilation(members: Vec<NamespaceMember>) -> Compilation {
        Compilation {
            name: "test".into(),
            global_namespace: NamespaceSymbol { name: String::new(), members },
        }
    }

    fn names(found: &[TypeDescriptor<'_>]) -> Vec<String> {
        found.iter().map(|d| d.qualified_name()).collect()
    }

    fn sample() -> Vec<Compilation> {
        let mut outer = ty("Outer", Accessibility::Public);
        outer.nested_types =
            vec![ty("Inner", Accessibility::Public), ty("Hidden", Accessibility::Private)];
        vec![compilation(vec![
            public("GlobalThing"),
            ns(
                "UnityEngine",
                vec![
                    public("GameObject"),
                    NamespaceMember::Type(ty("Internal", Accessibility::Internal)),
                    ns("UI", vec![public("Button")]),
                    NamespaceMember::Type(outer),
                ],
            ),
            ns("System", vec![public("String")]),
        ])]
    }

    #[test]
    fn test_filter_prefix_and_global() {
        let filter = NamespaceFilter::new(vec!["UnityEngine".into()], true);
        let comps = sample();
        let found = collect_types(&comps, &filter, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(
            names(&found),
            vec![
                "GlobalThing",
                "UnityEngine.GameObject",
                "UnityEngine.Outer",
                "UnityEngine.Outer.Inner",
                "UnityEngine.UI.Button",
            ]
        );
    }

    #[test]
    fn test_global_namespace_is_a_knob() {
        let filter = NamespaceFilter::new(vec!["UnityEngine".into()], false);
        let comps = sample();
        let found = collect_types(&comps, &filter, DEFAULT_PARALLEL_THRESHOLD);
        assert!(!names(&found).contains(&"GlobalThing".to_string()));
    }

    #[test]
    fn test_nested_type_context() {
        let filter = NamespaceFilter::new(vec!["UnityEngine".into()], false);
        let comps = sample();
        let found = collect_types(&comps, &filter, DEFAULT_PARALLEL_THRESHOLD);
        let inner = found.iter().find(|d| d.symbol.name == "Inner").unwrap();
        assert_eq!(inner.namespace, "UnityEngine");
        assert_eq!(inner.containing_type.as_deref(), Some("UnityEngine.Outer"));
    }

    #[test]
    fn test_deeper_prefix_still_walks_parents() {
        let filter = NamespaceFilter::new(vec!["UnityEngine.UI".into()], false);
        let comps = sample();
        let found = collect_types(&comps, &filter, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(names(&found), vec!["UnityEngine.UI.Button"]);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let members: Vec<NamespaceMember> = (0..200)
            .map(|i| ns(&format!("Game{i}"), vec![public("A"), public("B"), public("C")]))
            .collect();
        let comps = vec![compilation(members)];
        let filter = NamespaceFilter::new(vec!["Game".into()], false);
        let sequential = collect_types(&comps, &filter, usize::MAX);
        let parallel = collect_types(&comps, &filter, 0);
        assert_eq!(sequential.len(), 600);
        assert_eq!(names(&sequential), names(&parallel));
    }

    #[test]
    fn test_duplicates_across_compilations_collapse() {
        let comps = vec![
            compilation(vec![ns("Game", vec![public("Player")])]),
            compilation(vec![ns("Game", vec![public("Player"), public("Enemy")])]),
        ];
        let filter = NamespaceFilter::new(vec!["Game".into()], false);
        let found = collect_types(&comps, &filter, 0);
        assert_eq!(names(&found), vec!["Game.Enemy", "Game.Player"]);
    }

    #[test]
    fn test_generic_overloads_collapse_to_lowest_arity() {
        let mut generic = ty("Pool", Accessibility::Public);
        generic.type_arguments = vec![TypeRef::named("T")];
        let mut pair = ty("Pool", Accessibility::Public);
        pair.type_arguments = vec![TypeRef::named("K"), TypeRef::named("V")];
        let comps = vec![compilation(vec![ns(
            "Game",
            vec![
                NamespaceMember::Type(pair),
                NamespaceMember::Type(generic),
                public("Pool"),
            ],
        )])];
        let filter = NamespaceFilter::new(vec!["Game".into()], false);
        for threshold in [0, DEFAULT_PARALLEL_THRESHOLD] {
            let found = collect_types(&comps, &filter, threshold);
            assert_eq!(names(&found), vec!["Game.Pool"]);
            assert_eq!(found[0].arity(), 0);
        }
    }

    #[test]
    fn test_unnamed_symbol_skipped() {
        let comps = vec![compilation(vec![ns("Game", vec![public(""), public("Ok")])])];
        let filter = NamespaceFilter::new(vec!["Game".into()], false);
        let found = collect_types(&comps, &filter, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(names(&found), vec!["Game.Ok"]);
    }

    #[test]
    fn test_empty_prefixes_ignored() {
        let filter = NamespaceFilter::new(vec![" ".into(), "".into()], false);
        assert!(!filter.allows("Anything"));
        assert!(!filter.allows(""));
    }
}
