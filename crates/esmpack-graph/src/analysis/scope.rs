//! Free-identifier and top-level reference analysis

use oxc_ast::ast::{IdentifierReference, Program};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::{SemanticBuilder, SymbolFlags};
use rustc_hash::FxHashSet;

/// Scope facts about one module.
#[derive(Debug, Clone, Default)]
pub struct ScopeSummary {
    /// Identifiers that would be global if import declarations were removed,
    /// in order of first reference. Property names and non-shorthand object
    /// keys are not references, so `a.foo` and `{foo: 1}` never contribute
    /// `foo`.
    pub free: Vec<String>,
    /// Top-level bindings with at least one reference anywhere in the module
    pub referenced: FxHashSet<String>,
}

impl ScopeSummary {
    pub fn is_free(&self, name: &str) -> bool {
        self.free.iter().any(|free| free == name)
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        self.referenced.contains(name)
    }
}

/// Compute the [`ScopeSummary`] of a parsed module
pub fn summarize(program: &Program<'_>) -> ScopeSummary {
    let semantic = SemanticBuilder::new().build(program).semantic;
    let scoping = semantic.scoping();

    let mut free: FxHashSet<String> = scoping
        .root_unresolved_references()
        .keys()
        .map(|name| name.to_string())
        .collect();
    let mut referenced = FxHashSet::default();

    for symbol_id in scoping.iter_bindings_in(scoping.root_scope_id()) {
        if scoping.get_resolved_reference_ids(symbol_id).is_empty() {
            continue;
        }
        let name = scoping.symbol_name(symbol_id).to_string();
        if scoping.symbol_flags(symbol_id).contains(SymbolFlags::Import) {
            free.insert(name.clone());
        }
        referenced.insert(name);
    }

    let mut order = ReferenceOrder {
        wanted: &free,
        seen: FxHashSet::default(),
        ordered: Vec::with_capacity(free.len()),
    };
    order.visit_program(program);

    ScopeSummary {
        free: order.ordered,
        referenced,
    }
}

/// Orders free names by their first reference in source order
struct ReferenceOrder<'s> {
    wanted: &'s FxHashSet<String>,
    seen: FxHashSet<String>,
    ordered: Vec<String>,
}

impl<'a> Visit<'a> for ReferenceOrder<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        let name = it.name.as_str();
        if self.wanted.contains(name) && !self.seen.contains(name) {
            self.seen.insert(name.to_string());
            self.ordered.push(name.to_string());
        }
        walk::walk_identifier_reference(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmpack_gen::{Allocator, ParseOptions, parse};

    fn summary(source: &str) -> ScopeSummary {
        let allocator = Allocator::default();
        let parsed = parse(&allocator, source, ParseOptions::from_path("/x.js")).unwrap();
        summarize(&parsed.program)
    }

    #[test]
    fn assignment_target_is_free() {
        assert_eq!(summary("a = 1;").free, ["a"]);
    }

    #[test]
    fn free_names_in_first_reference_order() {
        assert_eq!(summary("x = (a) => {b};").free, ["x", "b"]);
    }

    #[test]
    fn used_imports_count_as_free() {
        let s = summary("import foo, {a, b as c} from './foo.js';\nconsole.log(foo, c);");
        assert_eq!(s.free, ["console", "foo", "c"]);
        assert!(!s.is_free("a"));
    }

    #[test]
    fn property_names_and_keys_are_not_references() {
        let s = summary("import foo from './foo.js';\nconst a = {foo: 1};\nconsole.log(a.foo);");
        assert!(!s.is_free("foo"));
        assert!(s.is_referenced("a"));
    }

    #[test]
    fn shorthand_property_is_a_reference() {
        let s = summary("import foo from './foo.js';\nexport const a = {foo};");
        assert!(s.is_free("foo"));
    }

    #[test]
    fn export_specifier_references_binding() {
        let s = summary("const a = 1; const b = 2; export { a };");
        assert!(s.is_referenced("a"));
        assert!(!s.is_referenced("b"));
    }
}
