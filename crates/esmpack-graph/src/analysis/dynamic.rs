//! Discovery of `import("...")` and `new Worker("...")` call sites

use oxc_ast::ast::{
    Argument, Expression, ImportExpression, NewExpression, ObjectPropertyKind, Program, PropertyKey,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    Import,
    Worker { is_module: bool },
}

/// A string-literal dynamic dependency and the span of its literal argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSite {
    pub kind: DynamicKind,
    pub specifier: String,
    pub literal_span: Span,
}

/// Collect every dynamic import and worker construction with a string literal argument.
///
/// Computed specifiers (`import(name)`) cannot be followed statically and are skipped.
pub fn collect_dynamic_sites(program: &Program<'_>) -> Vec<DynamicSite> {
    let mut collector = SiteCollector { sites: Vec::new() };
    collector.visit_program(program);
    collector.sites
}

struct SiteCollector {
    sites: Vec<DynamicSite>,
}

impl<'a> Visit<'a> for SiteCollector {
    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &it.source {
            self.sites.push(DynamicSite {
                kind: DynamicKind::Import,
                specifier: lit.value.to_string(),
                literal_span: lit.span,
            });
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        let is_worker = matches!(&it.callee, Expression::Identifier(ident) if ident.name == "Worker");
        if is_worker {
            if let Some(Argument::StringLiteral(lit)) = it.arguments.first() {
                self.sites.push(DynamicSite {
                    kind: DynamicKind::Worker {
                        is_module: it.arguments.get(1).is_some_and(is_module_worker_options),
                    },
                    specifier: lit.value.to_string(),
                    literal_span: lit.span,
                });
            }
        }
        walk::walk_new_expression(self, it);
    }
}

/// `{ type: "module" }`
fn is_module_worker_options(arg: &Argument<'_>) -> bool {
    let Argument::ObjectExpression(options) = arg else {
        return false;
    };
    options.properties.iter().any(|prop| {
        let ObjectPropertyKind::ObjectProperty(prop) = prop else {
            return false;
        };
        let key_is_type = match &prop.key {
            PropertyKey::StaticIdentifier(ident) => ident.name == "type",
            PropertyKey::StringLiteral(lit) => lit.value == "type",
            _ => false,
        };
        key_is_type && matches!(&prop.value, Expression::StringLiteral(lit) if lit.value == "module")
    })
}
