//! Tree shaking
//!
//! Shaking works on the modules reachable from the entry and returns a new
//! [`ModuleGraph`]; the bundler's module cache is never modified, so the same
//! cache can be bundled again with different options.
//!
//! Two passes run in order:
//!
//! 1. Dead exports. Every importer contributes the names it imports from a
//!    target; namespace imports, `export *`, dynamic imports and workers
//!    require the whole export set. In every module except the entry, a pure
//!    export that nobody requires is removed.
//! 2. Dead imports. An import declaration whose bindings are all unused is
//!    removed, unless the target (or anything it imports) has side effects.
//!
//! Rewritten modules are re-analyzed, and the result keeps only the modules
//! still reachable from the entry.

use std::sync::Arc;

use esmpack_gen::{Allocator, CodeBuffer, GetSpan, ParseOptions, Span, parse, quote};
use esmpack_graph::analysis::{ScopeSummary, analyze_module, purity, summarize};
use esmpack_graph::{
    EdgeKind, ImportMap, Imported, ModuleGraph, ModuleId, ModuleRecord, Resolution,
    resolve_specifier,
};
use oxc_ast::ast::{
    Declaration, ExportAllDeclaration, ExportDefaultDeclaration, ExportDefaultDeclarationKind,
    ExportNamedDeclaration, Statement, StringLiteral,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{BundleError, Result};

/// Export names some importer asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Required {
    /// Every export (namespace import, `export *`, dynamic import, worker)
    All,
    Names(FxHashSet<String>),
}

impl Default for Required {
    fn default() -> Self {
        Required::Names(FxHashSet::default())
    }
}

impl Required {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Required::All => true,
            Required::Names(names) => names.contains(name),
        }
    }

    fn insert(&mut self, name: &str) {
        if let Required::Names(names) = self {
            names.insert(name.to_string());
        }
    }
}

/// Shake the part of `graph` reachable from `entry`
pub fn shake(graph: &ModuleGraph, entry: &ModuleId, import_map: &ImportMap) -> Result<ModuleGraph> {
    let reachable = graph.reachable(entry.as_str());
    if reachable.is_empty() {
        return Err(BundleError::missing_record(entry.as_str()));
    }
    let required = required_exports(graph, &reachable)?;
    let nothing = Required::default();

    let mut pruned = ModuleGraph::new();
    let mut removed_exports = 0;
    for id in &reachable {
        let record = graph
            .get(id.as_str())
            .ok_or_else(|| BundleError::missing_record(id.as_str()))?;
        let requirement = required.get(id).unwrap_or(&nothing);
        if id == entry || !has_dead_exports(record, requirement) {
            pruned.insert(Arc::clone(record));
            continue;
        }
        let (source, removed) = prune_exports(record, requirement, graph, import_map)?;
        removed_exports += removed;
        pruned.insert(analyze_module(id, Arc::from(source), import_map)?);
    }

    let mut optimized = ModuleGraph::new();
    let mut removed_imports = 0;
    for record in pruned.records() {
        if !has_dead_imports(record, &pruned) {
            optimized.insert(Arc::clone(record));
            continue;
        }
        let (source, removed) = prune_imports(record, &pruned, import_map)?;
        removed_imports += removed;
        optimized.insert(analyze_module(&record.id, Arc::from(source), import_map)?);
    }

    let survived: ModuleGraph = optimized
        .reachable(entry.as_str())
        .iter()
        .filter_map(|id| optimized.get(id.as_str()).cloned())
        .collect();

    tracing::debug!(
        entry = %entry,
        removed_exports,
        removed_imports,
        modules_before = reachable.len(),
        modules_after = survived.len(),
        "tree shaking complete"
    );
    Ok(survived)
}

/// Union of the export names each reachable module is asked for
pub fn required_exports(
    graph: &ModuleGraph,
    reachable: &[ModuleId],
) -> Result<FxHashMap<ModuleId, Required>> {
    let mut required: FxHashMap<ModuleId, Required> = FxHashMap::default();
    for id in reachable {
        let record = graph
            .get(id.as_str())
            .ok_or_else(|| BundleError::missing_record(id.as_str()))?;

        for edge in &record.imports {
            let names = required.entry(edge.target.clone()).or_default();
            for spec in &edge.specifiers {
                match &spec.imported {
                    Imported::Namespace => *names = Required::All,
                    Imported::Name(name) => names.insert(name),
                }
            }
        }

        let lazy = record
            .dynamic_imports
            .iter()
            .map(|d| &d.target)
            .chain(record.worker_sources.iter().map(|w| &w.target));
        for target in lazy {
            required.insert(target.clone(), Required::All);
        }
    }
    Ok(required)
}

fn has_dead_exports(record: &ModuleRecord, required: &Required) -> bool {
    record
        .exports
        .iter()
        .any(|export| export.pure && !required.contains(&export.name))
}

fn has_dead_imports(record: &ModuleRecord, graph: &ModuleGraph) -> bool {
    record.imports.iter().any(|edge| {
        edge.kind == EdgeKind::Import
            && edge.is_unused()
            && !graph.has_side_effects(edge.target.as_str())
    })
}

/// Returns the rewritten source and the number of removed exports
fn prune_exports(
    record: &ModuleRecord,
    required: &Required,
    graph: &ModuleGraph,
    import_map: &ImportMap,
) -> Result<(String, usize)> {
    let allocator = Allocator::default();
    let parsed = parse(&allocator, &record.source, ParseOptions::from_path(record.id.as_str()))?;
    let scope = summarize(&parsed.program);

    let mut pruner = ExportPruner {
        code: CodeBuffer::new(&record.source),
        record,
        required,
        graph,
        import_map,
        scope: &scope,
        removed: 0,
    };
    for stmt in &parsed.program.body {
        match stmt {
            Statement::ExportNamedDeclaration(export) if !export.export_kind.is_type() => {
                match &export.declaration {
                    Some(decl) => pruner.declaration(export, decl),
                    None => pruner.specifiers(export),
                }
            }
            Statement::ExportDefaultDeclaration(export) => pruner.default_export(export),
            Statement::ExportAllDeclaration(export) => pruner.namespace_re_export(export),
            _ => {}
        }
    }
    Ok((pruner.code.render()?, pruner.removed))
}

struct ExportPruner<'s> {
    code: CodeBuffer<'s>,
    record: &'s ModuleRecord,
    required: &'s Required,
    graph: &'s ModuleGraph,
    import_map: &'s ImportMap,
    scope: &'s ScopeSummary,
    removed: usize,
}

impl<'s> ExportPruner<'s> {
    /// `export const a = ...`, `export function f() {}`, `export class K {}`
    fn declaration(&mut self, export: &ExportNamedDeclaration<'_>, decl: &Declaration<'_>) {
        let names: Vec<String> = match decl {
            Declaration::VariableDeclaration(var) => var
                .declarations
                .iter()
                .flat_map(|d| d.id.get_binding_identifiers())
                .map(|ident| ident.name.to_string())
                .collect(),
            Declaration::FunctionDeclaration(_) | Declaration::ClassDeclaration(_) => {
                decl.id().map(|ident| ident.name.to_string()).into_iter().collect()
            }
            _ => return,
        };
        if names.iter().any(|name| self.required.contains(name)) || !purity::is_pure_declaration(decl) {
            return;
        }

        self.removed += names.len();
        if names.iter().any(|name| self.scope.is_referenced(name)) {
            // Still used locally: keep the binding, drop the export
            self.code.remove(Span::new(export.span.start, decl.span().start));
        } else {
            self.code.remove(export.span);
        }
    }

    /// `export { a, b as c }` and `export { a } from "./m.js"`
    fn specifiers(&mut self, export: &ExportNamedDeclaration<'_>) {
        let kept: Vec<_> = export
            .specifiers
            .iter()
            .filter(|spec| self.required.contains(&spec.exported.name()))
            .collect();
        if kept.len() == export.specifiers.len() {
            return;
        }
        self.removed += export.specifiers.len() - kept.len();

        if kept.is_empty() {
            self.drop_statement(export.span, export.source.as_ref());
            return;
        }

        let list = kept
            .iter()
            .map(|spec| self.code.slice(spec.span))
            .collect::<Vec<_>>()
            .join(", ");
        // Everything after the closing brace: `from "./m.js"`, attributes, `;`
        let last_end = export.specifiers.last().map_or(export.span.start, |spec| spec.span.end);
        let rest = self.code.slice(Span::new(last_end, export.span.end));
        let tail = rest.find('}').map_or("", |brace| &rest[brace + 1..]);
        self.code.overwrite(export.span, format!("export {{ {list} }}{tail}"));
    }

    fn default_export(&mut self, export: &ExportDefaultDeclaration<'_>) {
        if self.required.contains("default") || !purity::is_pure_export_default(&export.declaration) {
            return;
        }
        self.removed += 1;

        let named = match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                func.id.as_ref().map(|id| (id.name.as_str(), func.span))
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                class.id.as_ref().map(|id| (id.name.as_str(), class.span))
            }
            _ => None,
        };
        match named {
            Some((name, span)) if self.scope.is_referenced(name) => {
                self.code.remove(Span::new(export.span.start, span.start));
            }
            _ => self.code.remove(export.span),
        }
    }

    /// `export * as ns from "./m.js"`; plain `export *` is always kept
    fn namespace_re_export(&mut self, export: &ExportAllDeclaration<'_>) {
        let Some(exported) = &export.exported else {
            return;
        };
        if self.required.contains(&exported.name()) {
            return;
        }
        self.removed += 1;
        self.drop_statement(export.span, Some(&export.source));
    }

    /// Remove a re-export statement, keeping a bare import when its target has effects
    fn drop_statement(&mut self, span: Span, source: Option<&StringLiteral<'_>>) {
        let Some(source) = source else {
            self.code.remove(span);
            return;
        };
        let has_effects = match resolve_specifier(&source.value, self.record.id.dir(), self.import_map) {
            Ok(Resolution::Local(target)) => self.graph.has_side_effects(target.as_str()),
            _ => true,
        };
        if has_effects {
            self.code.overwrite(span, format!("import {};", quote(&source.value)));
        } else {
            self.code.remove(span);
        }
    }
}

/// Returns the rewritten source and the number of removed import declarations
fn prune_imports(
    record: &ModuleRecord,
    graph: &ModuleGraph,
    import_map: &ImportMap,
) -> Result<(String, usize)> {
    let allocator = Allocator::default();
    let parsed = parse(&allocator, &record.source, ParseOptions::from_path(record.id.as_str()))?;
    let scope = summarize(&parsed.program);
    let mut code = CodeBuffer::new(&record.source);
    let mut removed = 0;

    for stmt in &parsed.program.body {
        let Statement::ImportDeclaration(import) = stmt else {
            continue;
        };
        if import.import_kind.is_type() {
            continue;
        }
        let Ok(Resolution::Local(target)) =
            resolve_specifier(&import.source.value, record.id.dir(), import_map)
        else {
            continue;
        };
        let unused = import
            .specifiers
            .iter()
            .flatten()
            .all(|spec| !scope.is_free(&spec.local().name));
        if unused && !graph.has_side_effects(target.as_str()) {
            tracing::trace!(module = %record.id, target = %target, "removing unused import");
            code.remove(import.span);
            removed += 1;
        }
    }
    Ok((code.render()?, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmpack_graph::ModuleLoader;
    use esmpack_graph::runtime::MemoryRuntime;

    async fn load(files: &[(&str, &str)], entry: &str) -> (ModuleGraph, ModuleId) {
        let runtime = MemoryRuntime::from_files(files.iter().copied());
        let map = ImportMap::default();
        let entry = ModuleId::new(entry).unwrap();
        let mut graph = ModuleGraph::new();
        ModuleLoader::new(&runtime, &map)
            .load(&entry, &mut graph)
            .await
            .unwrap();
        (graph, entry)
    }

    async fn shaken(files: &[(&str, &str)], entry: &str) -> ModuleGraph {
        let (graph, entry) = load(files, entry).await;
        shake(&graph, &entry, &ImportMap::default()).unwrap()
    }

    #[tokio::test]
    async fn removes_unrequired_pure_exports() {
        let graph = shaken(
            &[
                ("/index.js", "import {c} from './c.js'; console.log(c);"),
                ("/c.js", "export const c = 1; export const deadcode = 2;"),
            ],
            "/index.js",
        )
        .await;
        let c = graph.get("/c.js").unwrap();
        assert!(!c.source.contains("deadcode"));
        assert_eq!(c.export_names().collect::<Vec<_>>(), ["c"]);
    }

    #[tokio::test]
    async fn keeps_impure_exports() {
        let graph = shaken(
            &[
                ("/index.js", "import {c} from './c.js'; console.log(c);"),
                ("/c.js", "export const c = 1; export const effect = init();"),
            ],
            "/index.js",
        )
        .await;
        assert!(graph.get("/c.js").unwrap().source.contains("effect = init()"));
    }

    #[tokio::test]
    async fn locally_used_export_keeps_its_binding() {
        let graph = shaken(
            &[
                ("/index.js", "import {b} from './m.js'; console.log(b);"),
                ("/m.js", "export const a = 1;\nexport const b = a + 1;"),
            ],
            "/index.js",
        )
        .await;
        let m = graph.get("/m.js").unwrap();
        assert!(m.source.contains("const a = 1;"));
        assert!(!m.source.contains("export const a"));
    }

    #[tokio::test]
    async fn drops_unused_pure_imports_and_their_modules() {
        let graph = shaken(
            &[
                ("/index.js", "import a from './a.js';\nimport b from './b.js';\nconsole.log(a);"),
                ("/a.js", "console.log(1)"),
                ("/b.js", "export default 1;"),
            ],
            "/index.js",
        )
        .await;
        assert!(graph.contains("/a.js"));
        assert!(!graph.contains("/b.js"));
        assert!(!graph.get("/index.js").unwrap().source.contains("./b.js"));
    }

    #[tokio::test]
    async fn keeps_unused_imports_with_side_effects() {
        let graph = shaken(
            &[
                ("/index.js", "import './polyfill.js';\nimport x from './x.js';"),
                ("/polyfill.js", "globalThis.ready = true;"),
                ("/x.js", "import './polyfill.js'; export default 1;"),
            ],
            "/index.js",
        )
        .await;
        assert!(graph.contains("/polyfill.js"));
        // x.js is pure itself but imports an impure module
        assert!(graph.contains("/x.js"));
    }

    #[tokio::test]
    async fn prunes_export_specifier_lists() {
        let graph = shaken(
            &[
                ("/index.js", "import {b} from './m.js'; console.log(b);"),
                ("/m.js", "const a = 1, b = 2, c = 3;\nexport { a, b as b, c };"),
            ],
            "/index.js",
        )
        .await;
        let m = graph.get("/m.js").unwrap();
        assert!(m.source.contains("export { b as b };"));
        assert_eq!(m.export_names().collect::<Vec<_>>(), ["b"]);
    }

    #[tokio::test]
    async fn namespace_import_requires_everything() {
        let graph = shaken(
            &[
                ("/index.js", "import * as m from './m.js'; console.log(m);"),
                ("/m.js", "export const a = 1; export const b = 2;"),
            ],
            "/index.js",
        )
        .await;
        assert_eq!(graph.get("/m.js").unwrap().export_names().count(), 2);
    }

    #[tokio::test]
    async fn dynamic_targets_keep_their_exports() {
        let graph = shaken(
            &[
                ("/index.js", "const p = import('./lazy.js');"),
                ("/lazy.js", "export const a = 1; export default 2;"),
            ],
            "/index.js",
        )
        .await;
        assert_eq!(graph.get("/lazy.js").unwrap().export_names().count(), 2);
    }

    #[tokio::test]
    async fn entry_exports_are_untouched() {
        let graph = shaken(&[("/index.js", "export const unused = 1;")], "/index.js").await;
        assert!(graph.get("/index.js").unwrap().source.contains("export const unused"));
    }

    #[tokio::test]
    async fn input_graph_is_not_modified() {
        let (graph, entry) = load(
            &[
                ("/index.js", "import {c} from './c.js'; console.log(c);"),
                ("/c.js", "export const c = 1; export const deadcode = 2;"),
            ],
            "/index.js",
        )
        .await;
        shake(&graph, &entry, &ImportMap::default()).unwrap();
        assert!(graph.get("/c.js").unwrap().source.contains("deadcode"));
    }
}
