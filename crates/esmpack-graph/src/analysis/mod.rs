//! Scope & usage analysis
//!
//! [`analyze`] turns one parsed module into the metadata the rest of the
//! pipeline works from: resolved import edges with per-specifier usage,
//! export bindings with purity, dynamic-import and worker targets, and
//! module-level purity.

mod dynamic;
pub mod purity;
mod scope;

pub use dynamic::{DynamicKind, DynamicSite, collect_dynamic_sites};
pub use scope::{ScopeSummary, summarize};

use std::sync::Arc;

use esmpack_gen::{Allocator, ParseOptions, parse};
use oxc_ast::ast::{
    Declaration, ExportAllDeclaration, ExportNamedDeclaration, ImportDeclaration,
    ImportDeclarationSpecifier, Program, Statement,
};

use crate::error::{GraphError, Result};
use crate::module::{
    DynamicImport, EdgeKind, ExportBinding, ImportEdge, Imported, ModuleRecord, Specifier,
    WorkerSource,
};
use crate::resolve::{ImportMap, Resolution, resolve_specifier};
use crate::ModuleId;

/// Metadata extracted from one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAnalysis {
    pub imports: Vec<ImportEdge>,
    pub exports: Vec<ExportBinding>,
    pub dynamic_imports: Vec<DynamicImport>,
    pub worker_sources: Vec<WorkerSource>,
    pub pure: bool,
}

/// Parse `source` and build a fresh [`ModuleRecord`] for `id`
pub fn analyze_module(id: &ModuleId, source: Arc<str>, import_map: &ImportMap) -> Result<ModuleRecord> {
    let allocator = Allocator::default();
    let parsed = parse(&allocator, &source, ParseOptions::from_path(id.as_str()))?;
    let analysis = analyze(&parsed.program, id, import_map)?;
    Ok(ModuleRecord {
        id: id.clone(),
        source: Arc::clone(&source),
        imports: analysis.imports,
        exports: analysis.exports,
        dynamic_imports: analysis.dynamic_imports,
        worker_sources: analysis.worker_sources,
        pure: analysis.pure,
    })
}

/// Analyze a parsed module located at `id`
pub fn analyze(program: &Program<'_>, id: &ModuleId, import_map: &ImportMap) -> Result<ModuleAnalysis> {
    let scope = summarize(program);
    let mut analyzer = Analyzer {
        id,
        import_map,
        scope: &scope,
        out: ModuleAnalysis {
            pure: purity::is_pure_module(program),
            ..ModuleAnalysis::default()
        },
    };

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => analyzer.import_declaration(decl)?,
            Statement::ExportNamedDeclaration(decl) => analyzer.export_named(decl)?,
            Statement::ExportDefaultDeclaration(decl) => analyzer.out.exports.push(ExportBinding {
                name: "default".to_string(),
                pure: purity::is_pure_export_default(&decl.declaration),
            }),
            Statement::ExportAllDeclaration(decl) => analyzer.export_all(decl)?,
            _ => {}
        }
    }

    for site in collect_dynamic_sites(program) {
        let Some(target) = analyzer.resolve(&site.specifier)? else {
            continue;
        };
        match site.kind {
            DynamicKind::Import => {
                if !analyzer.out.dynamic_imports.iter().any(|d| d.target == target) {
                    analyzer.out.dynamic_imports.push(DynamicImport {
                        target,
                        specifier: site.specifier,
                    });
                }
            }
            DynamicKind::Worker { is_module } => {
                if !analyzer.out.worker_sources.iter().any(|w| w.target == target) {
                    analyzer.out.worker_sources.push(WorkerSource {
                        target,
                        specifier: site.specifier,
                        is_module,
                    });
                }
            }
        }
    }

    Ok(analyzer.out)
}

struct Analyzer<'s> {
    id: &'s ModuleId,
    import_map: &'s ImportMap,
    scope: &'s ScopeSummary,
    out: ModuleAnalysis,
}

impl Analyzer<'_> {
    /// `None` for external specifiers
    fn resolve(&self, specifier: &str) -> Result<Option<ModuleId>> {
        match resolve_specifier(specifier, self.id.dir(), self.import_map) {
            Ok(Resolution::Local(id)) => Ok(Some(id)),
            Ok(Resolution::External(_)) => Ok(None),
            Err(_) => Err(GraphError::module_not_found(self.id.as_str(), specifier)),
        }
    }

    fn import_declaration(&mut self, decl: &ImportDeclaration<'_>) -> Result<()> {
        if decl.import_kind.is_type() {
            return Ok(());
        }
        let Some(target) = self.resolve(&decl.source.value)? else {
            return Ok(());
        };

        let specifiers = decl
            .specifiers
            .iter()
            .flatten()
            .map(|spec| {
                let local = spec.local().name.to_string();
                let imported = match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => Imported::Name(s.imported.name().to_string()),
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => Imported::Name("default".to_string()),
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => Imported::Namespace,
                };
                let used = self.scope.is_free(&local);
                Specifier { local, imported, used }
            })
            .collect();

        self.out.imports.push(ImportEdge {
            target,
            specifier: decl.source.value.to_string(),
            kind: EdgeKind::Import,
            specifiers,
        });
        Ok(())
    }

    fn export_named(&mut self, decl: &ExportNamedDeclaration<'_>) -> Result<()> {
        if decl.export_kind.is_type() {
            return Ok(());
        }

        if let Some(declaration) = &decl.declaration {
            match declaration {
                Declaration::VariableDeclaration(var) => {
                    for declarator in &var.declarations {
                        let pure = declarator.init.as_ref().is_none_or(purity::is_pure_expression);
                        for ident in declarator.id.get_binding_identifiers() {
                            self.out.exports.push(ExportBinding {
                                name: ident.name.to_string(),
                                pure,
                            });
                        }
                    }
                }
                Declaration::FunctionDeclaration(_) | Declaration::ClassDeclaration(_) => {
                    if let Some(ident) = declaration.id() {
                        self.out.exports.push(ExportBinding {
                            name: ident.name.to_string(),
                            pure: true,
                        });
                    }
                }
                _ => {}
            }
        }

        for spec in &decl.specifiers {
            self.out.exports.push(ExportBinding {
                name: spec.exported.name().to_string(),
                pure: true,
            });
        }

        if let Some(source) = &decl.source {
            if let Some(target) = self.resolve(&source.value)? {
                let specifiers = decl
                    .specifiers
                    .iter()
                    .map(|spec| Specifier {
                        local: spec.exported.name().to_string(),
                        imported: Imported::Name(spec.local.name().to_string()),
                        used: true,
                    })
                    .collect();
                self.out.imports.push(ImportEdge {
                    target,
                    specifier: source.value.to_string(),
                    kind: EdgeKind::ReExport,
                    specifiers,
                });
            }
        }
        Ok(())
    }

    fn export_all(&mut self, decl: &ExportAllDeclaration<'_>) -> Result<()> {
        let (kind, local) = match &decl.exported {
            Some(name) => {
                let name = name.name().to_string();
                self.out.exports.push(ExportBinding {
                    name: name.clone(),
                    pure: true,
                });
                (EdgeKind::ReExport, name)
            }
            None => (EdgeKind::ReExportAll, "*".to_string()),
        };

        if let Some(target) = self.resolve(&decl.source.value)? {
            self.out.imports.push(ImportEdge {
                target,
                specifier: decl.source.value.to_string(),
                kind,
                specifiers: vec![Specifier {
                    local,
                    imported: Imported::Namespace,
                    used: true,
                }],
            });
        }
        Ok(())
    }
}
