//! Module rewriting into the runtime registry protocol
//!
//! Import declarations become hoisted reads from the runtime import function
//! and export declarations become writes to the module's exports object.
//! Rewrites are span edits over the module's retained source, so the
//! record itself is never changed and can be rendered again as an entry or
//! as a registry module.

use esmpack_gen::{
    Allocator, CodeBuffer, GetSpan, ParseOptions, Span, parse, property_access, property_key, quote,
};
use esmpack_graph::analysis::collect_dynamic_sites;
use esmpack_graph::{ImportMap, ModuleRecord, Resolution, resolve_specifier};
use indexmap::IndexMap;
use oxc_ast::ast::{
    Declaration, ExportAllDeclaration, ExportDefaultDeclaration, ExportDefaultDeclarationKind,
    ExportNamedDeclaration, ImportDeclaration, ImportDeclarationSpecifier, Program, Statement,
    StringLiteral,
};
use rustc_hash::FxBuildHasher;

use crate::chunk::ChunkUrls;
use crate::error::{BundleError, Result};

/// Runtime import function
pub const IMPORT_FN: &str = "_$_import";
/// Exports object passed to each registry module
pub const EXPORTS_OBJ: &str = "_$_exports";
/// Cache of evaluated module exports, keyed by id
pub const EXPORTED_CACHE: &str = "_$_exported";
/// Registry table of module factories
pub const MODULES_TABLE: &str = "_$_modules";
/// Prefix of the namespace aliases bound to external URLs
pub const EXTERNAL_PREFIX: &str = "_$_ext";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Registry module: exports always rewritten
    Module,
    /// Root of an output unit
    Entry { preserve_export: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    pub mode: Mode,
    /// Keep imports of external URLs as native `import` declarations
    pub preserve_external_import: bool,
    /// Rewrite `import()` and `new Worker()` literals to chunk URLs
    pub chunk_urls: Option<&'a ChunkUrls>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformed {
    pub code: String,
}

/// Native external imports of one output unit.
///
/// Registry modules are function bodies, so they cannot hold `import`
/// declarations. Each external URL is imported once at the top of the unit as
/// `import * as _$_ext<n>`, and modules read their bindings from that alias.
/// Local names never reach the top level, so two modules binding `h` from
/// different URLs do not collide.
#[derive(Debug, Clone, Default)]
pub struct ExternalImports {
    aliases: IndexMap<String, String, FxBuildHasher>,
}

impl ExternalImports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `url`, assigned on first use
    pub fn alias(&mut self, url: &str) -> &str {
        let next = self.aliases.len();
        self.aliases
            .entry(url.to_string())
            .or_insert_with(|| format!("{EXTERNAL_PREFIX}{next}"))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// One namespace import per URL, in first-use order
    pub fn declarations(&self) -> impl Iterator<Item = String> + '_ {
        self.aliases
            .iter()
            .map(|(url, alias)| format!("import * as {alias} from {};", quote(url)))
    }
}

/// Rewrite one module for inclusion in an output unit.
///
/// External URLs lifted out of registry modules are recorded in `externals`;
/// the caller renders their declarations once per unit.
pub fn transform(
    record: &ModuleRecord,
    import_map: &ImportMap,
    options: &TransformOptions<'_>,
    externals: &mut ExternalImports,
) -> Result<Transformed> {
    let allocator = Allocator::default();
    let parsed = parse(&allocator, &record.source, ParseOptions::from_path(record.id.as_str()))?;
    let program = &parsed.program;

    let mut transformer = Transformer {
        record,
        import_map,
        options,
        externals,
        code: CodeBuffer::new(&record.source),
        exported_functions: Vec::new(),
        hoisted: Vec::new(),
    };

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(import) => transformer.import_declaration(import)?,
            Statement::ExportNamedDeclaration(export) => transformer.export_named(export)?,
            Statement::ExportDefaultDeclaration(export) => transformer.export_default(export),
            Statement::ExportAllDeclaration(export) => transformer.export_all(export)?,
            _ => {}
        }
    }
    if let Some(urls) = options.chunk_urls {
        transformer.rewrite_dynamic_sites(program, urls);
    }
    transformer.finish(program)
}

struct Transformer<'s> {
    record: &'s ModuleRecord,
    import_map: &'s ImportMap,
    options: &'s TransformOptions<'s>,
    externals: &'s mut ExternalImports,
    code: CodeBuffer<'s>,
    /// Export assignments of hoisted function declarations. They run before
    /// any import so a cycle back into this module already sees them.
    exported_functions: Vec<String>,
    /// Import reads placed at the top of the module body, in order
    hoisted: Vec<String>,
}

impl<'s> Transformer<'s> {
    fn preserves_export(&self) -> bool {
        matches!(self.options.mode, Mode::Entry { preserve_export: true })
    }

    /// Registry id for a specifier, or the specifier itself when external
    fn target(&self, source: &StringLiteral<'_>) -> Result<Target> {
        match resolve_specifier(&source.value, self.record.id.dir(), self.import_map) {
            Ok(Resolution::Local(id)) => Ok(Target::Local(id.to_string())),
            Ok(Resolution::External(url)) => Ok(Target::External(url)),
            Err(_) => Err(BundleError::ModuleNotFound {
                importer: self.record.id.to_string(),
                specifier: source.value.to_string(),
            }),
        }
    }

    fn unsupported(&self, span: Span) -> BundleError {
        BundleError::UnsupportedSyntax {
            module: self.record.id.to_string(),
            statement: self.code.slice(span).trim().to_string(),
        }
    }

    fn import_declaration(&mut self, import: &ImportDeclaration<'_>) -> Result<()> {
        if import.import_kind.is_type() {
            self.code.remove(import.span);
            return Ok(());
        }

        let (object, lifted) = match self.target(&import.source)? {
            Target::Local(id) => (import_call(&id), false),
            Target::External(url) if self.options.preserve_external_import => match self.options.mode {
                Mode::Module => (self.externals.alias(&url).to_string(), true),
                // Top-level entry code keeps the declaration as written
                Mode::Entry { .. } => return Ok(()),
            },
            Target::External(url) => (import_call(&url), false),
        };

        let mut bindings = Vec::new();
        let mut namespace = None;
        for spec in import.specifiers.iter().flatten() {
            match spec {
                ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                    if spec.import_kind.is_type() {
                        continue;
                    }
                    bindings.push(format!("{}: {}", property_key(&spec.imported.name()), spec.local.name));
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                    bindings.push(format!("default: {}", spec.local.name));
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
                    namespace = Some(spec.local.name.to_string());
                }
            }
        }

        if let Some(local) = &namespace {
            self.hoisted.push(format!("const {local} = {object};"));
        }
        if !bindings.is_empty() {
            self.hoisted.push(format!("const {{ {} }} = {object};", bindings.join(", ")));
        } else if namespace.is_none() && !lifted {
            self.hoisted.push(format!("{object};"));
        }
        self.code.remove(import.span);
        Ok(())
    }

    /// Edits that only exist to drop native export syntax
    fn remove_unless_preserved(&mut self, span: Span) {
        if !self.preserves_export() {
            self.code.remove(span);
        }
    }

    fn export_named(&mut self, export: &ExportNamedDeclaration<'_>) -> Result<()> {
        if export.export_kind.is_type() {
            self.code.remove(export.span);
            return Ok(());
        }
        if self.preserves_export() && export.source.is_some() {
            return Err(self.unsupported(export.span));
        }

        if let Some(decl) = &export.declaration {
            self.export_declaration(export, decl);
            return Ok(());
        }

        let object = match &export.source {
            Some(source) => match self.target(source)? {
                Target::Local(id) | Target::External(id) => Some(import_call(&id)),
            },
            None => None,
        };
        let assignments: Vec<String> = export
            .specifiers
            .iter()
            .filter(|spec| !spec.export_kind.is_type())
            .map(|spec| {
                let local = spec.local.name();
                let value = match &object {
                    Some(object) => property_access(object, &local),
                    None => local.to_string(),
                };
                export_assignment(&spec.exported.name(), &value)
            })
            .collect();
        if !self.preserves_export() {
            self.code.overwrite(export.span, assignments.join(" "));
        } else if !assignments.is_empty() {
            self.code.insert(export.span.end, format!("\n{}", assignments.join(" ")));
        }
        Ok(())
    }

    /// `export const a = 1` keeps the binding and assigns it afterwards;
    /// exported functions are hoisted, so their assignment is too.
    fn export_declaration(&mut self, export: &ExportNamedDeclaration<'_>, decl: &Declaration<'_>) {
        let prefix = Span::new(export.span.start, decl.span().start);
        match decl {
            Declaration::VariableDeclaration(var) => {
                let assignments: Vec<String> = var
                    .declarations
                    .iter()
                    .flat_map(|d| d.id.get_binding_identifiers())
                    .map(|ident| export_assignment(&ident.name, &ident.name))
                    .collect();
                self.remove_unless_preserved(prefix);
                self.code.insert(export.span.end, format!("\n{}", assignments.join(" ")));
            }
            Declaration::FunctionDeclaration(func) => {
                self.remove_unless_preserved(prefix);
                if let Some(id) = &func.id {
                    self.exported_functions.push(export_assignment(&id.name, &id.name));
                }
            }
            Declaration::ClassDeclaration(class) => {
                self.remove_unless_preserved(prefix);
                if let Some(id) = &class.id {
                    self.code
                        .insert(export.span.end, format!("\n{}", export_assignment(&id.name, &id.name)));
                }
            }
            other if other.is_type() => self.remove_unless_preserved(export.span),
            _ => self.remove_unless_preserved(prefix),
        }
    }

    fn export_default(&mut self, export: &ExportDefaultDeclaration<'_>) {
        match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) if func.id.is_some() => {
                self.remove_unless_preserved(Span::new(export.span.start, func.span.start));
                if let Some(id) = &func.id {
                    self.exported_functions.push(export_assignment("default", &id.name));
                }
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) if class.id.is_some() => {
                self.remove_unless_preserved(Span::new(export.span.start, class.span.start));
                if let Some(id) = &class.id {
                    self.code
                        .insert(export.span.end, format!("\n{}", export_assignment("default", &id.name)));
                }
            }
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => self.remove_unless_preserved(export.span),
            value => {
                let assign = format!("{} = ", property_access(EXPORTS_OBJ, "default"));
                if self.preserves_export() {
                    // `export default _$_exports.default = value;`
                    self.code.insert(value.span().start, assign);
                } else {
                    self.code
                        .overwrite(Span::new(export.span.start, value.span().start), assign);
                }
                if !self.code.slice(export.span).trim_end().ends_with(';') {
                    self.code.insert(export.span.end, ";");
                }
            }
        }
    }

    fn export_all(&mut self, export: &ExportAllDeclaration<'_>) -> Result<()> {
        if export.export_kind.is_type() {
            self.code.remove(export.span);
            return Ok(());
        }
        if self.preserves_export() {
            return Err(self.unsupported(export.span));
        }

        let call = match self.target(&export.source)? {
            Target::Local(id) | Target::External(id) => import_call(&id),
        };
        let text = match &export.exported {
            Some(name) => export_assignment(&name.name(), &call),
            None => format!(
                "for (const [_$_k, _$_v] of Object.entries({call})) if (_$_k !== \"default\") {EXPORTS_OBJ}[_$_k] = _$_v;"
            ),
        };
        self.code.overwrite(export.span, text);
        Ok(())
    }

    fn rewrite_dynamic_sites(&mut self, program: &Program<'_>, urls: &ChunkUrls) {
        for site in collect_dynamic_sites(program) {
            let Ok(Resolution::Local(target)) =
                resolve_specifier(&site.specifier, self.record.id.dir(), self.import_map)
            else {
                continue;
            };
            if let Some(url) = urls.get(&target) {
                self.code.overwrite(site.literal_span, quote(url));
            }
        }
    }

    fn finish(mut self, program: &Program<'_>) -> Result<Transformed> {
        // A hashbang is only valid at the very start of a file
        if let Some(hashbang) = &program.hashbang {
            self.code.remove(hashbang.span);
        }

        let mut head = Vec::with_capacity(self.exported_functions.len() + self.hoisted.len() + 1);
        if matches!(self.options.mode, Mode::Entry { .. }) {
            // The entry registers itself so imports cycling back into it resolve
            head.push(format!(
                "const {EXPORTS_OBJ} = {EXPORTED_CACHE}[{}] = {{}};",
                quote(self.record.id.as_str())
            ));
        }
        head.append(&mut self.exported_functions);
        head.append(&mut self.hoisted);

        if !head.is_empty() {
            // After directives so `"use strict"` stays a directive
            let at = program
                .directives
                .last()
                .map(|d| d.span.end)
                .or_else(|| program.hashbang.as_ref().map(|h| h.span.end))
                .unwrap_or(0);
            let text = head.join("\n");
            let text = if at == 0 { format!("{text}\n") } else { format!("\n{text}") };
            self.code.insert(at, text);
        }

        Ok(Transformed {
            code: self.code.render()?,
        })
    }
}

enum Target {
    Local(String),
    External(String),
}

fn import_call(id: &str) -> String {
    format!("{IMPORT_FN}({})", quote(id))
}

fn export_assignment(exported: &str, value: &str) -> String {
    format!("{} = {value};", property_access(EXPORTS_OBJ, exported))
}
