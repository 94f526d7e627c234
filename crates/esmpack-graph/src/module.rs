//! Per-module records produced by the analyzer

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ModuleId;

/// What an import specifier binds to in the target module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum Imported {
    /// A single named export (`default` included)
    Name(String),
    /// The whole module namespace (`import * as ns`, `export *`)
    Namespace,
}

impl Imported {
    pub fn name(&self) -> Option<&str> {
        match self {
            Imported::Name(name) => Some(name),
            Imported::Namespace => None,
        }
    }
}

/// One binding pulled through an import edge.
///
/// For re-exports the roles invert: `local` is the name the re-exporting
/// module exposes and `imported` is the name read from the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifier {
    pub local: String,
    pub imported: Imported,
    /// Referenced as a free identifier somewhere outside import declarations
    pub used: bool,
}

/// Syntactic origin of an import edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// `import ... from "m"` or `import "m"`
    Import,
    /// `export { a as b } from "m"` or `export * as ns from "m"`
    ReExport,
    /// `export * from "m"`
    ReExportAll,
}

/// Static dependency of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEdge {
    pub target: ModuleId,
    /// Specifier as written in the source
    pub specifier: String,
    pub kind: EdgeKind,
    pub specifiers: Vec<Specifier>,
}

impl ImportEdge {
    pub fn is_namespace(&self) -> bool {
        self.specifiers
            .iter()
            .any(|s| s.imported == Imported::Namespace)
    }

    /// `true` when no specifier is used (vacuously true for bare `import "m"`)
    pub fn is_unused(&self) -> bool {
        self.specifiers.iter().all(|s| !s.used)
    }
}

/// A named binding the module exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBinding {
    /// Exported name, `default` for default exports
    pub name: String,
    /// Dropping the export has no observable effect
    pub pure: bool,
}

/// `import("m")` target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicImport {
    pub target: ModuleId,
    pub specifier: String,
}

/// `new Worker("m")` target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSource {
    pub target: ModuleId,
    pub specifier: String,
    /// Created with `{ type: "module" }`
    pub is_module: bool,
}

/// Everything known about one module.
///
/// Records are immutable once built. Changing a module (source update, tree
/// shaking) produces a new record that replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub source: Arc<str>,
    pub imports: Vec<ImportEdge>,
    pub exports: Vec<ExportBinding>,
    pub dynamic_imports: Vec<DynamicImport>,
    pub worker_sources: Vec<WorkerSource>,
    /// Top-level statements have no observable effect
    pub pure: bool,
}

impl ModuleRecord {
    /// Ids of every module this one depends on, statically or not
    pub fn dependencies(&self) -> impl Iterator<Item = &ModuleId> {
        self.imports
            .iter()
            .map(|edge| &edge.target)
            .chain(self.dynamic_imports.iter().map(|d| &d.target))
            .chain(self.worker_sources.iter().map(|w| &w.target))
    }

    /// Ids of static dependencies in declaration order
    pub fn static_dependencies(&self) -> impl Iterator<Item = &ModuleId> {
        self.imports.iter().map(|edge| &edge.target)
    }

    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|e| e.name.as_str())
    }
}
