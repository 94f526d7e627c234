//! Specifier resolution
//!
//! Relative (`./`, `../`) and absolute (`/`) specifiers resolve against the
//! importing module's directory. Bare specifiers go through the optional
//! [`ImportMap`]. Anything else (`https://…`, unmapped bare names) is
//! external and never loaded.

use std::path::Path;

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::{ModuleId, ModuleIdError};

/// Bare-specifier mapping in the standard `{"imports": {...}}` shape.
///
/// Keys ending in `/` are prefix mappings; other keys match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportMap {
    #[serde(default)]
    pub imports: IndexMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an import map from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_import(mut self, specifier: impl Into<String>, target: impl Into<String>) -> Self {
        self.imports.insert(specifier.into(), target.into());
        self
    }

    /// Rewrite relative targets so they are anchored at `base`
    pub fn resolve_against(&self, base: &str) -> Self {
        let imports = self
            .imports
            .iter()
            .map(|(key, value)| {
                let target = if value.starts_with('.') {
                    let joined = Path::new(base).join(value).clean();
                    let mut joined = joined.to_string_lossy().replace('\\', "/");
                    if value.ends_with('/') && !joined.ends_with('/') {
                        joined.push('/');
                    }
                    joined
                } else {
                    value.clone()
                };
                (key.clone(), target)
            })
            .collect();
        Self { imports }
    }

    /// Look up a bare specifier: exact match first, then the longest `/` prefix.
    pub fn lookup(&self, specifier: &str) -> Option<String> {
        if let Some(target) = self.imports.get(specifier) {
            return Some(target.clone());
        }
        self.imports
            .iter()
            .filter(|(key, _)| key.ends_with('/') && specifier.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(key, target)| format!("{}{}", target, &specifier[key.len()..]))
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Outcome of resolving one specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A module inside the graph
    Local(ModuleId),
    /// Left as-is in the output and never loaded
    External(String),
}

impl Resolution {
    pub fn local(&self) -> Option<&ModuleId> {
        match self {
            Resolution::Local(id) => Some(id),
            Resolution::External(_) => None,
        }
    }
}

/// Returns `true` for URL specifiers that are never bundled
pub fn is_external_url(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

/// Resolve `specifier` as written in a module located in `importer_dir`.
pub fn resolve_specifier(
    specifier: &str,
    importer_dir: &str,
    import_map: &ImportMap,
) -> Result<Resolution, ModuleIdError> {
    if is_external_url(specifier) {
        return Ok(Resolution::External(specifier.to_string()));
    }
    if specifier.starts_with('/') {
        return ModuleId::new(specifier).map(Resolution::Local);
    }
    if specifier.starts_with('.') {
        return ModuleId::new(Path::new(importer_dir).join(specifier)).map(Resolution::Local);
    }
    match import_map.lookup(specifier) {
        Some(mapped) if mapped.starts_with('/') => ModuleId::new(mapped).map(Resolution::Local),
        Some(mapped) => Ok(Resolution::External(mapped)),
        None => Ok(Resolution::External(specifier.to_string())),
    }
}
