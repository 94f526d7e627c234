//! Bundle configuration types.
//!
//! Both option structs deserialize from camelCase JSON (the shape callers of
//! `bundle(entry, { optimize, exposeToGlobal, ... })` already use) and offer
//! builder-style setters for Rust callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BundleError, Result};

fn default_true() -> bool {
    true
}

fn default_public_path() -> String {
    "/".to_string()
}

/// Options for a single-file bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleOptions {
    /// Run tree shaking before rendering
    #[serde(default = "default_true")]
    pub optimize: bool,

    /// Expose the runtime import function as `globalThis.<name>.import`
    #[serde(default)]
    pub expose_to_global: Option<String>,

    /// Keep `import ... from "https://..."` declarations verbatim
    #[serde(default = "default_true")]
    pub preserve_external_import: bool,

    /// Keep native `export` syntax in the entry module
    #[serde(default = "default_true")]
    pub preserve_export: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            expose_to_global: None,
            preserve_external_import: true,
            preserve_export: true,
        }
    }
}

impl BundleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from serde_json::Value
    ///
    /// # Example
    ///
    /// ```
    /// use esmpack_bundler::BundleOptions;
    /// use serde_json::json;
    ///
    /// let options = BundleOptions::from_value(json!({
    ///     "optimize": false,
    ///     "exposeToGlobal": "app"
    /// }))
    /// .unwrap();
    /// assert!(!options.optimize);
    /// assert_eq!(options.expose_to_global.as_deref(), Some("app"));
    /// assert!(options.preserve_external_import);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| BundleError::InvalidOptions(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BundleError::InvalidOptions(e.to_string()))
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_expose_to_global(mut self, name: impl Into<String>) -> Self {
        self.expose_to_global = Some(name.into());
        self
    }

    pub fn with_preserve_external_import(mut self, preserve: bool) -> Self {
        self.preserve_external_import = preserve;
        self
    }

    pub fn with_preserve_export(mut self, preserve: bool) -> Self {
        self.preserve_export = preserve;
        self
    }
}

/// Options for split output (`bundle_chunks`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkOptions {
    /// Run tree shaking before splitting
    #[serde(default = "default_true")]
    pub optimize: bool,

    /// Expose the runtime import function as `globalThis.<name>.import`
    #[serde(default)]
    pub expose_to_global: Option<String>,

    /// Prefix for rewritten `import()` / `new Worker()` chunk URLs
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Keep native `export` syntax in the entry unit
    #[serde(default = "default_true")]
    pub preserve_export: bool,

    /// Keep `import ... from "https://..."` declarations verbatim
    #[serde(default = "default_true")]
    pub preserve_external_import: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            expose_to_global: None,
            public_path: default_public_path(),
            preserve_export: true,
            preserve_external_import: true,
        }
    }
}

impl ChunkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| BundleError::InvalidOptions(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BundleError::InvalidOptions(e.to_string()))
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_expose_to_global(mut self, name: impl Into<String>) -> Self {
        self.expose_to_global = Some(name.into());
        self
    }

    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = public_path.into();
        self
    }

    pub fn with_preserve_export(mut self, preserve: bool) -> Self {
        self.preserve_export = preserve;
        self
    }

    pub fn with_preserve_external_import(mut self, preserve: bool) -> Self {
        self.preserve_external_import = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_defaults() {
        let options = BundleOptions::from_value(json!({})).unwrap();
        assert_eq!(options, BundleOptions::default());
        assert!(options.optimize);
        assert!(options.preserve_external_import);
        assert!(options.expose_to_global.is_none());
    }

    #[test]
    fn chunk_defaults() {
        let options = ChunkOptions::from_json("{}").unwrap();
        assert_eq!(options.public_path, "/");
        assert!(options.optimize);
    }

    #[test]
    fn chunk_camel_case() {
        let options = ChunkOptions::from_value(json!({
            "optimize": true,
            "publicPath": "/dist/",
            "exposeToGlobal": "lib"
        }))
        .unwrap();
        assert_eq!(options.public_path, "/dist/");
        assert_eq!(options.expose_to_global.as_deref(), Some("lib"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = BundleOptions::from_value(json!({ "minify": true })).unwrap_err();
        assert!(matches!(err, BundleError::InvalidOptions(_)));
    }

    #[test]
    fn builders() {
        let options = ChunkOptions::new()
            .with_optimize(false)
            .with_public_path("/static/")
            .with_preserve_export(false);
        assert!(!options.optimize);
        assert_eq!(options.public_path, "/static/");
        assert!(!options.preserve_export);
    }
}
