//! The `Bundler` façade

use std::borrow::Cow;
use std::sync::Arc;

use esmpack_graph::runtime::{MemoryRuntime, Runtime};
use esmpack_graph::{ImportMap, ModuleGraph, ModuleId, ModuleLoader};
use serde::{Deserialize, Serialize};

use crate::chunk::{FlatNames, UnitKind, single_unit, split_units};
use crate::config::{BundleOptions, ChunkOptions};
use crate::error::{BundleError, Result};
use crate::render::{RenderOptions, render_unit};
use crate::shake::shake;

/// One rendered unit of split output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChunkOutput {
    /// The unit containing the requested entry module
    Entry { entry: String, built_code: String },
    /// A unit rooted at a dynamic-import or worker target
    Chunk { chunk_name: String, built_code: String },
}

impl ChunkOutput {
    pub fn is_entry(&self) -> bool {
        matches!(self, ChunkOutput::Entry { .. })
    }

    /// Entry id or chunk name
    pub fn name(&self) -> &str {
        match self {
            ChunkOutput::Entry { entry, .. } => entry,
            ChunkOutput::Chunk { chunk_name, .. } => chunk_name,
        }
    }

    pub fn built_code(&self) -> &str {
        match self {
            ChunkOutput::Entry { built_code, .. } | ChunkOutput::Chunk { built_code, .. } => built_code,
        }
    }
}

/// Bundles modules from a [`Runtime`], caching analyzed modules between calls.
///
/// The cache is owned by the instance. All operations take `&mut self`, so
/// one instance can only run one build or update at a time.
///
/// # Example
///
/// ```rust,no_run
/// use esmpack_bundler::{BundleOptions, Bundler};
///
/// # async fn demo() -> esmpack_bundler::Result<()> {
/// let mut bundler = Bundler::new([
///     ("/foo.js", "export default 'foo';"),
///     ("/index.js", "import foo from './foo.js'; console.log(foo);"),
/// ]);
/// let code = bundler.bundle("/index.js", &BundleOptions::default()).await?;
/// assert!(code.starts_with("// esmpack generate"));
///
/// bundler.update_module("/index.js", "console.log(1)").await?;
/// let code = bundler.bundle("/index.js", &BundleOptions::default()).await?;
/// assert!(!code.contains("/foo.js"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    runtime: Arc<dyn Runtime>,
    import_map: ImportMap,
    graph: ModuleGraph,
}

impl Bundler {
    /// Create a bundler over an in-memory set of files
    pub fn new<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::with_runtime(Arc::new(MemoryRuntime::from_files(files)))
    }

    pub fn with_runtime(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            import_map: ImportMap::default(),
            graph: ModuleGraph::new(),
        }
    }

    pub fn with_import_map(mut self, import_map: ImportMap) -> Self {
        self.import_map = import_map;
        self
    }

    /// Cached module records
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    pub fn import_map(&self) -> &ImportMap {
        &self.import_map
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// Bundle `entry` and everything it statically imports into one script
    pub async fn bundle(&mut self, entry: &str, options: &BundleOptions) -> Result<String> {
        let entry = ModuleId::new(entry)?;
        self.load(&entry).await?;

        let graph = self.optimized(&entry, options.optimize)?;
        let unit = single_unit(&graph, &entry)?;
        let code = render_unit(
            &graph,
            &unit,
            &self.import_map,
            &RenderOptions {
                expose_to_global: options.expose_to_global.as_deref(),
                preserve_export: options.preserve_export,
                preserve_external_import: options.preserve_external_import,
                chunk_urls: None,
            },
        )?;
        tracing::info!(entry = %entry, modules = unit.modules.len(), "bundle complete");
        Ok(code)
    }

    /// Bundle `entry` with a separate unit per dynamic import and worker target.
    ///
    /// The entry unit comes first.
    pub async fn bundle_chunks(&mut self, entry: &str, options: &ChunkOptions) -> Result<Vec<ChunkOutput>> {
        let entry = ModuleId::new(entry)?;
        self.load(&entry).await?;

        let graph = self.optimized(&entry, options.optimize)?;
        let units = split_units(&graph, &entry)?;

        let mut names = FlatNames::new();
        for unit in units.iter().filter(|unit| !unit.is_entry()) {
            names.assign(&unit.root);
        }
        let urls = names.urls(&options.public_path);

        let mut outputs = Vec::with_capacity(units.len());
        for unit in &units {
            // Classic workers are scripts; export syntax cannot survive there
            let preserve_export = match unit.kind {
                UnitKind::Worker { is_module } => is_module && options.preserve_export,
                UnitKind::Entry | UnitKind::DynamicImport => options.preserve_export,
            };
            let built_code = render_unit(
                &graph,
                unit,
                &self.import_map,
                &RenderOptions {
                    expose_to_global: options.expose_to_global.as_deref(),
                    preserve_export,
                    preserve_external_import: options.preserve_external_import,
                    chunk_urls: Some(&urls),
                },
            )?;
            let output = if unit.is_entry() {
                ChunkOutput::Entry {
                    entry: unit.root.to_string(),
                    built_code,
                }
            } else {
                let chunk_name = names.get(unit.root.as_str()).ok_or_else(|| {
                    BundleError::invariant(format!("no chunk name for '{}'", unit.root))
                })?;
                ChunkOutput::Chunk {
                    chunk_name: chunk_name.to_string(),
                    built_code,
                }
            };
            outputs.push(output);
        }

        tracing::info!(entry = %entry, units = outputs.len(), "chunked bundle complete");
        Ok(outputs)
    }

    /// Replace the source of `path` and re-analyze it.
    ///
    /// Only the changed module is invalidated; the next `bundle` call walks
    /// from its entry again and drops modules that are no longer reachable.
    pub async fn update_module(&mut self, path: &str, source: &str) -> Result<()> {
        let id = ModuleId::new(path)?;
        ModuleLoader::new(self.runtime.as_ref(), &self.import_map)
            .reload(&id, source, &mut self.graph)
            .await?;
        tracing::debug!(module = %id, "module updated");
        Ok(())
    }

    async fn load(&mut self, entry: &ModuleId) -> Result<()> {
        ModuleLoader::new(self.runtime.as_ref(), &self.import_map)
            .load(entry, &mut self.graph)
            .await?;
        Ok(())
    }

    fn optimized(&self, entry: &ModuleId, optimize: bool) -> Result<Cow<'_, ModuleGraph>> {
        if optimize {
            shake(&self.graph, entry, &self.import_map).map(Cow::Owned)
        } else {
            Ok(Cow::Borrowed(&self.graph))
        }
    }
}

/// Bundle `entry` from an in-memory set of files in one call
pub async fn bundle<I, K, V>(files: I, entry: &str, options: &BundleOptions) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    Bundler::new(files).bundle(entry, options).await
}
