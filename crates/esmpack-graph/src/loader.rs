//! Module loading
//!
//! The loader walks the dependency graph with an explicit work list. A
//! module is marked visited before any of its dependencies are scheduled, so
//! import cycles terminate and every module is processed exactly once per
//! walk. Records already present in the graph are reused, but their edges
//! are still followed so that a dependency dropped from the cache (after a
//! source update) is picked up again.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::analysis::analyze_module;
use crate::error::{ENTRY_IMPORTER, GraphError, Result};
use crate::resolve::ImportMap;
use crate::runtime::{Runtime, RuntimeError};
use crate::{ModuleGraph, ModuleId};

/// Pending module and how it was reached
struct Pending {
    id: ModuleId,
    importer: String,
    specifier: String,
}

/// Loads modules from a [`Runtime`] into a [`ModuleGraph`].
pub struct ModuleLoader<'a> {
    runtime: &'a dyn Runtime,
    import_map: &'a ImportMap,
}

impl<'a> ModuleLoader<'a> {
    pub fn new(runtime: &'a dyn Runtime, import_map: &'a ImportMap) -> Self {
        Self {
            runtime,
            import_map,
        }
    }

    /// Make sure `entry` and everything reachable from it (static imports,
    /// re-exports, dynamic imports and workers) has a record in `graph`.
    ///
    /// Returns the ids visited by this walk in discovery order.
    pub async fn load(&self, entry: &ModuleId, graph: &mut ModuleGraph) -> Result<Vec<ModuleId>> {
        let mut visited: FxHashSet<ModuleId> = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![Pending {
            id: entry.clone(),
            importer: ENTRY_IMPORTER.to_string(),
            specifier: entry.to_string(),
        }];

        while let Some(pending) = stack.pop() {
            if !visited.insert(pending.id.clone()) {
                continue;
            }

            let record = match graph.get(pending.id.as_str()) {
                Some(cached) => {
                    tracing::trace!(module = %pending.id, "reusing cached module");
                    Arc::clone(cached)
                }
                None => {
                    let source = self.read(&pending).await?;
                    let record = Arc::new(analyze_module(&pending.id, source, self.import_map)?);
                    tracing::debug!(
                        module = %pending.id,
                        imports = record.imports.len(),
                        pure = record.pure,
                        "added module"
                    );
                    graph.insert(Arc::clone(&record));
                    record
                }
            };
            order.push(pending.id);

            let children = record
                .imports
                .iter()
                .map(|edge| (&edge.target, &edge.specifier))
                .chain(record.dynamic_imports.iter().map(|d| (&d.target, &d.specifier)))
                .chain(record.worker_sources.iter().map(|w| (&w.target, &w.specifier)));

            // Reverse so dependencies are visited in declaration order
            let mut scheduled: Vec<Pending> = children
                .filter(|(target, _)| !visited.contains(*target))
                .map(|(target, specifier)| Pending {
                    id: target.clone(),
                    importer: record.id.to_string(),
                    specifier: specifier.clone(),
                })
                .collect();
            scheduled.reverse();
            stack.extend(scheduled);
        }

        Ok(order)
    }

    /// Replace the source of `id`, drop its cached record and walk again from it.
    ///
    /// Dependents are not re-analyzed; the next full walk from the entry picks
    /// up whatever changed.
    pub async fn reload(&self, id: &ModuleId, source: &str, graph: &mut ModuleGraph) -> Result<()> {
        self.runtime.write_file(id.as_path(), source.as_bytes()).await?;
        graph.remove(id.as_str());
        tracing::debug!(module = %id, "invalidated module");
        self.load(id, graph).await?;
        Ok(())
    }

    async fn read(&self, pending: &Pending) -> Result<Arc<str>> {
        match self.runtime.read_source(pending.id.as_path()).await {
            Ok(source) => Ok(Arc::from(source)),
            Err(RuntimeError::FileNotFound(_)) => Err(GraphError::module_not_found(
                pending.importer.clone(),
                pending.specifier.clone(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
