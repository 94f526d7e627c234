//! Output units and flat chunk names
//!
//! A unit is the static import closure of one root module, listed
//! dependencies first. Single-file bundles have exactly one unit rooted at
//! the entry. Split output adds one unit per distinct dynamic-import or
//! worker target. Units never share modules at runtime (each rendered unit
//! carries its own registry), so a module reached from several roots is
//! copied into each of their units.

use std::collections::VecDeque;
use std::sync::Arc;

use esmpack_graph::{ModuleGraph, ModuleId, ModuleRecord};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::error::{BundleError, Result};

/// Rewritten call-site URL per chunk root
pub type ChunkUrls = FxHashMap<ModuleId, String>;

/// Why a unit exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Entry,
    DynamicImport,
    Worker { is_module: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub root: ModuleId,
    pub kind: UnitKind,
    /// Static closure of `root` in post-order; `root` is always last
    pub modules: Vec<ModuleId>,
}

impl OutputUnit {
    pub fn is_entry(&self) -> bool {
        self.kind == UnitKind::Entry
    }

    /// Modules rendered into the registry table, i.e. everything but the root
    pub fn dependencies(&self) -> &[ModuleId] {
        self.modules.split_last().map_or(&[], |(_, rest)| rest)
    }
}

/// Static import closure of `root`, dependencies before dependents.
///
/// Table order does not drive execution (the runtime import function does),
/// but post-order keeps the output readable and deterministic.
pub fn static_closure(graph: &ModuleGraph, root: &ModuleId) -> Result<Vec<ModuleId>> {
    let mut visited: FxHashSet<&ModuleId> = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack: Vec<(&Arc<ModuleRecord>, usize)> = vec![(lookup(graph, root)?, 0)];
    visited.insert(root);

    while let Some(top) = stack.last_mut() {
        let (record, next) = *top;
        match record.imports.get(next) {
            Some(edge) => {
                top.1 += 1;
                if visited.insert(&edge.target) {
                    stack.push((lookup(graph, &edge.target)?, 0));
                }
            }
            None => {
                order.push(record.id.clone());
                stack.pop();
            }
        }
    }
    Ok(order)
}

fn lookup<'g>(graph: &'g ModuleGraph, id: &ModuleId) -> Result<&'g Arc<ModuleRecord>> {
    graph
        .get(id.as_str())
        .ok_or_else(|| BundleError::missing_record(id.as_str()))
}

/// The one unit of a single-file bundle
pub fn single_unit(graph: &ModuleGraph, entry: &ModuleId) -> Result<OutputUnit> {
    Ok(OutputUnit {
        root: entry.clone(),
        kind: UnitKind::Entry,
        modules: static_closure(graph, entry)?,
    })
}

/// Entry unit first, then one unit per dynamic-import or worker target in
/// discovery order.
pub fn split_units(graph: &ModuleGraph, entry: &ModuleId) -> Result<Vec<OutputUnit>> {
    let mut units = Vec::new();
    let mut roots: FxHashSet<ModuleId> = FxHashSet::default();
    let mut queue = VecDeque::from([(entry.clone(), UnitKind::Entry)]);

    while let Some((root, kind)) = queue.pop_front() {
        let modules = static_closure(graph, &root)?;
        for id in &modules {
            let record = lookup(graph, id)?;
            for dynamic in &record.dynamic_imports {
                if roots.insert(dynamic.target.clone()) {
                    queue.push_back((dynamic.target.clone(), UnitKind::DynamicImport));
                }
            }
            for worker in &record.worker_sources {
                if roots.insert(worker.target.clone()) {
                    queue.push_back((
                        worker.target.clone(),
                        UnitKind::Worker {
                            is_module: worker.is_module,
                        },
                    ));
                }
            }
        }
        tracing::debug!(root = %root, ?kind, modules = modules.len(), "output unit");
        units.push(OutputUnit { root, kind, modules });
    }
    Ok(units)
}

/// Slash-free symbol for a module id: `/src/foo.js` becomes `_$_src$foo.js`
pub fn flat_symbol(id: &ModuleId) -> String {
    format!("_$_{}", id.as_str().trim_start_matches('/').replace('/', "$"))
}

/// Collision-free flat names for chunk roots, in assignment order
#[derive(Debug, Clone, Default)]
pub struct FlatNames {
    names: IndexMap<ModuleId, String, FxBuildHasher>,
    taken: FxHashSet<String>,
}

impl FlatNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name for `id`, assigning one on first use.
    ///
    /// `/a/b.js` and `/a$b.js` flatten to the same symbol; the later one
    /// gets a `$<n>` suffix.
    pub fn assign(&mut self, id: &ModuleId) -> &str {
        let taken = &mut self.taken;
        self.names.entry(id.clone()).or_insert_with(|| {
            let base = flat_symbol(id);
            let mut name = base.clone();
            let mut n = 1;
            while taken.contains(&name) {
                name = format!("{base}${n}");
                n += 1;
            }
            taken.insert(name.clone());
            tracing::trace!(module = %id, name = %name, "assigned chunk name");
            name
        })
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Call-site URLs: `public_path` followed by the flat name
    pub fn urls(&self, public_path: &str) -> ChunkUrls {
        self.names
            .iter()
            .map(|(id, name)| (id.clone(), format!("{public_path}{name}")))
            .collect()
    }
}
