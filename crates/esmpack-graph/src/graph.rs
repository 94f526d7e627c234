use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::{ModuleId, ModuleRecord};

/// Mapping from module id to its record, in insertion order.
///
/// Records are shared (`Arc`) so derived graphs, such as the output of tree
/// shaking, only clone the records they actually rewrite.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    modules: IndexMap<ModuleId, Arc<ModuleRecord>, FxBuildHasher>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ModuleRecord>> {
        self.modules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    /// Insert or replace the record stored under its own id
    pub fn insert(&mut self, record: impl Into<Arc<ModuleRecord>>) -> Option<Arc<ModuleRecord>> {
        let record = record.into();
        self.modules.insert(record.id.clone(), record)
    }

    /// Drop a record, keeping the order of the remaining ones
    pub fn remove(&mut self, id: &str) -> Option<Arc<ModuleRecord>> {
        self.modules.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Arc<ModuleRecord>)> {
        self.modules.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<ModuleRecord>> {
        self.modules.values()
    }

    /// `true` if the module or anything it statically imports has top-level effects.
    ///
    /// Ids missing from the graph count as impure.
    pub fn has_side_effects(&self, id: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(record) = self.get(current) else {
                return true;
            };
            if !record.pure {
                return true;
            }
            stack.extend(record.static_dependencies().map(ModuleId::as_str));
        }
        false
    }

    /// Ids reachable from `entry` through static imports, dynamic imports and
    /// workers, in discovery order (`entry` first).
    ///
    /// Dependencies without a record are skipped.
    pub fn reachable(&self, entry: &str) -> Vec<ModuleId> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![entry];
        while let Some(current) = stack.pop() {
            let Some(record) = self.get(current) else {
                continue;
            };
            if !seen.insert(current) {
                continue;
            }
            order.push(record.id.clone());
            let mut children: Vec<&str> = record
                .dependencies()
                .map(ModuleId::as_str)
                .filter(|dep| !seen.contains(dep))
                .collect();
            children.reverse();
            stack.extend(children);
        }
        order
    }
}

impl FromIterator<Arc<ModuleRecord>> for ModuleGraph {
    fn from_iter<T: IntoIterator<Item = Arc<ModuleRecord>>>(iter: T) -> Self {
        let mut graph = ModuleGraph::new();
        for record in iter {
            graph.insert(record);
        }
        graph
    }
}
