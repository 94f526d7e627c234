use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Runtime, RuntimeError, RuntimeResult};
use crate::ModuleId;

/// In-memory file store keyed by canonical module id.
///
/// Paths are normalised on the way in and on lookup, so `/a/../b.js`
/// and `/b.js` address the same file.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(path, source)` pairs. Paths that cannot form a
    /// module id are skipped.
    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let map = files
            .into_iter()
            .filter_map(|(path, source)| {
                let id = ModuleId::new(path.as_ref()).ok()?;
                Some((id.as_str().to_string(), source.into().into_bytes()))
            })
            .collect();
        Self {
            files: RwLock::new(map),
        }
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn key(path: &Path) -> RuntimeResult<String> {
        ModuleId::new(path)
            .map(|id| id.as_str().to_string())
            .map_err(|err| RuntimeError::Other(err.to_string()))
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let key = Self::key(path)?;
        self.files
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(PathBuf::from(key)))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let key = Self::key(path)?;
        self.files.write().insert(key, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        Self::key(path)
            .map(|key| self.files.read().contains_key(&key))
            .unwrap_or(false)
    }
}
