//! Filesystem-backed runtime
//!
//! Virtual module ids are rooted at a directory on disk: with root
//! `/home/me/app`, module `/src/main.js` reads `/home/me/app/src/main.js`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Runtime that reads and writes real files below a root directory.
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    root: PathBuf,
}

impl NativeRuntime {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path onto the filesystem
    fn host_path(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let host = self.host_path(path);
        tokio::fs::read(&host).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", host.display(), e))
            }
        })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let host = self.host_path(path);
        if let Some(parent) = host.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RuntimeError::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&host, content)
            .await
            .map_err(|e| RuntimeError::Io(format!("Failed to write {}: {}", host.display(), e)))
    }

    fn exists(&self, path: &Path) -> bool {
        self.host_path(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roundtrip_below_root() {
        let temp = TempDir::new().unwrap();
        let runtime = NativeRuntime::new(temp.path());

        runtime
            .write_file(Path::new("/src/a.js"), b"export const a = 1;")
            .await
            .unwrap();

        assert!(runtime.exists(Path::new("/src/a.js")));
        assert!(temp.path().join("src/a.js").is_file());
        let source = runtime.read_source(Path::new("/src/a.js")).await.unwrap();
        assert_eq!(source, "export const a = 1;");
    }

    #[tokio::test]
    async fn test_missing_file_reports_virtual_path() {
        let temp = TempDir::new().unwrap();
        let runtime = NativeRuntime::new(temp.path());
        let err = runtime.read_file(Path::new("/missing.js")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(p) if p == Path::new("/missing.js")));
    }
}
