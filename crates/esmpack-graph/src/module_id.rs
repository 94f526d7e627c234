use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Canonical identifier for a module in the graph.
///
/// Identifiers are absolute, `/`-separated virtual paths with `.` and `..`
/// segments folded away, so `./a/../b.js` and `/b.js` collapse to the same
/// key. Relative input is anchored at the virtual root `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a new module identifier from a virtual path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ModuleIdError> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(ModuleIdError::EmptyPath);
        }

        let rooted = if path.has_root() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };

        let cleaned = rooted.clean().to_string_lossy().replace('\\', "/");
        if cleaned.is_empty() || cleaned == "/" {
            return Err(ModuleIdError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        Ok(Self(cleaned))
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as a path, for runtime file access.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Directory containing the module, used as the base for relative specifiers.
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModuleId {
    type Error = ModuleIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for ModuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur while constructing a [`ModuleId`].
#[derive(Debug, Error)]
pub enum ModuleIdError {
    #[error("module path cannot be empty")]
    EmptyPath,

    #[error("module path '{path}' does not name a file")]
    NotAFile { path: PathBuf },
}
