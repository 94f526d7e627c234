use esmpack_gen::GenError;
use miette::Diagnostic;
use thiserror::Error;

use crate::ModuleIdError;
use crate::runtime::RuntimeError;

/// Importer name reported when the entry module itself is missing
pub const ENTRY_IMPORTER: &str = "<entry>";

/// Errors raised while building the module graph
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A static, dynamic or worker import points at source that does not exist
    #[error("Cannot find module '{specifier}' imported from '{importer}'")]
    #[diagnostic(code(esmpack::graph::module_not_found))]
    ModuleNotFound { importer: String, specifier: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] GenError),

    #[error(transparent)]
    #[diagnostic(code(esmpack::graph::runtime))]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(code(esmpack::graph::invalid_module_id))]
    InvalidModuleId(#[from] ModuleIdError),
}

impl GraphError {
    pub fn module_not_found(importer: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            importer: importer.into(),
            specifier: specifier.into(),
        }
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
