//! Error types for bundling

use esmpack_gen::GenError;
use esmpack_graph::{GraphError, ModuleIdError, runtime::RuntimeError};
use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a `bundle()` or `bundle_chunks()` call.
///
/// There is no partial output: any of these fails the whole build.
#[derive(Debug, Error, Diagnostic)]
pub enum BundleError {
    /// An import, dynamic import or worker target has no source
    #[error("Cannot find module '{specifier}' imported from '{importer}'")]
    #[diagnostic(code(esmpack::bundle::module_not_found))]
    ModuleNotFound { importer: String, specifier: String },

    /// Syntax that cannot be expressed in the requested output form
    #[error("Unsupported syntax in entry module '{module}': `{statement}`")]
    #[diagnostic(
        code(esmpack::bundle::unsupported_syntax),
        help(
            "re-exports with a source cannot be kept as native exports yet.\n\
             Rewrite\n  export {{ x as a }} from \"./m.js\"\n\
             as\n  import {{ x }} from \"./m.js\";\n  export {{ x as a }}"
        )
    )]
    UnsupportedSyntax { module: String, statement: String },

    /// Parser error, propagated unchanged
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(GenError),

    /// Source store failure other than a missing file
    #[error(transparent)]
    #[diagnostic(code(esmpack::bundle::runtime))]
    Runtime(#[from] RuntimeError),

    /// Input path cannot form a module id
    #[error(transparent)]
    #[diagnostic(code(esmpack::bundle::invalid_path))]
    InvalidPath(#[from] ModuleIdError),

    /// Options could not be deserialized
    #[error("Invalid options: {0}")]
    #[diagnostic(code(esmpack::bundle::invalid_options))]
    InvalidOptions(String),

    /// Internal bookkeeping went wrong; this is a bug, not bad input
    #[error("Internal invariant violated: {message}")]
    #[diagnostic(code(esmpack::bundle::invariant))]
    Invariant { message: String },
}

impl BundleError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Shorthand for a record missing from the graph
    pub fn missing_record(id: &str) -> Self {
        Self::invariant(format!("no module record for reachable id '{id}'"))
    }
}

impl From<GraphError> for BundleError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::ModuleNotFound { importer, specifier } => {
                BundleError::ModuleNotFound { importer, specifier }
            }
            GraphError::Parse(err) => BundleError::Parse(err),
            GraphError::Runtime(err) => BundleError::Runtime(err),
            GraphError::InvalidModuleId(err) => BundleError::InvalidPath(err),
        }
    }
}

impl From<GenError> for BundleError {
    fn from(err: GenError) -> Self {
        match err {
            GenError::ParseFailed { .. } => BundleError::Parse(err),
            // Edit bookkeeping errors come from our own rewrites
            other => BundleError::invariant(other.to_string()),
        }
    }
}

/// Result type for bundling operations
pub type Result<T> = std::result::Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_not_found_keeps_names() {
        let err: BundleError = GraphError::module_not_found("/index.js", "./x.js").into();
        assert_eq!(
            err.to_string(),
            "Cannot find module './x.js' imported from '/index.js'"
        );
    }

    #[test]
    fn overlapping_edit_is_an_invariant() {
        let err: BundleError = GenError::OverlappingEdit {
            start: 1,
            end: 2,
            cursor: 3,
        }
        .into();
        assert!(matches!(err, BundleError::Invariant { .. }));
    }

    #[test]
    fn unsupported_syntax_has_help() {
        let err = BundleError::UnsupportedSyntax {
            module: "/index.js".into(),
            statement: "export { a } from './a.js'".into(),
        };
        let help = err.help().unwrap().to_string();
        assert!(help.contains("import { x } from \"./m.js\";"));
    }
}
