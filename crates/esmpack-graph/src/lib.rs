//! esmpack graph - module records and the passes that build them
//!
//! This crate owns everything that happens before code generation:
//!
//! - [`ModuleId`]: canonical virtual paths used as graph keys
//! - [`runtime`]: the [`Runtime`] source store trait with in-memory and
//!   filesystem implementations
//! - [`resolve`]: specifier resolution and [`ImportMap`]
//! - [`analysis`]: free-identifier usage, export purity, dynamic imports
//!   and workers, and the [`analysis::purity`] classifier
//! - [`ModuleLoader`]: the work-list graph walker
//!
//! # Example
//!
//! ```rust,no_run
//! use esmpack_graph::{ImportMap, ModuleGraph, ModuleId, ModuleLoader, runtime::MemoryRuntime};
//!
//! # async fn demo() -> esmpack_graph::Result<()> {
//! let runtime = MemoryRuntime::from_files([
//!     ("/index.js", "import { a } from './a.js'; console.log(a);"),
//!     ("/a.js", "export const a = 1;"),
//! ]);
//! let import_map = ImportMap::default();
//! let mut graph = ModuleGraph::new();
//! ModuleLoader::new(&runtime, &import_map)
//!     .load(&ModuleId::new("/index.js")?, &mut graph)
//!     .await?;
//! assert!(graph.get("/a.js").unwrap().pure);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
mod error;
mod graph;
mod loader;
mod module;
mod module_id;
pub mod resolve;
pub mod runtime;

pub use error::{ENTRY_IMPORTER, GraphError, Result};
pub use graph::ModuleGraph;
pub use loader::ModuleLoader;
pub use module::{
    DynamicImport, EdgeKind, ExportBinding, ImportEdge, Imported, ModuleRecord, Specifier,
    WorkerSource,
};
pub use module_id::{ModuleId, ModuleIdError};
pub use resolve::{ImportMap, Resolution, is_external_url, resolve_specifier};
pub use runtime::Runtime;
