#![cfg_attr(docsrs, feature(doc_cfg))]

//! # esmpack-bundler
//!
//! Bundles ES modules into a single script (or a set of chunks) that runs
//! without native module loading. Each module becomes a factory in a
//! registry table; a small memoized `_$_import(id)` function evaluates each
//! factory at most once, in first-use order.
//!
//! The pipeline, built on [`esmpack_graph`]:
//!
//! 1. load the module graph from a [`Runtime`]
//! 2. [`shake`](shake::shake) dead exports and dead imports (`optimize`)
//! 3. split into [output units](chunk) at dynamic imports and workers
//! 4. rewrite imports and exports, then render each unit
//!
//! ## Quick Start
//!
//! ```no_run
//! use esmpack_bundler::{BundleOptions, Bundler, ChunkOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bundler = Bundler::new([
//!     ("/index.js", "import { greet } from './greet.js'; greet(); import('./lazy.js');"),
//!     ("/greet.js", "export const greet = () => console.log('hi');"),
//!     ("/lazy.js", "export default 1;"),
//! ]);
//!
//! let single = bundler.bundle("/index.js", &BundleOptions::default()).await?;
//! println!("{single}");
//!
//! let chunks = bundler
//!     .bundle_chunks("/index.js", &ChunkOptions::new().with_public_path("/dist/"))
//!     .await?;
//! for chunk in &chunks {
//!     println!("{}: {} bytes", chunk.name(), chunk.built_code().len());
//! }
//! # Ok(()) }
//! ```

mod bundler;
pub mod chunk;
pub mod config;
pub mod error;
pub mod render;
pub mod shake;
pub mod transform;

// Logging utilities (optional)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

pub use bundler::{Bundler, ChunkOutput, bundle};
pub use config::{BundleOptions, ChunkOptions};
pub use error::{BundleError, Result};

// Foundation types callers need to drive a build
pub use esmpack_graph::runtime::{MemoryRuntime, NativeRuntime, Runtime, RuntimeError};
pub use esmpack_graph::{ImportMap, ModuleGraph, ModuleId};
