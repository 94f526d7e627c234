//! Parsing and code generation primitives for esmpack
//!
//! This crate wraps the OXC parser behind a small façade and provides
//! [`CodeBuffer`], a span-based splicer used to emit rewritten modules.
//! Instead of printing a mutated AST, every transform parses a fresh tree
//! from the retained source, records edits against node spans, and renders
//! the original text with those edits applied. Formatting and comments of
//! untouched code survive verbatim.
//!
//! # Example
//!
//! ```rust
//! use esmpack_gen::{Allocator, CodeBuffer, ParseOptions, parse};
//! use oxc_ast::ast::Statement;
//! use oxc_span::GetSpan;
//!
//! let source = "import a from './a.js';\nconsole.log(a);";
//! let allocator = Allocator::default();
//! let parsed = parse(&allocator, source, ParseOptions::from_path("/index.js"))?;
//!
//! let mut code = CodeBuffer::new(source);
//! for stmt in &parsed.program.body {
//!     if let Statement::ImportDeclaration(decl) = stmt {
//!         code.remove(decl.span());
//!     }
//! }
//! assert_eq!(code.render()?, "\nconsole.log(a);");
//! # Ok::<(), esmpack_gen::GenError>(())
//! ```

mod buffer;
mod error;
mod format;
mod parser;

pub use buffer::CodeBuffer;
pub use error::{GenError, Result};
pub use format::{is_identifier_name, property_access, property_key, quote};
pub use parser::{ParseOptions, ParsedProgram, parse};

// Re-export commonly used OXC types for convenience
pub use oxc_allocator::Allocator;
pub use oxc_span::{GetSpan, Span};
