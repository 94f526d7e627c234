//! Parser façade over the OXC parser
//!
//! Every module is parsed as an ES module regardless of extension, so that
//! top-level `import`/`export` and strict-mode scoping always apply.

use crate::error::{GenError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parse options for reading module source
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Source type (JavaScript, TypeScript, JSX, TSX)
    pub source_type: SourceType,
    /// Name reported in parse errors
    pub path: String,
    /// Allow parsing errors (returns partial AST)
    pub allow_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::mjs(),
            path: String::from("<anonymous>"),
            allow_errors: false,
        }
    }
}

impl ParseOptions {
    /// Create parse options from a module path (auto-detects language and JSX)
    pub fn from_path(path: &str) -> Self {
        Self {
            source_type: SourceType::from_path(path)
                .unwrap_or(SourceType::mjs())
                .with_module(true),
            path: path.to_string(),
            allow_errors: false,
        }
    }

    /// Keep the partial AST instead of failing on syntax errors
    pub fn allow_errors(mut self, allow: bool) -> Self {
        self.allow_errors = allow;
        self
    }
}

/// Parsed program with AST and diagnostics
pub struct ParsedProgram<'a> {
    /// The parsed AST program
    pub program: Program<'a>,
    /// Parse diagnostics (empty unless `allow_errors` was set)
    pub diagnostics: Vec<String>,
    /// Original source text
    pub source_text: &'a str,
}

impl<'a> ParsedProgram<'a> {
    /// Get the program AST
    pub fn ast(&self) -> &Program<'a> {
        &self.program
    }

    /// Check if parsing had errors
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse source code into an AST
///
/// The allocator must outlive the returned program. Syntax errors fail the
/// call with [`GenError::ParseFailed`] unless `options.allow_errors` is set.
pub fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    options: ParseOptions,
) -> Result<ParsedProgram<'a>> {
    let result = Parser::new(allocator, source, options.source_type).parse();

    let mut diagnostics: Vec<String> = result.errors.iter().map(|err| err.to_string()).collect();
    if result.panicked && diagnostics.is_empty() {
        diagnostics.push("parser aborted".to_string());
    }

    if !options.allow_errors && !diagnostics.is_empty() {
        return Err(GenError::parse_failed(options.path, diagnostics));
    }

    Ok(ParsedProgram {
        program: result.program,
        diagnostics,
        source_text: source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_syntax() {
        let allocator = Allocator::default();
        let parsed = parse(
            &allocator,
            "import a from './a.js'; export default a;",
            ParseOptions::from_path("/index.js"),
        )
        .unwrap();
        assert_eq!(parsed.ast().body.len(), 2);
        assert!(!parsed.has_errors());
    }

    #[test]
    fn test_plain_js_is_parsed_as_module() {
        let options = ParseOptions::from_path("/script.js");
        assert!(options.source_type.is_module());
    }

    #[test]
    fn test_parse_error_names_path() {
        let allocator = Allocator::default();
        let err = parse(&allocator, "const = ;", ParseOptions::from_path("/bad.js"))
            .err()
            .unwrap();
        match err {
            GenError::ParseFailed { path, messages } => {
                assert_eq!(path, "/bad.js");
                assert!(!messages.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_allow_errors_keeps_partial_ast() {
        let allocator = Allocator::default();
        let parsed = parse(
            &allocator,
            "const = ;",
            ParseOptions::from_path("/bad.js").allow_errors(true),
        )
        .unwrap();
        assert!(parsed.has_errors());
    }
}
