//! Span-based source splicing
//!
//! [`CodeBuffer`] keeps the original module text untouched and records
//! edits against byte spans of it. Rendering applies the edits in source
//! order, so rewrites that target nested nodes (a dynamic `import()` inside
//! an exported initializer, for example) compose as long as their spans are
//! disjoint.

use crate::error::{GenError, Result};
use oxc_span::Span;

#[derive(Debug, Clone)]
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

/// Collects edits against an immutable source string and renders the result.
///
/// # Example
///
/// ```rust
/// use esmpack_gen::CodeBuffer;
/// use oxc_span::Span;
///
/// let mut code = CodeBuffer::new("export const a = 1;");
/// code.remove(Span::new(0, 7));
/// code.insert(19, "\n_$_exports.a = a;");
/// assert_eq!(code.render()?, "const a = 1;\n_$_exports.a = a;");
/// # Ok::<(), esmpack_gen::GenError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuffer<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl<'s> CodeBuffer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// The original, unedited source text
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Source text covered by `span`
    pub fn slice(&self, span: Span) -> &'s str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    /// Replace the text covered by `span`
    pub fn overwrite(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text: text.into(),
        });
    }

    /// Delete the text covered by `span`
    pub fn remove(&mut self, span: Span) {
        self.overwrite(span, String::new());
    }

    /// Insert text at byte offset `at`; inserts at the same offset keep call order
    pub fn insert(&mut self, at: u32, text: impl Into<String>) {
        self.overwrite(Span::new(at, at), text);
    }

    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Apply all edits and return the new text
    pub fn render(&self) -> Result<String> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        // Stable sort: zero-width inserts sort ahead of replacements at the same offset
        edits.sort_by_key(|edit| (edit.start, edit.end));

        let len = self.source.len();
        let mut out = String::with_capacity(len + edits.iter().map(|e| e.text.len()).sum::<usize>());
        let mut cursor: u32 = 0;

        for edit in edits {
            if edit.start > edit.end || edit.end as usize > len {
                return Err(GenError::EditOutOfBounds {
                    start: edit.start,
                    end: edit.end,
                    len,
                });
            }
            if edit.start < cursor {
                return Err(GenError::OverlappingEdit {
                    start: edit.start,
                    end: edit.end,
                    cursor,
                });
            }
            out.push_str(self.slice(Span::new(cursor, edit.start)));
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(self.source.get(cursor as usize..).unwrap_or_default());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_edits_is_identity() {
        let code = CodeBuffer::new("console.log(1);");
        assert!(!code.is_modified());
        assert_eq!(code.render().unwrap(), "console.log(1);");
    }

    #[test]
    fn test_edits_apply_in_source_order() {
        let mut code = CodeBuffer::new("import a from 'a';\nfoo(a);");
        code.insert(0, "const {default: a} = load('a');\n");
        code.remove(Span::new(0, 18));
        assert_eq!(
            code.render().unwrap(),
            "const {default: a} = load('a');\n\nfoo(a);"
        );
    }

    #[test]
    fn test_inserts_at_same_offset_keep_order() {
        let mut code = CodeBuffer::new("x;");
        code.insert(0, "a;");
        code.insert(0, "b;");
        assert_eq!(code.render().unwrap(), "a;b;x;");
    }

    #[test]
    fn test_nested_disjoint_edits() {
        let source = "export default import('./foo.js');";
        let mut code = CodeBuffer::new(source);
        code.overwrite(Span::new(0, 15), "_$_exports.default = ");
        code.overwrite(Span::new(22, 32), "\"/_$_foo.js\"");
        assert_eq!(
            code.render().unwrap(),
            "_$_exports.default = import(\"/_$_foo.js\");"
        );
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let mut code = CodeBuffer::new("abcdef");
        code.overwrite(Span::new(0, 4), "x");
        code.overwrite(Span::new(2, 5), "y");
        assert!(matches!(
            code.render(),
            Err(GenError::OverlappingEdit { start: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_edit_is_rejected() {
        let mut code = CodeBuffer::new("abc");
        code.remove(Span::new(1, 10));
        assert!(matches!(code.render(), Err(GenError::EditOutOfBounds { .. })));
    }
}
