//! Host text-buffer abstraction.
//!
//! The scanner reads documents only through [`TextDocument`] and writes key
//! replacements only through [`EditSink`]. [`SourceText`] implements both over an
//! owned string, for the CLI and for tests.

use crate::core::data::{Position, Span};
use crate::utils::{build_line_index, offset_to_line};

/// Read-only view of a source document.
pub trait TextDocument {
    fn text(&self) -> &str;

    /// Line and character column of a byte offset. Offsets past the end clamp
    /// to the end of the text.
    fn position_at(&self, offset: usize) -> Position;

    /// Text of a 0-based line without its line terminator.
    fn line_at(&self, line: usize) -> Option<&str>;

    /// Identifier reported in scan results.
    fn path(&self) -> &str {
        ""
    }
}

/// Applies a text replacement to the host buffer.
pub trait EditSink {
    /// Replaces `span` with `new_text`. Returns false if the edit was rejected.
    fn apply(&mut self, span: Span, new_text: &str) -> bool;
}

/// In-memory document with a precomputed line index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    path: String,
    text: String,
    line_index: Vec<usize>,
}

impl SourceText {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = build_line_index(&text);
        Self {
            path: path.into(),
            text,
            line_index,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_index.len()
    }

    /// Byte offset of a position, if it lies inside the text.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = self.line_at(position.line)?;
        let start = self.line_index[position.line];
        let column = line
            .char_indices()
            .nth(position.column)
            .map(|(i, _)| i)
            .or_else(|| (line.chars().count() == position.column).then_some(line.len()))?;
        Some(start + column)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl TextDocument for SourceText {
    fn text(&self) -> &str {
        &self.text
    }

    fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = offset_to_line(&self.line_index, offset) - 1;
        let line_start = self.line_index[line];
        let column = self.text[line_start..offset].chars().count();
        Position::new(line, column)
    }

    fn line_at(&self, line: usize) -> Option<&str> {
        let start = *self.line_index.get(line)?;
        let end = self
            .line_index
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let text = &self.text[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    fn path(&self) -> &str {
        &self.path
    }
}

impl EditSink for SourceText {
    fn apply(&mut self, span: Span, new_text: &str) -> bool {
        if span.start > span.end
            || span.end > self.text.len()
            || !self.text.is_char_boundary(span.start)
            || !self.text.is_char_boundary(span.end)
        {
            return false;
        }
        self.text.replace_range(span.start..span.end, new_text);
        self.line_index = build_line_index(&self.text);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at() {
        let doc = SourceText::new("a.dart", "ab\n你好x\n");
        assert_eq!(doc.position_at(0), Position::new(0, 0));
        assert_eq!(doc.position_at(2), Position::new(0, 2));
        assert_eq!(doc.position_at(3), Position::new(1, 0));
        // Column counts characters, not bytes.
        assert_eq!(doc.position_at(9), Position::new(1, 2));
        assert_eq!(doc.position_at(100), Position::new(2, 0));
    }

    #[test]
    fn test_line_at() {
        let doc = SourceText::new("a.dart", "first\r\nsecond\nthird");
        assert_eq!(doc.line_at(0), Some("first"));
        assert_eq!(doc.line_at(1), Some("second"));
        assert_eq!(doc.line_at(2), Some("third"));
        assert_eq!(doc.line_at(3), None);
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn test_offset_at() {
        let doc = SourceText::new("a.dart", "ab\n你好x");
        assert_eq!(doc.offset_at(Position::new(1, 2)), Some(9));
        assert_eq!(doc.offset_at(Position::new(1, 3)), Some(10));
        assert_eq!(doc.offset_at(Position::new(1, 4)), None);
        assert_eq!(doc.offset_at(Position::new(5, 0)), None);
    }

    #[test]
    fn test_apply_edit() {
        let mut doc = SourceText::new("a.dart", "x = S.of(context).old;\ny");
        assert!(doc.apply(Span::new(4, 21), "context.l10n.fresh"));
        assert_eq!(doc.text(), "x = context.l10n.fresh;\ny");
        assert_eq!(doc.position_at(24), Position::new(1, 0));

        assert!(!doc.apply(Span::new(10, 500), "nope"));
        assert!(!doc.apply(Span::new(5, 2), "nope"));
    }
}
