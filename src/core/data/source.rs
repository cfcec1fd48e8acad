use super::reference::Position;

/// Where a key reference starts in a Dart file, 1-based for display.
///
/// The scanner works in 0-based [`Position`]s; `path:line:col` output is
/// 1-based. Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }

    /// Converts a scanner position.
    pub fn from_position(file_path: impl Into<String>, position: Position) -> Self {
        Self::new(file_path, position.line + 1, position.column + 1)
    }
}

/// A reference location plus the Dart line it sits on, so reports can draw
/// the line with a caret under the accessor (`S.of(context).title`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub location: SourceLocation,
    /// The whole line without its terminator.
    pub source_line: String,
}

impl SourceContext {
    pub fn new(location: SourceLocation, source_line: impl Into<String>) -> Self {
        Self {
            location,
            source_line: source_line.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}
