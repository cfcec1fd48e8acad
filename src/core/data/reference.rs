use std::fmt;

/// Byte offsets into a source text, inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// 0-based line and column (in characters) within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Line/column form of a [`Span`], as hosts address text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends, so a cursor sitting right after the
    /// last character still hits the reference.
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position <= self.end
    }
}

/// Which textual shape identified a localization-key usage.
///
/// The four built-in kinds cover the accessors generated by `flutter gen-l10n`
/// and `intl_utils`. `Custom` carries the name a caller registered an extra
/// pattern under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternKind {
    /// `S.of(context).key(args)`
    GeneratedClassAccessor,
    /// `context.l10n.key(args)`
    ContextExtension,
    /// `AppLocalizations.of(context)!.key(args)`, also used for alias accesses.
    NullableSingletonAccessor,
    /// `Intl.message('text', name: 'key', args)`
    MessageFunctionCall,
    Custom(String),
}

impl PatternKind {
    /// The built-in kinds, in scan order.
    pub const BUILTIN: [PatternKind; 4] = [
        PatternKind::GeneratedClassAccessor,
        PatternKind::ContextExtension,
        PatternKind::NullableSingletonAccessor,
        PatternKind::MessageFunctionCall,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PatternKind::GeneratedClassAccessor => "generated_class",
            PatternKind::ContextExtension => "context_l10n",
            PatternKind::NullableSingletonAccessor => "app_localizations",
            PatternKind::MessageFunctionCall => "intl_message",
            PatternKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One occurrence of a localization-key usage in source text.
///
/// Built fresh on every scan. Only `is_valid` changes after construction,
/// when validation finds the match inside a string literal or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub key: String,
    pub span: Span,
    pub range: Range,
    pub pattern_kind: PatternKind,
    /// Argument names, `None` when the usage is a plain property access.
    pub parameters: Option<Vec<String>>,
    /// Full matched text, kept for replacement.
    pub raw_text: String,
    pub is_valid: bool,
}
