//! Issue types for localization checks.
//!
//! Every problem the tool reports is an [`Issue`]. Each variant carries what
//! a reporter needs to show it: a location, a message and optional details.
//! Issues never block an operation; they are collected and printed.

use enum_dispatch::enum_dispatch;

use crate::core::{MessageContext, SourceContext};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    UndefinedKey,
    PartialTranslation,
    KeyTooLong,
    KeyStyle,
    CommentedReference,
    ScanError,
    MissingParameter,
    UnknownParameter,
    InvalidKey,
    UnusedPlaceholder,
    UndefinedPlaceholder,
    MissingTranslation,
    EmptyTranslation,
    InvalidPattern,
    ParseError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::UndefinedKey => write!(f, "undefined-key"),
            Rule::PartialTranslation => write!(f, "partial-translation"),
            Rule::KeyTooLong => write!(f, "key-too-long"),
            Rule::KeyStyle => write!(f, "key-style"),
            Rule::CommentedReference => write!(f, "commented-reference"),
            Rule::ScanError => write!(f, "scan-error"),
            Rule::MissingParameter => write!(f, "missing-parameter"),
            Rule::UnknownParameter => write!(f, "unknown-parameter"),
            Rule::InvalidKey => write!(f, "invalid-key"),
            Rule::UnusedPlaceholder => write!(f, "unused-placeholder"),
            Rule::UndefinedPlaceholder => write!(f, "undefined-placeholder"),
            Rule::MissingTranslation => write!(f, "missing-translation"),
            Rule::EmptyTranslation => write!(f, "empty-translation"),
            Rule::InvalidPattern => write!(f, "invalid-pattern"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

// ============================================================
// Issue Types - Dart Source (SourceContext)
// ============================================================

/// Key referenced in source but absent from every catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedKeyIssue {
    pub context: SourceContext,
    pub key: String,
}

impl UndefinedKeyIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::UndefinedKey
    }
}

/// Key referenced in source and translated in only some locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialTranslationIssue {
    pub context: SourceContext,
    pub key: String,
    /// Locales without a value for the key.
    pub missing_in: Vec<String>,
}

impl PartialTranslationIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::PartialTranslation
    }
}

/// A finding of the reference scanner. Severity depends on the finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFindingIssue {
    pub context: SourceContext,
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
}

/// Call site that does not pass a placeholder the template message declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParameterIssue {
    pub context: SourceContext,
    pub key: String,
    pub parameter: String,
}

impl MissingParameterIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MissingParameter
    }
}

/// Call site argument with no matching placeholder in the template message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParameterIssue {
    pub context: SourceContext,
    pub key: String,
    pub parameter: String,
}

impl UnknownParameterIssue {
    pub fn severity() -> Severity {
        Severity::Info
    }

    pub fn rule() -> Rule {
        Rule::UnknownParameter
    }
}

// ============================================================
// Issue Types - ARB Files (MessageContext)
// ============================================================

/// Catalog key that is not a valid Dart identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKeyIssue {
    pub context: MessageContext,
    pub locale: String,
}

impl InvalidKeyIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::InvalidKey
    }
}

/// Placeholder declared in metadata but not used in the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedPlaceholderIssue {
    pub context: MessageContext,
    pub placeholder: String,
}

impl UnusedPlaceholderIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnusedPlaceholder
    }
}

/// `{name}` used in the value without a placeholder definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedPlaceholderIssue {
    pub context: MessageContext,
    pub placeholder: String,
}

impl UndefinedPlaceholderIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::UndefinedPlaceholder
    }
}

/// Key present in some catalogs but absent from others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTranslationIssue {
    pub context: MessageContext,
    pub missing_in: Vec<String>,
}

impl MissingTranslationIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MissingTranslation
    }
}

/// Key whose value is empty or whitespace in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyTranslationIssue {
    pub context: MessageContext,
    pub locale: String,
}

impl EmptyTranslationIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::EmptyTranslation
    }
}

// ============================================================
// Special Issue Types
// ============================================================

/// A configured key pattern failed to compile; the defaults are in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPatternIssue {
    /// The settings file the pattern came from.
    pub file_path: String,
    pub pattern: String,
    pub error: String,
}

impl InvalidPatternIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::InvalidPattern
    }
}

/// File could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    UndefinedKey(UndefinedKeyIssue),
    PartialTranslation(PartialTranslationIssue),
    ScanFinding(ScanFindingIssue),
    MissingParameter(MissingParameterIssue),
    UnknownParameter(UnknownParameterIssue),
    InvalidKey(InvalidKeyIssue),
    UnusedPlaceholder(UnusedPlaceholderIssue),
    UndefinedPlaceholder(UndefinedPlaceholderIssue),
    MissingTranslation(MissingTranslationIssue),
    EmptyTranslation(EmptyTranslationIssue),
    InvalidPattern(InvalidPatternIssue),
    ParseError(ParseErrorIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }

    /// Rewrites the file path of the issue's location.
    pub fn map_file_path(&mut self, f: impl FnOnce(&str) -> String) {
        let path = match self {
            Issue::UndefinedKey(i) => &mut i.context.location.file_path,
            Issue::PartialTranslation(i) => &mut i.context.location.file_path,
            Issue::ScanFinding(i) => &mut i.context.location.file_path,
            Issue::MissingParameter(i) => &mut i.context.location.file_path,
            Issue::UnknownParameter(i) => &mut i.context.location.file_path,
            Issue::InvalidKey(i) => &mut i.context.location.file_path,
            Issue::UnusedPlaceholder(i) => &mut i.context.location.file_path,
            Issue::UndefinedPlaceholder(i) => &mut i.context.location.file_path,
            Issue::MissingTranslation(i) => &mut i.context.location.file_path,
            Issue::EmptyTranslation(i) => &mut i.context.location.file_path,
            Issue::InvalidPattern(i) => &mut i.file_path,
            Issue::ParseError(i) => &mut i.file_path,
        };
        *path = f(path);
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Dart source location, with the line shown under the header.
    Source(&'a SourceContext),
    /// ARB file location.
    Message(&'a MessageContext),
    /// File-level only.
    File { path: &'a str },
}

/// Uniform view of an issue for the reporters.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display (key name, error text, ...).
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for UndefinedKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some(format!(
            "add it with `arbsync set {} <LOCALE> <VALUE>`",
            self.key
        ))
    }
}

impl Report for PartialTranslationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("missing in: {}", self.missing_in.join(", ")))
    }
}

impl Report for ScanFindingIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn report_severity(&self) -> Severity {
        self.severity
    }

    fn report_rule(&self) -> Rule {
        self.rule
    }
}

impl Report for MissingParameterIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "placeholder '{}' is declared but not passed",
            self.parameter
        ))
    }
}

impl Report for UnknownParameterIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("'{}' is not a placeholder of this message", self.parameter))
    }
}

impl Report for InvalidKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.context)
    }

    fn message(&self) -> String {
        self.context.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some("keys must start with a letter and contain only letters, digits and '_'".into())
    }
}

impl Report for UnusedPlaceholderIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.context)
    }

    fn message(&self) -> String {
        self.context.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "placeholder '{}' is not used in (\"{}\")",
            self.placeholder, self.context.value
        ))
    }
}

impl Report for UndefinedPlaceholderIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.context)
    }

    fn message(&self) -> String {
        self.context.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "'{{{}}}' has no placeholder definition",
            self.placeholder
        ))
    }
}

impl Report for MissingTranslationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.context)
    }

    fn message(&self) -> String {
        self.context.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "(\"{}\") missing in: {}",
            self.context.value,
            self.missing_in.join(", ")
        ))
    }
}

impl Report for EmptyTranslationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.context)
    }

    fn message(&self) -> String {
        self.context.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("empty in {}", self.locale))
    }
}

impl Report for InvalidPatternIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.pattern.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }

    fn hint(&self) -> Option<String> {
        Some("the default key patterns are used until this is fixed".into())
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_file_path(&self) -> &str {
        match self.location() {
            ReportLocation::Source(ctx) => &ctx.location.file_path,
            ReportLocation::Message(ctx) => &ctx.location.file_path,
            ReportLocation::File { path } => path,
        }
    }

    fn sort_line(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.location.line,
            ReportLocation::Message(ctx) => ctx.location.line,
            ReportLocation::File { .. } => 0,
        }
    }

    fn sort_col(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.location.col,
            ReportLocation::Message(ctx) => ctx.location.col,
            ReportLocation::File { .. } => 0,
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // file, line, col, rule, message
        self.sort_file_path()
            .cmp(other.sort_file_path())
            .then_with(|| self.sort_line().cmp(&other.sort_line()))
            .then_with(|| self.sort_col().cmp(&other.sort_col()))
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Tests
// ============================================================
