//! Pattern matching for localization-key usages in Dart source.
//!
//! Every [`PatternKind`] is backed by its own extractor, so one kind can be
//! replaced (from settings or by a lexer-backed implementation) without touching
//! the others. The scanner only sees the [`MatchExtractor`] trait.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::data::{PatternKind, Span};

const GENERATED_CLASS_PATTERN: &str =
    r"\bS\.of\(\s*context\s*\)\.([a-zA-Z][a-zA-Z0-9_]*)(?:\(([^)]*)\))?";
const CONTEXT_EXTENSION_PATTERN: &str =
    r"\bcontext\.l10n\.([a-zA-Z][a-zA-Z0-9_]*)(?:\(([^)]*)\))?";
const NULLABLE_SINGLETON_PATTERN: &str =
    r"\bAppLocalizations\.of\(\s*context\s*\)!?\.([a-zA-Z][a-zA-Z0-9_]*)(?:\(([^)]*)\))?";
const MESSAGE_FUNCTION_PATTERN: &str = r#"\bIntl\.message\s*\(\s*['"]([^'"]*)['"]\s*,\s*name\s*:\s*['"]([a-zA-Z][a-zA-Z0-9_]*)['"](?:\s*,\s*([^)]*))?\s*\)"#;

const ALIAS_DECLARATION_PATTERNS: [&str; 3] = [
    r"(?:final|var|const)\s+([a-zA-Z][a-zA-Z0-9_]*)\s*=\s*AppLocalizations\.of\(\s*context\s*\)!?",
    r"(?:final|var|const)\s+([a-zA-Z][a-zA-Z0-9_]*)\s*=\s*context\.l10n",
    r"(?:final|var|const)\s+([a-zA-Z][a-zA-Z0-9_]*)\s*=\s*S\.of\(\s*context\s*\)",
];

static DEFAULT_EXTRACTORS: LazyLock<Vec<RegexExtractor>> = LazyLock::new(|| {
    PatternKind::BUILTIN
        .iter()
        .map(|kind| {
            let (pattern, _, _) = builtin_layout(kind);
            RegexExtractor::for_kind(kind.clone(), pattern)
                .expect("built-in key pattern must compile")
        })
        .collect()
});

static DEFAULT_ALIAS_DECLARATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ALIAS_DECLARATION_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("built-in alias pattern must compile"))
        .collect()
});

/// Default regex and `(key group, args group)` for a built-in kind.
fn builtin_layout(kind: &PatternKind) -> (&'static str, usize, usize) {
    match kind {
        PatternKind::GeneratedClassAccessor => (GENERATED_CLASS_PATTERN, 1, 2),
        PatternKind::ContextExtension => (CONTEXT_EXTENSION_PATTERN, 1, 2),
        PatternKind::NullableSingletonAccessor => (NULLABLE_SINGLETON_PATTERN, 1, 2),
        PatternKind::MessageFunctionCall => (MESSAGE_FUNCTION_PATTERN, 2, 3),
        PatternKind::Custom(_) => ("", 1, 2),
    }
}

/// One match before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub key: String,
    pub span: Span,
    /// Text between the call parentheses, `None` for a property access.
    pub args: Option<String>,
    pub raw_text: String,
}

/// Finds the usages of one pattern kind in a source text.
pub trait MatchExtractor: Send + Sync {
    fn kind(&self) -> &PatternKind;

    /// All matches in `text`, in source order.
    fn extract(&self, text: &str) -> Result<Vec<RawMatch>>;

    fn is_match(&self, text: &str) -> bool {
        self.extract(text).is_ok_and(|matches| !matches.is_empty())
    }
}

/// Regex-backed extractor with a configurable capture-group layout.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    kind: PatternKind,
    regex: Regex,
    key_group: usize,
    args_group: usize,
}

impl RegexExtractor {
    pub fn new(kind: PatternKind, regex: Regex, key_group: usize, args_group: usize) -> Self {
        Self {
            kind,
            regex,
            key_group,
            args_group,
        }
    }

    /// Compiles `pattern` with the capture layout of `kind`.
    pub fn for_kind(kind: PatternKind, pattern: &str) -> Result<Self, regex::Error> {
        let (_, key_group, args_group) = builtin_layout(&kind);
        Ok(Self::new(kind, Regex::new(pattern)?, key_group, args_group))
    }

    /// Property-access extractor for a local alias such as `l10n`.
    pub fn for_alias(alias: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"\b{}\.([a-zA-Z][a-zA-Z0-9_]*)(?:\(([^)]*)\))?",
            regex::escape(alias)
        );
        Self::for_kind(PatternKind::NullableSingletonAccessor, &pattern)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl MatchExtractor for RegexExtractor {
    fn kind(&self) -> &PatternKind {
        &self.kind
    }

    fn extract(&self, text: &str) -> Result<Vec<RawMatch>> {
        let matches = self
            .regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let key = caps.get(self.key_group)?;
                Some(RawMatch {
                    key: key.as_str().to_string(),
                    span: Span::new(whole.start(), whole.end()),
                    args: caps.get(self.args_group).map(|m| m.as_str().to_string()),
                    raw_text: whole.as_str().to_string(),
                })
            })
            .collect();
        Ok(matches)
    }

    fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Regex replacements for the built-in kinds, read from settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_l10n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_localizations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intl_message: Option<String>,
    /// Replaces the whole alias-declaration list. Group 1 must capture the alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_declarations: Option<Vec<String>>,
}

impl PatternOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn for_kind(&self, kind: &PatternKind) -> Option<&str> {
        match kind {
            PatternKind::GeneratedClassAccessor => self.generated_class.as_deref(),
            PatternKind::ContextExtension => self.context_l10n.as_deref(),
            PatternKind::NullableSingletonAccessor => self.app_localizations.as_deref(),
            PatternKind::MessageFunctionCall => self.intl_message.as_deref(),
            PatternKind::Custom(_) => None,
        }
    }
}

/// Why a set of overrides was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDiagnostic {
    /// The offending override (a kind name or `variable_declarations`).
    pub pattern: String,
    pub message: String,
}

impl std::fmt::Display for PatternDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid pattern '{}': {}; using default patterns",
            self.pattern, self.message
        )
    }
}

/// The active extractors plus the alias-declaration regexes.
pub struct PatternSet {
    builtin: Vec<Box<dyn MatchExtractor>>,
    custom: Vec<Box<dyn MatchExtractor>>,
    alias_declarations: Vec<Regex>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            builtin: DEFAULT_EXTRACTORS
                .iter()
                .cloned()
                .map(|e| Box::new(e) as Box<dyn MatchExtractor>)
                .collect(),
            custom: Vec::new(),
            alias_declarations: DEFAULT_ALIAS_DECLARATIONS.clone(),
        }
    }
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set with `overrides` applied. See [`PatternSet::apply_overrides`].
    pub fn with_overrides(overrides: &PatternOverrides) -> (Self, Option<PatternDiagnostic>) {
        let mut set = Self::default();
        let diagnostic = set.apply_overrides(overrides);
        (set, diagnostic)
    }

    /// Replaces the built-in extractors and alias declarations from `overrides`.
    ///
    /// Kinds without an override get their default regex. If any override fails
    /// to compile, every built-in falls back to its default and the failure is
    /// returned. Custom kinds are kept either way.
    pub fn apply_overrides(&mut self, overrides: &PatternOverrides) -> Option<PatternDiagnostic> {
        match compile_overrides(overrides) {
            Ok((builtin, alias_declarations)) => {
                self.builtin = builtin;
                self.alias_declarations = alias_declarations;
                None
            }
            Err(diagnostic) => {
                tracing::warn!(
                    pattern = %diagnostic.pattern,
                    error = %diagnostic.message,
                    "custom pattern failed to compile, falling back to defaults"
                );
                let defaults = Self::default();
                self.builtin = defaults.builtin;
                self.alias_declarations = defaults.alias_declarations;
                Some(diagnostic)
            }
        }
    }

    /// Active extractors in processing order: built-ins, then custom kinds.
    pub fn extractors(&self) -> impl Iterator<Item = &dyn MatchExtractor> {
        self.builtin
            .iter()
            .chain(self.custom.iter())
            .map(|e| e.as_ref())
    }

    pub fn alias_declarations(&self) -> &[Regex] {
        &self.alias_declarations
    }

    /// Registers an extra pattern classified as `PatternKind::Custom(name)`.
    ///
    /// Group 1 must capture the key and group 2, if present, the arguments.
    /// Registering an existing name replaces it.
    pub fn add_custom(&mut self, name: &str, pattern: &str) -> Result<(), regex::Error> {
        let extractor = RegexExtractor::for_kind(PatternKind::Custom(name.to_string()), pattern)?;
        self.add_extractor(Box::new(extractor));
        Ok(())
    }

    /// Installs an extractor, replacing the current one of the same kind.
    pub fn add_extractor(&mut self, extractor: Box<dyn MatchExtractor>) {
        let list = match extractor.kind() {
            PatternKind::Custom(_) => &mut self.custom,
            _ => &mut self.builtin,
        };
        match list.iter().position(|e| e.kind() == extractor.kind()) {
            Some(index) => list[index] = extractor,
            None => list.push(extractor),
        }
    }

    /// Removes a custom kind. Returns false if no such kind was registered.
    pub fn remove_custom(&mut self, name: &str) -> bool {
        let before = self.custom.len();
        self.custom
            .retain(|e| !matches!(e.kind(), PatternKind::Custom(n) if n == name));
        self.custom.len() != before
    }

    /// Kinds in processing order.
    pub fn supported_patterns(&self) -> Vec<PatternKind> {
        self.extractors().map(|e| e.kind().clone()).collect()
    }

    /// Quick check whether any active pattern matches `text`.
    pub fn has_references(&self, text: &str) -> bool {
        self.extractors().any(|e| e.is_match(text))
    }
}

type CompiledPatterns = (Vec<Box<dyn MatchExtractor>>, Vec<Regex>);

fn compile_overrides(overrides: &PatternOverrides) -> Result<CompiledPatterns, PatternDiagnostic> {
    let mut builtin: Vec<Box<dyn MatchExtractor>> = Vec::new();
    for (kind, default) in PatternKind::BUILTIN.iter().zip(DEFAULT_EXTRACTORS.iter()) {
        let extractor = match overrides.for_kind(kind) {
            Some(pattern) => RegexExtractor::for_kind(kind.clone(), pattern).map_err(|e| {
                PatternDiagnostic {
                    pattern: kind.to_string(),
                    message: e.to_string(),
                }
            })?,
            None => default.clone(),
        };
        builtin.push(Box::new(extractor));
    }

    let alias_declarations = match &overrides.variable_declarations {
        Some(patterns) => patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| PatternDiagnostic {
                    pattern: "variable_declarations".to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => DEFAULT_ALIAS_DECLARATIONS.clone(),
    };

    Ok((builtin, alias_declarations))
}

/// Returns true if `key` is a usable key name: `^[A-Za-z][A-Za-z0-9_]*$`.
pub fn is_valid_key_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Extracts parameter names from a call's argument text.
///
/// Named arguments (`name: expr`) yield `name`. Positional arguments yield
/// themselves when they are plain identifiers and nothing otherwise. Only
/// top-level commas split arguments.
pub fn parse_parameters(args: &str) -> Vec<String> {
    split_top_level(args)
        .into_iter()
        .filter_map(|arg| {
            let arg = arg.trim();
            if let Some((name, _)) = split_named(arg) {
                return Some(name.to_string());
            }
            is_valid_key_name(arg).then(|| arg.to_string())
        })
        .collect()
}

/// Splits on commas outside brackets and string literals.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

fn split_named(arg: &str) -> Option<(&str, &str)> {
    let (name, value) = arg.split_once(':')?;
    let name = name.trim();
    is_valid_key_name(name).then_some((name, value.trim()))
}

/// Renders an accessor snippet for `key` in the shape of `kind`.
///
/// Parameters are passed by name (`p: p`). Custom kinds render as a
/// generated-class access.
pub fn generate_reference(key: &str, kind: &PatternKind, parameters: Option<&[String]>) -> String {
    let named: Vec<String> = parameters
        .unwrap_or_default()
        .iter()
        .map(|p| format!("{}: {}", p, p))
        .collect();
    let call = if named.is_empty() {
        String::new()
    } else {
        format!("({})", named.join(", "))
    };

    match kind {
        PatternKind::GeneratedClassAccessor | PatternKind::Custom(_) => {
            format!("S.of(context).{}{}", key, call)
        }
        PatternKind::ContextExtension => format!("context.l10n.{}{}", key, call),
        PatternKind::NullableSingletonAccessor => {
            format!("AppLocalizations.of(context)!.{}{}", key, call)
        }
        PatternKind::MessageFunctionCall => {
            let extra = if named.is_empty() {
                String::new()
            } else {
                format!(", {}", named.join(", "))
            };
            format!("Intl.message('', name: '{}'{})", key, extra)
        }
    }
}
