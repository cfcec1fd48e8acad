//! Finds localization-key references in Dart source text.
//!
//! A scan runs every extractor of the [`PatternSet`] over the whole text, then
//! resolves local aliases (`final l10n = context.l10n;`) and scans for
//! `alias.key` accesses. References come out grouped by pattern kind, in
//! processing order, and within a kind in text order.

use std::{collections::BTreeSet, sync::Arc, time::SystemTime};

use crate::core::data::{PatternKind, Position, Range, Reference};
use crate::core::document::{EditSink, TextDocument};
use crate::core::matcher::{
    MatchExtractor, PatternDiagnostic, PatternOverrides, PatternSet, RawMatch, RegexExtractor,
    generate_reference, is_valid_key_name, parse_parameters,
};
use crate::events::{EventBus, EventPayload};
use crate::issues::{Rule, Severity};

/// Keys longer than this are flagged.
pub const MAX_KEY_LENGTH: usize = 64;

/// A problem found while scanning one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDiagnostic {
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
    /// Where the problem is, when it concerns one reference.
    pub range: Option<Range>,
}

impl ScanDiagnostic {
    fn at(rule: Rule, severity: Severity, message: String, range: Range) -> Self {
        Self {
            rule,
            severity,
            message,
            range: Some(range),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub path: String,
    pub references: Vec<Reference>,
    pub diagnostics: Vec<ScanDiagnostic>,
    pub timestamp: SystemTime,
}

impl ScanResult {
    pub fn valid_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_valid)
    }
}

pub struct ReferenceScanner {
    patterns: PatternSet,
    bus: Option<Arc<EventBus>>,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(PatternSet::default())
    }
}

impl ReferenceScanner {
    pub fn new(patterns: PatternSet) -> Self {
        Self {
            patterns,
            bus: None,
        }
    }

    /// Publishes `ParseCompleted` after each scan and `PluginConfigChanged`
    /// after each reload.
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternSet {
        &mut self.patterns
    }

    /// Recompiles the built-in patterns from new settings.
    pub fn reload(&mut self, overrides: &PatternOverrides) -> Option<PatternDiagnostic> {
        let diagnostic = self.patterns.apply_overrides(overrides);
        tracing::debug!(
            patterns = ?self.patterns.supported_patterns(),
            fallback = diagnostic.is_some(),
            "reloaded key patterns"
        );
        if let Some(bus) = &self.bus {
            bus.publish(EventPayload::PluginConfigChanged);
        }
        diagnostic
    }

    pub fn scan(&self, doc: &dyn TextDocument) -> ScanResult {
        let text = doc.text();
        let mut references = Vec::new();
        let mut diagnostics = Vec::new();

        for extractor in self.patterns.extractors() {
            self.collect(doc, extractor, false, &mut references, &mut diagnostics);
        }

        for alias in find_aliases(text, &self.patterns) {
            match RegexExtractor::for_alias(&alias) {
                Ok(extractor) => {
                    self.collect(doc, &extractor, true, &mut references, &mut diagnostics)
                }
                Err(e) => diagnostics.push(ScanDiagnostic {
                    rule: Rule::ScanError,
                    severity: Severity::Error,
                    message: format!("Parse error: alias '{}': {}", alias, e),
                    range: None,
                }),
            }
        }

        for reference in &mut references {
            diagnostics.extend(validate_reference(doc, reference));
        }

        tracing::debug!(
            path = doc.path(),
            references = references.len(),
            diagnostics = diagnostics.len(),
            "scanned document"
        );
        if let Some(bus) = &self.bus {
            bus.publish(EventPayload::ParseCompleted {
                path: doc.path().to_string(),
                references: references.len(),
                diagnostics: diagnostics.len(),
            });
        }

        ScanResult {
            path: doc.path().to_string(),
            references,
            diagnostics,
            timestamp: SystemTime::now(),
        }
    }

    /// The reference whose range contains `position`, if any.
    pub fn reference_at(&self, doc: &dyn TextDocument, position: Position) -> Option<Reference> {
        self.scan(doc)
            .references
            .into_iter()
            .find(|r| r.range.contains(position))
    }

    /// References that start or end on `line`. A call whose arguments span
    /// several lines belongs to its first and last line.
    pub fn references_in_line(&self, doc: &dyn TextDocument, line: usize) -> Vec<Reference> {
        self.scan(doc)
            .references
            .into_iter()
            .filter(|r| r.range.start.line == line || r.range.end.line == line)
            .collect()
    }

    pub fn find_key_usages(&self, doc: &dyn TextDocument, key: &str) -> Vec<Reference> {
        self.scan(doc)
            .references
            .into_iter()
            .filter(|r| r.key == key)
            .collect()
    }

    /// Keys of all valid references.
    pub fn unique_keys(&self, doc: &dyn TextDocument) -> BTreeSet<String> {
        self.scan(doc)
            .references
            .into_iter()
            .filter(|r| r.is_valid)
            .map(|r| r.key)
            .collect()
    }

    /// Rewrites one reference to use `new_key`, keeping its accessor style and
    /// parameters. Returns whether the sink applied the edit.
    pub fn replace_reference(
        &self,
        sink: &mut dyn EditSink,
        reference: &Reference,
        new_key: &str,
    ) -> bool {
        if !is_valid_key_name(new_key) {
            tracing::warn!(key = new_key, "refusing to replace with an invalid key name");
            return false;
        }
        let text = generate_reference(
            new_key,
            &reference.pattern_kind,
            reference.parameters.as_deref(),
        );
        sink.apply(reference.span, &text)
    }

    fn collect(
        &self,
        doc: &dyn TextDocument,
        extractor: &dyn MatchExtractor,
        is_alias: bool,
        references: &mut Vec<Reference>,
        diagnostics: &mut Vec<ScanDiagnostic>,
    ) {
        let matches = match extractor.extract(doc.text()) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(kind = %extractor.kind(), error = %e, "extractor failed");
                diagnostics.push(ScanDiagnostic {
                    rule: Rule::ScanError,
                    severity: Severity::Error,
                    message: format!("Parse error: {:#}", e),
                    range: None,
                });
                return;
            }
        };

        for m in matches {
            if is_alias && follows_member_access(doc.text(), m.span.start) {
                continue;
            }
            if let Some(reference) = build_reference(doc, m, extractor.kind()) {
                references.push(reference);
            }
        }
    }
}

fn build_reference(doc: &dyn TextDocument, m: RawMatch, kind: &PatternKind) -> Option<Reference> {
    if !is_valid_key_name(&m.key) {
        return None;
    }
    Some(Reference {
        range: Range::new(doc.position_at(m.span.start), doc.position_at(m.span.end)),
        parameters: m.args.as_deref().map(parse_parameters),
        key: m.key,
        span: m.span,
        pattern_kind: kind.clone(),
        raw_text: m.raw_text,
        is_valid: true,
    })
}

/// Local names bound to a localization accessor, deduplicated in order of
/// first declaration.
fn find_aliases(text: &str, patterns: &PatternSet) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    for declaration in patterns.alias_declarations() {
        for captures in declaration.captures_iter(text) {
            if let Some(name) = captures.get(1)
                && !aliases.iter().any(|a| a == name.as_str())
            {
                aliases.push(name.as_str().to_string());
            }
        }
    }
    aliases
}

/// `context.l10n.key` must not also count as an access on an alias named `l10n`.
fn follows_member_access(text: &str, offset: usize) -> bool {
    text[..offset].ends_with('.')
}

fn validate_reference(doc: &dyn TextDocument, reference: &mut Reference) -> Vec<ScanDiagnostic> {
    let mut diagnostics = Vec::new();

    if reference.key.len() > MAX_KEY_LENGTH {
        diagnostics.push(ScanDiagnostic::at(
            Rule::KeyTooLong,
            Severity::Warning,
            format!("Key name too long: {}", reference.key),
            reference.range,
        ));
    }

    if reference.key.contains("__") {
        diagnostics.push(ScanDiagnostic::at(
            Rule::KeyStyle,
            Severity::Info,
            format!("Avoid double underscores in key name: {}", reference.key),
            reference.range,
        ));
    }

    let start = reference.range.start;
    if doc
        .line_at(start.line)
        .is_some_and(|line| is_in_string_or_comment(line, start.column))
    {
        reference.is_valid = false;
        diagnostics.push(ScanDiagnostic::at(
            Rule::CommentedReference,
            Severity::Info,
            format!("Reference found in string or comment: {}", reference.key),
            reference.range,
        ));
    }

    diagnostics
}

/// Whether character column `column` of `line` sits inside a string literal
/// or after a `//` comment start.
pub fn is_in_string_or_comment(line: &str, column: usize) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = line.chars().take(column).peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '/' && chars.peek() == Some(&'/') {
                    return true;
                }
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
            }
        }
    }

    quote.is_some()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::document::SourceText;
    use crate::events::EventKind;

    fn scan(text: &str) -> ScanResult {
        ReferenceScanner::default().scan(&SourceText::new("lib/main.dart", text))
    }

    #[test]
    fn test_generated_class_property() {
        let result = scan("Text(S.of(context).myKey)");
        assert_eq!(result.references.len(), 1);
        let reference = &result.references[0];
        assert_eq!(reference.key, "myKey");
        assert_eq!(reference.pattern_kind, PatternKind::GeneratedClassAccessor);
        assert_eq!(reference.parameters, None);
        assert_eq!(reference.raw_text, "S.of(context).myKey");
        assert!(reference.is_valid);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.path, "lib/main.dart");
    }

    #[test]
    fn test_context_extension_call_with_argument() {
        let result = scan("Text(context.l10n.greetUser(userName))");
        assert_eq!(result.references.len(), 1);
        let reference = &result.references[0];
        assert_eq!(reference.key, "greetUser");
        assert_eq!(reference.pattern_kind, PatternKind::ContextExtension);
        assert_eq!(reference.parameters, Some(vec!["userName".to_string()]));
    }

    #[test]
    fn test_reference_in_line_comment_is_invalid() {
        let result = scan("  // Text(S.of(context).fakeKey)\nText(S.of(context).realKey)");
        assert_eq!(result.references.len(), 2);

        let fake = &result.references[0];
        assert_eq!(fake.key, "fakeKey");
        assert!(!fake.is_valid);
        assert!(result.references[1].is_valid);

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, Rule::CommentedReference);
        assert_eq!(result.diagnostics[0].severity, Severity::Info);
        assert_eq!(result.diagnostics[0].range, Some(fake.range));
    }

    #[test]
    fn test_reference_in_string_is_invalid() {
        let result = scan(r#"print("S.of(context).quoted");"#);
        assert_eq!(result.references.len(), 1);
        assert!(!result.references[0].is_valid);
    }

    #[test]
    fn test_failed_override_keeps_default_matches() {
        let overrides = PatternOverrides {
            generated_class: Some("S\\.of(".to_string()),
            ..Default::default()
        };
        let (patterns, diagnostic) = PatternSet::with_overrides(&overrides);
        assert!(diagnostic.is_some());

        let scanner = ReferenceScanner::new(patterns);
        let result = scanner.scan(&SourceText::new("a.dart", "Text(S.of(context).myKey)"));
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].key, "myKey");
    }

    #[test]
    fn test_ordering_is_kind_major() {
        let text = "context.l10n.first;\nS.of(context).second;\nAppLocalizations.of(context)!.third;";
        let keys: Vec<_> = scan(text).references.into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let scanner = ReferenceScanner::default();
        let doc = SourceText::new(
            "a.dart",
            "final l10n = context.l10n;\nl10n.title;\nS.of(context).body(count: n);",
        );
        let first = scanner.scan(&doc);
        let second = scanner.scan(&doc);
        assert_eq!(first.references, second.references);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_alias_accesses() {
        let text = "final l10n = context.l10n;\nfinal loc = AppLocalizations.of(context)!;\nText(l10n.title);\nText(loc.subtitle(name: user));\nText(context.l10n.body);";
        let result = scan(text);
        let found: Vec<_> = result
            .references
            .iter()
            .map(|r| (r.key.as_str(), r.pattern_kind.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("body", PatternKind::ContextExtension),
                ("subtitle", PatternKind::NullableSingletonAccessor),
                ("title", PatternKind::NullableSingletonAccessor),
            ]
        );
        assert_eq!(
            result.references[1].parameters,
            Some(vec!["name".to_string()])
        );
    }

    #[test]
    fn test_long_and_double_underscore_keys() {
        let long_key = format!("k{}", "a".repeat(MAX_KEY_LENGTH));
        let text = format!("S.of(context).{};\nS.of(context).bad__name;", long_key);
        let result = scan(&text);
        let rules: Vec<_> = result
            .diagnostics
            .iter()
            .map(|d| (d.rule, d.severity))
            .collect();
        assert_eq!(
            rules,
            vec![
                (Rule::KeyTooLong, Severity::Warning),
                (Rule::KeyStyle, Severity::Info),
            ]
        );
        assert!(result.references.iter().all(|r| r.is_valid));
    }

    #[test]
    fn test_range_positions() {
        let result = scan("a\n  S.of(context).title;");
        let reference = &result.references[0];
        assert_eq!(reference.range.start, Position::new(1, 2));
        assert_eq!(reference.range.end, Position::new(1, 21));
    }

    #[test]
    fn test_queries() {
        let scanner = ReferenceScanner::default();
        let doc = SourceText::new(
            "a.dart",
            "S.of(context).title;\ncontext.l10n.title;\n// S.of(context).hidden\nS.of(context).body;",
        );

        let at = scanner.reference_at(&doc, Position::new(1, 15)).unwrap();
        assert_eq!(at.key, "title");
        assert_eq!(at.pattern_kind, PatternKind::ContextExtension);
        assert!(scanner.reference_at(&doc, Position::new(0, 40)).is_none());

        let line = scanner.references_in_line(&doc, 3);
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].key, "body");

        assert_eq!(scanner.find_key_usages(&doc, "title").len(), 2);

        let keys: Vec<_> = scanner.unique_keys(&doc).into_iter().collect();
        assert_eq!(keys, vec!["body", "title"]);
    }

    #[test]
    fn test_references_in_line_match_either_end() {
        let scanner = ReferenceScanner::default();
        let doc = SourceText::new(
            "a.dart",
            "final a = S.of(context).greet(\n  name: user,\n);\nS.of(context).title;",
        );
        let greet = &scanner.scan(&doc).references[0];
        assert_eq!(greet.key, "greet");
        assert_eq!(greet.range.start.line, 0);
        assert_eq!(greet.range.end.line, 2);

        let keys = |line| -> Vec<String> {
            scanner
                .references_in_line(&doc, line)
                .into_iter()
                .map(|r| r.key)
                .collect()
        };
        assert_eq!(keys(0), vec!["greet"]);
        assert!(keys(1).is_empty());
        assert_eq!(keys(2), vec!["greet"]);
        assert_eq!(keys(3), vec!["title"]);
    }

    #[test]
    fn test_replace_reference() {
        let scanner = ReferenceScanner::default();
        let mut doc = SourceText::new("a.dart", "Text(S.of(context).greet(name: user));");
        let reference = scanner.scan(&doc).references.remove(0);

        assert!(scanner.replace_reference(&mut doc, &reference, "welcome"));
        assert_eq!(doc.text(), "Text(S.of(context).welcome(name: name));");

        let reference = scanner.scan(&doc).references.remove(0);
        assert!(!scanner.replace_reference(&mut doc, &reference, "9bad"));
    }

    #[test]
    fn test_bus_notifications() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [EventKind::ParseCompleted, EventKind::PluginConfigChanged] {
            let seen = Arc::clone(&seen);
            bus.subscribe(kind, move |event| {
                seen.lock().unwrap().push(event.payload.clone());
                Ok(())
            });
        }

        let mut scanner = ReferenceScanner::default().with_bus(Arc::clone(&bus));
        scanner.scan(&SourceText::new("a.dart", "S.of(context).x;"));
        scanner.reload(&PatternOverrides::default());
        bus.flush();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventPayload::ParseCompleted {
                    path: "a.dart".into(),
                    references: 1,
                    diagnostics: 0,
                },
                EventPayload::PluginConfigChanged,
            ]
        );
    }

    #[test]
    fn test_is_in_string_or_comment() {
        assert!(is_in_string_or_comment("// x", 3));
        assert!(is_in_string_or_comment("a = 'x", 6));
        assert!(!is_in_string_or_comment("a = 'x' + y", 10));
        assert!(is_in_string_or_comment(r#"a = "it\"s x"#, 11));
        assert!(!is_in_string_or_comment("a = '//' + x", 11));
        assert!(!is_in_string_or_comment("x / y", 4));
    }
}
