//! One bus, store, scanner and cache set wired together.
//!
//! Nothing here is global: hosts that want a different wiring can build the
//! parts themselves. The engine only saves the boilerplate.

use std::{collections::BTreeMap, path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use crate::cache::{CacheInvalidator, CacheKeys, EphemeralCache, PrefixInvalidate, cached_translations};
use crate::config::Config;
use crate::core::{
    SourceContext, SourceLocation, TextDocument,
    data::{Position, Reference},
    matcher::{PatternDiagnostic, PatternOverrides, PatternSet},
    parsers::arb::LoadWarning,
    scanner::{ReferenceScanner, ScanResult},
    status::{KeyStatus, TranslationStatus, reconcile},
    store::{LoadReport, ResourceStore},
    watcher::CatalogWatcher,
};
use crate::events::EventBus;
use crate::issues::{
    InvalidPatternIssue, Issue, MissingParameterIssue, ParseErrorIssue, PartialTranslationIssue,
    ScanFindingIssue, UndefinedKeyIssue, UnknownParameterIssue,
};

pub struct Engine {
    bus: Arc<EventBus>,
    store: Arc<ResourceStore>,
    scanner: ReferenceScanner,
    translations: Arc<EphemeralCache<BTreeMap<String, String>>>,
    scans: Arc<EphemeralCache<ScanResult>>,
    _invalidator: CacheInvalidator,
    pattern_diagnostic: Option<PatternDiagnostic>,
    primary_locale: Option<String>,
    debounce: Duration,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(ResourceStore::new().with_bus(Arc::clone(&bus)));

        let (mut patterns, pattern_diagnostic) = PatternSet::with_overrides(&config.pattern_overrides());
        if config.enable_custom_patterns {
            for (name, pattern) in &config.extra_patterns {
                if let Err(e) = patterns.add_custom(name, pattern) {
                    tracing::warn!(kind = %name, error = %e, "ignoring extra pattern");
                }
            }
        }
        let scanner = ReferenceScanner::new(patterns).with_bus(Arc::clone(&bus));

        let translations = Arc::new(EphemeralCache::with_default_ttl(config.cache_ttl()));
        let scans = Arc::new(EphemeralCache::with_default_ttl(config.cache_ttl()));
        let invalidator = CacheInvalidator::attach(
            &bus,
            vec![
                translations.clone() as Arc<dyn PrefixInvalidate>,
                scans.clone() as Arc<dyn PrefixInvalidate>,
            ],
        );

        Self {
            bus,
            store,
            scanner,
            translations,
            scans,
            _invalidator: invalidator,
            pattern_diagnostic,
            primary_locale: config.primary_locale.clone(),
            debounce: config.debounce(),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    pub fn scanner(&self) -> &ReferenceScanner {
        &self.scanner
    }

    /// Loads every catalog in `arb_dir`, replacing what was loaded before.
    pub fn load(&self, arb_dir: &Path, template_file_name: &str) -> LoadReport {
        let report = self.store.load_all(arb_dir, template_file_name);
        self.bus.flush();
        report
    }

    /// Delivers queued events, returning how many were delivered.
    pub fn flush(&self) -> usize {
        self.bus.flush()
    }

    /// Recompiles the key patterns. Cached scans are dropped once the
    /// resulting event is delivered.
    pub fn reload_patterns(&mut self, overrides: &PatternOverrides) {
        self.pattern_diagnostic = self.scanner.reload(overrides);
        if let Some(diagnostic) = &self.pattern_diagnostic {
            tracing::warn!(%diagnostic, "pattern settings rejected");
        }
    }

    /// Why the configured pattern overrides were rejected, if they were.
    pub fn pattern_diagnostic(&self) -> Option<&PatternDiagnostic> {
        self.pattern_diagnostic.as_ref()
    }

    /// The rejected pattern overrides as an issue against `config_path`.
    pub fn pattern_issue(&self, config_path: &str) -> Option<Issue> {
        self.pattern_diagnostic.as_ref().map(|diagnostic| {
            InvalidPatternIssue {
                file_path: config_path.to_string(),
                pattern: diagnostic.pattern.clone(),
                error: diagnostic.message.clone(),
            }
            .into()
        })
    }

    /// The configured primary locale, else the template catalog's.
    pub fn default_locale(&self) -> String {
        self.primary_locale
            .clone()
            .unwrap_or_else(|| self.store.default_locale())
    }

    pub fn translations(&self, key: &str) -> BTreeMap<String, String> {
        cached_translations(&self.translations, &self.store, key)
    }

    pub fn key_status(&self, key: &str) -> KeyStatus {
        reconcile(key, &self.translations(key), &self.store.locales())
    }

    /// Scan result for one version of a document, reused until the version
    /// changes or the patterns are reloaded.
    pub fn scan_cached(&self, doc: &dyn TextDocument, version: u64) -> ScanResult {
        let key = CacheKeys::dart_parse_result(doc.path(), version);
        if let Some(result) = self.scans.get(&key) {
            return result;
        }
        let result = self.scanner.scan(doc);
        self.scans.set(key, result.clone(), None);
        result
    }

    /// Every reference whose key is not translated in all locales, call
    /// arguments that disagree with the template's placeholders, plus the
    /// scanner's own findings.
    pub fn check_document(&self, doc: &dyn TextDocument) -> Vec<Issue> {
        let result = self.scanner.scan(doc);
        let locales = self.store.locales();
        let default_locale = self.default_locale();
        let mut issues: Vec<Issue> = Vec::new();

        for reference in result.valid_references() {
            self.check_parameters(doc, reference, &default_locale, &mut issues);
            let status = reconcile(&reference.key, &self.translations(&reference.key), &locales);
            match status.status {
                TranslationStatus::Complete => {}
                TranslationStatus::Missing => issues.push(
                    UndefinedKeyIssue {
                        context: source_context(doc, reference.range.start),
                        key: reference.key.clone(),
                    }
                    .into(),
                ),
                TranslationStatus::Partial => issues.push(
                    PartialTranslationIssue {
                        context: source_context(doc, reference.range.start),
                        key: reference.key.clone(),
                        missing_in: status.missing_locales,
                    }
                    .into(),
                ),
            }
        }

        for diagnostic in result.diagnostics {
            match diagnostic.range {
                Some(range) => issues.push(
                    ScanFindingIssue {
                        context: source_context(doc, range.start),
                        rule: diagnostic.rule,
                        severity: diagnostic.severity,
                        message: diagnostic.message,
                    }
                    .into(),
                ),
                None => issues.push(
                    ParseErrorIssue {
                        file_path: doc.path().to_string(),
                        error: diagnostic.message,
                    }
                    .into(),
                ),
            }
        }

        issues
    }

    /// Compares named call arguments with the placeholders the key declares
    /// in `locale`. Calls without arguments, and keys without placeholders,
    /// are not checked.
    fn check_parameters(
        &self,
        doc: &dyn TextDocument,
        reference: &Reference,
        locale: &str,
        issues: &mut Vec<Issue>,
    ) {
        let Some(passed) = reference.parameters.as_deref().filter(|p| !p.is_empty()) else {
            return;
        };
        let Some(declared) = self.store.placeholder_names(&reference.key, locale) else {
            return;
        };

        for parameter in declared.iter().filter(|d| !passed.contains(d)) {
            issues.push(
                MissingParameterIssue {
                    context: source_context(doc, reference.range.start),
                    key: reference.key.clone(),
                    parameter: parameter.clone(),
                }
                .into(),
            );
        }
        for parameter in passed.iter().filter(|p| !declared.contains(p)) {
            issues.push(
                UnknownParameterIssue {
                    context: source_context(doc, reference.range.start),
                    key: reference.key.clone(),
                    parameter: parameter.clone(),
                }
                .into(),
            );
        }
    }

    /// Runs the bus dispatcher on the current Tokio runtime until
    /// [`EventBus::shutdown`].
    pub fn spawn_dispatcher(&self) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("The event dispatcher needs a Tokio runtime")?;
        let bus = Arc::clone(&self.bus);
        Ok(runtime.spawn(async move { bus.run_dispatcher().await }))
    }

    /// Starts the periodic sweep of both caches on the current Tokio runtime.
    ///
    /// The sweepers run until aborted or until the engine is dropped.
    pub fn spawn_sweepers(&self, interval: Duration) -> Result<Vec<JoinHandle<()>>> {
        let translations = self
            .translations
            .spawn_sweeper(interval)
            .context("Cache sweeping needs a Tokio runtime")?;
        let scans = self
            .scans
            .spawn_sweeper(interval)
            .context("Cache sweeping needs a Tokio runtime")?;
        Ok(vec![translations, scans])
    }

    /// Reloads catalogs from `arb_dir` as its files change.
    pub fn watch(&self, arb_dir: &Path) -> Result<CatalogWatcher> {
        CatalogWatcher::start(arb_dir, Arc::clone(&self.store), self.debounce)
    }

    pub fn load_warnings_as_issues(warnings: &[LoadWarning]) -> Vec<Issue> {
        warnings
            .iter()
            .map(|w| {
                ParseErrorIssue {
                    file_path: w.file_path.clone(),
                    error: w.error.clone(),
                }
                .into()
            })
            .collect()
    }
}

fn source_context(doc: &dyn TextDocument, position: Position) -> SourceContext {
    SourceContext::new(
        SourceLocation::from_position(doc.path(), position),
        doc.line_at(position.line).unwrap_or_default(),
    )
}
