//! In-memory catalogs for every locale, kept in sync with the ARB files.
//!
//! Every mutation updates memory first, then rewrites the affected file, then
//! publishes an event. The catalog map is locked once per file touched, so a
//! bulk operation is a series of independent single-file writes.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use thiserror::Error;

use crate::core::data::{Catalog, Entry};
use crate::core::parsers::arb::{
    LoadWarning, infer_locale, parse_arb_file, scan_arb_files, serialize_catalog,
};
use crate::core::status::{TranslationStatus, translation_status};
use crate::events::{ChangeType, EventBus, EventPayload};
use crate::utils::{read, write};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no catalog loaded for locale '{0}'")]
    LocaleNotFound(String),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize catalog '{locale}': {source}")]
    Serialize {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Whether a write created a key or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    Updated,
}

impl KeyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAction::Added => "added",
            KeyAction::Updated => "updated",
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    /// Locales loaded, in file-name order.
    pub locales: Vec<String>,
    pub warnings: Vec<LoadWarning>,
}

/// Outcome of an operation that touches several files.
///
/// Files are written independently, so some may succeed while others fail.
#[derive(Debug, Default)]
pub struct BulkResult {
    /// Locales whose file was written.
    pub applied: Vec<String>,
    /// Entries added, changed or removed across all files.
    pub entries: usize,
    pub failures: Vec<(String, StoreError)>,
}

impl BulkResult {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, locale: &str, changed: usize, result: Result<(), StoreError>) {
        match result {
            Ok(()) => {
                self.applied.push(locale.to_string());
                self.entries += changed;
            }
            Err(e) => {
                tracing::error!(locale, error = %e, "catalog update failed");
                self.failures.push((locale.to_string(), e));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocaleStats {
    /// Keys with a non-blank value in this locale.
    pub translated: usize,
    /// Keys present in some catalog but absent or blank here.
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub total_keys: usize,
    pub total_locales: usize,
    pub complete: usize,
    pub partial: usize,
    pub missing: usize,
    /// Share of complete keys, 0 to 100.
    pub completion_rate: f64,
    pub locales: BTreeMap<String, LocaleStats>,
}

pub struct ResourceStore {
    catalogs: RwLock<BTreeMap<String, Catalog>>,
    template_file_name: RwLock<Option<String>>,
    generation: AtomicU64,
    bus: Option<Arc<EventBus>>,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore {
    pub fn new() -> Self {
        Self {
            catalogs: RwLock::new(BTreeMap::new()),
            template_file_name: RwLock::new(None),
            generation: AtomicU64::new(0),
            bus: None,
        }
    }

    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Replaces all catalogs with the `*.arb` files found in `dir`.
    pub fn load_all(&self, dir: &Path, template_file_name: &str) -> LoadReport {
        let scanned = scan_arb_files(dir, template_file_name);
        let mut report = LoadReport {
            locales: Vec::new(),
            warnings: scanned.warnings,
        };

        let mut catalogs = BTreeMap::new();
        for catalog in scanned.catalogs {
            if let Some(previous) = catalogs.get(&catalog.locale).map(|c: &Catalog| c.source_path.clone()) {
                tracing::warn!(
                    locale = %catalog.locale,
                    kept = %catalog.source_path.display(),
                    replaced = %previous.display(),
                    "two ARB files map to the same locale"
                );
            } else {
                report.locales.push(catalog.locale.clone());
            }
            catalogs.insert(catalog.locale.clone(), catalog);
        }

        tracing::info!(
            dir = %dir.display(),
            locales = report.locales.len(),
            warnings = report.warnings.len(),
            "loaded ARB catalogs"
        );
        *write(&self.catalogs) = catalogs;
        *write(&self.template_file_name) = Some(template_file_name.to_string());
        self.bump();
        report
    }

    /// Adds or replaces one catalog without touching the disk.
    pub fn insert(&self, catalog: Catalog) {
        write(&self.catalogs).insert(catalog.locale.clone(), catalog);
        self.bump();
    }

    pub fn clear(&self) {
        write(&self.catalogs).clear();
        self.bump();
    }

    /// Counter increased by every change to the catalogs.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn catalogs(&self) -> BTreeMap<String, Catalog> {
        read(&self.catalogs).clone()
    }

    pub fn catalog(&self, locale: &str) -> Option<Catalog> {
        read(&self.catalogs).get(locale).cloned()
    }

    pub fn locales(&self) -> Vec<String> {
        read(&self.catalogs).keys().cloned().collect()
    }

    pub fn locale_count(&self) -> usize {
        read(&self.catalogs).len()
    }

    pub fn get_translation(&self, key: &str, locale: &str) -> Option<String> {
        read(&self.catalogs)
            .get(locale)
            .and_then(|c| c.get(key))
            .map(|e| e.value.clone())
    }

    /// Every locale holding an entry for `key`, including empty values.
    pub fn get_all_translations(&self, key: &str) -> BTreeMap<String, String> {
        read(&self.catalogs)
            .iter()
            .filter_map(|(locale, c)| c.get(key).map(|e| (locale.clone(), e.value.clone())))
            .collect()
    }

    /// Placeholder names `key` declares in `locale`, in declaration order.
    /// `None` when the entry is missing or declares none.
    pub fn placeholder_names(&self, key: &str, locale: &str) -> Option<Vec<String>> {
        let catalogs = read(&self.catalogs);
        let placeholders = catalogs.get(locale)?.get(key)?.placeholders.as_ref()?;
        Some(placeholders.keys().cloned().collect())
    }

    pub fn status(&self, key: &str) -> TranslationStatus {
        translation_status(&self.get_all_translations(key), self.locale_count())
    }

    pub fn all_keys(&self) -> BTreeSet<String> {
        read(&self.catalogs)
            .values()
            .flat_map(|c| c.entries.keys().cloned())
            .collect()
    }

    /// The template catalog's locale, or `en` when no template is loaded.
    pub fn default_locale(&self) -> String {
        read(&self.catalogs)
            .values()
            .find(|c| c.is_template)
            .map(|c| c.locale.clone())
            .unwrap_or_else(|| "en".to_string())
    }

    /// Sets one value and writes the file.
    ///
    /// An existing entry keeps its placeholders and metadata; its description
    /// changes only when one is given.
    pub fn set_translation(
        &self,
        key: &str,
        locale: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<KeyAction, StoreError> {
        let action = {
            let mut catalogs = write(&self.catalogs);
            let catalog = catalogs
                .get_mut(locale)
                .ok_or_else(|| StoreError::LocaleNotFound(locale.to_string()))?;
            let action = upsert(catalog, key, value, description);
            self.bump();
            persist(catalog)?;
            action
        };

        tracing::debug!(key, locale, action = action.as_str(), "translation written");
        self.publish(EventPayload::TranslationUpdated {
            key: key.to_string(),
            locale: locale.to_string(),
            value: value.to_string(),
        });
        Ok(action)
    }

    /// Sets `key` in several locales, one file at a time.
    pub fn set_translations(
        &self,
        key: &str,
        translations: &BTreeMap<String, String>,
        description: Option<&str>,
    ) -> BulkResult {
        let mut result = BulkResult::default();
        for (locale, value) in translations {
            let outcome = self
                .set_translation(key, locale, value, description)
                .map(|_| ());
            result.record(locale, 1, outcome);
        }
        result
    }

    /// Adds `key` to every catalog: the default locale gets `default_value`,
    /// the others an empty string.
    pub fn create_translation_key(
        &self,
        key: &str,
        default_value: &str,
        description: Option<&str>,
    ) -> BulkResult {
        let default_locale = self.default_locale();
        let mut result = BulkResult::default();
        for locale in self.locales() {
            let value = if locale == default_locale { default_value } else { "" };
            let outcome = self
                .set_translation(key, &locale, value, description)
                .map(|_| ());
            result.record(&locale, 1, outcome);
        }
        self.publish(EventPayload::TranslationKeyCreated {
            key: key.to_string(),
            locales: result.applied.clone(),
        });
        result
    }

    /// Removes `key` from one locale. Returns false if the key was absent.
    pub fn delete_translation(&self, locale: &str, key: &str) -> Result<bool, StoreError> {
        {
            let mut catalogs = write(&self.catalogs);
            let catalog = catalogs
                .get_mut(locale)
                .ok_or_else(|| StoreError::LocaleNotFound(locale.to_string()))?;
            if catalog.entries.shift_remove(key).is_none() {
                return Ok(false);
            }
            self.bump();
            persist(catalog)?;
        }

        self.publish(EventPayload::TranslationDeleted {
            key: key.to_string(),
            locale: locale.to_string(),
        });
        Ok(true)
    }

    /// Removes `key` from every catalog that has it.
    pub fn delete_key(&self, key: &str) -> BulkResult {
        let mut result = BulkResult::default();
        for locale in self.locales() {
            match self.delete_translation(&locale, key) {
                Ok(true) => result.record(&locale, 1, Ok(())),
                Ok(false) => {}
                Err(e) => result.record(&locale, 0, Err(e)),
            }
        }
        result
    }

    /// Copies every locale's entry for `from` to `to`, metadata included.
    pub fn duplicate_key(&self, from: &str, to: &str) -> BulkResult {
        let mut result = BulkResult::default();
        for locale in self.locales() {
            let copied = {
                let mut catalogs = write(&self.catalogs);
                let Some(catalog) = catalogs.get_mut(&locale) else {
                    continue;
                };
                let Some(source) = catalog.get(from).cloned() else {
                    continue;
                };
                let value = source.value.clone();
                catalog.entries.insert(
                    to.to_string(),
                    Entry {
                        key: to.to_string(),
                        ..source
                    },
                );
                self.bump();
                persist(catalog).map(|()| value)
            };
            match copied {
                Ok(value) => {
                    result.record(&locale, 1, Ok(()));
                    self.publish(EventPayload::TranslationUpdated {
                        key: to.to_string(),
                        locale: locale.clone(),
                        value,
                    });
                }
                Err(e) => result.record(&locale, 0, Err(e)),
            }
        }
        result
    }

    /// Reorders one catalog by key, in memory only.
    pub fn sort_entries(&self, locale: &str) -> Result<(), StoreError> {
        write(&self.catalogs)
            .get_mut(locale)
            .ok_or_else(|| StoreError::LocaleNotFound(locale.to_string()))?
            .sort_entries();
        self.bump();
        Ok(())
    }

    pub fn save_locale(&self, locale: &str) -> Result<(), StoreError> {
        let mut catalogs = write(&self.catalogs);
        let catalog = catalogs
            .get_mut(locale)
            .ok_or_else(|| StoreError::LocaleNotFound(locale.to_string()))?;
        persist(catalog)
    }

    /// Keys mapped to the locales where they are absent or blank.
    pub fn missing_translations(&self) -> BTreeMap<String, Vec<String>> {
        let catalogs = read(&self.catalogs);
        let keys: BTreeSet<&String> = catalogs.values().flat_map(|c| c.entries.keys()).collect();

        let mut missing = BTreeMap::new();
        for key in keys {
            let locales: Vec<String> = catalogs
                .iter()
                .filter(|(_, c)| c.get(key).is_none_or(|e| e.value.trim().is_empty()))
                .map(|(locale, _)| locale.clone())
                .collect();
            if !locales.is_empty() {
                missing.insert(key.clone(), locales);
            }
        }
        missing
    }

    /// Placeholder values `generate_missing` would write, by locale.
    ///
    /// Keys without a non-empty value in `default_locale` are left out.
    pub fn fill_plan(
        &self,
        default_locale: &str,
    ) -> Result<BTreeMap<String, Vec<(String, String)>>, StoreError> {
        let catalogs = read(&self.catalogs);
        let defaults = catalogs
            .get(default_locale)
            .ok_or_else(|| StoreError::LocaleNotFound(default_locale.to_string()))?;
        let keys: BTreeSet<&String> = catalogs.values().flat_map(|c| c.entries.keys()).collect();

        let mut plan: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
        for key in keys {
            let Some(default) = defaults.get(key).filter(|e| !e.value.is_empty()) else {
                continue;
            };
            for (locale, catalog) in catalogs.iter() {
                if locale != default_locale && !catalog.contains_key(key) {
                    plan.entry(locale.clone()).or_default().push((
                        key.clone(),
                        format!("[{}] {}", locale.to_uppercase(), default.value),
                    ));
                }
            }
        }
        Ok(plan)
    }

    /// Adds `"[XX] <default value>"` for every key a locale lacks.
    ///
    /// Keys without a non-empty value in `default_locale` are skipped.
    pub fn generate_missing(&self, default_locale: &str) -> BulkResult {
        let plan = match self.fill_plan(default_locale) {
            Ok(plan) => plan,
            Err(e) => {
                let mut result = BulkResult::default();
                result.record(default_locale, 0, Err(e));
                return result;
            }
        };

        let mut result = BulkResult::default();
        for (locale, entries) in plan {
            let outcome = {
                let mut catalogs = write(&self.catalogs);
                match catalogs.get_mut(&locale) {
                    Some(catalog) => {
                        for (key, value) in &entries {
                            upsert(catalog, key, value, None);
                        }
                        self.bump();
                        persist(catalog)
                    }
                    None => Err(StoreError::LocaleNotFound(locale.clone())),
                }
            };
            let succeeded = outcome.is_ok();
            result.record(&locale, entries.len(), outcome);
            if succeeded {
                for (key, value) in entries {
                    self.publish(EventPayload::TranslationUpdated {
                        key,
                        locale: locale.clone(),
                        value,
                    });
                }
            }
        }
        result
    }

    /// Key to locale to value over all catalogs, `""` where a locale lacks the key.
    pub fn export_matrix(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        let catalogs = read(&self.catalogs);
        let keys: BTreeSet<&String> = catalogs.values().flat_map(|c| c.entries.keys()).collect();
        keys.into_iter()
            .map(|key| {
                let row = catalogs
                    .iter()
                    .map(|(locale, c)| {
                        let value = c.get(key).map(|e| e.value.clone()).unwrap_or_default();
                        (locale.clone(), value)
                    })
                    .collect();
                (key.clone(), row)
            })
            .collect()
    }

    /// Writes the non-empty values of a key/locale/value matrix, one file per locale.
    pub fn import_matrix(&self, matrix: &BTreeMap<String, BTreeMap<String, String>>) -> BulkResult {
        let mut by_locale: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for (key, row) in matrix {
            for (locale, value) in row {
                if !value.is_empty() {
                    by_locale.entry(locale).or_default().push((key, value));
                }
            }
        }

        let mut result = BulkResult::default();
        for (locale, entries) in by_locale {
            let outcome = {
                let mut catalogs = write(&self.catalogs);
                match catalogs.get_mut(locale) {
                    Some(catalog) => {
                        for (key, value) in &entries {
                            upsert(catalog, key, value, None);
                        }
                        self.bump();
                        persist(catalog)
                    }
                    None => Err(StoreError::LocaleNotFound(locale.to_string())),
                }
            };
            let succeeded = outcome.is_ok();
            result.record(locale, entries.len(), outcome);
            if succeeded {
                for (key, value) in entries {
                    self.publish(EventPayload::TranslationUpdated {
                        key: key.to_string(),
                        locale: locale.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        result
    }

    pub fn statistics(&self) -> Statistics {
        let catalogs = read(&self.catalogs);
        let keys: BTreeSet<&String> = catalogs.values().flat_map(|c| c.entries.keys()).collect();
        let mut stats = Statistics {
            total_keys: keys.len(),
            total_locales: catalogs.len(),
            ..Default::default()
        };

        for key in &keys {
            let present = catalogs.values().filter(|c| c.contains_key(key)).count();
            match (present, catalogs.len()) {
                (0, _) => stats.missing += 1,
                (n, total) if n < total => stats.partial += 1,
                _ => stats.complete += 1,
            }
        }

        for (locale, catalog) in catalogs.iter() {
            let translated = keys
                .iter()
                .filter(|key| catalog.get(key).is_some_and(|e| !e.value.trim().is_empty()))
                .count();
            stats.locales.insert(
                locale.clone(),
                LocaleStats {
                    translated,
                    missing: keys.len() - translated,
                },
            );
        }

        if stats.total_keys > 0 {
            stats.completion_rate = stats.complete as f64 * 100.0 / stats.total_keys as f64;
        }
        stats
    }

    /// Reloads or drops the catalog behind `path` after an external change.
    ///
    /// A file that fails to parse keeps its previous catalog and yields a
    /// warning. `CatalogFileChanged` is published either way.
    pub fn handle_file_change(&self, path: &Path, change: ChangeType) -> Option<LoadWarning> {
        let locale = infer_locale(path);
        let mut warning = None;

        match change {
            ChangeType::Deleted => {
                let removed = write(&self.catalogs).remove(&locale).is_some();
                tracing::info!(path = %path.display(), locale, removed, "ARB file deleted");
            }
            ChangeType::Created | ChangeType::Modified => {
                let is_template = self.is_template_path(path, &locale);
                match parse_arb_file(path, is_template) {
                    Ok(parsed) => {
                        tracing::info!(path = %path.display(), locale, %change, "ARB file reloaded");
                        write(&self.catalogs).insert(locale.clone(), parsed.catalog);
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %format!("{:#}", e), "failed to reload ARB file");
                        warning = Some(LoadWarning {
                            file_path: path.to_string_lossy().to_string(),
                            error: format!("{:#}", e),
                        });
                    }
                }
            }
        }

        self.bump();
        self.publish(EventPayload::CatalogFileChanged {
            path: path.to_path_buf(),
            locale,
            change,
        });
        warning
    }

    fn is_template_path(&self, path: &Path, locale: &str) -> bool {
        let by_name = read(&self.template_file_name)
            .as_deref()
            .zip(path.file_name().and_then(|n| n.to_str()))
            .is_some_and(|(template, name)| template == name);
        by_name
            || read(&self.catalogs)
                .get(locale)
                .is_some_and(|c| c.is_template)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn publish(&self, payload: EventPayload) {
        if let Some(bus) = &self.bus {
            bus.publish(payload);
        }
    }
}

fn upsert(catalog: &mut Catalog, key: &str, value: &str, description: Option<&str>) -> KeyAction {
    match catalog.entries.get_mut(key) {
        Some(entry) => {
            entry.value = value.to_string();
            if let Some(description) = description {
                entry.description = Some(description.to_string());
            }
            KeyAction::Updated
        }
        None => {
            let mut entry = Entry::new(key, value);
            entry.description = description.map(str::to_string);
            catalog.entries.insert(key.to_string(), entry);
            KeyAction::Added
        }
    }
}

fn persist(catalog: &mut Catalog) -> Result<(), StoreError> {
    let content = serialize_catalog(catalog).map_err(|source| StoreError::Serialize {
        locale: catalog.locale.clone(),
        source,
    })?;
    fs::write(&catalog.source_path, content).map_err(|source| StoreError::Io {
        path: catalog.source_path.clone(),
        source,
    })?;
    catalog.last_modified_at = SystemTime::now();
    Ok(())
}
