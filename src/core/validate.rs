//! Structural checks over loaded catalogs.
//!
//! Nothing here blocks a load or a save: every finding is an [`Issue`] for
//! the reporters.

use std::{collections::BTreeMap, fs};

use crate::core::data::{Catalog, MessageContext, MessageLocation};
use crate::core::matcher::is_valid_key_name;
use crate::core::parsers::arb::find_key_line;
use crate::issues::{
    EmptyTranslationIssue, InvalidKeyIssue, Issue, MissingTranslationIssue,
    UndefinedPlaceholderIssue, UnusedPlaceholderIssue,
};
use crate::utils::build_line_index;

/// Resolves key positions inside one ARB file.
struct KeyLines {
    file_path: String,
    content: String,
    line_index: Vec<usize>,
}

impl KeyLines {
    fn for_catalog(catalog: &Catalog) -> Self {
        // Unreadable files still validate; every key then points at line 1.
        let content = fs::read_to_string(&catalog.source_path).unwrap_or_default();
        let line_index = build_line_index(&content);
        Self {
            file_path: catalog.source_path.to_string_lossy().to_string(),
            content,
            line_index,
        }
    }

    fn context(&self, key: &str, value: &str) -> MessageContext {
        let line = find_key_line(&self.content, key, &self.line_index);
        MessageContext::new(MessageLocation::with_line(&self.file_path, line), key, value)
    }
}

/// Key format and placeholder consistency within one catalog.
///
/// Placeholder checks run only for entries that declare placeholders.
pub fn validate_catalog(catalog: &Catalog) -> Vec<Issue> {
    let lines = KeyLines::for_catalog(catalog);
    let mut issues = Vec::new();

    for entry in catalog.entries.values() {
        if !is_valid_key_name(&entry.key) {
            issues.push(
                InvalidKeyIssue {
                    context: lines.context(&entry.key, &entry.value),
                    locale: catalog.locale.clone(),
                }
                .into(),
            );
        }

        let Some(placeholders) = &entry.placeholders else {
            continue;
        };
        let used = entry.value_placeholder_names();

        for name in placeholders.keys() {
            if !used.contains(&name.as_str()) {
                issues.push(
                    UnusedPlaceholderIssue {
                        context: lines.context(&entry.key, &entry.value),
                        placeholder: name.clone(),
                    }
                    .into(),
                );
            }
        }
        for name in used {
            if !placeholders.contains_key(name) {
                issues.push(
                    UndefinedPlaceholderIssue {
                        context: lines.context(&entry.key, &entry.value),
                        placeholder: name.to_string(),
                    }
                    .into(),
                );
            }
        }
    }

    issues
}

/// Keys absent from some locales, and values that are blank.
///
/// A missing key is reported once, at its entry in the template catalog if it
/// has one, otherwise in the first locale that has it.
pub fn validate_translations(catalogs: &BTreeMap<String, Catalog>) -> Vec<Issue> {
    let lines: BTreeMap<&str, KeyLines> = catalogs
        .iter()
        .map(|(locale, catalog)| (locale.as_str(), KeyLines::for_catalog(catalog)))
        .collect();

    let mut keys: Vec<&String> = catalogs.values().flat_map(|c| c.entries.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut issues = Vec::new();
    for key in keys {
        let holders: Vec<(&str, &Catalog)> = catalogs
            .iter()
            .filter(|(_, c)| c.contains_key(key))
            .map(|(locale, c)| (locale.as_str(), c))
            .collect();

        let missing_in: Vec<String> = catalogs
            .iter()
            .filter(|(_, c)| !c.contains_key(key))
            .map(|(locale, _)| locale.clone())
            .collect();
        let anchor = holders
            .iter()
            .find(|(_, c)| c.is_template)
            .or_else(|| holders.first());
        if !missing_in.is_empty()
            && let Some((locale, catalog)) = anchor
            && let (Some(entry), Some(lines)) = (catalog.get(key), lines.get(locale))
        {
            issues.push(
                MissingTranslationIssue {
                    context: lines.context(key, &entry.value),
                    missing_in,
                }
                .into(),
            );
        }

        for (locale, catalog) in holders {
            if let (Some(entry), Some(lines)) = (catalog.get(key), lines.get(locale))
                && entry.value.trim().is_empty()
            {
                issues.push(
                    EmptyTranslationIssue {
                        context: lines.context(key, &entry.value),
                        locale: locale.to_string(),
                    }
                    .into(),
                );
            }
        }
    }

    issues
}

/// Both checks over every catalog, sorted for reporting.
pub fn validate_all(catalogs: &BTreeMap<String, Catalog>) -> Vec<Issue> {
    let mut issues: Vec<Issue> = catalogs.values().flat_map(validate_catalog).collect();
    issues.extend(validate_translations(catalogs));
    issues.sort();
    issues
}
