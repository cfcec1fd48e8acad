//! Completeness of a key across locales.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TranslationStatus {
    Complete,
    Partial,
    Missing,
}

impl TranslationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::Complete => "complete",
            TranslationStatus::Partial => "partial",
            TranslationStatus::Missing => "missing",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TranslationStatus::Complete => "✓",
            TranslationStatus::Partial => "◐",
            TranslationStatus::Missing => "✘",
        }
    }
}

impl std::fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status from the number of locales holding an entry for the key.
///
/// Entries with an empty value still count as present here.
pub fn translation_status<V>(translations: &BTreeMap<String, V>, total_locales: usize) -> TranslationStatus {
    if translations.is_empty() {
        TranslationStatus::Missing
    } else if translations.len() < total_locales {
        TranslationStatus::Partial
    } else {
        TranslationStatus::Complete
    }
}

/// One key's status with the locales behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStatus {
    pub key: String,
    pub status: TranslationStatus,
    pub translated: Vec<String>,
    pub missing_locales: Vec<String>,
}

pub fn reconcile(
    key: &str,
    translations: &BTreeMap<String, String>,
    locales: &[String],
) -> KeyStatus {
    let (translated, missing_locales): (Vec<String>, Vec<String>) = locales
        .iter()
        .cloned()
        .partition(|locale| translations.contains_key(locale));
    KeyStatus {
        key: key.to_string(),
        status: translation_status(translations, locales.len()),
        translated,
        missing_locales,
    }
}
