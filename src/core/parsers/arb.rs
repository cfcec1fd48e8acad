use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::data::{Catalog, Entry, Placeholder};

/// A warning from scanning ARB files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ScanArbResult {
    /// Catalogs in file-name order.
    pub catalogs: Vec<Catalog>,
    pub warnings: Vec<LoadWarning>,
}

/// A parsed catalog plus the keys that had to be dropped while reading it.
#[derive(Debug)]
pub struct ParsedArb {
    pub catalog: Catalog,
    /// Keys whose value was an object or array, or whose `@key` had no entry.
    pub skipped: Vec<String>,
}

/// Infers a catalog's locale from its file name.
///
/// A stem ending in `app_xx` or `app_xx_YY` yields `xx` / `xx_YY`. Otherwise the
/// first `app_` is stripped from the stem, and an empty remainder means `en`.
///
/// Examples:
/// - "app_en.arb" -> "en"
/// - "app_zh_CN.arb" -> "zh_CN"
/// - "intl_app_fr.arb" -> "fr"
/// - "app_english.arb" -> "english"
/// - "messages.arb" -> "messages"
pub fn infer_locale(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if let Some(tag) = strict_locale_suffix(stem) {
        return tag.to_string();
    }

    let stripped = stem.replacen("app_", "", 1);
    if stripped.is_empty() {
        "en".to_string()
    } else {
        stripped
    }
}

pub(crate) fn strict_locale_suffix(stem: &str) -> Option<&str> {
    for len in [5, 2] {
        let Some(split) = stem.len().checked_sub(len) else {
            continue;
        };
        let (Some(head), Some(tail)) = (stem.get(..split), stem.get(split..)) else {
            continue;
        };
        if head.ends_with("app_") && is_locale_tag(tail) {
            return Some(tail);
        }
    }
    None
}

fn is_locale_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[..2].iter().all(u8::is_ascii_lowercase)
                && bytes[2] == b'_'
                && bytes[3..].iter().all(u8::is_ascii_uppercase)
        }
        _ => false,
    }
}

/// Parses ARB text into a [`Catalog`].
///
/// - `@@key` entries are kept in the catalog header.
/// - `@key` objects attach to `key` wherever they appear in the file.
/// - Numbers, booleans and null are coerced to their JSON text.
/// - Object and array values are skipped and reported in [`ParsedArb::skipped`].
pub fn parse_arb(content: &str, locale: &str, source_path: &Path) -> Result<ParsedArb> {
    let root: Value = serde_json::from_str(content)
        .with_context(|| format!("Failed to parse ARB file: {:?}", source_path))?;
    let Value::Object(root) = root else {
        bail!("ARB file {:?} is not a JSON object", source_path);
    };

    let mut catalog = Catalog::new(locale, source_path);
    let mut skipped = Vec::new();
    let mut pending_metadata: Vec<(String, Value)> = Vec::new();

    for (key, value) in root {
        if key.starts_with("@@") {
            catalog.header.insert(key, value);
        } else if let Some(target) = key.strip_prefix('@') {
            pending_metadata.push((target.to_string(), value));
        } else {
            match coerce_value(&value) {
                Some(text) => {
                    catalog.entries.insert(key.clone(), Entry::new(key, text));
                }
                None => {
                    tracing::warn!(
                        file = %source_path.display(),
                        key = %key,
                        "skipping non-scalar ARB value"
                    );
                    skipped.push(key);
                }
            }
        }
    }

    for (target, value) in pending_metadata {
        match catalog.entries.get_mut(&target) {
            Some(entry) => attach_metadata(entry, value),
            None => {
                tracing::warn!(
                    file = %source_path.display(),
                    key = %target,
                    "dropping metadata without a matching entry"
                );
                skipped.push(format!("@{}", target));
            }
        }
    }

    Ok(ParsedArb { catalog, skipped })
}

fn coerce_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn attach_metadata(entry: &mut Entry, value: Value) {
    let Value::Object(mut bag) = value else {
        // Non-object metadata is not part of the ARB format.
        return;
    };

    if let Some(Value::String(description)) = bag.get("description") {
        entry.description = Some(description.clone());
        bag.shift_remove("description");
    }

    if let Some(Value::Object(raw)) = bag.get("placeholders") {
        let placeholders: IndexMap<String, Placeholder> = raw
            .iter()
            .map(|(name, spec)| {
                let spec = match spec {
                    Value::Object(fields) => fields.clone(),
                    _ => Map::new(),
                };
                (name.clone(), Placeholder(spec))
            })
            .collect();
        entry.placeholders = Some(placeholders);
        bag.shift_remove("placeholders");
    }

    entry.metadata = Some(bag);
}

/// Reads and parses one ARB file, inferring its locale from the file name.
pub fn parse_arb_file(path: &Path, is_template: bool) -> Result<ParsedArb> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ARB file: {:?}", path))?;
    let locale = infer_locale(path);
    let mut parsed = parse_arb(&content, &locale, path)?;
    parsed.catalog.is_template = is_template;
    parsed.catalog.last_modified_at = fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now());
    Ok(parsed)
}

/// Renders a catalog in ARB form.
///
/// Header keys come first, then each entry followed by its `@key` object when it
/// carries a description, placeholders or other metadata. The `@key` object lists
/// `description`, then `placeholders`, then the remaining fields. Output is
/// pretty-printed with 2-space indentation and no trailing newline, which matches
/// `JSON.stringify(obj, null, 2)` for plain files.
pub fn serialize_catalog(catalog: &Catalog) -> serde_json::Result<String> {
    let mut root = Map::new();

    for (key, value) in &catalog.header {
        root.insert(key.clone(), value.clone());
    }

    for (key, entry) in &catalog.entries {
        root.insert(key.clone(), Value::String(entry.value.clone()));

        if entry.has_metadata() {
            let mut meta = Map::new();
            if let Some(description) = &entry.description {
                meta.insert("description".into(), Value::String(description.clone()));
            }
            if let Some(placeholders) = &entry.placeholders {
                meta.insert("placeholders".into(), serde_json::to_value(placeholders)?);
            }
            if let Some(extra) = &entry.metadata {
                for (field, value) in extra {
                    meta.insert(field.clone(), value.clone());
                }
            }
            root.insert(format!("@{}", key), Value::Object(meta));
        }
    }

    serde_json::to_string_pretty(&Value::Object(root))
}

/// Find the line where `key` appears as a JSON object key.
///
/// Matches inside string values are skipped by requiring a `:` after the
/// quoted key. Returns 1 when the key is not found.
pub fn find_key_line(content: &str, key: &str, line_index: &[usize]) -> usize {
    let pattern = format!("\"{}\"", key);
    let mut pos = 0;
    while let Some(rel_pos) = content[pos..].find(&pattern) {
        let abs_pos = pos + rel_pos;
        let after_pattern = abs_pos + pattern.len();
        if content[after_pattern..].trim_start().starts_with(':') {
            return crate::utils::offset_to_line(line_index, abs_pos);
        }
        pos = abs_pos + 1;
    }
    1
}

/// Loads every `*.arb` file in `arb_dir`, in file-name order.
///
/// A missing directory or an unreadable file produces a warning instead of an
/// error so the remaining files still load.
pub fn scan_arb_files(arb_dir: &Path, template_file_name: &str) -> ScanArbResult {
    let mut result = ScanArbResult::default();

    let read_dir = match fs::read_dir(arb_dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            tracing::warn!(dir = %arb_dir.display(), error = %e, "cannot read ARB directory");
            result.warnings.push(LoadWarning {
                file_path: arb_dir.to_string_lossy().to_string(),
                error: format!("Cannot read ARB directory: {}", e),
            });
            return result;
        }
    };

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("arb"))
        .collect();
    paths.sort();

    for path in paths {
        let is_template = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name == template_file_name);

        match parse_arb_file(&path, is_template) {
            Ok(parsed) => result.catalogs.push(parsed.catalog),
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to load ARB file");
                result.warnings.push(LoadWarning {
                    file_path: path.to_string_lossy().to_string(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    result
}
