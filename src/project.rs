//! Flutter project detection and `l10n.yaml` settings.
//!
//! A directory is a localized Flutter project when its `pubspec.yaml` depends
//! on the Flutter SDK and on `flutter_localizations`. Everything else about
//! the project is resolved from `l10n.yaml` and the ARB directory, with the
//! defaults `flutter gen-l10n` itself uses.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::parsers::arb::{infer_locale, strict_locale_suffix};

pub const PUBSPEC_FILE_NAME: &str = "pubspec.yaml";
pub const L10N_FILE_NAME: &str = "l10n.yaml";
pub const DEFAULT_ARB_DIR: &str = "lib/l10n";
pub const DEFAULT_TEMPLATE_FILE: &str = "app_en.arb";
pub const DEFAULT_CLASS_NAME: &str = "AppLocalizations";

/// True when the YAML holds nothing but blank lines and comments.
fn is_blank_yaml(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Settings read from `l10n.yaml`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct L10nConfig {
    pub arb_dir: Option<String>,
    pub template_arb_file: Option<String>,
    pub output_localization_file: Option<String>,
    pub output_class: Option<String>,
    pub synthetic_package: Option<bool>,
    pub preferred_supported_locales: Option<Vec<String>>,
}

impl L10nConfig {
    /// An empty or comment-only file yields the defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if is_blank_yaml(content) {
            return Ok(Self::default());
        }
        let config: Option<Self> = serde_yaml::from_str(content)?;
        Ok(config.unwrap_or_default())
    }

    /// Loads `l10n.yaml` from `root`. A missing file is `Ok(None)`.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(L10N_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read l10n config: {:?}", path))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse l10n config: {:?}", path))?;
        Ok(Some(config))
    }
}

/// Everything the engine needs to know about a localized project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub arb_directory: PathBuf,
    pub template_arb_file: String,
    pub default_locale: String,
    /// Locales of the ARB files found, in file-name order.
    pub supported_locales: Vec<String>,
    pub generated_dir: PathBuf,
    pub class_prefix: String,
    pub synthetic_package: bool,
    /// `flutter: generate: true` in the pubspec.
    pub generate: bool,
}

impl ProjectConfig {
    /// Resolves the project layout from optional `l10n.yaml` settings.
    pub fn resolve(root: &Path, l10n: Option<&L10nConfig>, generate: bool) -> Self {
        let arb_directory = root.join(
            l10n.and_then(|c| c.arb_dir.as_deref())
                .unwrap_or(DEFAULT_ARB_DIR),
        );
        let arb_files = list_arb_files(&arb_directory);

        let configured = l10n
            .and_then(|c| c.template_arb_file.clone())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_FILE.to_string());
        let template_arb_file = if arb_files.is_empty() || arb_files.contains(&configured) {
            configured
        } else {
            arb_files[0].clone()
        };

        let default_locale = Path::new(&template_arb_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(strict_locale_suffix)
            .unwrap_or("en")
            .to_string();

        let generated_dir = match l10n.and_then(|c| c.output_localization_file.as_deref()) {
            Some(file) => root
                .join(file)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            None => root.join(".dart_tool").join("flutter_gen").join("gen_l10n"),
        };

        Self {
            root: root.to_path_buf(),
            supported_locales: arb_files.iter().map(infer_locale).collect(),
            arb_directory,
            template_arb_file,
            default_locale,
            generated_dir,
            class_prefix: l10n
                .and_then(|c| c.output_class.clone())
                .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string()),
            synthetic_package: l10n.and_then(|c| c.synthetic_package).unwrap_or(true),
            generate,
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.arb_directory.join(&self.template_arb_file)
    }

    /// Problems that would stop the catalogs from loading.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.arb_directory.is_dir() {
            issues.push(format!(
                "ARB directory does not exist: {}",
                self.arb_directory.display()
            ));
        }
        if !self.template_path().is_file() {
            issues.push(format!(
                "Template ARB file does not exist: {}",
                self.template_arb_file
            ));
        }
        if self.supported_locales.is_empty() {
            issues.push("No supported locales found".to_string());
        }
        issues
    }
}

fn list_arb_files(dir: &Path) -> Vec<String> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "ARB directory not found");
        return Vec::new();
    };
    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".arb"))
        .collect();
    names.sort();
    names
}

/// The parts of `pubspec.yaml` project detection looks at.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Pubspec {
    pub dependencies: Option<BTreeMap<String, serde_yaml::Value>>,
    pub flutter: Option<FlutterSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FlutterSection {
    pub generate: Option<bool>,
}

impl Pubspec {
    pub fn parse(content: &str) -> Result<Self> {
        if is_blank_yaml(content) {
            return Ok(Self::default());
        }
        let pubspec: Option<Self> = serde_yaml::from_str(content)?;
        Ok(pubspec.unwrap_or_default())
    }

    fn depends_on(&self, package: &str) -> bool {
        self.dependencies
            .as_ref()
            .is_some_and(|deps| deps.contains_key(package))
    }

    /// Depends on both the Flutter SDK and `flutter_localizations`.
    pub fn is_localized(&self) -> bool {
        self.depends_on("flutter") && self.depends_on("flutter_localizations")
    }

    /// `flutter: generate: true`.
    pub fn generate(&self) -> bool {
        self.flutter
            .as_ref()
            .and_then(|f| f.generate)
            .unwrap_or(false)
    }
}

/// True when the pubspec declares the Flutter SDK and `flutter_localizations`.
///
/// A pubspec that is not valid YAML is not a localized project.
pub fn is_localized_flutter_project(pubspec: &str) -> bool {
    Pubspec::parse(pubspec).is_ok_and(|p| p.is_localized())
}

/// Detects a localized Flutter project rooted exactly at `root`.
///
/// Returns `Ok(None)` for anything that is not one.
pub fn detect_project(root: &Path) -> Result<Option<ProjectConfig>> {
    let pubspec_path = root.join(PUBSPEC_FILE_NAME);
    let Ok(content) = fs::read_to_string(&pubspec_path) else {
        return Ok(None);
    };
    let pubspec = match Pubspec::parse(&content) {
        Ok(pubspec) => pubspec,
        Err(err) => {
            tracing::warn!(path = %pubspec_path.display(), error = %err, "unreadable pubspec");
            return Ok(None);
        }
    };
    if !pubspec.is_localized() {
        tracing::debug!(root = %root.display(), "pubspec does not use flutter_localizations");
        return Ok(None);
    }

    let l10n = L10nConfig::load(root)?;
    let project = ProjectConfig::resolve(root, l10n.as_ref(), pubspec.generate());
    tracing::info!(
        root = %root.display(),
        arb_dir = %project.arb_directory.display(),
        template = %project.template_arb_file,
        locales = project.supported_locales.len(),
        "detected Flutter project"
    );
    Ok(Some(project))
}

/// Walks up from `start_dir` to the nearest directory holding a pubspec.
///
/// Stops at a `.git` boundary like the config lookup does.
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        if current.join(PUBSPEC_FILE_NAME).exists() {
            return Some(current);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}
