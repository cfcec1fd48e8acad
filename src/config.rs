use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::matcher::PatternOverrides;

pub const CONFIG_FILE_NAME: &str = ".arbsyncrc.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_generated: bool,
    #[serde(default, skip_serializing_if = "PatternOverrides::is_empty")]
    pub custom_patterns: PatternOverrides,
    /// Extra pattern kinds by name. Group 1 is the key, group 2 the arguments.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub enable_custom_patterns: bool,
    /// Quiet period before a changed ARB file is reloaded, in milliseconds.
    #[serde(default = "default_debounce_delay")]
    pub debounce_delay: u64,
    /// Lifetime of cached derived data, in milliseconds.
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout: u64,
    /// Source files above this size in bytes are not scanned.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Overrides the locale taken from the template ARB file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_locale: Option<String>,
}

fn default_includes() -> Vec<String> {
    vec!["lib".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_debounce_delay() -> u64 {
    500
}

fn default_cache_timeout() -> u64 {
    300_000
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: Vec::new(),
            ignore_generated: default_true(),
            custom_patterns: PatternOverrides::default(),
            extra_patterns: BTreeMap::new(),
            enable_custom_patterns: false,
            debounce_delay: default_debounce_delay(),
            cache_timeout: default_cache_timeout(),
            max_file_size: default_max_file_size(),
            primary_locale: None,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_delay)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_timeout)
    }

    /// Pattern overrides in effect, empty unless custom patterns are enabled.
    pub fn pattern_overrides(&self) -> PatternOverrides {
        if self.enable_custom_patterns {
            self.custom_patterns.clone()
        } else {
            PatternOverrides::default()
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Where the config was read from, `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.ignores.is_empty());
        assert_eq!(config.includes, vec!["lib"]);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.max_file_size, 1_048_576);
        assert!(!config.enable_custom_patterns);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "ignores": ["**/generated/**"],
              "includes": ["lib", "packages/*/lib"],
              "debounceDelay": 250,
              "primaryLocale": "de"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ignores, vec!["**/generated/**"]);
        assert_eq!(config.includes, vec!["lib", "packages/*/lib"]);
        assert_eq!(config.debounce_delay, 250);
        assert_eq!(config.primary_locale.as_deref(), Some("de"));
        assert_eq!(config.cache_timeout, 300_000);
    }

    #[test]
    fn test_custom_patterns_need_opt_in() {
        let json = r#"{
              "customPatterns": { "contextL10n": "\\bctx\\.tr\\.(\\w+)(?:\\(([^)]*)\\))?" },
              "extraPatterns": { "tr": "\\btr\\('(\\w+)'\\)" }
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.custom_patterns.context_l10n.is_some());
        assert_eq!(config.extra_patterns.len(), 1);
        assert!(config.pattern_overrides().is_empty());

        let enabled = Config {
            enable_custom_patterns: true,
            ..config
        };
        assert!(enabled.pattern_overrides().context_l10n.is_some());
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("lib").join("widgets");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["**/test/**"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file());
        assert_eq!(result.config.ignores, vec!["**/test/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file());
        assert_eq!(result.config, Config::default());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_invalid_include_pattern() {
        let config = Config {
            includes: vec!["lib/**/[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("includes"));
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["[invalid"] }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_json_round_trips() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"debounceDelay\": 500"));
        assert!(!json.contains("customPatterns"));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
