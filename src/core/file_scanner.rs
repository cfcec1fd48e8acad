//! Discovery of Dart source files under the configured include paths.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Code generators' output, skipped unless asked for.
pub const GENERATED_FILE_PATTERNS: &[&str] = &[
    "**/*.g.dart",
    "**/*.freezed.dart",
    "**/*.gr.dart",
    "**/*.mocks.dart",
    "**/.dart_tool/**",
    "**/build/**",
];

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

#[derive(Debug, Clone)]
pub struct ScanOptions<'a> {
    pub includes: &'a [String],
    pub ignores: &'a [String],
    pub ignore_generated: bool,
    /// Files above this size in bytes are skipped.
    pub max_file_size: u64,
}

#[derive(Debug, Default)]
pub struct FileScanResult {
    /// Dart files in path order.
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

pub fn scan_dart_files(base_dir: &Path, options: &ScanOptions<'_>) -> FileScanResult {
    let mut result = FileScanResult::default();

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in options.ignores {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => tracing::warn!(pattern = %p, error = %e, "invalid ignore pattern"),
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    if options.ignore_generated {
        glob_patterns.extend(GENERATED_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
    }

    let dirs_to_scan: Vec<PathBuf> = if options.includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in options.includes {
            if is_glob_pattern(inc) {
                let full_pattern = base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|p| p.is_dir())),
                    Err(e) => tracing::warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else {
                let path = base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    tracing::debug!(path = %path.display(), "include path does not exist");
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    tracing::warn!(error = %e, "cannot access path");
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignore_paths.iter().any(|ignore| path.starts_with(ignore))
                || glob_patterns.iter().any(|p| p.matches(&path_str))
            {
                continue;
            }

            if !path.is_file() || !is_dart_file(path) {
                continue;
            }
            let too_large = entry
                .metadata()
                .map(|m| m.len() > options.max_file_size)
                .unwrap_or(false);
            if too_large {
                result.skipped_count += 1;
                tracing::debug!(file = %path_str, "skipping file above size limit");
                continue;
            }
            result.files.insert(path_str.into());
        }
    }

    result
}

fn is_dart_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("dart")
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn options<'a>(includes: &'a [String], ignores: &'a [String]) -> ScanOptions<'a> {
        ScanOptions {
            includes,
            ignores,
            ignore_generated: true,
            max_file_size: 1024 * 1024,
        }
    }

    fn names(result: &FileScanResult) -> Vec<String> {
        result
            .files
            .iter()
            .map(|f| Path::new(f).file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_dart_files() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("widgets")).unwrap();
        File::create(lib.join("main.dart")).unwrap();
        File::create(lib.join("widgets").join("home.dart")).unwrap();
        File::create(lib.join("notes.txt")).unwrap();

        let result = scan_dart_files(dir.path(), &options(&["lib".to_owned()], &[]));
        assert_eq!(names(&result), vec!["main.dart", "home.dart"]);
    }

    #[test]
    fn test_generated_files_are_skipped() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("model.dart")).unwrap();
        File::create(dir.path().join("model.g.dart")).unwrap();
        File::create(dir.path().join("model.freezed.dart")).unwrap();

        let result = scan_dart_files(dir.path(), &options(&[], &[]));
        assert_eq!(names(&result), vec!["model.dart"]);

        let all = ScanOptions {
            ignore_generated: false,
            ..options(&[], &[])
        };
        assert_eq!(scan_dart_files(dir.path(), &all).files.len(), 3);
    }

    #[test]
    fn test_ignores_literal_and_glob() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("legacy")).unwrap();
        File::create(lib.join("app.dart")).unwrap();
        File::create(lib.join("app_test.dart")).unwrap();
        File::create(lib.join("legacy").join("old.dart")).unwrap();

        let ignores = ["lib/legacy".to_owned(), "**/*_test.dart".to_owned()];
        let result = scan_dart_files(dir.path(), &options(&["lib".to_owned()], &ignores));
        assert_eq!(names(&result), vec!["app.dart"]);
    }

    #[test]
    fn test_glob_include_and_missing_include() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages").join("a")).unwrap();
        fs::create_dir_all(dir.path().join("packages").join("b")).unwrap();
        File::create(dir.path().join("packages").join("a").join("a.dart")).unwrap();
        File::create(dir.path().join("packages").join("b").join("b.dart")).unwrap();

        let includes = ["packages/*".to_owned(), "nonexistent".to_owned()];
        let result = scan_dart_files(dir.path(), &options(&includes, &[]));
        assert_eq!(names(&result), vec!["a.dart", "b.dart"]);
    }

    #[test]
    fn test_overlapping_includes_deduplicate() {
        let dir = tempdir().unwrap();
        let screens = dir.path().join("lib").join("screens");
        fs::create_dir_all(&screens).unwrap();
        File::create(screens.join("login.dart")).unwrap();

        let includes = ["lib".to_owned(), "lib/screens".to_owned()];
        let result = scan_dart_files(dir.path(), &options(&includes, &[]));
        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_large_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.dart"), "x".repeat(64)).unwrap();
        fs::write(dir.path().join("small.dart"), "x").unwrap();

        let limited = ScanOptions {
            max_file_size: 16,
            ..options(&[], &[])
        };
        let result = scan_dart_files(dir.path(), &limited);
        assert_eq!(names(&result), vec!["small.dart"]);
        assert_eq!(result.skipped_count, 1);
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("lib/*"));
        assert!(is_glob_pattern("**/*.g.dart"));
        assert!(!is_glob_pattern("lib/src"));
    }
}
