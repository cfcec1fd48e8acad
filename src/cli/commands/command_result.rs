use std::path::PathBuf;

use crate::core::status::KeyStatus;
use crate::core::store::{KeyAction, Statistics};
use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Check,
    Validate,
    Status(StatusSummary),
    Edit(EditSummary),
    FillMissing(FillSummary),
    Export(ExportSummary),
    Watch(WatchSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct StatusSummary {
    pub keys: Vec<KeyStatus>,
    pub statistics: Statistics,
}

/// What a file-editing command changed.
#[derive(Debug)]
pub enum EditOutcome {
    Set {
        key: String,
        locale: String,
        action: KeyAction,
    },
    Deleted {
        key: String,
        locales: Vec<String>,
    },
    Duplicated {
        from: String,
        to: String,
        locales: Vec<String>,
    },
    Sorted {
        locales: Vec<String>,
    },
    Imported {
        entries: usize,
        locales: Vec<String>,
    },
}

#[derive(Debug)]
pub struct EditSummary {
    pub outcome: EditOutcome,
    /// Locales whose file could not be written, with the reason.
    pub failures: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct FillSummary {
    pub default_locale: String,
    /// Locale to the keys that get a placeholder value.
    pub planned: Vec<(String, Vec<String>)>,
    pub is_apply: bool,
    pub written: usize,
    pub failures: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub keys: usize,
}

#[derive(Debug)]
pub struct WatchSummary {
    pub changes: usize,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running an arbsync command
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    /// If false, always exit 0 (used for dry-run commands that report work to do).
    pub exit_on_errors: bool,
    /// Issues found by `check` and `validate`. Empty for other commands.
    pub issues: Vec<Issue>,
    /// Number of files that failed to parse.
    pub parse_error_count: usize,
    /// Number of Dart files that were scanned.
    pub source_files_checked: usize,
    /// Number of ARB files that were loaded.
    pub locale_files_checked: usize,
}
