//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Report Dart key references that are missing or partially translated
//! - `status`: Per-key translation status and overall statistics
//! - `set`, `delete`, `duplicate`, `sort`: Edit the ARB files
//! - `fill-missing`: Add placeholder values for keys a locale lacks
//! - `export`, `import`: Move translations in and out as a key/locale matrix
//! - `validate`: Structural and placeholder checks over the ARB files
//! - `watch`: Reload catalogs as the ARB files change
//! - `init`: Write a default `.arbsyncrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match self.command.as_ref()? {
            Command::Check(cmd) => Some(&cmd.common),
            Command::Status(cmd) => Some(&cmd.common),
            Command::Set(cmd) => Some(&cmd.common),
            Command::Delete(cmd) => Some(&cmd.common),
            Command::Duplicate(cmd) => Some(&cmd.common),
            Command::Sort(cmd) => Some(&cmd.common),
            Command::FillMissing(cmd) => Some(&cmd.common),
            Command::Export(cmd) => Some(&cmd.common),
            Command::Import(cmd) => Some(&cmd.common),
            Command::Validate(cmd) => Some(&cmd.common),
            Command::Watch(cmd) => Some(&cmd.common),
            Command::Init => None,
        }
    }

    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|c| c.verbose)
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Flutter project root (default: nearest directory with a pubspec.yaml)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// ARB directory, relative to the project root (overrides l10n.yaml)
    #[arg(long)]
    pub arb_dir: Option<PathBuf>,

    /// Template ARB file name (overrides l10n.yaml)
    #[arg(long)]
    pub template: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Keys to show (default: all)
    pub keys: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct SetCommand {
    pub key: String,
    pub locale: String,
    pub value: String,

    /// Description stored in the key's metadata
    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct DeleteCommand {
    pub key: String,

    /// Only delete from this locale (default: every locale)
    #[arg(long)]
    pub locale: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct DuplicateCommand {
    pub from: String,
    pub to: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct SortCommand {
    /// Only sort this locale (default: every locale)
    #[arg(long)]
    pub locale: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct FillMissingCommand {
    /// Actually write the placeholder values (default is dry-run)
    #[arg(long)]
    pub apply: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output JSON file
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON file mapping key to locale to value
    pub input: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check Dart sources for keys that are missing or partially translated
    Check(CheckCommand),
    /// Show the translation status of keys
    Status(StatusCommand),
    /// Add or update a translation
    Set(SetCommand),
    /// Delete a key
    Delete(DeleteCommand),
    /// Copy a key with its metadata to a new name in every locale
    Duplicate(DuplicateCommand),
    /// Sort ARB entries by key
    Sort(SortCommand),
    /// Add "[LOCALE] default" values for keys a locale lacks
    FillMissing(FillMissingCommand),
    /// Export all translations as a key/locale JSON matrix
    Export(ExportCommand),
    /// Import translations from a key/locale JSON matrix
    Import(ImportCommand),
    /// Check ARB files for invalid keys, placeholder mismatches and gaps
    Validate(ValidateCommand),
    /// Reload catalogs as the ARB files change, until Ctrl-C
    Watch(WatchCommand),
    /// Initialize a new .arbsyncrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_with_description() {
        let args = Arguments::try_parse_from([
            "arbsync",
            "set",
            "greet",
            "en",
            "Hello {name}",
            "--description",
            "Greeting",
            "-v",
        ])
        .unwrap();
        let Some(Command::Set(cmd)) = &args.command else {
            panic!("expected set command");
        };
        assert_eq!(cmd.key, "greet");
        assert_eq!(cmd.value, "Hello {name}");
        assert_eq!(cmd.description.as_deref(), Some("Greeting"));
        assert!(args.verbose());
    }

    #[test]
    fn test_common_args() {
        let args = Arguments::try_parse_from([
            "arbsync",
            "check",
            "--arb-dir",
            "assets/l10n",
            "--template",
            "intl_en.arb",
        ])
        .unwrap();
        let common = args.common().unwrap();
        assert_eq!(common.arb_dir, Some(PathBuf::from("assets/l10n")));
        assert_eq!(common.template.as_deref(), Some("intl_en.arb"));
        assert!(!args.verbose());
    }

    #[test]
    fn test_init_has_no_common_args() {
        let args = Arguments::try_parse_from(["arbsync", "init"]).unwrap();
        assert!(args.common().is_none());
    }

    #[test]
    fn test_fill_missing_is_kebab_case() {
        let args = Arguments::try_parse_from(["arbsync", "fill-missing", "--apply"]).unwrap();
        assert!(matches!(args.command, Some(Command::FillMissing(ref c)) if c.apply));
    }

    #[test]
    fn test_cli_definition() {
        Arguments::command().debug_assert();
    }
}
