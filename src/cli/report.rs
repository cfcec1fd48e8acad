//! Report formatting and printing utilities.
//!
//! Issues are shown in cargo-style format; command summaries as short
//! colored lines. Kept apart from the engine so it can be used as a library.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, EditOutcome, EditSummary, ExportSummary, FillSummary,
    InitSummary, StatusSummary, WatchSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::status::TranslationStatus;
use crate::core::store::KeyAction;
use crate::issues::{Issue, Report, ReportLocation, Severity};
use crate::utils::pluralize;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    // Calculate max line number width for alignment
    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
///
/// `source_files` is `None` for commands that only read the ARB files.
pub fn print_success_to<W: Write>(source_files: Option<usize>, locale_files: usize, writer: &mut W) {
    let locales = format!(
        "{} locale {}",
        locale_files,
        pluralize(locale_files, "file", "files")
    );
    let checked = match source_files {
        Some(count) => format!(
            "{} source {}, {}",
            count,
            pluralize(count, "file", "files"),
            locales
        ),
        None => locales,
    };
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Checked {} - no issues found", checked).green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

pub fn print(result: &CommandResult, verbose: bool) {
    let mut out = io::stdout().lock();
    print_command_output(result, verbose, &mut out);

    if result.issues.is_empty() {
        match result.summary {
            CommandSummary::Check => print_success_to(
                Some(result.source_files_checked),
                result.locale_files_checked,
                &mut out,
            ),
            CommandSummary::Validate => {
                print_success_to(None, result.locale_files_checked, &mut out)
            }
            _ => {}
        }
    }

    // check and validate already list parse errors
    if !shows_issues(&result.summary) {
        print_parse_warning(result.parse_error_count, verbose);
    }
}

fn shows_issues(summary: &CommandSummary) -> bool {
    matches!(summary, CommandSummary::Check | CommandSummary::Validate)
}

// ============================================================
// Internal Functions
// ============================================================

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().blue(),
    }
}

fn caret(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "^".red(),
        Severity::Warning => "^".yellow(),
        Severity::Info => "^".blue(),
    }
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);
    let severity = issue.report_severity();

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_label(severity),
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    // Clickable location: --> path:line:col
    if line == 0 {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), file_path);
    } else {
        let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), file_path, line, col);
    }

    if let Some(source_line) = source_line {
        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // col is 1-based, in characters
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret(severity),
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            pluralize(total_errors, "error", "errors").red(),
            total_warnings,
            pluralize(total_warnings, "warning", "warnings").yellow()
        );
    }
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Source(ctx) => (
            ctx.file_path(),
            ctx.line(),
            ctx.col(),
            Some(&ctx.source_line),
        ),
        ReportLocation::Message(ctx) => (ctx.file_path(), ctx.line(), ctx.col(), None),
        ReportLocation::File { path } => (path, 0, 0, None),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            ReportLocation::Message(ctx) => Some(ctx.line()),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn print_command_output<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Check | CommandSummary::Validate => report_to(&result.issues, writer),
        CommandSummary::Status(summary) => print_status(summary, writer),
        CommandSummary::Edit(summary) => print_edit(summary, writer),
        CommandSummary::FillMissing(summary) => print_fill(summary, writer),
        CommandSummary::Export(summary) => print_export(summary, writer),
        CommandSummary::Watch(summary) => print_watch(summary, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }

    if verbose && !shows_issues(&result.summary) {
        report_to(&result.issues, writer);
    }
}

fn status_mark(status: TranslationStatus) -> ColoredString {
    match status {
        TranslationStatus::Complete => status.icon().green(),
        TranslationStatus::Partial => status.icon().yellow(),
        TranslationStatus::Missing => status.icon().red(),
    }
}

fn print_status<W: Write>(summary: &StatusSummary, writer: &mut W) {
    let stats = &summary.statistics;
    let key_width = summary
        .keys
        .iter()
        .map(|k| UnicodeWidthStr::width(k.key.as_str()))
        .max()
        .unwrap_or(0);

    for key in &summary.keys {
        let total = key.translated.len() + key.missing_locales.len();
        let mut line = format!(
            "{} {:<width$}  {:<8}  {}/{}",
            status_mark(key.status),
            key.key,
            key.status.as_str(),
            key.translated.len(),
            total,
            width = key_width
        );
        if !key.missing_locales.is_empty() {
            line.push_str(&format!("  missing: {}", key.missing_locales.join(", ")));
        }
        let _ = writeln!(writer, "{}", line.trim_end());
    }
    if !summary.keys.is_empty() {
        let _ = writeln!(writer);
    }

    let _ = writeln!(
        writer,
        "{} {} in {} {}: {} complete, {} partial, {} missing ({:.1}% complete)",
        stats.total_keys,
        pluralize(stats.total_keys, "key", "keys"),
        stats.total_locales,
        pluralize(stats.total_locales, "locale", "locales"),
        stats.complete.to_string().green(),
        stats.partial.to_string().yellow(),
        stats.missing.to_string().red(),
        stats.completion_rate
    );
    for (locale, locale_stats) in &stats.locales {
        let _ = writeln!(
            writer,
            "  {}: {} translated, {} missing",
            locale, locale_stats.translated, locale_stats.missing
        );
    }
}

fn print_failures<W: Write>(failures: &[(String, String)], writer: &mut W) {
    for (locale, reason) in failures {
        let _ = writeln!(
            writer,
            "{} failed to update {}: {}",
            "error:".bold().red(),
            locale,
            reason
        );
    }
}

fn print_done<W: Write>(message: String, writer: &mut W) {
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), message.green());
}

fn print_edit<W: Write>(summary: &EditSummary, writer: &mut W) {
    match &summary.outcome {
        EditOutcome::Set {
            key,
            locale,
            action,
        } => {
            let verb = match action {
                KeyAction::Added => "Added",
                KeyAction::Updated => "Updated",
            };
            print_done(format!("{} '{}' in {}", verb, key, locale), writer);
        }
        EditOutcome::Deleted { key, locales } if !locales.is_empty() => {
            print_done(
                format!("Deleted '{}' from {}", key, locales.join(", ")),
                writer,
            );
        }
        EditOutcome::Duplicated { from, to, locales } if !locales.is_empty() => {
            print_done(
                format!("Duplicated '{}' as '{}' in {}", from, to, locales.join(", ")),
                writer,
            );
        }
        EditOutcome::Sorted { locales } if !locales.is_empty() => {
            print_done(format!("Sorted {}", locales.join(", ")), writer);
        }
        EditOutcome::Imported { entries, locales } => {
            if locales.is_empty() {
                let _ = writeln!(writer, "Nothing to import.");
            } else {
                print_done(
                    format!(
                        "Imported {} {} into {}",
                        entries,
                        pluralize(*entries, "value", "values"),
                        locales.join(", ")
                    ),
                    writer,
                );
            }
        }
        _ => {}
    }
    print_failures(&summary.failures, writer);
}

fn print_fill<W: Write>(summary: &FillSummary, writer: &mut W) {
    let total: usize = summary.planned.iter().map(|(_, keys)| keys.len()).sum();
    if total == 0 {
        print_done("No missing translations".to_string(), writer);
        return;
    }

    if summary.is_apply {
        let files = summary.planned.len().saturating_sub(summary.failures.len());
        let _ = writeln!(
            writer,
            "{} {} placeholder {} from '{}' in {} {}.",
            "Added".green().bold(),
            summary.written,
            pluralize(summary.written, "value", "values"),
            summary.default_locale,
            files,
            pluralize(files, "file", "files")
        );
        print_failures(&summary.failures, writer);
        return;
    }

    for (locale, keys) in &summary.planned {
        let _ = writeln!(writer, "  {}: {}", locale.bold(), keys.join(", "));
    }
    let _ = writeln!(
        writer,
        "{} {} placeholder {} from '{}'.",
        "Would add".yellow().bold(),
        total,
        pluralize(total, "value", "values"),
        summary.default_locale
    );
    let _ = writeln!(writer, "Run with {} to write them.", "--apply".cyan());
}

fn print_export<W: Write>(summary: &ExportSummary, writer: &mut W) {
    print_done(
        format!(
            "Exported {} {} to {}",
            summary.keys,
            pluralize(summary.keys, "key", "keys"),
            summary.path.display()
        ),
        writer,
    );
}

fn print_watch<W: Write>(summary: &WatchSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "Stopped watching after {} {}.",
        summary.changes,
        pluralize(summary.changes, "change", "changes")
    );
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        print_done(format!("Created {}", CONFIG_FILE_NAME), writer);
    }
}

// ============================================================
// Tests
// ============================================================
