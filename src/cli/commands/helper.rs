use super::{CommandResult, CommandSummary, EditSummary};
use crate::core::store::BulkResult;
use crate::issues::{Issue, Severity};

pub fn finish(
    summary: CommandSummary,
    mut issues: Vec<Issue>,
    source_files_checked: usize,
    locale_files_checked: usize,
    exit_on_errors: bool,
) -> CommandResult {
    issues.sort();

    let parse_error_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::ParseError(_)))
        .count();

    let mut error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let warning_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .count();

    error_count += match &summary {
        CommandSummary::Edit(EditSummary { failures, .. }) => failures.len(),
        CommandSummary::FillMissing(fill) => fill.failures.len(),
        _ => 0,
    };

    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        issues,
        parse_error_count,
        source_files_checked,
        locale_files_checked,
    }
}

/// Failures of a multi-file write, as `(locale, reason)` pairs.
pub fn failure_messages(result: &BulkResult) -> Vec<(String, String)> {
    result
        .failures
        .iter()
        .map(|(locale, e)| (locale.clone(), e.to_string()))
        .collect()
}
