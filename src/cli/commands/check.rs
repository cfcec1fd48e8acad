use std::{fs, path::Path};

use anyhow::Result;
use rayon::prelude::*;

use super::super::args::CheckCommand;
use super::{CommandResult, CommandSummary, context::CommandContext, helper::finish};
use crate::core::{
    SourceText,
    file_scanner::{ScanOptions, scan_dart_files},
};
use crate::issues::{Issue, ParseErrorIssue};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let config = &ctx.config;

    let scan = scan_dart_files(
        &ctx.root,
        &ScanOptions {
            includes: &config.includes,
            ignores: &config.ignores,
            ignore_generated: config.ignore_generated,
            max_file_size: config.max_file_size,
        },
    );
    let files: Vec<&String> = scan.files.iter().collect();

    let mut issues: Vec<Issue> = files
        .par_iter()
        .flat_map_iter(|file| match fs::read_to_string(Path::new(file.as_str())) {
            Ok(content) => ctx
                .engine
                .check_document(&SourceText::new(file.as_str(), content)),
            Err(e) => vec![
                ParseErrorIssue {
                    file_path: file.to_string(),
                    error: format!("Failed to read file: {}", e),
                }
                .into(),
            ],
        })
        .collect();
    issues.extend(ctx.load_issues());
    issues.extend(ctx.pattern_issues());
    ctx.relativize(&mut issues);

    Ok(finish(
        CommandSummary::Check,
        issues,
        files.len(),
        ctx.locale_files_checked(),
        true,
    ))
}
