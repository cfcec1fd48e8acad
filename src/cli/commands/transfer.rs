//! Key/locale matrix export and import.

use std::{collections::BTreeMap, fs};

use anyhow::{Context, Result};

use super::super::args::{ExportCommand, ImportCommand};
use super::{
    CommandResult, CommandSummary, EditOutcome, EditSummary, ExportSummary,
    context::CommandContext,
    helper::{failure_messages, finish},
};

type Matrix = BTreeMap<String, BTreeMap<String, String>>;

pub fn export(cmd: ExportCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let matrix = ctx.engine.store().export_matrix();

    let json = serde_json::to_string_pretty(&matrix).context("Failed to serialize translations")?;
    fs::write(&cmd.output, json)
        .with_context(|| format!("Failed to write export file: {:?}", cmd.output))?;

    Ok(finish(
        CommandSummary::Export(ExportSummary {
            path: cmd.output,
            keys: matrix.len(),
        }),
        Vec::new(),
        0,
        ctx.locale_files_checked(),
        true,
    ))
}

pub fn import(cmd: ImportCommand) -> Result<CommandResult> {
    let content = fs::read_to_string(&cmd.input)
        .with_context(|| format!("Failed to read import file: {:?}", cmd.input))?;
    let matrix: Matrix = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {:?}", cmd.input))?;

    let ctx = CommandContext::new(&cmd.common)?;
    let result = ctx.engine.store().import_matrix(&matrix);
    ctx.engine.flush();

    Ok(finish(
        CommandSummary::Edit(EditSummary {
            failures: failure_messages(&result),
            outcome: EditOutcome::Imported {
                entries: result.entries,
                locales: result.applied,
            },
        }),
        Vec::new(),
        0,
        ctx.locale_files_checked(),
        true,
    ))
}
