//! Commands that rewrite ARB files one key at a time.

use anyhow::{Result, bail};

use super::super::args::{DeleteCommand, DuplicateCommand, SetCommand, SortCommand};
use super::{
    CommandResult, CommandSummary, EditOutcome, EditSummary, context::CommandContext,
    helper::{failure_messages, finish},
};
use crate::core::matcher::is_valid_key_name;

fn edited(ctx: &CommandContext, outcome: EditOutcome, failures: Vec<(String, String)>) -> CommandResult {
    ctx.engine.flush();
    finish(
        CommandSummary::Edit(EditSummary { outcome, failures }),
        Vec::new(),
        0,
        ctx.locale_files_checked(),
        true,
    )
}

fn ensure_key_name(key: &str) -> Result<()> {
    if !is_valid_key_name(key) {
        bail!(
            "Invalid key name '{}': keys must start with a letter and contain only letters, digits and '_'",
            key
        );
    }
    Ok(())
}

pub fn set(cmd: SetCommand) -> Result<CommandResult> {
    ensure_key_name(&cmd.key)?;
    let ctx = CommandContext::new(&cmd.common)?;
    let action = ctx.engine.store().set_translation(
        &cmd.key,
        &cmd.locale,
        &cmd.value,
        cmd.description.as_deref(),
    )?;
    Ok(edited(
        &ctx,
        EditOutcome::Set {
            key: cmd.key,
            locale: cmd.locale,
            action,
        },
        Vec::new(),
    ))
}

pub fn delete(cmd: DeleteCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let store = ctx.engine.store();

    let (locales, failures) = match &cmd.locale {
        Some(locale) => {
            if !store.delete_translation(locale, &cmd.key)? {
                bail!("Key '{}' not found in locale '{}'", cmd.key, locale);
            }
            (vec![locale.clone()], Vec::new())
        }
        None => {
            let result = store.delete_key(&cmd.key);
            if result.entries == 0 && result.is_ok() {
                bail!("Key '{}' not found", cmd.key);
            }
            (result.applied.clone(), failure_messages(&result))
        }
    };

    Ok(edited(
        &ctx,
        EditOutcome::Deleted {
            key: cmd.key,
            locales,
        },
        failures,
    ))
}

pub fn duplicate(cmd: DuplicateCommand) -> Result<CommandResult> {
    ensure_key_name(&cmd.to)?;
    let ctx = CommandContext::new(&cmd.common)?;
    let store = ctx.engine.store();

    let keys = store.all_keys();
    if !keys.contains(&cmd.from) {
        bail!("Key '{}' not found", cmd.from);
    }
    if keys.contains(&cmd.to) {
        bail!("Key '{}' already exists", cmd.to);
    }

    let result = store.duplicate_key(&cmd.from, &cmd.to);
    let failures = failure_messages(&result);
    Ok(edited(
        &ctx,
        EditOutcome::Duplicated {
            from: cmd.from,
            to: cmd.to,
            locales: result.applied,
        },
        failures,
    ))
}

pub fn sort(cmd: SortCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let store = ctx.engine.store();

    let locales = match &cmd.locale {
        Some(locale) => vec![locale.clone()],
        None => store.locales(),
    };

    let mut sorted = Vec::new();
    let mut failures = Vec::new();
    for locale in locales {
        match store
            .sort_entries(&locale)
            .and_then(|()| store.save_locale(&locale))
        {
            Ok(()) => sorted.push(locale),
            Err(e) if cmd.locale.is_some() => return Err(e.into()),
            Err(e) => failures.push((locale, e.to_string())),
        }
    }

    Ok(edited(&ctx, EditOutcome::Sorted { locales: sorted }, failures))
}
