use anyhow::Result;

use super::super::args::FillMissingCommand;
use super::{
    CommandResult, CommandSummary, FillSummary, context::CommandContext,
    helper::{failure_messages, finish},
};

pub fn fill_missing(cmd: FillMissingCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let store = ctx.engine.store();
    let default_locale = ctx.engine.default_locale();

    let plan = store.fill_plan(&default_locale)?;
    let planned: Vec<(String, Vec<String>)> = plan
        .into_iter()
        .map(|(locale, entries)| (locale, entries.into_iter().map(|(key, _)| key).collect()))
        .collect();

    let (written, failures) = if cmd.apply {
        let result = store.generate_missing(&default_locale);
        ctx.engine.flush();
        (result.entries, failure_messages(&result))
    } else {
        (0, Vec::new())
    };

    let mut issues = ctx.load_issues();
    ctx.relativize(&mut issues);

    Ok(finish(
        CommandSummary::FillMissing(FillSummary {
            default_locale,
            planned,
            is_apply: cmd.apply,
            written,
            failures,
        }),
        issues,
        0,
        ctx.locale_files_checked(),
        cmd.apply,
    ))
}
