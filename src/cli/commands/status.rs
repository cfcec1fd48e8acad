use anyhow::Result;

use super::super::args::StatusCommand;
use super::{CommandResult, CommandSummary, StatusSummary, context::CommandContext, helper::finish};

pub fn status(cmd: StatusCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let store = ctx.engine.store();

    let keys: Vec<String> = if cmd.keys.is_empty() {
        store.all_keys().into_iter().collect()
    } else {
        cmd.keys.clone()
    };
    let keys = keys.iter().map(|key| ctx.engine.key_status(key)).collect();

    let mut issues = ctx.load_issues();
    ctx.relativize(&mut issues);

    Ok(finish(
        CommandSummary::Status(StatusSummary {
            keys,
            statistics: store.statistics(),
        }),
        issues,
        0,
        ctx.locale_files_checked(),
        false,
    ))
}
