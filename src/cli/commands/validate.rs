use anyhow::Result;

use super::super::args::ValidateCommand;
use super::{CommandResult, CommandSummary, context::CommandContext, helper::finish};
use crate::core::validate::validate_all;

pub fn validate(cmd: ValidateCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;

    let mut issues = validate_all(&ctx.engine.store().catalogs());
    issues.extend(ctx.load_issues());
    issues.extend(ctx.pattern_issues());
    ctx.relativize(&mut issues);

    Ok(finish(
        CommandSummary::Validate,
        issues,
        0,
        ctx.locale_files_checked(),
        true,
    ))
}
