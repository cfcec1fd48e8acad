use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::args::WatchCommand;
use super::{CommandResult, CommandSummary, WatchSummary, context::CommandContext, helper::finish};
use crate::cache::DEFAULT_SWEEP_INTERVAL;
use crate::events::{ChangeType, EventKind, EventPayload};

pub fn watch(cmd: WatchCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let changes = runtime.block_on(watch_until_interrupted(&ctx))?;

    Ok(finish(
        CommandSummary::Watch(WatchSummary { changes }),
        Vec::new(),
        0,
        ctx.locale_files_checked(),
        true,
    ))
}

async fn watch_until_interrupted(ctx: &CommandContext) -> Result<usize> {
    let bus = ctx.engine.bus();
    let changes = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&changes);
    let root = ctx.root.clone();
    let subscription = bus.subscribe_labeled(EventKind::CatalogFileChanged, "cli:watch", move |event| {
        if let EventPayload::CatalogFileChanged {
            path,
            locale,
            change,
        } = &event.payload
        {
            counter.fetch_add(1, Ordering::Relaxed);
            let shown = path.strip_prefix(&root).unwrap_or(path);
            let label = match change {
                ChangeType::Created => "Loaded".green(),
                ChangeType::Modified => "Reloaded".cyan(),
                ChangeType::Deleted => "Removed".yellow(),
            };
            println!("{} ./{} ({})", label.bold(), shown.display(), locale);
        }
        Ok(())
    });

    let dispatcher = ctx.engine.spawn_dispatcher()?;
    let sweepers = ctx.engine.spawn_sweepers(DEFAULT_SWEEP_INTERVAL)?;
    let watcher = ctx.engine.watch(&ctx.arb_dir)?;
    println!(
        "Watching {} for changes. Press {} to stop.",
        ctx.relative(watcher.dir()),
        "Ctrl-C".cyan()
    );

    let interrupted = tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C");
    drop(watcher);
    for sweeper in &sweepers {
        sweeper.abort();
    }
    bus.shutdown();
    dispatcher.await.context("Event dispatcher failed")?;
    bus.unsubscribe(subscription);
    interrupted?;

    Ok(changes.load(Ordering::Relaxed))
}
