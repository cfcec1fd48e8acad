use anyhow::{Result, bail};
use tracing_subscriber::EnvFilter;

use super::{
    args::{Arguments, Command},
    commands::{
        CommandResult,
        check::check,
        edit::{delete, duplicate, set, sort},
        fill::fill_missing,
        init::init,
        status::status,
        transfer::{export, import},
        validate::validate,
        watch::watch,
    },
};

/// Dispatches to the handler of the parsed command.
///
/// Returns `Err` when the command could not run at all (no catalogs, bad
/// config, write failure on a single-file edit).
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Status(cmd)) => status(cmd),
        Some(Command::Set(cmd)) => set(cmd),
        Some(Command::Delete(cmd)) => delete(cmd),
        Some(Command::Duplicate(cmd)) => duplicate(cmd),
        Some(Command::Sort(cmd)) => sort(cmd),
        Some(Command::FillMissing(cmd)) => fill_missing(cmd),
        Some(Command::Export(cmd)) => export(cmd),
        Some(Command::Import(cmd)) => import(cmd),
        Some(Command::Validate(cmd)) => validate(cmd),
        Some(Command::Watch(cmd)) => watch(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise warnings only, or debug output for this crate
/// with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "warn,arbsync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
