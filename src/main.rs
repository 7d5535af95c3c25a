//=========================================================================
// simulate_to_survive
//
// Binary entry point: parses the command line, loads the config, installs
// logging and dispatches to the subcommand.
//
//=========================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use simulate_to_survive::config::GameConfig;
use simulate_to_survive::logging;

use cli::{Cli, Command};

const APP_NAME: &str = "simulate_to_survive";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log maintenance only reads: no config is written, no log file opened
    let maintenance = matches!(cli.command, Some(Command::Logs(_)));
    let loaded = if maintenance {
        GameConfig::read(&cli.config)
    } else {
        GameConfig::load(&cli.config)
    };
    let (config, source) = loaded.with_context(|| format!("cannot load config {}", cli.config.display()))?;

    if maintenance {
        logging::init_stderr();
    } else {
        logging::init(&config.debug.log_dir, APP_NAME, config.debug.log_keep);
    }
    source.log(&cli.config);
    info!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Play(Default::default())) {
        Command::Play(args) => cli::play(config, args),
        Command::Logs(command) => cli::logs(&config, command),
        Command::Check => cli::check(&config),
        Command::Audio => cli::audio(&config),
        Command::Prologue { path } => cli::prologue(&config, path),
    }
}
