//=========================================================================
// Command Line
//=========================================================================
//
// clap definitions and one handler per subcommand. `play` is the
// default when no subcommand is given.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

//=== Internal Dependencies ===============================================

use simulate_to_survive::audio::LogSink;
use simulate_to_survive::config::{GameConfig, DEFAULT_CONFIG_PATH};
use simulate_to_survive::debug::log_rotation;
use simulate_to_survive::diagnostics::{self, ProloguePath};
use simulate_to_survive::game::headless::parse_script;
use simulate_to_survive::story::Story;
use simulate_to_survive::EngineBuilder;

//=== Definitions =========================================================

#[derive(Parser, Debug)]
#[command(name = "simulate_to_survive", version, about = "模拟生存 - Simulate to Survive", long_about = None)]
pub struct Cli {
    /// Config file, created with defaults when missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game (default)
    Play(PlayArgs),

    /// Inspect or delete log files
    #[command(subcommand)]
    Logs(LogsCommand),

    /// Smoke test of config, emotions, assets and the scene registry
    Check,

    /// List the audio catalog and play the rain ambience once
    Audio,

    /// Replay the prologue along one choice path
    Prologue {
        #[arg(long, value_enum, default_value = "obsession")]
        path: ProloguePath,
    },
}

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Comma separated key script, e.g. "enter,space,1,f2,wait"
    #[arg(long, requires = "headless")]
    pub script: Option<String>,

    /// Extra ticks after the script finishes
    #[arg(long, default_value_t = 60)]
    pub ticks: u64,
}

#[derive(Subcommand, Debug)]
pub enum LogsCommand {
    /// List logs, newest first
    List {
        /// Log directory (default: the configured one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Delete all but the newest N logs
    Clean {
        /// Logs to keep; 0 deletes all
        #[arg(long, default_value_t = 0)]
        keep: usize,

        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

//=== Handlers ============================================================

pub fn play(config: GameConfig, args: PlayArgs) -> Result<()> {
    let mut engine = EngineBuilder::new()
        .with_tps(f64::from(config.display.fps.max(1)))
        .with_config(config)
        .build()
        .context("failed to start the game")?;

    if !args.headless {
        return engine.run().context("windowed runtime failed");
    }

    let script = parse_script(args.script.as_deref().unwrap_or_default())
        .map_err(|e| anyhow!("invalid --script: {}", e))?;
    let report = engine.run_headless(&script, args.ticks);

    println!(
        "Headless run: {} ticks, {:.2}s game time, scene {}",
        report.ticks,
        report.game_time,
        engine.game().current_scene().unwrap_or("none")
    );
    let harness = engine.game().harness();
    if harness.capture_count() > 0 {
        println!("Screenshots: {} in {}", harness.capture_count(), harness.screenshot_dir().display());
        for capture in harness.captures() {
            println!("  {}", capture.display());
        }
    }
    Ok(())
}

pub fn logs(config: &GameConfig, command: LogsCommand) -> Result<()> {
    match command {
        LogsCommand::List { dir } => {
            let dir = dir.unwrap_or_else(|| config.debug.log_dir.clone());
            let files = log_rotation::list(&dir)
                .with_context(|| format!("cannot list logs in {}", dir.display()))?;

            if files.is_empty() {
                println!("No log files in {}", dir.display());
                return Ok(());
            }
            println!("{} log files in {}:", files.len(), dir.display());
            for (i, file) in files.iter().enumerate() {
                println!("{:>3}. {}", i + 1, format_log_entry(file));
            }
        }
        LogsCommand::Clean { keep, dir } => {
            let dir = dir.unwrap_or_else(|| config.debug.log_dir.clone());
            let report = log_rotation::clean(&dir, keep)
                .with_context(|| format!("cannot clean logs in {}", dir.display()))?;

            println!("Kept {}, deleted {} log files", report.kept.len(), report.deleted.len());
            for (path, error) in &report.failed {
                println!("  failed {}: {}", path.display(), error);
            }
        }
    }
    Ok(())
}

/// `name (size bytes, mtime)`, the layout of the old log tool.
fn format_log_entry(file: &log_rotation::LogFile) -> String {
    format!("{} ({} bytes, {})", file.name(), file.size, file.modified_display())
}

pub fn check(config: &GameConfig) -> Result<()> {
    let report = diagnostics::check(config);
    println!("{}", report);
    if !report.passed() {
        bail!("smoke test failed");
    }
    Ok(())
}

pub fn audio(config: &GameConfig) -> Result<()> {
    let report = diagnostics::audio(config, Box::new(LogSink));
    println!("{}", report);
    Ok(())
}

pub fn prologue(config: &GameConfig, path: ProloguePath) -> Result<()> {
    let story = Story::builtin().context("built-in story is invalid")?;
    let report = diagnostics::prologue(config, &story, path);
    println!("{}", report);

    let broken = report.broken_transitions().count();
    if broken > 0 {
        bail!("{} scene transitions point at missing scenes", broken);
    }
    info!("Prologue walk finished ({})", path);
    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_play() {
        let cli = Cli::try_parse_from(["simulate_to_survive"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn play_accepts_headless_script() {
        let cli = Cli::try_parse_from([
            "simulate_to_survive",
            "play",
            "--headless",
            "--script",
            "enter,space",
            "--ticks",
            "5",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        match cli.command {
            Some(Command::Play(args)) => {
                assert!(args.headless);
                assert_eq!(args.script.as_deref(), Some("enter,space"));
                assert_eq!(args.ticks, 5);
            }
            other => panic!("Expected play, got {:?}", other),
        }
    }

    #[test]
    fn script_requires_headless() {
        assert!(Cli::try_parse_from(["simulate_to_survive", "play", "--script", "enter"]).is_err());
    }

    #[test]
    fn logs_clean_defaults_to_keep_nothing() {
        let cli = Cli::try_parse_from(["simulate_to_survive", "logs", "clean"]).unwrap();
        match cli.command {
            Some(Command::Logs(LogsCommand::Clean { keep, dir })) => {
                assert_eq!(keep, 0);
                assert!(dir.is_none());
            }
            other => panic!("Expected logs clean, got {:?}", other),
        }
    }

    #[test]
    fn log_entries_show_size_in_bytes() {
        let file = log_rotation::LogFile {
            path: PathBuf::from("logs/simulate_to_survive_20260101_120000.log"),
            size: 2048,
            modified: std::time::SystemTime::UNIX_EPOCH,
        };

        let entry = format_log_entry(&file);

        assert!(entry.starts_with("simulate_to_survive_20260101_120000.log (2048 bytes, "));
        assert!(entry.ends_with(')'));
    }

    #[test]
    fn prologue_path_values() {
        let cli = Cli::try_parse_from(["simulate_to_survive", "prologue", "--path", "balanced"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Prologue { path: ProloguePath::Balanced })
        ));

        let cli = Cli::try_parse_from(["simulate_to_survive", "prologue"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Prologue { path: ProloguePath::Obsession })
        ));
    }
}
