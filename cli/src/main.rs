//! ballot: replays scripted ballot scenarios against the engine.

mod config;
mod replay;
mod script;

use std::path::PathBuf;

use anyhow::bail;
use ballot_utils::LogFormat;
use clap::Parser;

use crate::config::CliConfig;
use crate::script::Script;

#[derive(Parser)]
#[command(name = "ballot", about = "Session-based ballot engine with vote delegation")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario script and print each step's outcome.
    Replay {
        /// Path to the TOML scenario script.
        script: PathBuf,

        /// Print the final engine state as JSON instead of a summary.
        #[arg(long)]
        json: bool,

        /// Exit with an error if any step was rejected.
        #[arg(long)]
        expect_clean: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    ballot_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Replay {
            script,
            json,
            expect_clean,
        } => {
            let parsed = Script::from_toml_file(&script)?;
            tracing::info!(
                steps = parsed.steps.len(),
                clock = parsed.clock,
                "replaying {}",
                script.display()
            );

            let report = replay::replay(&parsed, config.engine.clone(), &config.programmatic)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
            } else {
                for outcome in &report.outcomes {
                    match &outcome.result {
                        Ok(detail) => println!(
                            "[{:>3}] +{}s {:<18} ok       {detail}",
                            outcome.index, outcome.at, outcome.op
                        ),
                        Err(e) => println!(
                            "[{:>3}] +{}s {:<18} rejected {}: {e}",
                            outcome.index,
                            outcome.at,
                            outcome.op,
                            e.code()
                        ),
                    }
                }
                println!();
                for line in replay::summarize(&report.snapshot, report.final_time) {
                    println!("{line}");
                }
                for (op, accepted, rejected) in report.counter.rows() {
                    println!("{op:<18} accepted {accepted:>4}  rejected {rejected:>4}");
                }
            }

            if expect_clean && report.counter.total_rejected() > 0 {
                bail!(
                    "{} step(s) rejected",
                    report.counter.total_rejected()
                );
            }
        }
    }

    Ok(())
}
