pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shelfwise_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "shelfwise",
    about = "Shelfwise recommendation CLI",
    long_about = "Score product recommendations from JSON request bodies and inspect engine readiness.",
    after_help = "Examples:\n  shelfwise recommend trending --input trending.json\n  cat similar.json | shelfwise recommend similar\n  shelfwise doctor --json\n  shelfwise config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one recommendation operation and print the response envelope as JSON")]
    Recommend {
        #[arg(help = "personalized | similar | also-bought | trending | combine")]
        operation: String,
        #[arg(long, help = "Read the request body from FILE instead of stdin")]
        input: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and report engine health")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { operation, input } => {
            commands::recommend::run(&operation, input.as_deref())
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Install the global subscriber. Output goes to stderr so stdout only
/// carries command payloads. Repeated calls keep the first subscriber.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
