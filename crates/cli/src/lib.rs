pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slotwise_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "slotwise",
    about = "Slotwise meeting calendar CLI",
    long_about = "Inspect configuration, seed the demo week, and drive the calendar tools one call at a time or as a JSON-lines session.",
    after_help = "Examples:\n  slotwise doctor --json\n  slotwise call find_free_slot --input '{\"duration\":60,\"date\":\"2025-05-03\"}'\n  echo '{\"tool\":\"list_meetings\"}' | slotwise session --demo"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a slotwise.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, the working-time window, and the demo fixture")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Build the deterministic demo week and print the calendar state")]
    Seed,
    #[command(about = "List the registered calendar tools")]
    Tools,
    #[command(about = "Run a single calendar tool against a fresh calendar")]
    Call {
        #[arg(help = "Tool name, e.g. add_meeting or find_free_slot")]
        tool: String,
        #[arg(long, help = "Tool arguments as a JSON object")]
        input: Option<String>,
        #[arg(long, help = "Pre-populate the calendar with the demo week")]
        demo: bool,
    },
    #[command(
        about = "Execute JSON-lines tool calls from stdin against one calendar, in order"
    )]
    Session {
        #[arg(long, help = "Pre-populate the calendar with the demo week")]
        demo: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    init_logging(&resolve_logging(&options));

    let result = match cli.command {
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Seed => commands::seed::run(&options),
        Command::Tools => commands::tools::run(),
        Command::Call { tool, input, demo } => {
            commands::call::run(&options, &tool, input.as_deref(), demo)
        }
        Command::Session { demo } => commands::session::run(&options, demo),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logging settings for the whole process. Commands report config failures
/// themselves, so an invalid config falls back to default logging here.
pub fn resolve_logging(options: &LoadOptions) -> LoggingConfig {
    AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging)
}

/// Logs go to stderr so stdout stays machine-readable. Only the first call
/// installs a subscriber.
pub fn init_logging(config: &LoggingConfig) {
    use tracing::Level;

    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
