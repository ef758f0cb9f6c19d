pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quotewise_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "quotewise",
    about = "Quotewise project quote CLI",
    long_about = "Price project requirements into draft quotes, merge assistant add-ons, and inspect catalog and config.",
    after_help = "Examples:\n  quotewise price --input project.json --trace\n  quotewise generate --input project.toml --accept analytics\n  quotewise catalog"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a quotewise.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the configured log level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a project input file into a draft quote")]
    Price {
        #[arg(long, help = "JSON or TOML file with project inputs")]
        input: PathBuf,
        #[arg(long, help = "Include the step-by-step pricing trace")]
        trace: bool,
    },
    #[command(about = "Price inputs, request add-on suggestions and print the merged quote")]
    Generate {
        #[arg(long, help = "JSON or TOML file with project inputs")]
        input: PathBuf,
        #[arg(long, value_delimiter = ',', help = "Only merge these suggested keys")]
        accept: Option<Vec<String>>,
        #[arg(long, help = "Override the recommender latency in milliseconds")]
        latency_ms: Option<u64>,
    },
    #[command(about = "List effective catalog prices and feature options")]
    Catalog,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Price { .. } => "price",
            Self::Generate { .. } => "generate",
            Self::Catalog => "catalog",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        recommender_latency_ms: match &cli.command {
            Command::Generate { latency_ms, .. } => *latency_ms,
            _ => None,
        },
    };
    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: overrides.clone(),
    };

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure(
                cli.command.name(),
                "config_validation",
                format!("configuration issue: {error}"),
                commands::EXIT_CONFIG_VALIDATION,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Price { input, trace } => commands::price::run(&config, &input, trace),
        Command::Generate { input, accept, .. } => {
            commands::generate::run(&config, &input, accept)
        }
        Command::Catalog => commands::catalog::run(&config),
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(&config, cli.config.as_deref(), &overrides),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout carries only the command outcome.
fn init_logging(config: &AppConfig) {
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
