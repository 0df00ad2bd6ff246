// genrunner
// Main entry point for the genrunner binary

use clap::Parser;
use genrunner_engine::cli::{Cli, Command};
use genrunner_engine::config::Config;
use genrunner_engine::handlers::{handle_check, handle_entry_points, handle_generate, OutputFormat};
use genrunner_engine::telemetry::init_telemetry_with_level;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_default()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    if let Some(level) = &cli.log {
        config.set_log_level(level)?;
    }
    init_telemetry_with_level(&config.core.log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");
    tracing::info!("genrunner v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Generate {
            entry_point,
            profile,
            output,
        } => {
            config.apply_overrides(entry_point, profile, output)?;
            handle_generate(&config, format)
        }

        Command::EntryPoints => handle_entry_points(&config, format),

        Command::Check => handle_check(&config, format),
    }
}
