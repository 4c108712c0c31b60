use anyhow::Result;
use clap::{Parser, Subcommand};
use gettext_turbo::commands;
use gettext_turbo::config::Config;
use gettext_turbo::logging::{self, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gettext-turbo")]
#[command(author, version, about = "Fast gettext template extraction for JavaScript and markup", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity: off, error, warn, info or debug
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract translatable strings into a .pot template
    Extract {
        /// Output file (overrides config)
        #[arg(short, long)]
        output: Option<String>,

        /// Exit with an error when any file was skipped or unreadable
        #[arg(long)]
        fail_on_skipped: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::set_level(cli.log_level);

    // Load configuration
    let config = Config::load_or_default(cli.config.as_ref())?;

    match cli.command {
        Commands::Extract {
            output,
            fail_on_skipped,
        } => {
            commands::extract::run(&config, output, fail_on_skipped)?;
        }
    }

    Ok(())
}
