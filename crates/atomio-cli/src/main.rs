mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod npy;

use crate::cli::{Cli, Commands};
use crate::config::PartialConfig;
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 atomio CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = PartialConfig::load(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Write(args) => {
                info!("Dispatching to 'write' command.");
                commands::write::run(args, &config).map(|_| ())
            }
            Commands::Se3(args) => {
                info!("Dispatching to 'se3' command.");
                commands::se3::run(args, &config)
            }
            Commands::Inspect(args) => {
                info!("Dispatching to 'inspect' command.");
                commands::inspect::run(args).map(|_| ())
            }
        }
    });

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
