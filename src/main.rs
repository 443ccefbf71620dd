mod collate;
mod config;
mod contact;
mod controller;
mod error;
mod logging;
mod phone;
mod store;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "agenda", about = "In-memory contact list for the terminal")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs here instead of the configured or default location
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the configuration, then print the categories
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    if let Some(command) = cli.command {
        match command {
            Command::CheckConfig => {
                handle_check_config(&config);
                return Ok(());
            }
        }
    }

    let log_path = match cli.log_file {
        Some(path) => path,
        None => config.log.resolved_file()?,
    };
    let _guard = logging::init(&log_path, &config.log.level)?;
    info!(
        config = %config
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string()),
        categories = config.categories.len(),
        "starting"
    );

    let mut app = ui::app::App::new(&config);
    app.run()?;

    Ok(())
}

fn handle_check_config(config: &Config) {
    match &config.config_path {
        Some(path) => println!("Loaded configuration from {}", path.display()),
        None => println!("No configuration file found; using defaults"),
    }

    println!("Categories:");
    for option in config.categories.options() {
        if option.icon.is_empty() {
            println!("  {}", option.category);
        } else {
            println!("  {} {}", option.icon, option.category);
        }
    }

    if let Some(region) = &config.phone_region {
        println!("Phone region: {}", region);
    }
}
