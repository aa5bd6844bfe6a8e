pub mod cli;
pub mod core;
pub mod providers;
pub mod server;

use crate::cli::{calc::CalcArgs, serve::ServeArgs};
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Calc(CalcArgs),
    Rates { attempts: Option<u32> },
    Serve(ServeArgs),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("VPS value calculator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Calc(args) => cli::calc::run(&config, args).await,
        AppCommand::Rates { attempts } => cli::rates::run(&config, attempts).await,
        AppCommand::Serve(args) => cli::serve::run(&config, args).await,
    }
}
