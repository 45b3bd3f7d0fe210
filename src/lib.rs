pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Ratio {
        from: String,
        to: String,
        amount: Option<f64>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxscrape starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::GoogleRatioProvider::new(&config.providers.google)?;

    match command {
        AppCommand::Ratio { from, to, amount } => {
            cli::ratio::run(&provider, &from, &to, amount).await
        }
    }
}
