use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxscrape::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the exchange ratio between two currencies
    Ratio {
        /// Reference currency code, e.g. USD
        from: String,
        /// Target currency code, e.g. EUR
        to: String,
        /// Also show this many units of the reference currency converted
        #[arg(short, long)]
        amount: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxscrape::cli::setup::setup(),
        Some(Commands::Ratio { from, to, amount }) => {
            fxscrape::run_command(
                fxscrape::AppCommand::Ratio { from, to, amount },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
