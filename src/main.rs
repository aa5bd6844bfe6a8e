use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use vpsval::cli::{calc::CalcArgs, serve::ServeArgs};
use vpsval::core::log::init_logging;
use vpsval::core::{Currency, PaymentCycle};

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

impl From<Commands> for vpsval::AppCommand {
    fn from(cmd: Commands) -> vpsval::AppCommand {
        match cmd {
            Commands::Calc {
                price,
                currency,
                cycle,
                today,
                expiry,
            } => vpsval::AppCommand::Calc(CalcArgs {
                price,
                currency,
                cycle,
                today,
                expiry,
            }),
            Commands::Rates { attempts } => vpsval::AppCommand::Rates { attempts },
            Commands::Serve { host, port } => vpsval::AppCommand::Serve(ServeArgs { host, port }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate the remaining value of a subscription
    Calc {
        /// Purchase price for one billing cycle
        #[arg(short, long, allow_negative_numbers = true)]
        price: f64,
        /// Currency of the purchase price
        #[arg(long)]
        currency: Option<Currency>,
        /// Billing cycle: monthly, quarterly, semi-annually or annually
        #[arg(long)]
        cycle: Option<PaymentCycle>,
        /// Current date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Expiry date (YYYY-MM-DD)
        #[arg(short, long)]
        expiry: Option<NaiveDate>,
    },
    /// Refresh and display exchange rates
    Rates {
        /// Number of fetch attempts
        #[arg(short, long)]
        attempts: Option<u32>,
    },
    /// Run the caching exchange-rate proxy
    Serve {
        /// Address to listen on
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if matches!(cli.command, Some(Commands::Serve { .. })) {
        LevelFilter::INFO
    } else {
        LevelFilter::OFF
    };
    init_logging(level);

    let result = match cli.command {
        Some(Commands::Setup) => vpsval::cli::setup::setup(),
        Some(cmd) => vpsval::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
