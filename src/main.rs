use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxdash::core::log::init_logging;
use fxdash::core::rates::SeriesWindow;

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

impl From<Commands> for fxdash::AppCommand {
    fn from(cmd: Commands) -> fxdash::AppCommand {
        match cmd {
            Commands::Rates { base, target } => fxdash::AppCommand::Rates { base, target },
            Commands::Chart { from, to, window } => fxdash::AppCommand::Chart {
                from: from.to_uppercase(),
                to: to.to_uppercase(),
                window,
            },
            Commands::Convert { amount, from, to } => fxdash::AppCommand::Convert {
                amount,
                from: from.to_uppercase(),
                to: to.to_uppercase(),
            },
            Commands::Dashboard => fxdash::AppCommand::Dashboard,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display latest exchange rates for a base currency
    Rates {
        /// Base currency code (defaults to the configured one)
        #[arg(short, long)]
        base: Option<String>,
        /// Target currency to pin at the top of the table
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Display historical rates for a currency pair
    Chart {
        from: String,
        to: String,
        /// Window: daily (7d), monthly (12mo) or yearly (5y)
        #[arg(short, long, default_value = "daily")]
        window: SeriesWindow,
    },
    /// Convert an amount and show the fee breakdown
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// Start an interactive conversion session
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxdash::cli::setup::setup(),
        Some(cmd) => fxdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
