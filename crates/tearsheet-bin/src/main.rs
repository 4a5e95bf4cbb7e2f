//! Tearsheet binary.
//!
//! Serves the dashboard page or prints an analysis to the terminal.

mod chart;
mod render;
mod web;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tearsheet::{ChartRange, Config, Dashboard, SymbolTableFormat};
use tracing_subscriber::EnvFilter;

/// Ticker shown in the form and analyzed when none is given.
pub(crate) const DEFAULT_TICKER: &str = "AAPL";

#[derive(Parser)]
#[command(name = "tearsheet")]
#[command(about = "Tearsheet: a minimalist dashboard for company analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// User agent sent to SEC (overrides TEARSHEET_USER_AGENT)
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Symbol table format: json or pipe (overrides TEARSHEET_SYMBOL_FORMAT)
    #[arg(long, global = true)]
    symbol_format: Option<SymbolTableFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard page
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8501")]
        bind: SocketAddr,
    },

    /// Analyze one ticker and print the result
    Analyze {
        /// Stock ticker
        #[arg(default_value = DEFAULT_TICKER)]
        ticker: String,

        /// Chart range (1d, 5d, 1mo, 6mo, 1y, 5y, 10y)
        #[arg(long, default_value_t = ChartRange::default())]
        range: ChartRange,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }
    if let Some(format) = cli.symbol_format {
        config.symbol_source.format = format;
    }

    let dashboard = Dashboard::from_config(&config)?;

    match cli.command {
        Commands::Serve { bind } => {
            web::serve(Arc::new(dashboard), bind).await?;
        }
        Commands::Analyze { ticker, range } => {
            let analysis = dashboard.analyze(&ticker, range).await;
            print!("{}", render::text::analysis(&analysis));
        }
    }

    Ok(())
}
