use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trade_market::{
    account::Money,
    bin_utils::{Service, ServiceError},
    market::MarketConfig,
    offer::GoodKind,
};

/// Runs a market over seller offers read from a CSV file and prints
/// the resulting balances.
#[derive(Debug, Parser)]
struct Cli {
    /// CSV file with `seller,kind,refinement,price,reserve` rows
    offers: PathBuf,
    /// Kind of good the market buys
    #[arg(long)]
    good_kind: GoodKind,
    /// Highest unit price the market pays
    #[arg(long)]
    price_ceiling: Money,
    /// Number of goods the market buys
    #[arg(long)]
    demand: usize,
    /// Initial market funds
    #[arg(long)]
    balance: Money,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = File::open(&cli.offers)
        .with_context(|| format!("Failed to open `{}`", cli.offers.display()))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config: MarketConfig {
            good_kind: cli.good_kind,
            price_ceiling: cli.price_ceiling,
            demand: cli.demand,
            balance: cli.balance,
        },
        error_printer: Box::new(|line: u64, err: ServiceError| match err {
            ServiceError::ParseErr(err) => eprintln!("Error at line {line}: {err}"),
            ServiceError::MarketErr(err) => eprintln!("Offer at line {line} rejected: {err}"),
        }),
    };
    service.run()
}
