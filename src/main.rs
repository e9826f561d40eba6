//! Demo binary: runs one atomic arbitrage execution against three
//! in-memory venues and prints the outcome as JSON.

use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use log::info;

use triarb::config::Config;
use triarb::exec::{execute_arbitrage, Ledger};
use triarb::logger::setup_logger;
use triarb::types::{Amount, TokenId, TradeRequest};
use triarb::venue::amm::AmmVenue;
use triarb::venue::book::{BookVenue, Level, PRICE_SCALE};
use triarb::venue::clmm::ClmmVenue;
use triarb::venue::VenueHandle;

/// Command-line overrides for the environment defaults.
#[derive(Parser)]
#[command(author, version, about = "Three-leg atomic arbitrage demo", long_about = None)]
struct Cli {
    /// Input amount in base units of the starting token
    #[arg(long)]
    amount_in: Option<u64>,
    /// Minimum acceptable profit in base units of the starting token
    #[arg(long)]
    min_profit: Option<u64>,
    /// Maximum tolerated slippage in basis points
    #[arg(long)]
    max_slippage_bps: Option<u32>,
}

/// Builds the demo route: USDC -> SOL on a constant-product pool,
/// SOL -> RAY on a concentrated range, RAY -> USDC on an order book.
fn demo_venues() -> Result<Vec<VenueHandle>> {
    let pool = AmmVenue::new(
        "raydium USDC/SOL",
        TokenId::from("USDC"),
        TokenId::from("SOL"),
        Amount::from(1_000_000_000u64),
        Amount::from(500_000_000u64),
        30,
    )?;
    let range = ClmmVenue::new(
        "orca SOL/RAY",
        TokenId::from("SOL"),
        TokenId::from("RAY"),
        Amount::from(400_000_000u64),
        Amount::from(900_000_000u64),
        Amount::from(50_000_000u64),
        25,
    )?;
    let market = BookVenue::new(
        "openbook RAY/USDC",
        TokenId::from("RAY"),
        TokenId::from("USDC"),
        vec![
            Level {
                price: PRICE_SCALE * 95 / 100,
                quantity: Amount::from(1_200_000u64),
            },
            Level {
                price: PRICE_SCALE * 94 / 100,
                quantity: Amount::from(1_500_000u64),
            },
        ],
    )?;
    Ok(vec![Arc::new(pool), Arc::new(range), Arc::new(market)])
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger()?;
    let config = Config::from_env();
    let cli = Cli::parse();

    let request = TradeRequest::new(
        Amount::from(cli.amount_in.unwrap_or(config.amount_in)),
        Amount::from(cli.min_profit.unwrap_or(config.min_profit)),
        cli.max_slippage_bps.unwrap_or(config.max_slippage_bps),
    )?;

    let venues = demo_venues()?;
    let mut ledger = Ledger::new(
        [(TokenId::from("USDC"), Amount::from(10_000_000u64))]
            .into_iter()
            .collect(),
    );

    info!(
        "executing {} -> {} legs, min profit {}, max slippage {} bps",
        request.amount_in,
        venues.len(),
        request.min_profit,
        request.max_slippage_bps
    );
    let outcome = execute_arbitrage(&request, &venues, &mut ledger).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
