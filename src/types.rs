//! Shared amount and token types used across the venue and execution layers.

use alloy::primitives::{I256, U256};
use derive_more::Display;
use eyre::{bail, Result};
use serde::Serialize;

/// An unsigned token amount in base units.
pub type Amount = U256;

/// A signed token amount, used for profit that may be negative.
pub type SignedAmount = I256;

/// Basis-point denominator: 10,000 bps = 100%.
pub const BPS_DENOM: u64 = 10_000;

/// Identifier of a token (mint address or symbol). Venues and the caller
/// ledger agree on these identifiers; the core never interprets them.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TokenId(pub String);

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The caller's bounds for one arbitrage execution.
///
/// All amounts are denominated in base units of the starting token; the
/// route is required to end in that same token so `min_profit` is comparable
/// to the final output.
#[derive(Clone, Debug)]
pub struct TradeRequest {
    /// Amount fed into the first leg.
    pub amount_in: Amount,
    /// Minimum acceptable `final_out - amount_in`, checked before commit.
    pub min_profit: Amount,
    /// Maximum tolerated downside deviation between quoted and realized
    /// output, per leg and for the route as a whole.
    pub max_slippage_bps: u32,
}

impl TradeRequest {
    /// Creates a validated request.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount_in` is zero or `max_slippage_bps`
    /// exceeds 10,000.
    pub fn new(amount_in: Amount, min_profit: Amount, max_slippage_bps: u32) -> Result<Self> {
        if amount_in.is_zero() {
            bail!("amount_in must be positive");
        }
        if u64::from(max_slippage_bps) > BPS_DENOM {
            bail!("max_slippage_bps must be within 0..=10000");
        }
        Ok(Self {
            amount_in,
            min_profit,
            max_slippage_bps,
        })
    }
}
