//! # Venue Module
//!
//! The venue seam: opaque handles to the three liquidity venue kinds the
//! executor routes through. Each venue exposes versioned state reads, a
//! pure quote, an `execute` that applies one swap, and a `revert` that
//! restores the exact pre-swap state for rollback. The venues' own
//! matching and pricing internals stay behind this trait.

/// Constant-product AMM pool venue
pub mod amm;
/// Order-book market venue
pub mod book;
/// Concentrated-liquidity AMM venue
pub mod clmm;

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use derive_more::Display;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::types::{Amount, TokenId, BPS_DENOM};

/// Discriminant identifying what kind of venue a handle points at.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum VenueKind {
    /// Automated market maker priced on `reserve_in * reserve_out = k`.
    #[display("constant-product")]
    ConstantProduct,
    /// AMM with liquidity concentrated in an active price range.
    #[display("concentrated")]
    Concentrated,
    /// Order book filled by walking resting levels in price priority.
    #[display("order-book")]
    OrderBook,
}

/// Expected result of one swap against a venue's state at quote time.
///
/// Produced per leg, consumed immediately, never persisted.
#[derive(Clone, Debug)]
pub struct Quote {
    /// Kind of the quoting venue.
    pub kind: VenueKind,
    /// Venue state version the quote was computed against. Execution
    /// re-checks this to detect a race with another transaction.
    pub state_version: u64,
    /// Input amount the quote was computed for.
    pub amount_in: Amount,
    /// Expected output after fees and curve/book slippage.
    pub amount_out_expected: Amount,
    /// Output at the pre-trade marginal price, before any size impact.
    pub amount_out_ideal: Amount,
    /// `(ideal - expected) * 10000 / ideal`.
    pub price_impact_bps: u32,
}

/// Realized result of one executed leg.
///
/// Feeds the realized-slippage check, the next leg's input, and the
/// compensating-action list.
#[derive(Clone, Debug)]
pub struct LegFill {
    /// Input actually consumed by the venue.
    pub amount_in_actual: Amount,
    /// Output actually produced by the venue.
    pub amount_out_actual: Amount,
    /// State version the venue snapshotted before applying the swap; keys
    /// the compensating restore in [`Venue::revert`].
    pub restore: u64,
}

/// One liquidity venue, scoped to a single swap direction
/// (`token_in` -> `token_out`) for the duration of one execution.
#[async_trait]
pub trait Venue: Send + Sync {
    /// The venue discriminant.
    fn kind(&self) -> VenueKind;

    /// Human-readable name for logs.
    fn label(&self) -> &str;

    /// Token this venue consumes.
    fn token_in(&self) -> &TokenId;

    /// Token this venue produces.
    fn token_out(&self) -> &TokenId;

    /// Current state version. Bumped by every write, including writes by
    /// other actors.
    async fn state_version(&self) -> Result<u64, ErrorKind>;

    /// Computes the expected output for `amount_in` against current state.
    /// Read-only.
    ///
    /// # Errors
    ///
    /// `InsufficientLiquidity` if the venue cannot absorb `amount_in`,
    /// `MathOverflow` on checked-arithmetic failure.
    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind>;

    /// Applies the swap, consuming `amount_in` and mutating venue state.
    ///
    /// # Errors
    ///
    /// `StaleVenueState` if the current version differs from
    /// `quoted_version`; otherwise the same failures as [`Venue::quote`].
    async fn execute(&self, amount_in: Amount, quoted_version: u64) -> Result<LegFill, ErrorKind>;

    /// Restores the exact state snapshotted before `fill` was applied.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` if `fill` does not match the most recent
    /// unreverted swap on this venue.
    async fn revert(&self, fill: &LegFill) -> Result<(), ErrorKind>;
}

/// Opaque reference to a venue, shared with the caller for one execution.
pub type VenueHandle = Arc<dyn Venue>;

/// Locks a venue-internal mutex, mapping poisoning to a venue failure so
/// callers never panic on a lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ErrorKind> {
    mutex.lock().map_err(|_| ErrorKind::VenueExecutionFailed)
}

/// `a * b / d` with an explicit overflow check on the multiplication.
pub(crate) fn mul_div(a: Amount, b: Amount, d: Amount) -> Result<Amount, ErrorKind> {
    if d.is_zero() {
        return Err(ErrorKind::InsufficientLiquidity);
    }
    let product = a.checked_mul(b).ok_or(ErrorKind::MathOverflow)?;
    Ok(product / d)
}

/// Size impact of a quote in basis points, measured against the output at
/// the pre-trade marginal price. Zero when the fill is at or better than
/// the marginal price.
pub(crate) fn price_impact_bps(ideal: Amount, expected: Amount) -> Result<u32, ErrorKind> {
    if ideal.is_zero() || expected >= ideal {
        return Ok(0);
    }
    let shortfall = ideal - expected;
    let bps = mul_div(shortfall, Amount::from(BPS_DENOM), ideal)?;
    u32::try_from(bps).map_err(|_| ErrorKind::MathOverflow)
}
