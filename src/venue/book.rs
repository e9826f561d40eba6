//! Order-book market venue.
//!
//! Fills an input amount by walking resting levels in price priority and
//! paying out the volume-weighted sum. A book that runs out of resting
//! quantity before the input is consumed reports insufficient liquidity;
//! there are no partial successes.

use std::sync::Mutex;

use async_trait::async_trait;
use eyre::{bail, Result};

use super::{lock, mul_div, price_impact_bps, LegFill, Quote, Venue, VenueKind};
use crate::error::ErrorKind;
use crate::types::{Amount, TokenId};

/// Fixed-point scale for level prices: a price of `PRICE_SCALE` pays one
/// output base unit per input base unit.
pub const PRICE_SCALE: u64 = 1_000_000_000;

/// One resting price level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    /// Output units paid per input unit, scaled by [`PRICE_SCALE`].
    pub price: u64,
    /// Input-token quantity resting at this price.
    pub quantity: Amount,
}

/// Mutable book state for one side.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BookState {
    /// Resting levels, best (highest) price first.
    levels: Vec<Level>,
    /// Monotonic write counter.
    version: u64,
}

/// One side of an order-book market, selling `token_out` for `token_in`.
pub struct BookVenue {
    /// Name used in logs.
    label: String,
    /// Token this side consumes.
    token_in: TokenId,
    /// Token this side produces.
    token_out: TokenId,
    /// Live book state.
    state: Mutex<BookState>,
    /// Pre-fill snapshots, popped in reverse by [`Venue::revert`].
    undo: Mutex<Vec<BookState>>,
}

/// Volume-weighted output for `amount_in` walked through `levels` in
/// price priority.
///
/// # Errors
///
/// `InsufficientLiquidity` if the book is exhausted before `amount_in` is
/// consumed, `MathOverflow` on checked-arithmetic failure.
fn walk_levels(levels: &[Level], amount_in: Amount) -> Result<Amount, ErrorKind> {
    let mut remaining = amount_in;
    let mut amount_out = Amount::ZERO;
    for level in levels {
        if remaining.is_zero() {
            break;
        }
        let take = remaining.min(level.quantity);
        let paid = mul_div(take, Amount::from(level.price), Amount::from(PRICE_SCALE))?;
        amount_out = amount_out.checked_add(paid).ok_or(ErrorKind::MathOverflow)?;
        remaining -= take;
    }
    if !remaining.is_zero() {
        return Err(ErrorKind::InsufficientLiquidity);
    }
    Ok(amount_out)
}

impl BookVenue {
    /// Creates a book side from resting levels.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens are equal, the levels are empty or
    /// not strictly descending by price, or any price or quantity is zero.
    pub fn new(label: &str, token_in: TokenId, token_out: TokenId, levels: Vec<Level>) -> Result<Self> {
        if token_in == token_out {
            bail!("book tokens must be different");
        }
        if levels.is_empty() {
            bail!("book must have at least one level");
        }
        for pair in levels.windows(2) {
            if pair[1].price >= pair[0].price {
                bail!("book levels must be strictly descending by price");
            }
        }
        if levels.iter().any(|l| l.price == 0 || l.quantity.is_zero()) {
            bail!("book levels must have positive price and quantity");
        }
        Ok(Self {
            label: label.to_string(),
            token_in,
            token_out,
            state: Mutex::new(BookState { levels, version: 0 }),
            undo: Mutex::new(Vec::new()),
        })
    }

    /// Total resting input-token quantity, for assertions.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` if the state lock is poisoned.
    pub fn depth(&self) -> Result<Amount, ErrorKind> {
        let state = lock(&self.state)?;
        let mut depth = Amount::ZERO;
        for level in &state.levels {
            depth = depth
                .checked_add(level.quantity)
                .ok_or(ErrorKind::MathOverflow)?;
        }
        Ok(depth)
    }

    /// Quote against an explicit state, shared by `quote` and `execute`.
    fn quote_state(&self, state: &BookState, amount_in: Amount) -> Result<Quote, ErrorKind> {
        let expected = walk_levels(&state.levels, amount_in)?;
        if expected.is_zero() && !amount_in.is_zero() {
            return Err(ErrorKind::InsufficientLiquidity);
        }
        // The best resting level is the pre-trade marginal price.
        let best_price = state
            .levels
            .first()
            .map(|l| l.price)
            .ok_or(ErrorKind::InsufficientLiquidity)?;
        let ideal = mul_div(amount_in, Amount::from(best_price), Amount::from(PRICE_SCALE))?;
        Ok(Quote {
            kind: self.kind(),
            state_version: state.version,
            amount_in,
            amount_out_expected: expected,
            amount_out_ideal: ideal,
            price_impact_bps: price_impact_bps(ideal, expected)?,
        })
    }

    /// Consumes `amount_in` from the front of the book, dropping exhausted
    /// levels. Callers have already checked the book is deep enough.
    fn consume(levels: &mut Vec<Level>, amount_in: Amount) {
        let mut remaining = amount_in;
        while !remaining.is_zero() {
            let Some(front) = levels.first_mut() else {
                break;
            };
            let take = remaining.min(front.quantity);
            front.quantity -= take;
            remaining -= take;
            if front.quantity.is_zero() {
                levels.remove(0);
            }
        }
    }
}

#[async_trait]
impl Venue for BookVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::OrderBook
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn token_in(&self) -> &TokenId {
        &self.token_in
    }

    fn token_out(&self) -> &TokenId {
        &self.token_out
    }

    async fn state_version(&self) -> Result<u64, ErrorKind> {
        Ok(lock(&self.state)?.version)
    }

    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind> {
        let state = lock(&self.state)?;
        self.quote_state(&state, amount_in)
    }

    async fn execute(&self, amount_in: Amount, quoted_version: u64) -> Result<LegFill, ErrorKind> {
        let mut state = lock(&self.state)?;
        if state.version != quoted_version {
            return Err(ErrorKind::StaleVenueState);
        }
        let quote = self.quote_state(&state, amount_in)?;
        let snapshot = state.clone();
        lock(&self.undo)?.push(snapshot);

        Self::consume(&mut state.levels, amount_in);
        state.version += 1;

        Ok(LegFill {
            amount_in_actual: amount_in,
            amount_out_actual: quote.amount_out_expected,
            restore: quoted_version,
        })
    }

    async fn revert(&self, fill: &LegFill) -> Result<(), ErrorKind> {
        let mut undo = lock(&self.undo)?;
        let snapshot = undo.pop().ok_or(ErrorKind::VenueExecutionFailed)?;
        if snapshot.version != fill.restore {
            undo.push(snapshot);
            return Err(ErrorKind::VenueExecutionFailed);
        }
        *lock(&self.state)? = snapshot;
        Ok(())
    }
}
