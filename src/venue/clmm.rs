//! Concentrated-liquidity AMM venue.
//!
//! Models the active tick range of a concentrated pool as a pair of virtual
//! reserves priced with the constant-product curve, plus an in-range input
//! capacity. Input beyond the capacity would cross out of the range and is
//! reported as insufficient liquidity rather than priced.

use std::sync::Mutex;

use async_trait::async_trait;
use eyre::{bail, Result};

use super::amm::constant_product_out;
use super::{lock, mul_div, price_impact_bps, LegFill, Quote, Venue, VenueKind};
use crate::error::ErrorKind;
use crate::types::{Amount, TokenId, BPS_DENOM};

/// Mutable state of the active range.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RangeState {
    /// Virtual reserve of the input-side token within the range.
    virtual_in: Amount,
    /// Virtual reserve of the output-side token within the range.
    virtual_out: Amount,
    /// Input the range can still absorb before the price leaves it.
    capacity_in: Amount,
    /// Monotonic write counter.
    version: u64,
}

/// One swap direction of a concentrated-liquidity pool's active range.
pub struct ClmmVenue {
    /// Name used in logs.
    label: String,
    /// Token this direction consumes.
    token_in: TokenId,
    /// Token this direction produces.
    token_out: TokenId,
    /// Swap fee in basis points, taken from the input amount.
    fee_bps: u32,
    /// Live range state.
    state: Mutex<RangeState>,
    /// Pre-swap snapshots, popped in reverse by [`Venue::revert`].
    undo: Mutex<Vec<RangeState>>,
}

impl ClmmVenue {
    /// Creates a range with the given virtual reserves, input capacity
    /// and fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens are equal, a reserve or the capacity
    /// is zero, or the fee is not below 10,000 bps.
    pub fn new(
        label: &str,
        token_in: TokenId,
        token_out: TokenId,
        virtual_in: Amount,
        virtual_out: Amount,
        capacity_in: Amount,
        fee_bps: u32,
    ) -> Result<Self> {
        if token_in == token_out {
            bail!("range tokens must be different");
        }
        if virtual_in.is_zero() || virtual_out.is_zero() || capacity_in.is_zero() {
            bail!("range reserves and capacity must be positive");
        }
        if u64::from(fee_bps) >= BPS_DENOM {
            bail!("fee_bps must be below 10000");
        }
        Ok(Self {
            label: label.to_string(),
            token_in,
            token_out,
            fee_bps,
            state: Mutex::new(RangeState {
                virtual_in,
                virtual_out,
                capacity_in,
                version: 0,
            }),
            undo: Mutex::new(Vec::new()),
        })
    }

    /// Remaining in-range input capacity, for assertions.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` if the state lock is poisoned.
    pub fn capacity_in(&self) -> Result<Amount, ErrorKind> {
        Ok(lock(&self.state)?.capacity_in)
    }

    /// Quote against an explicit state, shared by `quote` and `execute`.
    fn quote_state(&self, state: &RangeState, amount_in: Amount) -> Result<Quote, ErrorKind> {
        if amount_in > state.capacity_in {
            return Err(ErrorKind::InsufficientLiquidity);
        }
        let expected =
            constant_product_out(amount_in, state.virtual_in, state.virtual_out, self.fee_bps)?;
        if expected.is_zero() && !amount_in.is_zero() {
            return Err(ErrorKind::InsufficientLiquidity);
        }
        let keep = Amount::from(BPS_DENOM - u64::from(self.fee_bps));
        let effective_in = amount_in
            .checked_mul(keep)
            .ok_or(ErrorKind::MathOverflow)?;
        let marginal_denominator = state
            .virtual_in
            .checked_mul(Amount::from(BPS_DENOM))
            .ok_or(ErrorKind::MathOverflow)?;
        let ideal = mul_div(effective_in, state.virtual_out, marginal_denominator)?;
        Ok(Quote {
            kind: self.kind(),
            state_version: state.version,
            amount_in,
            amount_out_expected: expected,
            amount_out_ideal: ideal,
            price_impact_bps: price_impact_bps(ideal, expected)?,
        })
    }
}

#[async_trait]
impl Venue for ClmmVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::Concentrated
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

        state.virtual_in = state
            .virtual_in
            .checked_add(amount_in)
            .ok_or(ErrorKind::MathOverflow)?;
        state.virtual_out -= quote.amount_out_expected;
        state.capacity_in -= amount_in;
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
