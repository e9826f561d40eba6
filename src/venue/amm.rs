//! Constant-product AMM venue.
//!
//! Prices one swap direction of a `reserve_in * reserve_out = k` pool with
//! a basis-point fee taken from the input, using integer arithmetic only so
//! outputs are bit-exact and rounding never favors the trader.

use std::sync::Mutex;

use async_trait::async_trait;
use eyre::{bail, Result};

use super::{lock, mul_div, price_impact_bps, LegFill, Quote, Venue, VenueKind};
use crate::error::ErrorKind;
use crate::types::{Amount, TokenId, BPS_DENOM};

/// Mutable pool state. The version is bumped by every write so quotes can
/// detect a race with another transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PoolState {
    /// Reserve of the input-side token.
    reserve_in: Amount,
    /// Reserve of the output-side token.
    reserve_out: Amount,
    /// Monotonic write counter.
    version: u64,
}

/// One swap direction of a constant-product pool.
pub struct AmmVenue {
    /// Name used in logs.
    label: String,
    /// Token this direction consumes.
    token_in: TokenId,
    /// Token this direction produces.
    token_out: TokenId,
    /// Swap fee in basis points, taken from the input amount.
    fee_bps: u32,
    /// Live reserves and version.
    state: Mutex<PoolState>,
    /// Pre-swap snapshots, popped in reverse by [`Venue::revert`].
    undo: Mutex<Vec<PoolState>>,
}

/// `floor(amount_in * (10000 - fee) * reserve_out /
/// (reserve_in * 10000 + amount_in * (10000 - fee)))`.
///
/// # Errors
///
/// `MathOverflow` if any intermediate product overflows,
/// `InsufficientLiquidity` if the pool is empty.
pub fn constant_product_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: u32,
) -> Result<Amount, ErrorKind> {
    let keep = Amount::from(BPS_DENOM - u64::from(fee_bps));
    let effective_in = amount_in
        .checked_mul(keep)
        .ok_or(ErrorKind::MathOverflow)?;
    let numerator = effective_in
        .checked_mul(reserve_out)
        .ok_or(ErrorKind::MathOverflow)?;
    let denominator = reserve_in
        .checked_mul(Amount::from(BPS_DENOM))
        .ok_or(ErrorKind::MathOverflow)?
        .checked_add(effective_in)
        .ok_or(ErrorKind::MathOverflow)?;
    if denominator.is_zero() {
        return Err(ErrorKind::InsufficientLiquidity);
    }
    Ok(numerator / denominator)
}

impl AmmVenue {
    /// Creates a pool direction with the given reserves and fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens are equal, a reserve is zero, or the
    /// fee is not below 10,000 bps.
    pub fn new(
        label: &str,
        token_in: TokenId,
        token_out: TokenId,
        reserve_in: Amount,
        reserve_out: Amount,
        fee_bps: u32,
    ) -> Result<Self> {
        if token_in == token_out {
            bail!("pool tokens must be different");
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            bail!("pool reserves must be positive");
        }
        if u64::from(fee_bps) >= BPS_DENOM {
            bail!("fee_bps must be below 10000");
        }
        Ok(Self {
            label: label.to_string(),
            token_in,
            token_out,
            fee_bps,
            state: Mutex::new(PoolState {
                reserve_in,
                reserve_out,
                version: 0,
            }),
            undo: Mutex::new(Vec::new()),
        })
    }

    /// Overwrites the reserves, modelling a trade by another actor landing
    /// on the pool. Bumps the state version.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` if the state lock is poisoned.
    pub fn set_reserves(&self, reserve_in: Amount, reserve_out: Amount) -> Result<(), ErrorKind> {
        let mut state = lock(&self.state)?;
        state.reserve_in = reserve_in;
        state.reserve_out = reserve_out;
        state.version += 1;
        Ok(())
    }

    /// Current reserves, for assertions and the demo binary.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` if the state lock is poisoned.
    pub fn reserves(&self) -> Result<(Amount, Amount), ErrorKind> {
        let state = lock(&self.state)?;
        Ok((state.reserve_in, state.reserve_out))
    }

    /// Quote against an explicit state, shared by `quote` and `execute`.
    fn quote_state(&self, state: &PoolState, amount_in: Amount) -> Result<Quote, ErrorKind> {
        let expected = constant_product_out(amount_in, state.reserve_in, state.reserve_out, self.fee_bps)?;
        if expected.is_zero() && !amount_in.is_zero() {
            return Err(ErrorKind::InsufficientLiquidity);
        }
        let keep = Amount::from(BPS_DENOM - u64::from(self.fee_bps));
        let effective_in = amount_in
            .checked_mul(keep)
            .ok_or(ErrorKind::MathOverflow)?;
        let marginal_denominator = state
            .reserve_in
            .checked_mul(Amount::from(BPS_DENOM))
            .ok_or(ErrorKind::MathOverflow)?;
        let ideal = mul_div(effective_in, state.reserve_out, marginal_denominator)?;
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
impl Venue for AmmVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::ConstantProduct
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

        state.reserve_in = state
            .reserve_in
            .checked_add(amount_in)
            .ok_or(ErrorKind::MathOverflow)?;
        state.reserve_out -= quote.amount_out_expected;
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
