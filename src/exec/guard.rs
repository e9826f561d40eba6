//! Slippage and profit guards.
//!
//! Pure checks applied around venue calls: the slippage guard bounds the
//! downside deviation between a quoted and a realized output, and the
//! profit guard is the final gate before commit.

use crate::error::ErrorKind;
use crate::types::{Amount, SignedAmount, BPS_DENOM};

/// Downside deviation of `realized` from `quoted` in basis points. Upside
/// counts as zero; only shortfalls are deviation.
///
/// # Errors
///
/// `MathOverflow` on checked-arithmetic failure.
pub fn deviation_bps(quoted: Amount, realized: Amount) -> Result<u32, ErrorKind> {
    if quoted.is_zero() || realized >= quoted {
        return Ok(0);
    }
    let shortfall = quoted - realized;
    let scaled = shortfall
        .checked_mul(Amount::from(BPS_DENOM))
        .ok_or(ErrorKind::MathOverflow)?;
    u32::try_from(scaled / quoted).map_err(|_| ErrorKind::MathOverflow)
}

/// Rejects a realized output that fell short of its quote by more than
/// `max_slippage_bps`.
///
/// # Errors
///
/// `SlippageExceeded` when the deviation is over the bound, `MathOverflow`
/// on checked-arithmetic failure.
pub fn check_slippage(
    quoted: Amount,
    realized: Amount,
    max_slippage_bps: u32,
) -> Result<(), ErrorKind> {
    let deviation = deviation_bps(quoted, realized)?;
    if deviation > max_slippage_bps {
        return Err(ErrorKind::SlippageExceeded);
    }
    Ok(())
}

/// Net profit of an execution, `final_out - amount_in`, as a signed amount.
///
/// # Errors
///
/// `MathOverflow` if either amount exceeds the signed range.
pub fn net_profit(amount_in: Amount, final_out: Amount) -> Result<SignedAmount, ErrorKind> {
    let final_out = SignedAmount::try_from(final_out).map_err(|_| ErrorKind::MathOverflow)?;
    let amount_in = SignedAmount::try_from(amount_in).map_err(|_| ErrorKind::MathOverflow)?;
    final_out
        .checked_sub(amount_in)
        .ok_or(ErrorKind::MathOverflow)
}

/// The final gate: accepts the execution only when net profit reaches the
/// caller's minimum, returning the profit it checked.
///
/// # Errors
///
/// `InsufficientProfit` when `final_out - amount_in < min_profit`,
/// `MathOverflow` if an amount exceeds the signed range.
pub fn check_profit(
    amount_in: Amount,
    final_out: Amount,
    min_profit: Amount,
) -> Result<SignedAmount, ErrorKind> {
    let profit = net_profit(amount_in, final_out)?;
    let min_profit = SignedAmount::try_from(min_profit).map_err(|_| ErrorKind::MathOverflow)?;
    if profit < min_profit {
        return Err(ErrorKind::InsufficientProfit);
    }
    Ok(profit)
}
