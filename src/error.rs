//! Typed failure reasons surfaced to the caller.
//!
//! Every abort reaches the caller as an [`ErrorKind`] inside the terminal
//! `ExecutionOutcome`; nothing is retried internally. Retry policy belongs
//! to the caller, since a blind retry of a financial operation risks
//! double-execution.

use serde::Serialize;
use thiserror::Error;

/// Reasons an execution can abort.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The venue's reserves or resting orders cannot absorb the input.
    #[error("venue cannot absorb the requested amount")]
    InsufficientLiquidity,

    /// The venue's state version changed between quoting and execution,
    /// i.e. another transaction landed first.
    #[error("venue state changed between quote and execution")]
    StaleVenueState,

    /// The caller supplied no venues.
    #[error("route has no legs")]
    EmptyRoute,

    /// Adjacent legs disagree on token flow, or the route does not end in
    /// its starting token.
    #[error("route legs disagree on token flow")]
    IncompatibleLegs,

    /// Realized output fell short of the quote by more than the bound.
    #[error("realized output deviates beyond the slippage bound")]
    SlippageExceeded,

    /// Net profit came in below the caller's minimum.
    #[error("net profit below the caller minimum")]
    InsufficientProfit,

    /// The venue or a token transfer rejected the operation outright.
    #[error("venue rejected or failed the swap")]
    VenueExecutionFailed,

    /// The venue call exceeded the deadline imposed by the surrounding
    /// execution environment.
    #[error("venue call timed out")]
    Timeout,

    /// A checked fixed-point multiplication overflowed.
    #[error("fixed-point arithmetic overflowed")]
    MathOverflow,
}
