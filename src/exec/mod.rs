//! # Execution Module
//!
//! Everything between the caller's request and a terminal outcome: route
//! planning, the slippage and profit guards, the caller ledger, and the
//! atomic executor that ties them together.

/// Atomic state machine running a planned route
pub mod executor;
/// Slippage and profit guards
pub mod guard;
/// Caller token-account ledger
pub mod ledger;
/// Route planning and quote composition
pub mod route;
/// Builders and venue doubles for tests
#[cfg(test)]
pub mod test_helpers;

pub use executor::{execute_arbitrage, ExecutionOutcome};
pub use ledger::Ledger;
