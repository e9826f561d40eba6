/*!
 * # Triarb - Atomic Cross-Venue Arbitrage Executor
 *
 * Triarb routes a starting token amount sequentially through three
 * independent liquidity venues (a constant-product AMM, a concentrated
 * AMM, and an order-book market) and either completes all legs profitably
 * within caller-specified bounds or aborts with no state change.
 *
 * ## Core Guarantees
 *
 * - **Exact arithmetic**: all amounts are integer fixed-point with
 *   checked multiplication before division; rounding never favors the
 *   trader.
 * - **Atomicity**: legs execute as one indivisible unit; any failure
 *   unwinds every applied leg via compensating actions.
 * - **Guarded execution**: realized output is checked against its quote
 *   after every leg, and net profit is gated immediately before commit.
 *
 * ## Module Structure
 *
 * - `venue`: the opaque venue seam and the three venue kinds
 * - `exec`: route planning, guards, the caller ledger and the executor
 * - `types`, `error`: shared amounts, tokens and the failure taxonomy
 * - `config`, `logger`: environment defaults and console logging
 */

/// Environment-backed defaults for the demo binary
pub mod config;
/// Typed failure reasons
pub mod error;
/// Route planning, guards, ledger and the atomic executor
pub mod exec;
/// Console logging setup
pub mod logger;
/// Shared amount and token types
pub mod types;
/// Venue seam and venue implementations
pub mod venue;
