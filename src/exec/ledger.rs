//! Caller token-account ledger.
//!
//! Tracks the balances the executor moves between legs: the source token,
//! the intermediates, and the destination. The core only needs
//! debit/credit success-or-failure signals from it; a snapshot taken before
//! leg 1 is restored verbatim on any abort.

use std::collections::HashMap;

use crate::error::ErrorKind;
use crate::types::{Amount, TokenId};

/// Balances of the caller's token accounts, keyed by token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Map of token IDs to their balances in base units.
    holdings: HashMap<TokenId, Amount>,
}

impl Ledger {
    /// Creates a ledger with the given holdings.
    #[must_use]
    pub fn new(holdings: HashMap<TokenId, Amount>) -> Self {
        Self { holdings }
    }

    /// Balance of a token; zero if the token has no account yet.
    #[must_use]
    pub fn balance(&self, token: &TokenId) -> Amount {
        self.holdings.get(token).copied().unwrap_or_default()
    }

    /// Adds `amount` to the token's balance.
    ///
    /// # Errors
    ///
    /// `MathOverflow` if the balance would overflow.
    pub fn credit(&mut self, token: &TokenId, amount: Amount) -> Result<(), ErrorKind> {
        let balance = self.holdings.entry(token.clone()).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(ErrorKind::MathOverflow)?;
        Ok(())
    }

    /// Removes `amount` from the token's balance.
    ///
    /// # Errors
    ///
    /// `VenueExecutionFailed` when the balance is short; the transfer
    /// collaborator signals failure and the executor aborts.
    pub fn debit(&mut self, token: &TokenId, amount: Amount) -> Result<(), ErrorKind> {
        let balance = self.holdings.entry(token.clone()).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(ErrorKind::VenueExecutionFailed)?;
        Ok(())
    }

    /// Copy of the current holdings, taken before leg 1.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Restores a snapshot verbatim, discarding every change since.
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}
