//! Builders and venue doubles for execution tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::exec::ledger::Ledger;
use crate::types::{Amount, TokenId, BPS_DENOM};
use crate::venue::amm::AmmVenue;
use crate::venue::book::{BookVenue, Level};
use crate::venue::clmm::ClmmVenue;
use crate::venue::{mul_div, LegFill, Quote, Venue, VenueKind};

/// Constant-product pool direction with `u64` reserves.
#[allow(clippy::unwrap_used)]
pub fn amm(
    label: &str,
    token_in: &str,
    token_out: &str,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u32,
) -> Arc<AmmVenue> {
    Arc::new(
        AmmVenue::new(
            label,
            TokenId::from(token_in),
            TokenId::from(token_out),
            Amount::from(reserve_in),
            Amount::from(reserve_out),
            fee_bps,
        )
        .unwrap(),
    )
}

/// Concentrated range direction with `u64` virtual reserves.
#[allow(clippy::unwrap_used)]
pub fn clmm(
    label: &str,
    token_in: &str,
    token_out: &str,
    virtual_in: u64,
    virtual_out: u64,
    capacity_in: u64,
    fee_bps: u32,
) -> Arc<ClmmVenue> {
    Arc::new(
        ClmmVenue::new(
            label,
            TokenId::from(token_in),
            TokenId::from(token_out),
            Amount::from(virtual_in),
            Amount::from(virtual_out),
            Amount::from(capacity_in),
            fee_bps,
        )
        .unwrap(),
    )
}

/// Book side from `(price, quantity)` pairs, best price first.
#[allow(clippy::unwrap_used)]
pub fn book(label: &str, token_in: &str, token_out: &str, levels: &[(u64, u64)]) -> Arc<BookVenue> {
    let levels = levels
        .iter()
        .map(|(price, quantity)| Level {
            price: *price,
            quantity: Amount::from(*quantity),
        })
        .collect();
    Arc::new(BookVenue::new(label, TokenId::from(token_in), TokenId::from(token_out), levels).unwrap())
}

/// Ledger from `(token, balance)` pairs.
pub fn ledger(balances: &[(&str, u64)]) -> Ledger {
    Ledger::new(
        balances
            .iter()
            .map(|(token, balance)| (TokenId::from(*token), Amount::from(*balance)))
            .collect(),
    )
}

/// Venue double that quotes one fixed output and realizes another,
/// regardless of input. State is versionless and reverts are no-ops.
pub struct StubVenue {
    /// Name used in logs.
    label: String,
    /// Token this stub consumes.
    token_in: TokenId,
    /// Token this stub produces.
    token_out: TokenId,
    /// Output promised by quotes.
    quoted_out: Amount,
    /// Output produced by execution.
    realized_out: Amount,
}

impl StubVenue {
    /// Creates a stub quoting `quoted_out` and realizing `realized_out`.
    pub fn new(
        label: &str,
        token_in: &str,
        token_out: &str,
        quoted_out: u64,
        realized_out: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            token_in: TokenId::from(token_in),
            token_out: TokenId::from(token_out),
            quoted_out: Amount::from(quoted_out),
            realized_out: Amount::from(realized_out),
        })
    }
}

#[async_trait]
impl Venue for StubVenue {
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
        Ok(0)
    }

    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind> {
        Ok(Quote {
            kind: self.kind(),
            state_version: 0,
            amount_in,
            amount_out_expected: self.quoted_out,
            amount_out_ideal: self.quoted_out,
            price_impact_bps: 0,
        })
    }

    async fn execute(&self, amount_in: Amount, quoted_version: u64) -> Result<LegFill, ErrorKind> {
        if quoted_version != 0 {
            return Err(ErrorKind::StaleVenueState);
        }
        Ok(LegFill {
            amount_in_actual: amount_in,
            amount_out_actual: self.realized_out,
            restore: 0,
        })
    }

    async fn revert(&self, _fill: &LegFill) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Wrapper that lands another actor's trade on the inner pool right before
/// execution, so the quoted state version no longer matches.
pub struct FrontrunVenue {
    /// The pool being raced.
    inner: Arc<AmmVenue>,
    /// Reserves the front-runner leaves behind.
    reserves: (Amount, Amount),
}

impl FrontrunVenue {
    /// Wraps `inner`, scheduling a reserve overwrite before execution.
    pub fn new(inner: Arc<AmmVenue>, reserve_in: u64, reserve_out: u64) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reserves: (Amount::from(reserve_in), Amount::from(reserve_out)),
        })
    }
}

#[async_trait]
impl Venue for FrontrunVenue {
    fn kind(&self) -> VenueKind {
        self.inner.kind()
    }

    fn label(&self) -> &str {
        self.inner.label()
    }

    fn token_in(&self) -> &TokenId {
        self.inner.token_in()
    }

    fn token_out(&self) -> &TokenId {
        self.inner.token_out()
    }

    async fn state_version(&self) -> Result<u64, ErrorKind> {
        self.inner.state_version().await
    }

    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind> {
        self.inner.quote(amount_in).await
    }

    async fn execute(&self, amount_in: Amount, quoted_version: u64) -> Result<LegFill, ErrorKind> {
        self.inner.set_reserves(self.reserves.0, self.reserves.1)?;
        self.inner.execute(amount_in, quoted_version).await
    }

    async fn revert(&self, fill: &LegFill) -> Result<(), ErrorKind> {
        self.inner.revert(fill).await
    }
}

/// Wrapper whose execution never completes in time: quotes pass through
/// untouched, but `execute` reports the deadline imposed by the
/// surrounding environment.
pub struct TimeoutVenue {
    /// The venue that stopped answering.
    inner: Arc<AmmVenue>,
}

impl TimeoutVenue {
    /// Wraps `inner`, timing out every execution attempt.
    pub fn new(inner: Arc<AmmVenue>) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl Venue for TimeoutVenue {
    fn kind(&self) -> VenueKind {
        self.inner.kind()
    }

    fn label(&self) -> &str {
        self.inner.label()
    }

    fn token_in(&self) -> &TokenId {
        self.inner.token_in()
    }

    fn token_out(&self) -> &TokenId {
        self.inner.token_out()
    }

    async fn state_version(&self) -> Result<u64, ErrorKind> {
        self.inner.state_version().await
    }

    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind> {
        self.inner.quote(amount_in).await
    }

    async fn execute(&self, _amount_in: Amount, _quoted_version: u64) -> Result<LegFill, ErrorKind> {
        Err(ErrorKind::Timeout)
    }

    async fn revert(&self, fill: &LegFill) -> Result<(), ErrorKind> {
        self.inner.revert(fill).await
    }
}

/// Wrapper that realizes a haircut below the inner venue's honest output,
/// modelling mid-route price manipulation the version check cannot see.
pub struct RiggedVenue {
    /// The honest venue being manipulated.
    inner: Arc<AmmVenue>,
    /// Shortfall applied to the realized output, in basis points.
    haircut_bps: u32,
}

impl RiggedVenue {
    /// Wraps `inner` with a realized-output shortfall of `haircut_bps`.
    pub fn new(inner: Arc<AmmVenue>, haircut_bps: u32) -> Arc<Self> {
        Arc::new(Self { inner, haircut_bps })
    }
}

#[async_trait]
impl Venue for RiggedVenue {
    fn kind(&self) -> VenueKind {
        self.inner.kind()
    }

    fn label(&self) -> &str {
        self.inner.label()
    }

    fn token_in(&self) -> &TokenId {
        self.inner.token_in()
    }

    fn token_out(&self) -> &TokenId {
        self.inner.token_out()
    }

    async fn state_version(&self) -> Result<u64, ErrorKind> {
        self.inner.state_version().await
    }

    async fn quote(&self, amount_in: Amount) -> Result<Quote, ErrorKind> {
        self.inner.quote(amount_in).await
    }

    async fn execute(&self, amount_in: Amount, quoted_version: u64) -> Result<LegFill, ErrorKind> {
        let mut fill = self.inner.execute(amount_in, quoted_version).await?;
        let keep = Amount::from(BPS_DENOM - u64::from(self.haircut_bps));
        fill.amount_out_actual = mul_div(
            fill.amount_out_actual,
            keep,
            Amount::from(BPS_DENOM),
        )?;
        Ok(fill)
    }

    async fn revert(&self, fill: &LegFill) -> Result<(), ErrorKind> {
        self.inner.revert(fill).await
    }
}
