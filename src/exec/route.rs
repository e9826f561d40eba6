//! Route planning.
//!
//! Assembles the caller-supplied venue sequence into a planned route: one
//! quote per leg, each leg's input chained from the previous leg's expected
//! output. Venue ordering is the caller's intent and is never reordered
//! here; the planner only validates token flow and composes the numbers.

use crate::error::ErrorKind;
use crate::types::{Amount, TradeRequest};
use crate::venue::{mul_div, Quote, VenueHandle};

/// One quoted leg of a planned route.
#[derive(Clone)]
pub struct PlannedLeg {
    /// The venue this leg executes against.
    pub venue: VenueHandle,
    /// The leg's quote at planning time.
    pub quote: Quote,
}

/// A quoted multi-leg route. Three legs is the canonical shape
/// (AMM -> AMM -> order book), but any caller-validated sequence of one or
/// more legs is accepted.
pub struct Route {
    /// Quoted legs in execution order.
    pub legs: Vec<PlannedLeg>,
    /// Cumulative output at each leg's pre-trade marginal price, the
    /// baseline for the pre-flight slippage check.
    pub amount_out_ideal: Amount,
}

impl Route {
    /// Quotes every leg and validates token flow.
    ///
    /// The route must chain (each leg's output token is the next leg's
    /// input token) and must end in its starting token, so profit is
    /// denominated in the token that went in.
    ///
    /// # Errors
    ///
    /// `EmptyRoute` when no venues are supplied, `IncompatibleLegs` on a
    /// token-flow mismatch, and any quote failure from the venues.
    pub async fn plan(request: &TradeRequest, venues: &[VenueHandle]) -> Result<Self, ErrorKind> {
        let Some(first) = venues.first() else {
            return Err(ErrorKind::EmptyRoute);
        };
        let Some(last) = venues.last() else {
            return Err(ErrorKind::EmptyRoute);
        };
        for pair in venues.windows(2) {
            if pair[0].token_out() != pair[1].token_in() {
                return Err(ErrorKind::IncompatibleLegs);
            }
        }
        if last.token_out() != first.token_in() {
            return Err(ErrorKind::IncompatibleLegs);
        }

        let mut legs = Vec::with_capacity(venues.len());
        let mut amount = request.amount_in;
        let mut ideal = request.amount_in;
        for venue in venues {
            let quote = venue.quote(amount).await?;
            amount = quote.amount_out_expected;
            // Compose the leg's marginal rate into the route baseline.
            ideal = mul_div(ideal, quote.amount_out_ideal, quote.amount_in)?;
            legs.push(PlannedLeg {
                venue: venue.clone(),
                quote,
            });
        }

        Ok(Self {
            legs,
            amount_out_ideal: ideal,
        })
    }

    /// Cumulative expected output of the full route. `plan` rejects empty
    /// routes, so a constructed route always has a last leg.
    #[must_use]
    pub fn amount_out_expected(&self) -> Amount {
        self.legs
            .last()
            .map_or(Amount::ZERO, |leg| leg.quote.amount_out_expected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::*;
    use crate::types::TradeRequest;

    fn request(amount_in: u64) -> TradeRequest {
        TradeRequest::new(Amount::from(amount_in), Amount::ZERO, 10_000).unwrap()
    }

    #[tokio::test]
    async fn test_empty_route() {
        let result = Route::plan(&request(1_000), &[]).await;
        assert_eq!(result.err().unwrap(), ErrorKind::EmptyRoute);
    }

    #[tokio::test]
    async fn test_adjacent_token_mismatch() {
        let venues: Vec<VenueHandle> = vec![
            amm("P1", "A", "B", 1_000_000, 1_000_000, 30),
            amm("P2", "C", "A", 1_000_000, 1_000_000, 30),
        ];
        let result = Route::plan(&request(1_000), &venues).await;
        assert_eq!(result.err().unwrap(), ErrorKind::IncompatibleLegs);
    }

    #[tokio::test]
    async fn test_route_must_end_in_its_starting_token() {
        let venues: Vec<VenueHandle> = vec![
            amm("P1", "A", "B", 1_000_000, 1_000_000, 30),
            amm("P2", "B", "C", 1_000_000, 1_000_000, 30),
        ];
        let result = Route::plan(&request(1_000), &venues).await;
        assert_eq!(result.err().unwrap(), ErrorKind::IncompatibleLegs);
    }

    #[tokio::test]
    async fn test_legs_chain_on_expected_output() {
        let venues: Vec<VenueHandle> = vec![
            amm("P1", "A", "B", 1_000_000, 2_000_000, 30),
            amm("P2", "B", "A", 2_000_000, 1_100_000, 30),
        ];
        let route = Route::plan(&request(10_000), &venues).await.unwrap();
        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.legs[0].quote.amount_in, Amount::from(10_000u64));
        assert_eq!(
            route.legs[0].quote.amount_out_expected,
            Amount::from(19_743u64)
        );
        assert_eq!(route.legs[1].quote.amount_in, Amount::from(19_743u64));
        assert_eq!(route.amount_out_expected(), route.legs[1].quote.amount_out_expected);
    }

    #[tokio::test]
    async fn test_ideal_composes_marginal_rates() {
        // Pools priced 1:2 and 2:1.1 with zero fee; the marginal round
        // trip is 10_000 * 2 * 0.55 = 11_000, less one unit of flooring
        // per stage. Rounding down never favors the trader.
        let venues: Vec<VenueHandle> = vec![
            amm("P1", "A", "B", 1_000_000, 2_000_000, 0),
            amm("P2", "B", "A", 2_000_000, 1_100_000, 0),
        ];
        let route = Route::plan(&request(10_000), &venues).await.unwrap();
        assert_eq!(route.amount_out_ideal, Amount::from(10_999u64));
    }

    #[tokio::test]
    async fn test_quote_failure_propagates() {
        let venues: Vec<VenueHandle> = vec![
            amm("P1", "A", "B", 1_000_000_000, 2, 0),
            amm("P2", "B", "A", 2, 1_000_000_000, 0),
        ];
        let result = Route::plan(&request(1), &venues).await;
        assert_eq!(result.err().unwrap(), ErrorKind::InsufficientLiquidity);
    }

    #[tokio::test]
    async fn test_single_leg_cannot_cycle() {
        // A single leg can never end in its starting token, since a
        // venue's two tokens must differ.
        let venues: Vec<VenueHandle> = vec![amm("P1", "A", "B", 1_000_000, 2_000_000, 30)];
        let result = Route::plan(&request(10_000), &venues).await;
        assert_eq!(result.err().unwrap(), ErrorKind::IncompatibleLegs);
    }
}
