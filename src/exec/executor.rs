//! Atomic execution of a planned route.
//!
//! Runs the legs strictly in order as one indivisible unit: each leg's
//! realized output is re-checked against its quote before becoming the next
//! leg's input, and a compensating-action list built as legs succeed is
//! executed in reverse on any later failure. Balances are observable
//! outside the unit only after every leg and the final profit gate succeed.
//!
//! Venue state can change between quoting and execution, so the route is
//! not validated purely ahead of time; execution is optimistic with
//! per-leg verification and guaranteed all-or-nothing rollback.

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::error::ErrorKind;
use crate::exec::guard::{check_profit, check_slippage};
use crate::exec::ledger::Ledger;
use crate::exec::route::{PlannedLeg, Route};
use crate::types::{Amount, SignedAmount, TradeRequest};
use crate::venue::{LegFill, VenueHandle};

/// Phases of one execution. `Aborted` is reachable from every non-terminal
/// phase; `Committed` is reachable only through `ProfitChecked`.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Route quoted, nothing executed yet.
    Planned,
    /// Leg `i` is being applied on its venue.
    LegExecuting(usize),
    /// Leg `i` applied and its realized output verified.
    LegDone(usize),
    /// All legs done and the profit gate passed.
    ProfitChecked,
    /// Terminal: effects are durable.
    Committed,
    /// Terminal: all effects rolled back.
    Aborted(ErrorKind),
}

/// Terminal record of one execution, returned to the caller.
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionOutcome {
    /// Whether the route committed.
    pub success: bool,
    /// `final_out - amount_in` for a commit; zero for an abort, since no
    /// balance changed.
    pub net_profit: SignedAmount,
    /// Index of the leg that failed, if the failure was leg-local.
    pub failed_leg: Option<usize>,
    /// Why the execution aborted, if it did.
    pub reason: Option<ErrorKind>,
}

/// Working state of one run: the compensating-action list plus the phase.
/// Owned exclusively for the duration of the run and discarded afterward.
struct Execution<'a> {
    /// The caller's bounds.
    request: &'a TradeRequest,
    /// The caller's token accounts.
    ledger: &'a mut Ledger,
    /// Current phase, for logs and transition discipline.
    phase: Phase,
    /// Fills applied so far, reverted in reverse order on abort.
    fills: Vec<(VenueHandle, LegFill)>,
}

/// Executes a three-leg (or caller-validated N-leg) arbitrage route
/// atomically: plan, pre-flight guards, per-leg execution with realized
/// slippage checks, final profit gate, then commit or full rollback.
///
/// Every failure surfaces as a typed outcome; nothing is retried here.
pub async fn execute_arbitrage(
    request: &TradeRequest,
    venues: &[VenueHandle],
    ledger: &mut Ledger,
) -> ExecutionOutcome {
    let mut execution = Execution {
        request,
        ledger,
        phase: Phase::Planned,
        fills: Vec::new(),
    };
    execution.run(venues).await
}

impl Execution<'_> {
    /// Logs and applies a phase transition.
    fn advance(&mut self, next: Phase) {
        debug!("execution phase {:?} -> {next:?}", self.phase);
        self.phase = next;
    }

    async fn run(&mut self, venues: &[VenueHandle]) -> ExecutionOutcome {
        let route = match Route::plan(self.request, venues).await {
            Ok(route) => route,
            Err(reason) => return self.abort_unstarted(reason),
        };
        let projected = route.amount_out_expected();

        // Pre-flight: quoted deviation from the marginal-price baseline.
        if let Err(reason) = check_slippage(
            route.amount_out_ideal,
            projected,
            self.request.max_slippage_bps,
        ) {
            return self.abort_unstarted(reason);
        }
        // Pre-flight: projected profit, before any leg executes.
        if let Err(reason) =
            check_profit(self.request.amount_in, projected, self.request.min_profit)
        {
            return self.abort_unstarted(reason);
        }

        let snapshot = self.ledger.snapshot();
        let mut amount = self.request.amount_in;
        for (index, leg) in route.legs.iter().enumerate() {
            self.advance(Phase::LegExecuting(index));
            match self.execute_leg(leg, amount).await {
                Ok(realized) => amount = realized,
                Err(reason) => return self.abort(Some(index), reason, &snapshot).await,
            }
            self.advance(Phase::LegDone(index));
        }

        // The final gate, and the only one permitted to unwind fully
        // executed legs.
        let profit =
            match check_profit(self.request.amount_in, amount, self.request.min_profit) {
                Ok(profit) => profit,
                Err(reason) => return self.abort(None, reason, &snapshot).await,
            };
        self.advance(Phase::ProfitChecked);
        self.advance(Phase::Committed);
        info!(
            "committed {} legs: {} in, {amount} out, net profit {profit}",
            route.legs.len(),
            self.request.amount_in,
        );
        ExecutionOutcome {
            success: true,
            net_profit: profit,
            failed_leg: None,
            reason: None,
        }
    }

    /// Runs one leg: debit the input, apply the swap, verify realized
    /// output against the leg's quote, credit the output.
    async fn execute_leg(&mut self, leg: &PlannedLeg, amount: Amount) -> Result<Amount, ErrorKind> {
        self.ledger.debit(leg.venue.token_in(), amount)?;
        let fill = leg.venue.execute(amount, leg.quote.state_version).await?;
        self.fills.push((leg.venue.clone(), fill.clone()));
        check_slippage(
            leg.quote.amount_out_expected,
            fill.amount_out_actual,
            self.request.max_slippage_bps,
        )?;
        self.ledger.credit(leg.venue.token_out(), fill.amount_out_actual)?;
        Ok(fill.amount_out_actual)
    }

    /// Abort before any leg executed: no state to unwind.
    fn abort_unstarted(&mut self, reason: ErrorKind) -> ExecutionOutcome {
        warn!("aborted before execution: {reason}");
        self.advance(Phase::Aborted(reason));
        ExecutionOutcome {
            success: false,
            net_profit: SignedAmount::ZERO,
            failed_leg: None,
            reason: Some(reason),
        }
    }

    /// Abort mid-flight: execute the compensating actions in reverse and
    /// restore the ledger snapshot, then report the typed outcome.
    async fn abort(
        &mut self,
        failed_leg: Option<usize>,
        reason: ErrorKind,
        snapshot: &Ledger,
    ) -> ExecutionOutcome {
        while let Some((venue, fill)) = self.fills.pop() {
            if let Err(revert_error) = venue.revert(&fill).await {
                // Nothing further to unwind with; surface loudly.
                error!(
                    "compensating revert failed on {}: {revert_error}",
                    venue.label()
                );
            }
        }
        self.ledger.restore(snapshot.clone());
        warn!("aborted at leg {failed_leg:?}: {reason}");
        self.advance(Phase::Aborted(reason));
        ExecutionOutcome {
            success: false,
            net_profit: SignedAmount::ZERO,
            failed_leg,
            reason: Some(reason),
        }
    }
}
