use std::fmt;

use krabmaga::engine::{agent::Agent, state::State};
use tracing::error;

use crate::error::Result;
use crate::markets::auction::run_auction;
use crate::markets::settlement::settle;
use crate::report::SaleRecord;
use crate::state::HousingState;

/// Outcome of housing market clearing for one tick.
#[derive(Clone, Debug, Default)]
pub struct MarketOutcome {
    pub listings: usize,
    pub bids: usize,
    pub displacements: usize,
    pub sales: usize,
    pub volume: f64,
}

/// Clear the housing market in-place on the simulation state.
///
/// 1. Run the ascending auction over the current listings.
/// 2. Settle every winning bid (relisting buyers' previous homes).
/// 3. Append one `SaleRecord` per settled sale to the sale log.
pub fn clear_housing_market(state: &mut HousingState) -> Result<MarketOutcome> {
    let listings = state.market.for_sale_count();
    let auction = run_auction(
        &state.market,
        &state.employers,
        &state.valuation,
        state.config.bid_increment,
    )?;
    let settled = settle(&mut state.market, &auction.sales)?;

    let population = state.market.people.len();
    let homes = state.market.homes.len();
    for sale in &settled {
        let location = state.market.home(sale.event.home)?.location;
        state.sale_log.push(SaleRecord::new(
            state.current_tick,
            sale,
            location,
            population,
            homes,
        ));
    }

    let outcome = MarketOutcome {
        listings,
        bids: auction.bids.len(),
        displacements: auction.displacements,
        sales: settled.len(),
        volume: settled.iter().map(|s| s.event.price).sum(),
    };
    state.market_last = outcome.clone();
    Ok(outcome)
}

// ─────────────────────────────────────────────────────────────────────────────
// krabmaga Agent proxy for the housing market
// ─────────────────────────────────────────────────────────────────────────────

/// Proxy agent that clears the housing market within the krabmaga schedule.
///
/// Runs after `HousingState::before_step` (population driver) and before
/// `HousingState::after_step` (listing decay and recording).
#[derive(Clone)]
pub struct HousingMarketAgent;

impl fmt::Display for HousingMarketAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HousingMarketAgent")
    }
}

impl Agent for HousingMarketAgent {
    fn step(&mut self, state: &mut dyn State) {
        let state = state
            .as_any_mut()
            .downcast_mut::<HousingState>()
            .expect("state should be HousingState");
        if state.failure.is_some() {
            return;
        }
        if let Err(e) = clear_housing_market(state) {
            error!(tick = state.current_tick, "market clearing aborted: {e}");
            state.failure = Some(e);
        }
    }
}
