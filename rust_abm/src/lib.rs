/*!
# `housing_abm` - agent-based housing market simulation

Workers, employers and homes interact over discrete ticks. Home prices are
set by a repeated ascending-bid auction: every tick each listed home is
contested by every person in the population, bids rise by a fixed increment
until nobody wants to outbid the current holder, and winning bids are
settled against the market registry.

The tick loop is scheduled with [krABMaga](https://github.com/krABMaga/krABMaga)
(krabmaga):

1. population driver (`HousingState::before_step`): employer growth or
   shrinkage, layoffs, employer switching;
2. `HousingMarketAgent`: auction and settlement;
3. `HousingState::after_step`: listing price decay and the tick record.

## Quick start

```no_run
use housing_abm::{run_simulation, Config};

let output = run_simulation(Config::default()).unwrap();
for r in &output.ticks {
    println!("{} {} {:.0}", r.tick, r.sales, r.average_price);
}
```
*/

pub mod agents;
pub mod config;
pub mod error;
pub mod ids;
pub mod logger;
pub mod markets;
pub mod population;
pub mod report;
pub mod state;
pub mod valuation;

#[cfg(feature = "python")]
mod python;

pub use config::Config;
pub use error::{HousingError, Result};
pub use ids::{EmployerId, HomeId, PersonId};
pub use markets::{run_auction, settle, AuctionOutcome, MarketState, SaleEvent};
pub use report::{CsvReport, PersonValuation, SaleRecord};
pub use state::{HousingState, TickRecord};
pub use valuation::Valuation;

use krabmaga::engine::schedule::Schedule;
use krabmaga::engine::state::State;

/// Everything a finished run produced.
#[derive(Clone, Debug, Default)]
pub struct SimulationOutput {
    pub ticks: Vec<TickRecord>,
    pub sales: Vec<SaleRecord>,
}

/// Run a full simulation for `config.ticks` ticks.
///
/// Stops at the first tick that violates a market invariant and returns
/// that error.
pub fn run_simulation(config: Config) -> Result<SimulationOutput> {
    let ticks = config.ticks;
    let mut state = HousingState::new(config)?;
    let mut schedule = Schedule::new();

    // Schedules the housing market proxy (calls HousingState::init)
    state.init(&mut schedule);

    for _ in 0..ticks {
        schedule.step(&mut state);
        if let Some(e) = state.failure.take() {
            return Err(e);
        }
    }

    Ok(SimulationOutput {
        ticks: state.records,
        sales: state.sale_log,
    })
}
