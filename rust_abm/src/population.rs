//! Population driver: employer growth and shrinkage, layoffs and employer
//! switching. Runs at the start of every tick and hands the market a
//! population and a set of fresh listings.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::Result;
use crate::ids::{EmployerId, PersonId};
use crate::state::HousingState;

/// What the population driver did in one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationOutcome {
    pub hired: usize,
    pub departed: usize,
    pub relocated: usize,
}

/// Run the population driver for the state's current tick.
///
/// Outside the shock window employers grow and hire new people; inside it
/// they shrink and lay people off. The population order is then shuffled and
/// a small fraction of people swap employers, listing their homes.
pub fn drive_population(state: &mut HousingState) -> Result<PopulationOutcome> {
    let shock = state.config.in_shock(state.current_tick);
    let mut outcome = PopulationOutcome::default();

    for idx in 0..state.employers.len() {
        let employer = EmployerId(idx);
        if shock {
            let lost = state.employers[idx].shrink();
            if lost > 0 {
                outcome.departed += lay_off(state, employer, lost)?;
            }
        } else {
            let gained = state.employers[idx].grow();
            for _ in 0..gained {
                state.spawn_person(employer);
            }
            outcome.hired += gained;
        }
    }

    state.population_order.shuffle(&mut state.rng);
    outcome.relocated = switch_employers(state)?;

    debug!(
        tick = state.current_tick,
        shock,
        hired = outcome.hired,
        departed = outcome.departed,
        relocated = outcome.relocated,
        "population updated"
    );
    Ok(outcome)
}

/// Remove the first `count` employees of `employer` in population order.
/// Occupied homes go back on the market at the price floor.
pub fn lay_off(state: &mut HousingState, employer: EmployerId, count: usize) -> Result<usize> {
    let leaving: Vec<PersonId> = state
        .population_order
        .iter()
        .copied()
        .filter(|id| {
            state
                .market
                .people
                .get(id)
                .is_some_and(|p| p.employer == employer)
        })
        .take(count)
        .collect();

    for &id in &leaving {
        state.market.remove_person(id, state.config.price_floor)?;
    }
    state.population_order.retain(|id| !leaving.contains(id));
    Ok(leaving.len())
}

/// Swap employers between consecutive pairs at the front of the population
/// order. Each person who occupies a home lists it at a markup over its
/// last sold price. Returns the number of pairs swapped.
pub fn switch_employers(state: &mut HousingState) -> Result<usize> {
    let n = state.population_order.len();
    let span = (n as f64 * state.config.relocation_fraction) as usize;
    let markup = state.config.relocation_markup;

    let mut swapped = 0usize;
    for i in (0..span).step_by(2) {
        if i + 1 >= n {
            break;
        }
        let a = state.population_order[i];
        let b = state.population_order[i + 1];
        let employer_a = state.market.person(a)?.employer;
        let employer_b = state.market.person(b)?.employer;
        if let Some(p) = state.market.people.get_mut(&a) {
            p.employer = employer_b;
        }
        if let Some(p) = state.market.people.get_mut(&b) {
            p.employer = employer_a;
        }

        for id in [a, b] {
            let occupied = state.market.person(id)?.home;
            if let Some(home) = occupied {
                let price = state.market.home(home)?.sold_price * markup;
                state.market.list(home, price)?;
            }
        }
        swapped += 1;
    }
    Ok(swapped)
}
