use std::any::Any;

use krabmaga::engine::{schedule::Schedule, state::State};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::agents::{EmployerData, HomeData, Location, PersonData};
use crate::config::Config;
use crate::error::{HousingError, Result};
use crate::ids::{EmployerId, HomeId, IdCounter, PersonId};
use crate::markets::{clear_housing_market, decay_listings, HousingMarketAgent, MarketOutcome, MarketState};
use crate::population::{drive_population, PopulationOutcome};
use crate::report::{PersonValuation, SaleRecord};
use crate::valuation::Valuation;

// ─────────────────────────────────────────────────────────────────────────────
// Tick record
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate statistics recorded for a single tick.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub population: usize,
    pub homes: usize,
    pub for_sale: usize,
    pub sales: usize,
    pub average_price: f64,
    pub total_score: f64,
    pub total_profit: f64,
    pub occupancy_pct: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Housing state (implements krabmaga State)
// ─────────────────────────────────────────────────────────────────────────────

/// Central state struct holding the market, the employers and the run's
/// outputs.
///
/// This implements the krabmaga `State` trait. The only scheduled agent is
/// the `HousingMarketAgent` proxy; the population driver runs in
/// `before_step` and listing decay plus recording in `after_step`.
pub struct HousingState {
    pub market: MarketState,
    pub employers: Vec<EmployerData>,

    /// Population order used by layoffs and employer switching; reshuffled
    /// every tick.
    pub population_order: Vec<PersonId>,

    // Outcomes of the current tick
    pub population_last: PopulationOutcome,
    pub market_last: MarketOutcome,

    // Configuration
    pub config: Config,
    pub valuation: Valuation,

    // Random number generator
    pub rng: StdRng,

    // Simulation records
    pub records: Vec<TickRecord>,
    pub sale_log: Vec<SaleRecord>,
    pub current_tick: u64,

    /// First invariant violation; once set every phase is skipped.
    pub failure: Option<HousingError>,

    home_ids: IdCounter,
    person_ids: IdCounter,
}

impl HousingState {
    /// Create a new state and place employers, people and homes at random.
    pub fn new(config: Config) -> Result<Self> {
        let mut state = Self::empty(config)?;
        state.populate()?;
        Ok(state)
    }

    /// A validated state with no agents, for driving the market by hand.
    pub fn empty(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(HousingState {
            market: MarketState::new(),
            employers: Vec::new(),
            population_order: Vec::new(),
            population_last: PopulationOutcome::default(),
            market_last: MarketOutcome::default(),
            valuation: Valuation::from_config(&config),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            records: Vec::new(),
            sale_log: Vec::new(),
            current_tick: 0,
            failure: None,
            home_ids: IdCounter::new(),
            person_ids: IdCounter::new(),
        })
    }

    // ─── Agent initialisation ───────────────────────────────────────────────

    fn populate(&mut self) -> Result<()> {
        let position = normal(0.0, self.config.position_std)?;
        let size = normal(0.0, self.config.employer_size_std)?;
        let growth = normal(0.0, self.config.growth_std)?;

        for _ in 0..self.config.n_employers {
            let location = Location::new(position.sample(&mut self.rng), position.sample(&mut self.rng));
            let employer_size = 1.0 + size.sample(&mut self.rng).abs();
            let growth_rate = 1.0 + growth.sample(&mut self.rng).abs();
            self.add_employer(location, employer_size, growth_rate);
        }

        for idx in 0..self.employers.len() {
            for _ in 0..self.employers[idx].headcount() {
                self.spawn_person(EmployerId(idx));
            }
        }

        let n_homes = (self.market.people.len() as f64 * self.config.homes_per_person) as usize;
        for _ in 0..n_homes {
            let location = Location::new(position.sample(&mut self.rng), position.sample(&mut self.rng));
            self.build_home(location)?;
        }
        info!(
            employers = self.employers.len(),
            people = self.market.people.len(),
            homes = self.market.homes.len(),
            "market initialised"
        );
        Ok(())
    }

    pub fn add_employer(&mut self, location: Location, size: f64, growth_rate: f64) -> EmployerId {
        let id = EmployerId(self.employers.len());
        self.employers.push(EmployerData::new(id, location, size, growth_rate));
        id
    }

    /// Create a person working for `employer` at the end of the population order.
    pub fn spawn_person(&mut self, employer: EmployerId) -> PersonId {
        let id = PersonId(self.person_ids.next());
        self.market.add_person(PersonData::new(id, employer));
        self.population_order.push(id);
        id
    }

    /// Build a home and list it at the price floor.
    pub fn build_home(&mut self, location: Location) -> Result<HomeId> {
        let id = HomeId(self.home_ids.next());
        let floor = self.config.price_floor;
        self.market.add_home(HomeData::new(id, location, floor));
        self.market.list(id, floor)?;
        Ok(id)
    }

    // ─── Per-tick step helpers ──────────────────────────────────────────────

    /// Population driver (growth or shrinkage, shuffle, employer switching).
    pub fn run_pre_step(&mut self) {
        if self.failure.is_some() {
            return;
        }
        match drive_population(self) {
            Ok(outcome) => self.population_last = outcome,
            Err(e) => self.abort(e),
        }
    }

    /// Listing decay, invariant check and recording.
    pub fn run_post_step(&mut self) {
        if self.failure.is_some() {
            return;
        }
        decay_listings(&mut self.market, self.config.listing_decay, self.config.price_floor);
        if let Err(e) = self.market.check_invariants().and_then(|()| self.record()) {
            self.abort(e);
            return;
        }
        self.current_tick += 1;
    }

    /// Run one full tick without the krabmaga schedule.
    pub fn run_tick(&mut self) -> Result<()> {
        self.run_pre_step();
        if self.failure.is_none() {
            if let Err(e) = clear_housing_market(self) {
                self.abort(e);
            }
        }
        self.run_post_step();
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn abort(&mut self, e: HousingError) {
        error!(tick = self.current_tick, "tick aborted: {e}");
        self.failure = Some(e);
    }

    /// Revenue, cost and profit of every person in the population.
    pub fn valuation_snapshot(&self) -> Result<Vec<PersonValuation>> {
        self.market
            .people
            .values()
            .map(|person| -> Result<PersonValuation> {
                let workplace = self
                    .employers
                    .get(person.employer.0)
                    .ok_or(HousingError::UnknownEmployer(person.employer))?
                    .location;
                let home = match person.home {
                    Some(id) => Some(self.market.home(id)?),
                    None => None,
                };
                Ok(PersonValuation::new(&self.valuation, person, &workplace, home))
            })
            .collect()
    }

    /// Record aggregate statistics for the completed tick.
    pub fn record(&mut self) -> Result<()> {
        let snapshot = self.valuation_snapshot()?;
        for row in &snapshot {
            debug!(
                person = %row.person,
                listing = row.listing,
                home = ?row.home.map(|h| h.to_string()),
                sold_price = row.sold_price,
                revenue = row.revenue,
                cost = row.cost,
                score = row.score,
                profit = row.profit,
                "valuation"
            );
        }

        let population = self.market.people.len();
        let homes = self.market.homes.len();
        let record = TickRecord {
            tick: self.current_tick,
            population,
            homes,
            for_sale: self.market.for_sale_count(),
            sales: self.market_last.sales,
            average_price: self.market.average_price(self.config.recent_sales_window),
            total_score: snapshot.iter().map(|r| r.score).sum(),
            total_profit: snapshot.iter().map(|r| r.profit).sum(),
            occupancy_pct: if homes > 0 {
                100.0 * population as f64 / homes as f64
            } else {
                0.0
            },
        };
        info!(
            tick = record.tick,
            score = record.total_score as i64,
            profit = record.total_profit as i64,
            for_sale = record.for_sale,
            avg = record.average_price as i64,
            people = population,
            homes,
            sales = record.sales,
            "tick complete"
        );
        self.records.push(record);
        self.market_last = MarketOutcome::default();
        Ok(())
    }
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| HousingError::ConfigError {
        message: format!("invalid normal distribution ({mean}, {std_dev}): {e}"),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// krabmaga State implementation
// ─────────────────────────────────────────────────────────────────────────────

impl State for HousingState {
    /// Schedule the housing market proxy when the simulation starts.
    fn init(&mut self, schedule: &mut Schedule) {
        schedule.schedule_repeating(Box::new(HousingMarketAgent), 0.0, 0);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_state_mut(&mut self) -> &mut dyn State {
        self
    }

    fn as_state(&self) -> &dyn State {
        self
    }

    fn reset(&mut self) {
        // Re-initialise from the same configuration and seed
        match HousingState::new(self.config.clone()) {
            Ok(fresh) => *self = fresh,
            Err(e) => self.abort(e),
        }
    }

    /// Run the population driver before the market clears.
    fn before_step(&mut self, _schedule: &mut Schedule) {
        self.run_pre_step();
    }

    /// Decay unsold listings and record the tick.
    fn after_step(&mut self, _schedule: &mut Schedule) {
        self.run_post_step();
    }

    fn update(&mut self, _step: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_market_lists_every_home_at_the_floor() {
        let state = HousingState::new(Config::default()).unwrap();
        let people = state.market.people.len();
        assert!(people >= state.config.n_employers);
        assert_eq!(state.market.homes.len(), (people as f64 * 1.5) as usize);
        assert_eq!(state.market.for_sale_count(), state.market.homes.len());
        assert!(state
            .market
            .homes
            .values()
            .all(|h| h.asking_price == Some(10_000.0) && h.owner.is_none()));
        state.market.check_invariants().unwrap();
    }

    #[test]
    fn same_seed_gives_same_placement() {
        let a = HousingState::new(Config::default()).unwrap();
        let b = HousingState::new(Config::default()).unwrap();
        let locations = |s: &HousingState| -> Vec<(f64, f64)> {
            s.market.homes.values().map(|h| (h.location.x, h.location.y)).collect()
        };
        assert_eq!(locations(&a), locations(&b));
    }

    #[test]
    fn run_tick_records_and_advances() {
        let mut state = HousingState::new(Config::default()).unwrap();
        state.run_tick().unwrap();
        state.run_tick().unwrap();

        assert_eq!(state.current_tick, 2);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].tick, 0);
        assert!(state.records[0].sales > 0);
        assert_eq!(state.records[0].sales, state.sale_log.len() - state.records[1].sales);
    }

    #[test]
    fn failure_is_reported_and_cleared() {
        let mut state = HousingState::empty(Config::default()).unwrap();
        let employer = state.add_employer(Location::default(), 1.0, 1.0);
        state.build_home(Location::default()).unwrap();
        let person = state.spawn_person(employer);
        // Corrupt the person's employer reference.
        state.market.people.get_mut(&person).unwrap().employer = EmployerId(9);

        let err = state.run_tick().unwrap_err();
        assert!(matches!(err, HousingError::UnknownEmployer(EmployerId(9))));
        assert!(state.failure.is_none());
        assert!(state.records.is_empty());
    }

    #[test]
    fn snapshot_rejects_an_unknown_employer() {
        let mut state = HousingState::empty(Config::default()).unwrap();
        let employer = state.add_employer(Location::default(), 1.0, 1.0);
        let person = state.spawn_person(employer);
        assert_eq!(state.valuation_snapshot().unwrap().len(), 1);

        state.market.people.get_mut(&person).unwrap().employer = EmployerId(5);
        let err = state.valuation_snapshot().unwrap_err();
        assert!(matches!(err, HousingError::UnknownEmployer(EmployerId(5))));
        assert!(state.record().is_err());
        assert!(state.records.is_empty());
    }
}
