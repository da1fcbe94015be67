use std::collections::HashMap;

use housing_abm::agents::HomeStatus;
use housing_abm::{run_simulation, Config, HousingState, PersonId};

fn short_run() -> Config {
    Config {
        ticks: 30,
        shock_start: 10,
        shock_end: 18,
        ..Config::default()
    }
}

#[test]
fn every_tick_keeps_the_market_consistent() {
    let config = short_run();
    let mut state = HousingState::new(config.clone()).unwrap();
    let mut profits: HashMap<PersonId, f64> = HashMap::new();

    for _ in 0..config.ticks {
        state.run_tick().unwrap();
        state.market.check_invariants().unwrap();

        for home in state.market.homes.values() {
            assert!(home.status().is_some(), "{} has no legal state", home.id);
            if home.status() == Some(HomeStatus::VacantListed) {
                assert_eq!(home.times_sold, 0);
            }
            assert!(home.sold_price >= config.price_floor);
        }
        for person in state.market.people.values() {
            assert!(person.loan >= 0.0);
            let previous = profits.insert(person.id, person.profit).unwrap_or(0.0);
            assert!(person.profit >= previous, "{} profit went down", person.id);
        }
    }

    assert_eq!(state.records.len(), config.ticks);
    assert!(!state.sale_log.is_empty());
    assert!(state
        .sale_log
        .iter()
        .all(|s| s.price >= config.price_floor - 1e-6));
}

#[test]
fn shock_window_shrinks_the_population() {
    let config = short_run();
    let mut state = HousingState::new(config.clone()).unwrap();
    for _ in 0..config.ticks {
        state.run_tick().unwrap();
    }

    let population = |tick: u64| state.records[tick as usize].population;
    assert!(population(config.shock_start as u64 - 1) >= population(0));
    assert!(population(config.shock_end as u64) <= population(config.shock_start as u64 - 1));
}

#[test]
fn same_seed_reproduces_the_run() {
    let config = Config {
        ticks: 12,
        ..Config::default()
    };
    let mut a = HousingState::new(config.clone()).unwrap();
    let mut b = HousingState::new(config.clone()).unwrap();
    for _ in 0..config.ticks {
        a.run_tick().unwrap();
        b.run_tick().unwrap();
    }
    assert_eq!(a.sale_log, b.sale_log);
}

#[test]
fn scheduled_run_records_every_tick() {
    let config = Config {
        ticks: 15,
        ..Config::default()
    };
    let output = run_simulation(config.clone()).unwrap();

    assert_eq!(output.ticks.len(), config.ticks);
    let total: usize = output.ticks.iter().map(|t| t.sales).sum();
    assert_eq!(total, output.sales.len());
    assert!(output.ticks[0].sales > 0);
    assert!(output.sales.iter().all(|s| s.price >= config.price_floor - 1e-6));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = Config {
        listing_decay: 0.0,
        ..Config::default()
    };
    assert!(run_simulation(config).is_err());
}
