use housing_abm::agents::{HomeData, Location};
use housing_abm::markets::{run_auction, settle};
use housing_abm::{Config, HomeId, HousingError, HousingState, PersonId};

const TOLERANCE: f64 = 1e-6;

/// Revenue of 937.5 at zero distance, so a homeless person next to their
/// workplace has a breakeven bid of 15 000.
fn scenario_config() -> Config {
    Config {
        income: 937.5,
        max_spend: 1.0,
        relocation_fraction: 0.0,
        ..Config::default()
    }
}

/// One home listed at 10 000 and two homeless bidders whose breakeven bids
/// for it are 15 000 (P01) and 12 000 (P02).
fn two_bidders_one_home() -> (HousingState, HomeId) {
    let mut state = HousingState::empty(scenario_config()).unwrap();
    let home = state.build_home(Location::new(0.0, 0.0)).unwrap();

    // 0.995^d = 0.8 puts the second workplace where revenue is 80%.
    let d = 0.8_f64.ln() / 0.995_f64.ln();
    let near = state.add_employer(Location::new(0.0, 0.0), 1.0, 1.0);
    let far = state.add_employer(Location::new(d, 0.0), 1.0, 1.0);
    state.spawn_person(near);
    state.spawn_person(far);
    (state, home)
}

fn breakeven(state: &HousingState, person: PersonId, home: HomeId) -> f64 {
    let p = state.market.person(person).unwrap();
    let workplace = state.employers[p.employer.0].location;
    let target = state.market.home(home).unwrap();
    state.valuation.breakeven_bid(&workplace, None, target, 0.0)
}

#[test]
fn scenario_breakeven_bids_are_as_constructed() {
    let (state, home) = two_bidders_one_home();
    assert!((breakeven(&state, PersonId(1), home) - 15_000.0).abs() < TOLERANCE);
    assert!((breakeven(&state, PersonId(2), home) - 12_000.0).abs() < TOLERANCE);
}

#[test]
fn higher_breakeven_bidder_wins_between_the_two_breakevens() {
    let (state, home) = two_bidders_one_home();
    let outcome = run_auction(&state.market, &state.employers, &state.valuation, 1.05).unwrap();

    assert_eq!(outcome.sales.len(), 1);
    let sale = &outcome.sales[0];
    assert_eq!(sale.home, home);
    assert_eq!(sale.buyer, PersonId(1));
    assert!(sale.price < 15_000.0);
    assert!(sale.price >= 12_000.0);
    // The loser could not raise the final bid without crossing 12 000.
    assert!(sale.price * 1.05 >= 12_000.0);
    // 10 000, 10 500, 11 025, 11 576.25, 12 155.06
    assert!((sale.price - 10_000.0 * 1.05_f64.powi(4)).abs() < TOLERANCE);
    assert_eq!(outcome.displacements, 4);
}

#[test]
fn bidding_war_halts_with_a_strictly_increasing_sequence() {
    let (state, home) = two_bidders_one_home();
    let outcome = run_auction(&state.market, &state.employers, &state.valuation, 1.05).unwrap();

    let amounts: Vec<f64> = outcome.bids_on(home).map(|b| b.amount).collect();
    assert!(!amounts.is_empty());
    assert!(amounts.windows(2).all(|w| w[1] > w[0]));

    // Bounded by the number of 5% steps from the asking price to the
    // highest breakeven bid.
    let max_steps = ((15_000.0_f64 / 10_000.0).ln() / 1.05_f64.ln()).ceil() as usize + 1;
    assert!(amounts.len() <= max_steps);
    assert!(outcome.displacements < amounts.len());

    let bidders: Vec<PersonId> = outcome.bids_on(home).map(|b| b.bidder).collect();
    assert!(bidders.windows(2).all(|w| w[0] != w[1]));
}

#[test]
fn settled_scenario_moves_loan_and_ownership() {
    let (mut state, home) = two_bidders_one_home();
    let outcome = run_auction(&state.market, &state.employers, &state.valuation, 1.05).unwrap();
    settle(&mut state.market, &outcome.sales).unwrap();

    let winner = state.market.person(PersonId(1)).unwrap();
    assert_eq!(winner.home, Some(home));
    assert!((winner.loan - outcome.sales[0].price).abs() < TOLERANCE);
    assert_eq!(state.market.person(PersonId(2)).unwrap().home, None);
    assert!(state.market.for_sale.is_empty());
    state.market.check_invariants().unwrap();
}

#[test]
fn settling_the_same_event_twice_is_an_invariant_violation() {
    let (mut state, _) = two_bidders_one_home();
    let outcome = run_auction(&state.market, &state.employers, &state.valuation, 1.05).unwrap();
    settle(&mut state.market, &outcome.sales).unwrap();

    let err = settle(&mut state.market, &outcome.sales).unwrap_err();
    assert!(matches!(err, HousingError::HomeNotListed(_)));
    assert!(err.is_invariant_violation());
    state.market.check_invariants().unwrap();
}

#[test]
fn zero_distance_breakeven_is_full_revenue_over_carrying_rate() {
    let config = Config::default();
    let state = HousingState::empty(config.clone()).unwrap();
    let home = HomeData::new(HomeId(1), Location::new(4.0, 4.0), config.price_floor);

    let bid = state
        .valuation
        .breakeven_bid(&Location::new(4.0, 4.0), None, &home, 0.0);
    let expected = config.max_value() / (config.mortgage_rate + config.property_tax_rate);
    assert!((bid - expected).abs() < TOLERANCE);
}

#[test]
fn unwanted_listing_decays_to_the_floor_over_ticks() {
    let mut state = HousingState::empty(Config::default()).unwrap();
    let listed_at = 50_000.0;
    state
        .market
        .add_home(HomeData::new(HomeId(1), Location::new(0.0, 0.0), 10_000.0));
    state.market.list(HomeId(1), listed_at).unwrap();

    for k in 1..=12 {
        state.run_tick().unwrap();
        let asking = state.market.home(HomeId(1)).unwrap().asking_price.unwrap();
        let expected = (listed_at * 0.8_f64.powi(k)).max(10_000.0);
        assert!((asking - expected).abs() < TOLERANCE, "after {k} ticks: {asking} vs {expected}");
    }
    assert_eq!(state.records.len(), 12);
    assert!(state.records.iter().all(|r| r.sales == 0));
}

#[test]
fn relisted_home_is_bought_by_the_neighbour() {
    let mut state = HousingState::empty(scenario_config()).unwrap();
    let employer = state.add_employer(Location::new(0.0, 0.0), 1.0, 1.0);
    let home = state.build_home(Location::new(0.0, 0.0)).unwrap();
    let seller = state.spawn_person(employer);
    state.market.finalize_sale(home, seller, 10_000.0).unwrap();
    state.market.list(home, 11_000.0).unwrap();
    let buyer = state.spawn_person(employer);

    state.run_tick().unwrap();

    let sold = state.market.home(home).unwrap();
    assert_eq!(sold.owner, Some(buyer));
    let seller = state.market.person(seller).unwrap();
    assert_eq!(seller.loan, 0.0);
    assert!((seller.profit - (sold.sold_price - 10_000.0)).abs() < TOLERANCE);
    assert_eq!(state.sale_log.len(), 1);
    assert_eq!(state.sale_log[0].seller, Some(PersonId(1)));
}

#[test]
fn relocating_owner_sells_and_buys_in_the_same_tick() {
    let mut state = HousingState::empty(scenario_config()).unwrap();
    let here = state.add_employer(Location::new(0.0, 0.0), 1.0, 1.0);
    let there = state.add_employer(Location::new(100.0, 0.0), 1.0, 1.0);
    // The home the owner moves to has the lower id, so its sale comes
    // first in the auction's output.
    let new_home = state.build_home(Location::new(0.0, 0.0)).unwrap();
    let old_home = state.build_home(Location::new(100.0, 0.0)).unwrap();
    let owner = state.spawn_person(here);
    let neighbour = state.spawn_person(there);
    state.market.finalize_sale(old_home, owner, 10_000.0).unwrap();
    state.market.list(old_home, 13_000.0).unwrap();

    state.run_tick().unwrap();

    assert_eq!(state.sale_log.len(), 2);
    assert_eq!(state.sale_log[0].home, new_home);
    assert_eq!(state.sale_log[0].buyer, owner);
    assert_eq!(state.sale_log[1].home, old_home);
    assert_eq!(state.sale_log[1].seller, Some(owner));
    assert_eq!(state.sale_log[1].buyer, neighbour);

    let owner = state.market.person(owner).unwrap();
    assert_eq!(owner.home, Some(new_home));
    assert!((owner.loan - 10_000.0).abs() < TOLERANCE);
    assert!((owner.profit - 3_000.0).abs() < TOLERANCE);
    assert!(!owner.is_listing());

    let neighbour = state.market.person(neighbour).unwrap();
    assert_eq!(neighbour.home, Some(old_home));
    assert!((neighbour.loan - 13_000.0).abs() < TOLERANCE);
    assert!(state.market.for_sale.is_empty());
}
