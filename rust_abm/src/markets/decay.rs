use crate::markets::registry::MarketState;

/// Lower the asking price of every unsold listing by `factor`, never below
/// `price_floor`. Returns how many listings were adjusted.
pub fn decay_listings(market: &mut MarketState, factor: f64, price_floor: f64) -> usize {
    let mut adjusted = 0usize;
    for id in &market.for_sale {
        if let Some(asking) = market.homes.get_mut(id).and_then(|h| h.asking_price.as_mut()) {
            *asking = (*asking * factor).max(price_floor);
            adjusted += 1;
        }
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{HomeData, Location};
    use crate::ids::HomeId;

    fn market_with_listing(asking: f64) -> MarketState {
        let mut market = MarketState::new();
        market.add_home(HomeData::new(HomeId(1), Location::default(), 10_000.0));
        market.list(HomeId(1), asking).unwrap();
        market
    }

    #[test]
    fn unsold_listing_decays_geometrically_to_the_floor() {
        let listed_at = 40_000.0;
        let mut market = market_with_listing(listed_at);

        for k in 1..=10 {
            assert_eq!(decay_listings(&mut market, 0.8, 10_000.0), 1);
            let asking = market.home(HomeId(1)).unwrap().asking_price.unwrap();
            let expected = (listed_at * 0.8_f64.powi(k)).max(10_000.0);
            assert!((asking - expected).abs() < 1e-6, "tick {k}: {asking} vs {expected}");
        }
    }

    #[test]
    fn listing_at_the_floor_stays_there() {
        let mut market = market_with_listing(10_000.0);
        decay_listings(&mut market, 0.8, 10_000.0);
        assert_eq!(market.home(HomeId(1)).unwrap().asking_price, Some(10_000.0));
    }
}
