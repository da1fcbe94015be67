//! Agent valuation model.
//!
//! Revenue is the yearly benefit of living in a home: the full housing
//! budget, discounted by `distance_factor ^ distance` between the person's
//! workplace and the home. Costs are mortgage service on the loan plus
//! property tax on the purchase price. The breakeven bid is the price at
//! which buying a home is worth exactly as much as staying put.

use crate::agents::{HomeData, Location};
use crate::config::Config;

/// Fixed economic constants of one simulation run.
#[derive(Clone, Copy, Debug)]
pub struct Valuation {
    pub max_value: f64,
    pub distance_factor: f64,
    pub mortgage_rate: f64,
    pub property_tax_rate: f64,
}

impl Valuation {
    pub fn from_config(config: &Config) -> Self {
        Valuation {
            max_value: config.max_value(),
            distance_factor: config.distance_factor,
            mortgage_rate: config.mortgage_rate,
            property_tax_rate: config.property_tax_rate,
        }
    }

    pub fn carrying_rate(&self) -> f64 {
        self.mortgage_rate + self.property_tax_rate
    }

    /// Yearly benefit of living in `home` when working at `workplace`.
    pub fn revenue(&self, workplace: &Location, home: Option<&HomeData>) -> f64 {
        match home {
            Some(home) => {
                let distance = workplace.distance(&home.location);
                self.max_value * self.distance_factor.powf(distance)
            }
            None => 0.0,
        }
    }

    /// Yearly cost of the person's current position.
    pub fn carrying_cost(&self, loan: f64, current: Option<&HomeData>) -> f64 {
        loan * self.mortgage_rate + current.map_or(0.0, |h| h.sold_price) * self.property_tax_rate
    }

    /// Net yearly benefit of acquiring `home` at `price`.
    pub fn buy_value(&self, workplace: &Location, home: &HomeData, price: f64) -> f64 {
        self.revenue(workplace, Some(home)) - price * self.carrying_rate()
    }

    /// Net yearly benefit of keeping `home`, financed at `price` and taxed at
    /// `old_price`.
    pub fn sell_value(&self, workplace: &Location, home: &HomeData, price: f64, old_price: f64) -> f64 {
        self.revenue(workplace, Some(home)) - price * self.mortgage_rate - old_price * self.property_tax_rate
    }

    /// Price at which `buy_value(home)` equals the sell value of `current`
    /// (zero when the person occupies nothing).
    pub fn breakeven_bid(
        &self,
        workplace: &Location,
        current: Option<&HomeData>,
        home: &HomeData,
        sell_price: f64,
    ) -> f64 {
        let keep = current.map_or(0.0, |cur| self.sell_value(workplace, cur, sell_price, cur.sold_price));
        (self.revenue(workplace, Some(home)) - keep) / self.carrying_rate()
    }
}

/// A person as seen by the valuation model: where they work and what they
/// currently occupy.
#[derive(Clone, Copy, Debug)]
pub struct Bidder<'a> {
    pub workplace: Location,
    pub current_home: Option<&'a HomeData>,
}

impl<'a> Bidder<'a> {
    /// Sold price of the occupied home, 0 if none.
    pub fn sell_price(&self) -> f64 {
        self.current_home.map_or(0.0, |h| h.sold_price)
    }

    pub fn buy_value(&self, valuation: &Valuation, home: &HomeData, price: f64) -> f64 {
        valuation.buy_value(&self.workplace, home, price)
    }

    pub fn breakeven_bid(&self, valuation: &Valuation, home: &HomeData) -> f64 {
        valuation.breakeven_bid(&self.workplace, self.current_home, home, self.sell_price())
    }
}
