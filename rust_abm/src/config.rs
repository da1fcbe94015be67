use std::path::Path;

use serde::Deserialize;

use crate::error::{HousingError, Result};

/// Configuration parameters for the housing market simulation.
///
/// Default values reproduce the reference run (seed 1, 85 ticks, a
/// population shock between ticks 25 and 40). Any subset can be overridden
/// from a TOML file; missing keys keep their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // Run
    pub seed: u64,
    pub ticks: usize,

    // Initial placement
    pub n_employers: usize,
    pub homes_per_person: f64,
    pub position_std: f64,
    pub employer_size_std: f64,
    pub growth_std: f64,

    // Economics
    pub price_floor: f64,
    pub income: f64,
    pub max_spend: f64,
    pub distance_factor: f64,
    pub mortgage_rate: f64,
    pub property_tax_rate: f64,

    // Market mechanics
    pub bid_increment: f64,
    pub listing_decay: f64,
    pub recent_sales_window: usize,

    // Population driver
    pub shock_start: usize,
    pub shock_end: usize,
    pub relocation_fraction: f64,
    pub relocation_markup: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: 1,
            ticks: 85,

            n_employers: 10,
            homes_per_person: 1.5,
            position_std: 10.0,
            employer_size_std: 5.0,
            growth_std: 0.02,

            price_floor: 10_000.0,
            income: 100_000.0,
            max_spend: 0.6,
            distance_factor: 0.995,
            mortgage_rate: 0.05,
            property_tax_rate: 0.0125,

            bid_increment: 1.05,
            listing_decay: 0.8,
            recent_sales_window: 10,

            shock_start: 25,
            shock_end: 40,
            relocation_fraction: 0.05,
            relocation_markup: 1.2,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a (possibly partial) TOML document and validate the result.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Value of a home with no commute: the yearly housing budget.
    pub fn max_value(&self) -> f64 {
        self.income * self.max_spend
    }

    /// Whether `tick` falls inside the population shock window.
    pub fn in_shock(&self, tick: u64) -> bool {
        tick >= self.shock_start as u64 && tick <= self.shock_end as u64
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("price_floor", self.price_floor),
            ("income", self.income),
            ("max_spend", self.max_spend),
            ("distance_factor", self.distance_factor),
            ("mortgage_rate", self.mortgage_rate),
            ("property_tax_rate", self.property_tax_rate),
            ("bid_increment", self.bid_increment),
            ("listing_decay", self.listing_decay),
            ("position_std", self.position_std),
            ("employer_size_std", self.employer_size_std),
            ("growth_std", self.growth_std),
            ("relocation_markup", self.relocation_markup),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(config_error(format!("{field} must be positive, got {value}")));
            }
        }
        if self.distance_factor >= 1.0 {
            return Err(config_error("distance_factor must be below 1"));
        }
        if self.bid_increment <= 1.0 {
            return Err(config_error("bid_increment must be greater than 1"));
        }
        if self.listing_decay > 1.0 {
            return Err(config_error("listing_decay must not exceed 1"));
        }
        if self.homes_per_person < 1.0 {
            return Err(config_error("homes_per_person must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.relocation_fraction) {
            return Err(config_error("relocation_fraction must lie in [0, 1]"));
        }
        if self.shock_start > self.shock_end {
            return Err(config_error("shock_start must not come after shock_end"));
        }
        if self.recent_sales_window == 0 {
            return Err(config_error("recent_sales_window must be at least 1"));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> HousingError {
    HousingError::ConfigError {
        message: message.into(),
    }
}
