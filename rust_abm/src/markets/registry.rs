use std::collections::{BTreeMap, BTreeSet};

use crate::agents::{HomeData, HomeStatus, PersonData};
use crate::error::{HousingError, Result};
use crate::ids::{HomeId, PersonId};

/// Registry of homes, people, current listings and completed sale prices.
///
/// All ownership changes go through `list`, `unlist_on_sale` and
/// `finalize_sale`, which check their preconditions before touching any
/// state so a rejected call leaves the market unchanged. Batch settlement
/// uses the two halves of a sale, `credit_seller` and `transfer`, directly.
#[derive(Clone, Debug, Default)]
pub struct MarketState {
    pub homes: BTreeMap<HomeId, HomeData>,
    /// Active population: the potential bidders.
    pub people: BTreeMap<PersonId, PersonData>,
    /// People who left the population while still owning a listed home.
    pub departed: BTreeMap<PersonId, PersonData>,
    pub for_sale: BTreeSet<HomeId>,
    /// Every completed sale price, oldest first.
    pub sales: Vec<f64>,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_home(&mut self, home: HomeData) {
        self.homes.insert(home.id, home);
    }

    pub fn add_person(&mut self, person: PersonData) {
        self.people.insert(person.id, person);
    }

    pub fn home(&self, id: HomeId) -> Result<&HomeData> {
        self.homes.get(&id).ok_or(HousingError::UnknownHome(id))
    }

    pub fn person(&self, id: PersonId) -> Result<&PersonData> {
        self.people.get(&id).ok_or(HousingError::UnknownPerson(id))
    }

    /// Looks a seller up in the population first, then among the departed.
    pub fn owner(&self, id: PersonId) -> Option<&PersonData> {
        self.people.get(&id).or_else(|| self.departed.get(&id))
    }

    fn owner_mut(&mut self, id: PersonId) -> Option<&mut PersonData> {
        if self.people.contains_key(&id) {
            self.people.get_mut(&id)
        } else {
            self.departed.get_mut(&id)
        }
    }

    // ─── Listing ────────────────────────────────────────────────────────────

    /// Put a home on the market. An occupying owner moves out but keeps
    /// ownership until the sale settles.
    pub fn list(&mut self, home_id: HomeId, asking_price: f64) -> Result<()> {
        if !(asking_price.is_finite() && asking_price > 0.0) {
            return Err(HousingError::InvalidAskingPrice {
                home: home_id,
                price: asking_price,
            });
        }
        let (owner, listed) = {
            let home = self.home(home_id)?;
            (home.owner, home.is_listed())
        };
        if listed || self.for_sale.contains(&home_id) {
            return Err(HousingError::HomeAlreadyListed(home_id));
        }

        if let Some(owner_id) = owner {
            let person = self
                .people
                .get_mut(&owner_id)
                .ok_or_else(|| owner_inconsistent(home_id, format!("owner {owner_id} is not in the population")))?;
            if person.home != Some(home_id) {
                return Err(owner_inconsistent(
                    home_id,
                    format!("owner {owner_id} does not occupy the home"),
                ));
            }
            person.home = None;
            person.enlisted += 1;
        }

        if let Some(home) = self.homes.get_mut(&home_id) {
            home.asking_price = Some(asking_price);
        }
        self.for_sale.insert(home_id);
        Ok(())
    }

    /// Take a home off the market as part of a sale; returns its asking price.
    pub fn unlist_on_sale(&mut self, home_id: HomeId) -> Result<f64> {
        let home = self.homes.get_mut(&home_id).ok_or(HousingError::UnknownHome(home_id))?;
        let asking = match home.asking_price {
            Some(asking) if self.for_sale.contains(&home_id) => asking,
            _ => return Err(HousingError::HomeNotListed(home_id)),
        };
        home.asking_price = None;
        self.for_sale.remove(&home_id);
        Ok(asking)
    }

    // ─── Sale ───────────────────────────────────────────────────────────────

    /// Check that `buyer` may take over `home_id` right now, without
    /// mutating anything. The buyer may still occupy another home; that is
    /// resolved by settlement before the home is transferred.
    pub fn validate_sale(&self, home_id: HomeId, buyer: PersonId) -> Result<()> {
        let home = self.home(home_id)?;
        if !home.is_listed() || !self.for_sale.contains(&home_id) {
            return Err(HousingError::HomeNotListed(home_id));
        }
        self.person(buyer)?;
        if home.owner == Some(buyer) {
            return Err(HousingError::BuyerOwnsHome { buyer, home: home_id });
        }
        match home.owner {
            Some(owner_id) => {
                let owner = self
                    .owner(owner_id)
                    .ok_or_else(|| owner_inconsistent(home_id, format!("seller {owner_id} does not exist")))?;
                if owner.home == Some(home_id) {
                    return Err(owner_inconsistent(
                        home_id,
                        format!("seller {owner_id} still occupies the listed home"),
                    ));
                }
            }
            None if home.times_sold > 0 => {
                return Err(owner_inconsistent(home_id, "previously sold home has no owner".to_string()));
            }
            None => {}
        }
        Ok(())
    }

    /// Transfer a listed home to `buyer` at `price` in one step: unlist it,
    /// pay the seller (loan first, remainder as profit), record the price and
    /// hand the home and a matching loan to the buyer.
    pub fn finalize_sale(&mut self, home_id: HomeId, buyer: PersonId, price: f64) -> Result<()> {
        self.validate_sale(home_id, buyer)?;
        let occupied = self.person(buyer)?.home;
        if let Some(current) = occupied {
            return Err(HousingError::BuyerAlreadyHoused { buyer, home: current });
        }

        self.credit_seller(home_id, price)?;
        self.unlist_on_sale(home_id)?;
        self.transfer(home_id, buyer, price)
    }

    /// Pay the seller of a listed home its sale price. The home stays listed
    /// and owned by the seller until `transfer`. A departed seller with no
    /// other listing left is dropped.
    pub fn credit_seller(&mut self, home_id: HomeId, price: f64) -> Result<()> {
        let home = self.home(home_id)?;
        if !home.is_listed() || !self.for_sale.contains(&home_id) {
            return Err(HousingError::HomeNotListed(home_id));
        }
        let Some(seller_id) = home.owner else {
            return Ok(());
        };

        let person = self
            .owner_mut(seller_id)
            .ok_or_else(|| owner_inconsistent(home_id, format!("seller {seller_id} does not exist")))?;
        person.receive_sale_proceeds(price);
        if !person.is_listing() {
            // A departed seller has nothing left on the market.
            self.departed.remove(&seller_id);
        }
        Ok(())
    }

    /// Hand an unlisted home to a homeless `buyer` at `price` and record the
    /// sale. The previous owner must already have been credited.
    pub fn transfer(&mut self, home_id: HomeId, buyer: PersonId, price: f64) -> Result<()> {
        if self.home(home_id)?.is_listed() || self.for_sale.contains(&home_id) {
            return Err(HousingError::HomeAlreadyListed(home_id));
        }
        let person = self.people.get_mut(&buyer).ok_or(HousingError::UnknownPerson(buyer))?;
        if let Some(current) = person.home {
            return Err(HousingError::BuyerAlreadyHoused { buyer, home: current });
        }
        person.take_ownership(home_id, price);

        if let Some(home) = self.homes.get_mut(&home_id) {
            home.sold_price = price;
            home.owner = Some(buyer);
            home.times_sold += 1;
        }
        self.sales.push(price);
        Ok(())
    }

    // ─── Population interface ───────────────────────────────────────────────

    /// Remove a person from the population. An occupied home is listed at
    /// `relist_price` first; a person still selling a home is kept as a
    /// departed seller until that sale settles.
    pub fn remove_person(&mut self, id: PersonId, relist_price: f64) -> Result<()> {
        let occupied = self.person(id)?.home;
        if let Some(home) = occupied {
            self.list(home, relist_price)?;
        }
        if let Some(person) = self.people.remove(&id) {
            if person.is_listing() {
                self.departed.insert(id, person);
            }
        }
        Ok(())
    }

    // ─── Statistics ─────────────────────────────────────────────────────────

    pub fn for_sale_count(&self) -> usize {
        self.for_sale.len()
    }

    /// Upper median of the last `window` sale prices, or of every home's
    /// last sold price before the first sale.
    pub fn average_price(&self, window: usize) -> f64 {
        let mut prices: Vec<f64> = if self.sales.is_empty() {
            self.homes.values().map(|h| h.sold_price).collect()
        } else {
            self.sales[self.sales.len().saturating_sub(window)..].to_vec()
        };
        if prices.is_empty() {
            return 0.0;
        }
        prices.sort_by(|a, b| a.total_cmp(b));
        prices[prices.len() / 2]
    }

    // ─── Invariants ─────────────────────────────────────────────────────────

    /// Verify the three-state home model and the person↔home references.
    pub fn check_invariants(&self) -> Result<()> {
        for id in &self.for_sale {
            if !self.homes.contains_key(id) {
                return Err(invariant(format!("listed home {id} is not registered")));
            }
        }

        for (id, home) in &self.homes {
            if home.is_listed() != self.for_sale.contains(id) {
                return Err(invariant(format!("home {id} asking price disagrees with the for-sale set")));
            }
            match home.status() {
                Some(HomeStatus::OwnedOccupied) => {
                    let occupied = home
                        .owner
                        .and_then(|o| self.people.get(&o))
                        .is_some_and(|p| p.home == Some(*id));
                    if !occupied {
                        return Err(invariant(format!("home {id} is owned and unlisted but not occupied by its owner")));
                    }
                }
                Some(HomeStatus::OwnedListed) => {
                    let vacated = home
                        .owner
                        .and_then(|o| self.owner(o))
                        .is_some_and(|p| p.home != Some(*id) && p.is_listing());
                    if !vacated {
                        return Err(invariant(format!("listed home {id} is still occupied or its seller is missing")));
                    }
                }
                Some(HomeStatus::VacantListed) => {}
                None => {
                    return Err(invariant(format!("home {id} is neither owned nor listed for first sale")));
                }
            }
        }

        for (id, person) in &self.people {
            if let Some(home_id) = person.home {
                let home = self.home(home_id)?;
                if home.owner != Some(*id) || home.is_listed() {
                    return Err(invariant(format!("{id} occupies {home_id} without owning it off-market")));
                }
            }
            check_balances(person)?;
        }
        for (id, person) in &self.departed {
            if person.home.is_some() || !person.is_listing() {
                return Err(invariant(format!("departed {id} must only hold a listed home")));
            }
            check_balances(person)?;
        }
        Ok(())
    }
}

fn check_balances(person: &PersonData) -> Result<()> {
    if !(person.loan >= 0.0 && person.profit >= 0.0) {
        return Err(invariant(format!(
            "{} has loan {} and profit {}",
            person.id, person.loan, person.profit
        )));
    }
    Ok(())
}

fn owner_inconsistent(home: HomeId, message: String) -> HousingError {
    HousingError::OwnerInconsistent { home, message }
}

fn invariant(message: String) -> HousingError {
    HousingError::Invariant { message }
}
