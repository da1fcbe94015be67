use crate::agents::Location;
use crate::ids::{HomeId, PersonId};

/// The three legal states of a home.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeStatus {
    /// Owner set, not listed.
    OwnedOccupied,
    /// Owner set (already moved out), listed for sale.
    OwnedListed,
    /// Never purchased, listed for sale.
    VacantListed,
}

/// All mutable state for a single home.
#[derive(Clone, Debug)]
pub struct HomeData {
    pub id: HomeId,
    pub location: Location,
    pub owner: Option<PersonId>,
    /// Present only while the home is listed.
    pub asking_price: Option<f64>,
    pub sold_price: f64,
    pub times_sold: u32,
}

impl HomeData {
    /// A newly built home, valued at `price_floor` and not yet on the market.
    pub fn new(id: HomeId, location: Location, price_floor: f64) -> Self {
        HomeData {
            id,
            location,
            owner: None,
            asking_price: None,
            sold_price: price_floor,
            times_sold: 0,
        }
    }

    pub fn is_listed(&self) -> bool {
        self.asking_price.is_some()
    }

    /// Classify from the home's own flags. `None` means the flags describe
    /// no legal state (unowned and not listed, or vacant after a sale).
    pub fn status(&self) -> Option<HomeStatus> {
        match (self.owner, self.is_listed()) {
            (Some(_), false) => Some(HomeStatus::OwnedOccupied),
            (Some(_), true) => Some(HomeStatus::OwnedListed),
            (None, true) if self.times_sold == 0 => Some(HomeStatus::VacantListed),
            _ => None,
        }
    }
}
