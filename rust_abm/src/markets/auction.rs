//! Simultaneous ascending auction over every listed home.
//!
//! Each listed home starts with a standing bid of `asking / increment`, so
//! the first bid placed on it equals the asking price. Bidders are drained
//! from a FIFO work queue. A dequeued bidder looks at every listing, prices
//! a raise of the standing bid by the increment, and keeps the home with the
//! highest buy value among those still below their breakeven bid. If one is
//! found the bidder takes it over and the previous holder is pushed back
//! onto the queue. Either way the dequeued bidder leaves the queue.
//!
//! The loop ends when the queue is empty. Every displacement raises a bid by
//! a fixed factor and breakeven bids do not move during the auction, so
//! each home can only be contested a bounded number of times.
//!
//! # Tie-breaks
//!
//! The queue is seeded in ascending `PersonId` order and listings are
//! scanned in ascending `HomeId` order. A home only replaces the current
//! choice on a strictly greater buy value, so equal-value homes go to the
//! lowest `HomeId`; two bidders equally keen on a home resolve in queue
//! order.

use std::collections::VecDeque;

use tracing::trace;

use crate::agents::{EmployerData, HomeData};
use crate::error::{HousingError, Result};
use crate::ids::{HomeId, PersonId};
use crate::markets::registry::MarketState;
use crate::valuation::{Bidder, Valuation};

/// A completed trade produced by the auction.
#[derive(Clone, Debug, PartialEq)]
pub struct SaleEvent {
    pub home: HomeId,
    pub seller: Option<PersonId>,
    pub buyer: PersonId,
    pub old_price: f64,
    pub price: f64,
}

/// One bid accepted as the new standing bid on a home.
#[derive(Clone, Debug, PartialEq)]
pub struct BidRecord {
    pub home: HomeId,
    pub bidder: PersonId,
    pub amount: f64,
}

/// Outcome of one auction.
#[derive(Clone, Debug, Default)]
pub struct AuctionOutcome {
    /// Winning bids, in ascending home order.
    pub sales: Vec<SaleEvent>,
    /// Every accepted bid, in the order placed.
    pub bids: Vec<BidRecord>,
    /// Number of times a standing bidder was outbid.
    pub displacements: usize,
}

impl AuctionOutcome {
    pub fn has_sales(&self) -> bool {
        !self.sales.is_empty()
    }

    /// Accepted bids on `home`, oldest first.
    pub fn bids_on(&self, home: HomeId) -> impl Iterator<Item = &BidRecord> {
        self.bids.iter().filter(move |b| b.home == home)
    }
}

/// Transient per-home working state.
struct Listing<'a> {
    home: &'a HomeData,
    asking: f64,
    best_bid: f64,
    best_bidder: Option<usize>,
}

impl Listing<'_> {
    /// The bid needed to take the home over. With no standing bidder this
    /// is exactly the asking price.
    fn raised_bid(&self, increment: f64) -> f64 {
        match self.best_bidder {
            Some(_) => self.best_bid * increment,
            None => self.asking,
        }
    }
}

/// Run the auction for the current listings and population.
///
/// Reads `market` and `employers` only; the returned sale events are applied
/// by settlement.
pub fn run_auction(
    market: &MarketState,
    employers: &[EmployerData],
    valuation: &Valuation,
    bid_increment: f64,
) -> Result<AuctionOutcome> {
    if !(bid_increment.is_finite() && bid_increment > 1.0) {
        return Err(HousingError::ConfigError {
            message: format!("bid increment must be greater than 1, got {bid_increment}"),
        });
    }

    let mut listings = Vec::with_capacity(market.for_sale.len());
    for &home_id in &market.for_sale {
        let home = market.home(home_id)?;
        let asking = match home.asking_price {
            Some(asking) if asking.is_finite() && asking > 0.0 => asking,
            Some(price) => return Err(HousingError::InvalidAskingPrice { home: home_id, price }),
            None => return Err(HousingError::HomeNotListed(home_id)),
        };
        listings.push(Listing {
            home,
            asking,
            best_bid: asking / bid_increment,
            best_bidder: None,
        });
    }

    let mut outcome = AuctionOutcome::default();
    if listings.is_empty() {
        return Ok(outcome);
    }

    let mut ids = Vec::with_capacity(market.people.len());
    let mut bidders = Vec::with_capacity(market.people.len());
    for person in market.people.values() {
        let employer = employers
            .get(person.employer.0)
            .ok_or(HousingError::UnknownEmployer(person.employer))?;
        let current_home = match person.home {
            Some(home_id) => Some(market.home(home_id)?),
            None => None,
        };
        ids.push(person.id);
        bidders.push(Bidder {
            workplace: employer.location,
            current_home,
        });
    }

    let mut queue: VecDeque<usize> = (0..bidders.len()).collect();
    while let Some(b) = queue.pop_front() {
        let bidder = &bidders[b];
        let person = ids[b];

        let mut best: Option<(usize, f64, f64)> = None;
        for (i, listing) in listings.iter().enumerate() {
            if listing.home.owner == Some(person) {
                continue;
            }
            let candidate = listing.raised_bid(bid_increment);
            let value = bidder.buy_value(valuation, listing.home, candidate);
            let better = best.map_or(true, |(_, best_value, _)| value > best_value);
            if better && candidate < bidder.breakeven_bid(valuation, listing.home) {
                best = Some((i, value, candidate));
            }
        }

        let Some((i, _, candidate)) = best else {
            continue;
        };
        let listing = &mut listings[i];
        trace!(
            bidder = %person,
            home = %listing.home.id,
            bid = candidate,
            asking = listing.asking,
            "bid placed"
        );
        if let Some(previous) = listing.best_bidder.replace(b) {
            if previous != b {
                queue.push_back(previous);
                outcome.displacements += 1;
            }
        }
        listing.best_bid = candidate;
        outcome.bids.push(BidRecord {
            home: listing.home.id,
            bidder: person,
            amount: candidate,
        });
    }

    outcome.sales = listings
        .iter()
        .filter_map(|listing| {
            listing.best_bidder.map(|b| SaleEvent {
                home: listing.home.id,
                seller: listing.home.owner,
                buyer: ids[b],
                old_price: listing.home.sold_price,
                price: listing.best_bid,
            })
        })
        .collect();
    Ok(outcome)
}
