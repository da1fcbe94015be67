use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{HousingError, Result};
use crate::markets::auction::SaleEvent;
use crate::markets::registry::MarketState;

/// A sale that has been applied to the market, with the for-sale count
/// observed right after the home was unlisted.
#[derive(Clone, Debug, PartialEq)]
pub struct SettledSale {
    pub event: SaleEvent,
    pub for_sale_after: usize,
}

/// Apply one sale event on its own.
///
/// Replaying an event that was already applied fails with `HomeNotListed`
/// and changes nothing.
pub fn settle_sale(market: &mut MarketState, event: &SaleEvent) -> Result<SettledSale> {
    market.validate_sale(event.home, event.buyer)?;
    market.credit_seller(event.home, event.price)?;
    apply_purchase(market, event)
}

/// Apply every sale event of a tick.
///
/// Every event is validated before anything changes. All sellers are then
/// paid before any buyer takes on a new loan, so a person who sells one
/// home and buys another in the same tick ends with the same loan and
/// profit whatever the event order.
pub fn settle(market: &mut MarketState, events: &[SaleEvent]) -> Result<Vec<SettledSale>> {
    validate_batch(market, events)?;
    for event in events {
        market.credit_seller(event.home, event.price)?;
    }
    events.iter().map(|event| apply_purchase(market, event)).collect()
}

fn validate_batch(market: &MarketState, events: &[SaleEvent]) -> Result<()> {
    let mut homes = BTreeSet::new();
    let mut buyers = BTreeSet::new();
    for event in events {
        market.validate_sale(event.home, event.buyer)?;
        if !homes.insert(event.home) {
            return Err(HousingError::Invariant {
                message: format!("{} is sold twice in one batch", event.home),
            });
        }
        if !buyers.insert(event.buyer) {
            return Err(HousingError::Invariant {
                message: format!("{} buys more than one home in one batch", event.buyer),
            });
        }
    }
    Ok(())
}

/// Unlist the traded home, move the buyer out of any home they occupy
/// (listing it at its last sold price) and hand over the new one. The
/// seller must already have been credited.
fn apply_purchase(market: &mut MarketState, event: &SaleEvent) -> Result<SettledSale> {
    market.unlist_on_sale(event.home)?;
    let for_sale_after = market.for_sale_count();

    let buyer_home = market.person(event.buyer)?.home;
    if let Some(old_home) = buyer_home {
        let relist_price = market.home(old_home)?.sold_price;
        market.list(old_home, relist_price)?;
    }

    market.transfer(event.home, event.buyer, event.price)?;
    debug!(
        home = %event.home,
        seller = ?event.seller.map(|s| s.to_string()),
        buyer = %event.buyer,
        old_price = event.old_price,
        price = event.price,
        "sale settled"
    );
    Ok(SettledSale {
        event: event.clone(),
        for_sale_after,
    })
}
