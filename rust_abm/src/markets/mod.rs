pub mod auction;
pub mod decay;
pub mod housing;
pub mod registry;
pub mod settlement;

pub use auction::{run_auction, AuctionOutcome, BidRecord, SaleEvent};
pub use decay::decay_listings;
pub use housing::{clear_housing_market, HousingMarketAgent, MarketOutcome};
pub use registry::MarketState;
pub use settlement::{settle, settle_sale, SettledSale};
