use std::sync::Arc;

use thiserror::Error;

use crate::{
    account::{AccountError, Money},
    offer::{GoodKind, Offer},
};

pub mod basic_market;
pub mod shared_market;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("Good is the wrong type: market buys {expected}, offer has {found}")]
    InvalidGoodType { expected: GoodKind, found: GoodKind },
    #[error("Offer with {goods} goods is not accepted, exactly one is required")]
    InvalidOfferShape { goods: usize },
    #[error("No seller offers available")]
    NoSellerOffers,
    #[error("Market demand is satisfied")]
    DemandSatisfied,
    #[error("No offers available")]
    NoOfferAvailable,
    #[error("Market offer is no longer current")]
    StaleOffer,
    #[error(transparent)]
    Transfer(#[from] AccountError),
}

/// Price the market proposes for one specific offer.
///
/// Either accepts the seller's price or counters below it. Only the
/// counter most recently returned by [`Market::consider_offers`] can be
/// transacted.
#[derive(Debug, Clone)]
pub struct Counter {
    offer: Arc<Offer>,
    price: Money,
}

impl Counter {
    pub fn offer(&self) -> &Offer {
        &self.offer
    }

    pub fn price(&self) -> Money {
        self.price
    }

    fn refers_to_same_offer(&self, other: &Counter) -> bool {
        Arc::ptr_eq(&self.offer, &other.offer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    pub good_kind: GoodKind,
    /// Highest unit price the market pays, regardless of its funds.
    pub price_ceiling: Money,
    /// Number of goods bought before the market stops buying.
    pub demand: usize,
    /// Initial funds of the market account.
    pub balance: Money,
}

pub trait Market {
    fn add_offer(&mut self, offer: Offer) -> Result<(), MarketError>;

    /// Picks the cheapest pending offer and proposes a price for it.
    /// The offer leaves the pending set whether or not the counter is
    /// ever transacted.
    fn consider_offers(&mut self) -> Result<Counter, MarketError>;

    /// Pays the seller and takes the goods.
    fn transact_offer(&mut self, counter: &Counter) -> Result<(), MarketError>;
}
