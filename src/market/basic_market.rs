use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    account::{Account, Money, transfer},
    offer::{Good, GoodKind, Offer},
};

use super::{Counter, Market, MarketConfig, MarketError};

/// Market buying a single kind of good, one good per offer.
#[derive(Debug)]
pub struct BasicMarket {
    good_kind: GoodKind,
    price_ceiling: Money,
    demand: usize,
    bought: Vec<Good>,
    account: Arc<Account>,
    pending_offers: Vec<Arc<Offer>>,
    current_counter: Option<Counter>,
}

impl BasicMarket {
    pub fn new(good_kind: GoodKind, price_ceiling: Money, demand: usize, balance: Money) -> Self {
        Self {
            good_kind,
            price_ceiling,
            demand,
            bought: Vec::new(),
            account: Arc::new(Account::new(balance)),
            pending_offers: Vec::new(),
            current_counter: None,
        }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(
            config.good_kind,
            config.price_ceiling,
            config.demand,
            config.balance,
        )
    }

    pub fn good_kind(&self) -> GoodKind {
        self.good_kind
    }

    pub fn price_ceiling(&self) -> Money {
        self.price_ceiling
    }

    pub fn demand(&self) -> usize {
        self.demand
    }

    pub fn bought(&self) -> &[Good] {
        &self.bought
    }

    pub fn remaining_demand(&self) -> usize {
        self.demand.saturating_sub(self.bought.len())
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    pub fn pending_offer_count(&self) -> usize {
        self.pending_offers.len()
    }

    pub fn current_counter(&self) -> Option<&Counter> {
        self.current_counter.as_ref()
    }

    fn demand_satisfied(&self) -> bool {
        self.bought.len() >= self.demand
    }
}

impl Market for BasicMarket {
    fn add_offer(&mut self, offer: Offer) -> Result<(), MarketError> {
        let [good] = offer.goods() else {
            warn!(goods = offer.goods().len(), "offer rejected");
            return Err(MarketError::InvalidOfferShape {
                goods: offer.goods().len(),
            });
        };
        if good.kind != self.good_kind {
            warn!(kind = %good.kind, "offer rejected");
            return Err(MarketError::InvalidGoodType {
                expected: self.good_kind,
                found: good.kind,
            });
        }

        debug!(price = offer.unit_price(), "offer added");
        self.pending_offers.push(Arc::new(offer));
        Ok(())
    }

    fn consider_offers(&mut self) -> Result<Counter, MarketError> {
        if self.pending_offers.is_empty() {
            return Err(MarketError::NoSellerOffers);
        }
        if self.demand_satisfied() {
            return Err(MarketError::DemandSatisfied);
        }

        // must stay stable: equal prices are considered in submission order
        self.pending_offers.sort_by_key(|offer| offer.unit_price());
        let best = self.pending_offers.remove(0);

        let price = best
            .unit_price()
            .min(self.price_ceiling)
            .min(self.account.balance());
        debug!(ask = best.unit_price(), price, "counter proposed");

        let counter = Counter { offer: best, price };
        self.current_counter = Some(counter.clone());
        Ok(counter)
    }

    fn transact_offer(&mut self, counter: &Counter) -> Result<(), MarketError> {
        let Some(current) = &self.current_counter else {
            return Err(MarketError::NoOfferAvailable);
        };
        if !current.refers_to_same_offer(counter) {
            warn!(price = counter.price, "stale counter");
            return Err(MarketError::StaleOffer);
        }
        if self.demand_satisfied() {
            return Err(MarketError::DemandSatisfied);
        }

        // on failure the counter stays outstanding and can be retried
        transfer(current.price, &self.account, current.offer.account())?;

        self.bought.extend_from_slice(current.offer.goods());
        info!(
            price = current.price,
            bought = self.bought.len(),
            demand = self.demand,
            "offer settled"
        );
        self.current_counter = None;
        Ok(())
    }
}
