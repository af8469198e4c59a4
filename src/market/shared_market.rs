use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::offer::Offer;

use super::{Counter, Market, MarketError};

/// Cloneable handle letting sellers and a controller on different
/// threads drive the same market.
///
/// Each operation holds the market exclusively for its whole duration,
/// so pending offers and the current counter are never observed half
/// updated.
pub struct SharedMarket<M> {
    inner: Arc<Mutex<M>>,
}

impl<M> Clone for SharedMarket<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Market> SharedMarket<M> {
    pub fn new(market: M) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    pub fn add_offer(&self, offer: Offer) -> Result<(), MarketError> {
        self.lock().add_offer(offer)
    }

    pub fn consider_offers(&self) -> Result<Counter, MarketError> {
        self.lock().consider_offers()
    }

    pub fn transact_offer(&self, counter: &Counter) -> Result<(), MarketError> {
        self.lock().transact_offer(counter)
    }

    /// Runs `f` with exclusive access, e.g. to inspect market state.
    pub fn with<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, M> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
