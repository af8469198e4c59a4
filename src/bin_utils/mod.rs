//! This module could be a separate crate on its own, to drive [`trade_market`] from a binary,
//! but for simplicity it lives in the library so integration tests can use it.

use std::{
    collections::BTreeMap,
    io::{Read, Write},
    sync::Arc,
};

use anyhow::Result;
use csv_parser::CsvOfferParser;
use csv_printer::print_balances;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    account::{Account, Money},
    market::{Market, MarketConfig, MarketError, basic_market::BasicMarket},
    offer::{Good, Offer},
};

pub mod csv_parser;
pub mod csv_printer;

pub type SellerId = u16;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    ParseErr(#[from] csv::Error),
    #[error(transparent)]
    MarketErr(#[from] MarketError),
}

#[derive(Default)]
struct Seller {
    account: Arc<Account>,
    reserve: Money,
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: MarketConfig,
    pub error_printer: Box<dyn FnMut(u64, ServiceError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOfferParser::new(self.input);

        let mut market = BasicMarket::from_config(&self.config);
        let mut sellers: BTreeMap<SellerId, Seller> = BTreeMap::new();

        for (line, row) in parser {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    (self.error_printer)(line, err.into());
                    continue;
                }
            };
            let seller = sellers.entry(row.seller).or_default();
            if let Some(reserve) = row.reserve {
                seller.reserve = reserve;
            }
            let good = Good::with_refinement(row.kind, row.refinement.unwrap_or_default());
            let offer = Offer::single(good, seller.account.clone(), row.price);
            if let Err(err) = market.add_offer(offer) {
                (self.error_printer)(line, err.into());
            }
        }

        loop {
            let counter = match market.consider_offers() {
                Ok(counter) => counter,
                Err(err) => {
                    debug!(%err, "market stopped buying");
                    break;
                }
            };
            let reserve = sellers
                .values()
                .find(|s| Arc::ptr_eq(&s.account, counter.offer().account()))
                .map_or(0, |s| s.reserve);
            if counter.price() < reserve {
                info!(price = counter.price(), reserve, "seller declined counter");
                continue;
            }
            market.transact_offer(&counter)?;
        }

        print_balances(
            self.output,
            sellers
                .iter()
                .map(|(id, seller)| (*id, seller.account.balance())),
            market.account().balance(),
        )
    }
}
