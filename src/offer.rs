use std::{fmt, str::FromStr, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

use crate::account::{Account, Money};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GoodKind {
    Meat,
    Fur,
}

impl fmt::Display for GoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoodKind::Meat => f.write_str("meat"),
            GoodKind::Fur => f.write_str("fur"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown good kind `{0}`")]
pub struct UnknownGoodKind(String);

impl FromStr for GoodKind {
    type Err = UnknownGoodKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meat" => Ok(GoodKind::Meat),
            "fur" => Ok(GoodKind::Fur),
            _ => Err(UnknownGoodKind(s.to_owned())),
        }
    }
}

/// A single tradeable unit. Refinement is its quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Good {
    pub kind: GoodKind,
    pub refinement: i32,
}

impl Good {
    pub fn new(kind: GoodKind) -> Self {
        Self::with_refinement(kind, 0)
    }

    pub fn with_refinement(kind: GoodKind, refinement: i32) -> Self {
        Self { kind, refinement }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OfferError {
    #[error("Offer must contain at least one good")]
    NoGoods,
}

/// Goods a seller is willing to sell at `unit_price`, paid into `account`.
#[derive(Debug)]
pub struct Offer {
    goods: Vec<Good>,
    account: Arc<Account>,
    unit_price: Money,
}

impl Offer {
    pub fn new(
        goods: Vec<Good>,
        account: Arc<Account>,
        unit_price: Money,
    ) -> Result<Self, OfferError> {
        if goods.is_empty() {
            return Err(OfferError::NoGoods);
        }
        Ok(Self {
            goods,
            account,
            unit_price,
        })
    }

    pub fn single(good: Good, account: Arc<Account>, unit_price: Money) -> Self {
        Self {
            goods: vec![good],
            account,
            unit_price,
        }
    }

    pub fn goods(&self) -> &[Good] {
        &self.goods
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }
}
