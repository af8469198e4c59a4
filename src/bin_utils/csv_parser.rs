use std::io::Read;

use crate::{account::Money, offer::GoodKind};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

use super::SellerId;

#[derive(Debug, Deserialize)]
pub struct OfferRow {
    pub seller: SellerId,
    pub kind: GoodKind,
    pub refinement: Option<i32>,
    pub price: Money,
    /// Lowest counter price the seller accepts.
    pub reserve: Option<Money>,
}

/// Parses seller offers in CSV format, yielding each row with its line number
pub struct CsvOfferParser<R> {
    iter: DeserializeRecordsIntoIter<R, OfferRow>,
}

impl<R> CsvOfferParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvOfferParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<OfferRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
