use std::io::Write;

use crate::account::Money;
use csv::Writer;
use serde::Serialize;

use super::SellerId;

#[derive(Debug, Serialize)]
struct BalanceRow {
    owner: String,
    balance: Money,
}

/// Writes one `owner,balance` row per seller, in the given order,
/// followed by the market's own row.
pub fn print_balances<W>(
    output: &mut W,
    sellers: impl Iterator<Item = (SellerId, Money)>,
    market_balance: Money,
) -> anyhow::Result<()>
where
    W: Write,
{
    let market = BalanceRow {
        owner: "market".to_string(),
        balance: market_balance,
    };
    let rows = sellers
        .map(|(seller, balance)| BalanceRow {
            owner: seller.to_string(),
            balance,
        })
        .chain(std::iter::once(market));

    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
