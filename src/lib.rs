/// Money holding accounts and the transfer protocol between them.
/// Balance is modified using events, which are created by validating requests
pub mod account;

/// Goods and the priced offers sellers submit to a market.
pub mod offer;

/// Market interface, plus the single-good "basic" implementation.
/// Ranks pending offers, proposes counters and settles them.
///
/// NOTE: the interface is the seam for market variants that accept
/// multi-good offers.
pub mod market;

/// Caller side of the engine: reads offers from CSV, drives the
/// submit/consider/transact loop and prints resulting balances.
/// Lives here so the integration test can use it.
pub mod bin_utils;
