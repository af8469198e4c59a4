use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{error, trace};

pub type Money = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
}

#[derive(Debug)]
pub struct AccountEvent {
    amount: Money,
    kind: AccountEventKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Money, available: Money },
    #[error("Balance overflow: depositing {amount} into {balance}")]
    BalanceOverflow { amount: Money, balance: Money },
}

#[derive(Debug, Default)]
struct Ledger {
    balance: Money,
}

impl Ledger {
    fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn => {
                self.balance -= event.amount;
            }
        }
    }

    fn handle_deposit(&self, amount: Money) -> Result<AccountEvent, AccountError> {
        if self.balance.checked_add(amount).is_some() {
            Ok(AccountEvent {
                amount,
                kind: AccountEventKind::Deposited,
            })
        } else {
            Err(AccountError::BalanceOverflow {
                amount,
                balance: self.balance,
            })
        }
    }

    fn handle_withdraw(&self, amount: Money) -> Result<AccountEvent, AccountError> {
        if self.balance >= amount {
            Ok(AccountEvent {
                amount,
                kind: AccountEventKind::Withdrawn,
            })
        } else {
            Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            })
        }
    }
}

/// Money held by a seller or a market.
///
/// Shared between its owner and the offers that name it, so every
/// operation takes `&self`. [`Account::lock`] gives exclusive access for
/// a sequence of operations; the convenience methods lock for a single one.
#[derive(Debug, Default)]
pub struct Account {
    ledger: Mutex<Ledger>,
}

impl Account {
    pub fn new(balance: Money) -> Self {
        Self {
            ledger: Mutex::new(Ledger { balance }),
        }
    }

    /// Blocks until no one else holds the account. Released when the guard drops.
    pub fn lock(&self) -> AccountGuard<'_> {
        // Every mutation is a single applied event, so a panicking holder
        // cannot leave the balance half-written.
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        AccountGuard { ledger }
    }

    pub fn balance(&self) -> Money {
        self.lock().balance()
    }

    pub fn deposit(&self, amount: Money) -> Result<(), AccountError> {
        self.lock().deposit(amount)
    }

    pub fn withdraw(&self, amount: Money) -> Result<(), AccountError> {
        self.lock().withdraw(amount)
    }
}

/// Exclusive access to an [`Account`] balance.
pub struct AccountGuard<'a> {
    ledger: MutexGuard<'a, Ledger>,
}

impl AccountGuard<'_> {
    pub fn balance(&self) -> Money {
        self.ledger.balance
    }

    /// Fails without touching the balance when it cannot hold `amount` more.
    pub fn deposit(&mut self, amount: Money) -> Result<(), AccountError> {
        let evt = self.ledger.handle_deposit(amount)?;
        self.ledger.apply(&evt);
        Ok(())
    }

    /// Fails without touching the balance when `amount` exceeds it.
    pub fn withdraw(&mut self, amount: Money) -> Result<(), AccountError> {
        let evt = self.ledger.handle_withdraw(amount)?;
        self.ledger.apply(&evt);
        Ok(())
    }
}

/// Moves `amount` from `payer` to `payee`.
///
/// Transfers out of the same payer are serialized. The payee is only
/// touched after the payer has been debited, and is not held while the
/// payer is. If the payee cannot take the amount, the payer is credited
/// back and both balances end up as they were.
pub fn transfer(amount: Money, payer: &Account, payee: &Account) -> Result<(), AccountError> {
    {
        let mut payer = payer.lock();
        payer.withdraw(amount)?;
        trace!(amount, remaining = payer.balance(), "payer debited");
    }
    if let Err(err) = payee.deposit(amount) {
        if let Err(refund_err) = payer.deposit(amount) {
            error!(%refund_err, amount, "transfer refund failed, funds lost");
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn apply_events() {
        let mut ledger = Ledger::default();
        ledger.apply(&AccountEvent {
            amount: 10,
            kind: AccountEventKind::Deposited,
        });
        assert_eq!(ledger.balance, 10);
        ledger.apply(&AccountEvent {
            amount: 3,
            kind: AccountEventKind::Withdrawn,
        });
        assert_eq!(ledger.balance, 7);
    }

    #[test]
    fn handle_withdraw() {
        let ledger = Ledger { balance: 5 };
        let evt = ledger.handle_withdraw(5).unwrap();
        assert_eq!(evt.amount, 5);
        assert_eq!(evt.kind, AccountEventKind::Withdrawn);

        let err = ledger.handle_withdraw(6).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                requested: 6,
                available: 5
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 6, available 5"
        );
        // validation alone never moves money
        assert_eq!(ledger.balance, 5);
    }

    #[test]
    fn deposit_and_withdraw() {
        let acc = Account::new(10);
        assert_eq!(acc.balance(), 10);

        acc.deposit(5).unwrap();
        assert_eq!(acc.balance(), 15);

        acc.withdraw(15).unwrap();
        assert_eq!(acc.balance(), 0);

        let err = acc.withdraw(1).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));
        assert_eq!(acc.balance(), 0);
    }

    #[test]
    fn guard_sees_its_own_changes() {
        let acc = Account::default();
        let mut guard = acc.lock();
        guard.deposit(4).unwrap();
        guard.withdraw(1).unwrap();
        assert_eq!(guard.balance(), 3);
        drop(guard);
        assert_eq!(acc.balance(), 3);
    }

    #[test]
    fn transfer_moves_money() {
        let payer = Account::new(10);
        let payee = Account::new(1);
        transfer(4, &payer, &payee).unwrap();
        assert_eq!(payer.balance(), 6);
        assert_eq!(payee.balance(), 5);

        transfer(0, &payer, &payee).unwrap();
        assert_eq!(payer.balance(), 6);
        assert_eq!(payee.balance(), 5);
    }

    #[test]
    fn failed_transfer_changes_nothing() {
        let payer = Account::new(3);
        let payee = Account::new(0);
        let err = transfer(4, &payer, &payee).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(payer.balance(), 3);
        assert_eq!(payee.balance(), 0);

        // payer lock was released on the error path
        payer.deposit(1).unwrap();
        transfer(4, &payer, &payee).unwrap();
        assert_eq!(payee.balance(), 4);
    }

    #[test]
    fn deposit_never_overflows() {
        let ledger = Ledger {
            balance: Money::MAX - 1,
        };
        assert!(ledger.handle_deposit(1).is_ok());
        let err = ledger.handle_deposit(2).unwrap_err();
        assert_eq!(
            err,
            AccountError::BalanceOverflow {
                amount: 2,
                balance: Money::MAX - 1
            }
        );

        let acc = Account::new(Money::MAX);
        acc.deposit(0).unwrap();
        assert!(matches!(
            acc.deposit(1).unwrap_err(),
            AccountError::BalanceOverflow { .. }
        ));
        assert_eq!(acc.balance(), Money::MAX);
    }

    #[test]
    fn transfer_into_full_payee_changes_nothing() {
        let payer = Account::new(10);
        let payee = Account::new(Money::MAX - 3);
        let err = transfer(4, &payer, &payee).unwrap_err();
        assert_eq!(
            err,
            AccountError::BalanceOverflow {
                amount: 4,
                balance: Money::MAX - 3
            }
        );
        assert_eq!(payer.balance(), 10);
        assert_eq!(payee.balance(), Money::MAX - 3);

        transfer(3, &payer, &payee).unwrap();
        assert_eq!(payer.balance(), 7);
        assert_eq!(payee.balance(), Money::MAX);
    }

    #[test]
    fn concurrent_transfers_never_overdraw_payer() {
        let payer = Arc::new(Account::new(50));
        let payee = Arc::new(Account::new(0));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let payer = Arc::clone(&payer);
                let payee = Arc::clone(&payee);
                thread::spawn(move || transfer(10, &payer, &payee).is_ok())
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(succeeded, 5);
        assert_eq!(payer.balance(), 0);
        assert_eq!(payee.balance(), 50);
    }
}
