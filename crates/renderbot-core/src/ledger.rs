//! Credit Ledger
//!
//! Authoritative mapping from user identity to prepaid render credits.
//! The trait is the contract; the in-memory implementation is for
//! development and tests. A durable key-value backed implementation can
//! be dropped in behind the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CoreError, Result};
use crate::gateway::UserId;

/// Credit ledger storage trait
///
/// Implementations must serialize concurrent `credit`/`debit` calls for
/// the same user: `debit` is a conditional read-modify-write, so plain
/// atomic increments are not enough.
pub trait CreditLedger: Send + Sync {
    /// Current balance; unknown users read as 0
    fn balance(&self, user: &UserId) -> Result<u32>;

    /// Grant credits, creating the row lazily. Returns the new balance.
    ///
    /// `amount` must be positive; the caller validates it.
    fn credit(&self, user: &UserId, amount: u32) -> Result<u32>;

    /// Spend credits. Fails with [`CoreError::InsufficientCredit`] when
    /// the balance is below `amount`; returns the new balance otherwise.
    fn debit(&self, user: &UserId, amount: u32) -> Result<u32>;
}

/// In-memory credit ledger (for development)
pub struct MemoryCreditLedger {
    balances: RwLock<HashMap<String, u32>>,
}

impl Default for MemoryCreditLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCreditLedger {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }
}

impl CreditLedger for MemoryCreditLedger {
    fn balance(&self, user: &UserId) -> Result<u32> {
        let balances = self.balances.read().unwrap();
        Ok(balances.get(user.as_str()).copied().unwrap_or(0))
    }

    fn credit(&self, user: &UserId, amount: u32) -> Result<u32> {
        let mut balances = self.balances.write().unwrap();
        let balance = balances.entry(user.as_str().to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    fn debit(&self, user: &UserId, amount: u32) -> Result<u32> {
        // Check and mutate under one write lock so a racing credit or
        // second debit cannot interleave.
        let mut balances = self.balances.write().unwrap();
        let balance = balances.entry(user.as_str().to_string()).or_insert(0);

        if *balance < amount {
            return Err(CoreError::InsufficientCredit {
                needed: amount,
                available: *balance,
            });
        }

        *balance -= amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn test_unknown_user_reads_zero() {
        let ledger = MemoryCreditLedger::new();
        assert_eq!(ledger.balance(&user("42")).unwrap(), 0);
    }

    #[test]
    fn test_credit_then_debit_sums() {
        let ledger = MemoryCreditLedger::new();
        let u = user("42");

        assert_eq!(ledger.credit(&u, 5).unwrap(), 5);
        assert_eq!(ledger.credit(&u, 3).unwrap(), 8);
        assert_eq!(ledger.debit(&u, 1).unwrap(), 7);
        assert_eq!(ledger.debit(&u, 4).unwrap(), 3);
        assert_eq!(ledger.balance(&u).unwrap(), 3);
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let ledger = MemoryCreditLedger::new();
        let u = user("42");
        ledger.credit(&u, 1).unwrap();

        let err = ledger.debit(&u, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientCredit {
                needed: 2,
                available: 1
            }
        ));
        // Failed debit leaves the balance untouched
        assert_eq!(ledger.balance(&u).unwrap(), 1);
    }

    #[test]
    fn test_users_are_independent() {
        let ledger = MemoryCreditLedger::new();
        ledger.credit(&user("1"), 5).unwrap();
        ledger.credit(&user("2"), 2).unwrap();
        ledger.debit(&user("1"), 1).unwrap();

        assert_eq!(ledger.balance(&user("1")).unwrap(), 4);
        assert_eq!(ledger.balance(&user("2")).unwrap(), 2);
    }
}
