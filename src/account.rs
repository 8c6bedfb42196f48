//! Account wallet and holdings.
//!
//! An account holds a non-negative cash balance and the set of position ids it
//! owns. Within the settlement core only the Settlement operation mutates
//! accounts; account creation and funding belong to the lifecycle layer.

use crate::types::{AccountId, Money, PositionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Money,
    pub holdings: HashSet<PositionId>,
    pub created_at: Timestamp,
}

impl Account {
    pub fn new(id: AccountId, timestamp: Timestamp) -> Self {
        Self {
            id,
            balance: Money::zero(),
            holdings: HashSet::new(),
            created_at: timestamp,
        }
    }

    pub fn with_balance(id: AccountId, balance: Money, timestamp: Timestamp) -> Self {
        Self {
            id,
            balance,
            holdings: HashSet::new(),
            created_at: timestamp,
        }
    }

    pub fn credit(&mut self, amount: Money) {
        self.balance = self.balance.add(amount);
    }

    pub fn debit(&mut self, amount: Money) -> Result<(), AccountError> {
        if amount > self.balance {
            return Err(AccountError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self.balance.sub(amount);
        Ok(())
    }

    pub fn can_afford(&self, amount: Money) -> bool {
        amount <= self.balance
    }

    pub fn owns(&self, position_id: &PositionId) -> bool {
        self.holdings.contains(position_id)
    }

    pub fn grant(&mut self, position_id: PositionId) {
        self.holdings.insert(position_id);
    }

    pub fn revoke(&mut self, position_id: &PositionId) -> bool {
        self.holdings.remove(position_id)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AccountError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Money, available: Money },
}
