// 4.0: pure trade invariant checks. no I/O, no store, unit-testable in isolation.
// both marketplace operations run these against freshly read records so the
// precondition semantics are identical everywhere.

use crate::account::Account;
use crate::position::Position;
use crate::types::{AccountId, Money, PositionId, Price};

// Why a listing or purchase is not allowed. The operation layer maps
// NotOwner to PermissionDenied and everything else to FailedPrecondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeViolation {
    #[error("caller {caller} does not own position {position}")]
    NotOwner {
        caller: AccountId,
        position: PositionId,
    },

    #[error("position {0} is already listed for sale")]
    AlreadyListed(PositionId),

    #[error("position {0} is not pending and cannot be listed")]
    NotPending(PositionId),

    #[error("position {0} is not for sale")]
    NotForSale(PositionId),

    #[error("cannot buy own position {0}")]
    SelfTrade(PositionId),

    #[error("insufficient funds: asking {asking}, available {available}")]
    InsufficientFunds { asking: Money, available: Money },
}

// 4.1: may `caller` put this position up for sale? checks run in the order
// the errors are surfaced to callers: ownership, listing state, status.
pub fn can_list(position: &Position, caller: &AccountId) -> Result<(), TradeViolation> {
    if &position.owner != caller {
        return Err(TradeViolation::NotOwner {
            caller: caller.clone(),
            position: position.id.clone(),
        });
    }

    if position.is_listed() {
        return Err(TradeViolation::AlreadyListed(position.id.clone()));
    }

    if !position.is_pending() {
        return Err(TradeViolation::NotPending(position.id.clone()));
    }

    Ok(())
}

// 4.2: may `buyer` purchase this listed position? returns the validated
// asking price so the settlement body never re-derives it. the seller account
// is only credited, so no check is made on its balance.
pub fn can_settle(
    position: &Position,
    buyer: &AccountId,
    buyer_account: &Account,
    seller_account: &Account,
) -> Result<Price, TradeViolation> {
    debug_assert_eq!(
        seller_account.id, position.owner,
        "seller account must belong to the position owner"
    );

    let asking = match position.asking_price() {
        Some(price) => price,
        None => return Err(TradeViolation::NotForSale(position.id.clone())),
    };

    if &position.owner == buyer {
        return Err(TradeViolation::SelfTrade(position.id.clone()));
    }

    if !buyer_account.can_afford(asking.as_money()) {
        return Err(TradeViolation::InsufficientFunds {
            asking: asking.as_money(),
            available: buyer_account.balance,
        });
    }

    Ok(asking)
}
