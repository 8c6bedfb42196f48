// 6.0.2: receipts, errors, and the stable status taxonomy for marketplace operations.

use crate::account::AccountError;
use crate::checks::TradeViolation;
use crate::types::{AccountId, PositionId, Price};

// Confirmation that a position went up for sale.
#[derive(Debug, Clone)]
pub struct ListingReceipt {
    pub position_id: PositionId,
    pub seller: AccountId,
    pub asking_price: Price,
}

// Confirmation that a listed position changed hands.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub position_id: PositionId,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Price,
    // Commit attempts consumed, 1 when uncontended
    pub attempts: u32,
}

// Stable caller-visible status kind. UI logic keys error rendering off this,
// so the mapping from MarketError must never change under refactoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unauthenticated,
    InvalidArgument,
    NotFound,
    PermissionDenied,
    FailedPrecondition,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("caller is not authenticated")]
    Unauthenticated,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("position {0} not found")]
    PositionNotFound(PositionId),

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("permission denied: {0}")]
    PermissionDenied(TradeViolation),

    #[error("failed precondition: {0}")]
    FailedPrecondition(TradeViolation),

    #[error("settlement aborted after {attempts} conflicting attempts")]
    Aborted { attempts: u32 },
}

impl MarketError {
    pub fn status(&self) -> Status {
        match self {
            MarketError::Unauthenticated => Status::Unauthenticated,
            MarketError::InvalidArgument(_) => Status::InvalidArgument,
            MarketError::PositionNotFound(_) | MarketError::AccountNotFound(_) => Status::NotFound,
            MarketError::PermissionDenied(_) => Status::PermissionDenied,
            MarketError::FailedPrecondition(_) => Status::FailedPrecondition,
            MarketError::Aborted { .. } => Status::Aborted,
        }
    }
}

impl From<TradeViolation> for MarketError {
    fn from(violation: TradeViolation) -> Self {
        match violation {
            TradeViolation::NotOwner { .. } => MarketError::PermissionDenied(violation),
            _ => MarketError::FailedPrecondition(violation),
        }
    }
}

// A debit failing after can_settle passed means the checker and the wallet
// disagree; surface it as the same insufficient-funds precondition.
impl From<AccountError> for MarketError {
    fn from(err: AccountError) -> Self {
        let AccountError::InsufficientBalance {
            requested,
            available,
        } = err;
        MarketError::FailedPrecondition(TradeViolation::InsufficientFunds {
            asking: requested,
            available,
        })
    }
}
