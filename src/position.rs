// 2.0: wager position tracking. a position is tradable while its outcome is undecided.
// 2.1 has the listing/transfer mutators used by the two marketplace operations.

use crate::types::{AccountId, EventRef, Money, PositionId, Price, Side, Timestamp};
use serde::{Deserialize, Serialize};

// Lifecycle of the underlying wager. Only Pending positions can trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    // Outcome undecided, position may be listed and sold
    Pending,
    // Outcome decided and paid out
    Settled,
    // Underlying event cancelled, stake refunded
    Voided,
}

// Sale terms for a listed position. Present iff the position is for sale,
// so "asking price set iff listed" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub asking_price: Price,
    pub listed_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owner: AccountId,
    pub event_ref: EventRef,
    pub side: Side,
    pub stake: Money,
    pub status: PositionStatus,
    pub listing: Option<Listing>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Position {
    pub fn new(
        id: PositionId,
        owner: AccountId,
        event_ref: EventRef,
        side: Side,
        stake: Money,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            event_ref,
            side,
            stake,
            status: PositionStatus::Pending,
            listing: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_listed(&self) -> bool {
        self.listing.is_some()
    }

    pub fn asking_price(&self) -> Option<Price> {
        self.listing.map(|l| l.asking_price)
    }

    pub fn is_pending(&self) -> bool {
        self.status == PositionStatus::Pending
    }

    // 2.1: puts the position up for sale. caller must have validated
    // ownership and status first (see checks::can_list).
    pub fn mark_listed(&mut self, asking_price: Price, timestamp: Timestamp) {
        self.listing = Some(Listing {
            asking_price,
            listed_at: timestamp,
        });
        self.updated_at = timestamp;
    }

    // Takes the position off the market without transferring it.
    pub fn mark_delisted(&mut self, timestamp: Timestamp) {
        self.listing = None;
        self.updated_at = timestamp;
    }

    // 2.2: hands the position to its buyer and clears the sale terms.
    // the funds leg of the trade lives in the settlement transaction.
    pub fn settle_transfer(&mut self, buyer: AccountId, timestamp: Timestamp) {
        debug_assert!(self.is_listed(), "only listed positions transfer");
        self.owner = buyer;
        self.listing = None;
        self.updated_at = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_position() -> Position {
        Position::new(
            PositionId::new("pos-1"),
            AccountId::new("alice"),
            EventRef::new("game-42"),
            Side::Home,
            Money::new(dec!(80)),
            Timestamp::from_millis(0),
        )
    }

    #[test]
    fn new_position_is_pending_and_unlisted() {
        let pos = test_position();
        assert!(pos.is_pending());
        assert!(!pos.is_listed());
        assert!(pos.asking_price().is_none());
    }

    #[test]
    fn listing_sets_asking_price() {
        let mut pos = test_position();
        pos.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(10));

        assert!(pos.is_listed());
        assert_eq!(pos.asking_price().unwrap().value(), dec!(100));
        assert_eq!(pos.updated_at, Timestamp::from_millis(10));
    }

    #[test]
    fn delisting_clears_asking_price() {
        let mut pos = test_position();
        pos.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(10));
        pos.mark_delisted(Timestamp::from_millis(20));

        assert!(!pos.is_listed());
        assert!(pos.asking_price().is_none());
    }

    #[test]
    fn settle_transfer_moves_owner_and_clears_listing() {
        let mut pos = test_position();
        pos.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(10));
        pos.settle_transfer(AccountId::new("bob"), Timestamp::from_millis(20));

        assert_eq!(pos.owner, AccountId::new("bob"));
        assert!(!pos.is_listed());
        // stake and event reference ride along unchanged
        assert_eq!(pos.stake.value(), dec!(80));
        assert_eq!(pos.event_ref, EventRef::new("game-42"));
    }

    #[test]
    fn position_serializes_round_trip() {
        let mut pos = test_position();
        pos.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(10));

        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
}
