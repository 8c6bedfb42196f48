// 8.0: every committed marketplace state change produces an event. used for
// audit trails and notifying the display layer. rejected settlements are
// recorded too, so disputes can be traced after the fact.

use crate::types::{AccountId, Money, PositionId, Price, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    PositionListed(PositionListedEvent),
    PositionSettled(PositionSettledEvent),
    SettlementRejected(SettlementRejectedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionListedEvent {
    pub position_id: PositionId,
    pub seller: AccountId,
    pub asking_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSettledEvent {
    pub position_id: PositionId,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Price,
    pub buyer_balance_after: Money,
    pub seller_balance_after: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRejectedEvent {
    pub position_id: PositionId,
    pub buyer: AccountId,
    pub reason: String,
}

// Append-only audit log owned by the marketplace. Interior mutability so the
// operations can record through a shared reference.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<Event>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, payload: EventPayload) -> EventId {
        let mut entries = self.entries.lock();
        let id = EventId(entries.len() as u64 + 1);
        entries.push(Event {
            id,
            timestamp: Timestamp::now(),
            payload,
        });
        id
    }

    pub fn events(&self) -> Vec<Event> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn record_assigns_sequential_ids() {
        let log = AuditLog::new();

        let first = log.record(EventPayload::PositionListed(PositionListedEvent {
            position_id: PositionId::new("pos-1"),
            seller: AccountId::new("alice"),
            asking_price: Price::new_unchecked(dec!(100)),
        }));
        let second = log.record(EventPayload::SettlementRejected(SettlementRejectedEvent {
            position_id: PositionId::new("pos-1"),
            buyer: AccountId::new("bob"),
            reason: "insufficient funds".to_string(),
        }));

        assert_eq!(first, EventId(1));
        assert_eq!(second, EventId(2));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn events_serialize_for_export() {
        let log = AuditLog::new();
        log.record(EventPayload::PositionSettled(PositionSettledEvent {
            position_id: PositionId::new("pos-1"),
            seller: AccountId::new("alice"),
            buyer: AccountId::new("bob"),
            price: Price::new_unchecked(dec!(100)),
            buyer_balance_after: Money::new(dec!(50)),
            seller_balance_after: Money::new(dec!(100)),
        }));

        let json = serde_json::to_string(&log.events()).unwrap();
        assert!(json.contains("PositionSettled"));
    }
}
