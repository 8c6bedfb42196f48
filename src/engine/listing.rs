//! List-for-Sale operation.

use super::core::Marketplace;
use super::results::{ListingReceipt, MarketError};
use crate::checks::can_list;
use crate::events::{EventPayload, PositionListedEvent};
use crate::store::{MarketStore, Transaction};
use crate::types::{AccountId, PositionId, Price, Timestamp};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

impl<S: MarketStore> Marketplace<S> {
    /// Mark a position owned by the caller as for sale at `asking_price`.
    ///
    /// Preconditions are checked in a fixed order, each failing with a
    /// distinct error: authentication, argument validity, existence,
    /// ownership, listing state, wager status. The write touches a single
    /// record; every check runs against the latest read, and a version
    /// conflict (a settlement landing between read and commit) re-runs the
    /// whole read-and-check body under the same bounded retry cap as
    /// settlement.
    pub fn list_for_sale(
        &self,
        caller: Option<&AccountId>,
        position_id: &str,
        asking_price: Decimal,
    ) -> Result<ListingReceipt, MarketError> {
        let seller = caller.ok_or(MarketError::Unauthenticated)?;

        if position_id.trim().is_empty() {
            return Err(MarketError::InvalidArgument(
                "position id is required".to_string(),
            ));
        }
        let price = Price::new(asking_price).ok_or_else(|| {
            MarketError::InvalidArgument(format!(
                "asking price must be positive, got {asking_price}"
            ))
        })?;
        let position_id = PositionId::new(position_id);

        let max_attempts = self.config.max_settle_attempts;
        for attempt in 1..=max_attempts {
            let read = self
                .store
                .get_position(&position_id)
                .ok_or_else(|| MarketError::PositionNotFound(position_id.clone()))?;

            can_list(&read.record, seller)?;

            let mut listed = read.record.clone();
            listed.mark_listed(price, Timestamp::now());

            let txn = Transaction::new()
                .assert_position(&read)
                .write_position(listed);

            match self.store.commit(txn) {
                Ok(()) => {
                    info!(position = %position_id, seller = %seller, price = %price, "position listed");
                    self.audit
                        .record(EventPayload::PositionListed(PositionListedEvent {
                            position_id: position_id.clone(),
                            seller: seller.clone(),
                            asking_price: price,
                        }));
                    return Ok(ListingReceipt {
                        position_id,
                        seller: seller.clone(),
                        asking_price: price,
                    });
                }
                Err(conflict) => {
                    debug!(key = %conflict.key, attempt, "listing commit conflict, retrying");
                }
            }
        }

        warn!(position = %position_id, attempts = max_attempts, "listing aborted, contention exhausted retries");
        Err(MarketError::Aborted {
            attempts: max_attempts,
        })
    }
}
