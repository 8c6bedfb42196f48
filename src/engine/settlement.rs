//! Settlement operation: the atomic purchase of a listed position.
//!
//! The whole read-check-write body executes per attempt against fresh reads.
//! Three records move together or not at all: the position (owner and listing
//! state), the buyer account (debit, gains the holding), the seller account
//! (credit, loses the holding). The store rejects the commit if any of the
//! three changed after being read, and the body re-runs from scratch; it
//! never resumes with stale data.

use super::core::Marketplace;
use super::results::{MarketError, SettlementReceipt};
use crate::checks::can_settle;
use crate::events::{EventPayload, PositionSettledEvent, SettlementRejectedEvent};
use crate::store::{MarketStore, Transaction};
use crate::types::{AccountId, PositionId, Timestamp};
use tracing::{debug, info, warn};

impl<S: MarketStore> Marketplace<S> {
    /// Buy the listed position `position_id` at its asking price.
    ///
    /// On success the buyer paid exactly the asking price, the seller
    /// received exactly the asking price, and the position belongs to the
    /// buyer with its listing cleared. On any error nothing changed.
    pub fn settle(
        &self,
        caller: Option<&AccountId>,
        position_id: &str,
    ) -> Result<SettlementReceipt, MarketError> {
        let buyer_id = caller.ok_or(MarketError::Unauthenticated)?;

        if position_id.trim().is_empty() {
            return Err(MarketError::InvalidArgument(
                "position id is required".to_string(),
            ));
        }
        let position_id = PositionId::new(position_id);

        let max_attempts = self.config.max_settle_attempts;
        for attempt in 1..=max_attempts {
            // fresh reads every attempt
            let pos_read = self
                .store
                .get_position(&position_id)
                .ok_or_else(|| MarketError::PositionNotFound(position_id.clone()))?;
            let seller_id = pos_read.record.owner.clone();

            let (buyer_read, seller_read) = self.store.get_account_pair(buyer_id, &seller_id);
            let buyer_read =
                buyer_read.ok_or_else(|| MarketError::AccountNotFound(buyer_id.clone()))?;
            let seller_read =
                seller_read.ok_or_else(|| MarketError::AccountNotFound(seller_id.clone()))?;

            // all validation happens before any write is staged
            let price = can_settle(
                &pos_read.record,
                buyer_id,
                &buyer_read.record,
                &seller_read.record,
            )
            .map_err(|violation| {
                let err = MarketError::from(violation);
                self.audit
                    .record(EventPayload::SettlementRejected(SettlementRejectedEvent {
                        position_id: position_id.clone(),
                        buyer: buyer_id.clone(),
                        reason: err.to_string(),
                    }));
                err
            })?;

            let now = Timestamp::now();

            let mut position_after = pos_read.record.clone();
            position_after.settle_transfer(buyer_id.clone(), now);

            let mut buyer_after = buyer_read.record.clone();
            buyer_after.debit(price.as_money())?;
            buyer_after.grant(position_id.clone());

            let mut seller_after = seller_read.record.clone();
            seller_after.credit(price.as_money());
            seller_after.revoke(&position_id);

            let buyer_balance_after = buyer_after.balance;
            let seller_balance_after = seller_after.balance;

            let txn = Transaction::new()
                .assert_position(&pos_read)
                .assert_account(&buyer_read)
                .assert_account(&seller_read)
                .write_position(position_after)
                .write_account(buyer_after)
                .write_account(seller_after);

            match self.store.commit(txn) {
                Ok(()) => {
                    info!(
                        position = %position_id,
                        seller = %seller_id,
                        buyer = %buyer_id,
                        price = %price,
                        attempt,
                        "settlement committed"
                    );
                    self.audit
                        .record(EventPayload::PositionSettled(PositionSettledEvent {
                            position_id: position_id.clone(),
                            seller: seller_id.clone(),
                            buyer: buyer_id.clone(),
                            price,
                            buyer_balance_after,
                            seller_balance_after,
                        }));
                    return Ok(SettlementReceipt {
                        position_id,
                        seller: seller_id,
                        buyer: buyer_id.clone(),
                        price,
                        attempts: attempt,
                    });
                }
                Err(conflict) => {
                    debug!(key = %conflict.key, attempt, "settlement commit conflict, retrying");
                }
            }
        }

        warn!(position = %position_id, buyer = %buyer_id, attempts = max_attempts, "settlement aborted, contention exhausted retries");
        Err(MarketError::Aborted {
            attempts: max_attempts,
        })
    }
}
