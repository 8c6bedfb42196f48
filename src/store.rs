// 5.0: the transactional store contract. the durable copies of positions and
// accounts live behind this trait; the core never caches them across calls.
// 5.1 Transaction: asserted read set + staged writes, all-or-nothing commit.
// 5.2 MemoryStore: in-memory implementation with a per-record version counter
// checked at commit time. commit succeeds only if every record read is still
// at the version observed, which gives each attempt serializable isolation.

use crate::account::Account;
use crate::position::Position;
use crate::types::{AccountId, PositionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type Version = u64;

// A record paired with the version counter observed at read time.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: Version,
}

// Identifies a record across both collections for conflict reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Position(PositionId),
    Account(AccountId),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Position(id) => write!(f, "position/{id}"),
            RecordKey::Account(id) => write!(f, "account/{id}"),
        }
    }
}

// 5.1: a staged multi-record write. reads are asserted, writes are full
// replacement values that become visible atomically on commit. every written
// record must also appear in the read set; blind writes are not supported.
#[derive(Debug, Default)]
pub struct Transaction {
    reads: Vec<(RecordKey, Version)>,
    position_writes: Vec<Position>,
    account_writes: Vec<Account>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert_position(mut self, read: &Versioned<Position>) -> Self {
        self.reads
            .push((RecordKey::Position(read.record.id.clone()), read.version));
        self
    }

    pub fn assert_account(mut self, read: &Versioned<Account>) -> Self {
        self.reads
            .push((RecordKey::Account(read.record.id.clone()), read.version));
        self
    }

    pub fn write_position(mut self, position: Position) -> Self {
        self.position_writes.push(position);
        self
    }

    pub fn write_account(mut self, account: Account) -> Self {
        self.account_writes.push(account);
        self
    }

    pub fn read_set(&self) -> &[(RecordKey, Version)] {
        &self.reads
    }

    fn asserts(&self, key: &RecordKey) -> bool {
        self.reads.iter().any(|(k, _)| k == key)
    }
}

// A commit attempt was discarded because a read record changed underneath it.
// The caller retries the whole read-check-write body with fresh state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transaction conflict: {key} changed between read and commit")]
pub struct StoreConflict {
    pub key: RecordKey,
}

// 5.0: store contract consumed by the marketplace operations. implementations
// must make committed writes visible atomically and reject commits whose read
// set is stale.
pub trait MarketStore {
    fn get_position(&self, id: &PositionId) -> Option<Versioned<Position>>;

    fn get_account(&self, id: &AccountId) -> Option<Versioned<Account>>;

    // Reads two accounts in one call. Implementations backed by a shared
    // snapshot should serve both from the same snapshot.
    fn get_account_pair(
        &self,
        first: &AccountId,
        second: &AccountId,
    ) -> (Option<Versioned<Account>>, Option<Versioned<Account>>) {
        (self.get_account(first), self.get_account(second))
    }

    fn commit(&self, txn: Transaction) -> Result<(), StoreConflict>;
}

#[derive(Debug, Default)]
struct Inner {
    positions: HashMap<PositionId, Versioned<Position>>,
    accounts: HashMap<AccountId, Versioned<Account>>,
}

// 5.2: in-memory versioned store. cheap to clone; clones share state, so
// concurrent callers race against the same records like they would against a
// real document database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding entry points. Wager placement and account lifecycle are outside
    // the settlement core, so these are not part of the MarketStore contract.
    pub fn insert_position(&self, position: Position) {
        let mut inner = self.inner.write();
        inner.positions.insert(
            position.id.clone(),
            Versioned {
                record: position,
                version: 1,
            },
        );
    }

    pub fn insert_account(&self, account: Account) {
        let mut inner = self.inner.write();
        inner.accounts.insert(
            account.id.clone(),
            Versioned {
                record: account,
                version: 1,
            },
        );
    }

    // Marketplace browse view: every position currently for sale.
    pub fn listings(&self) -> Vec<Position> {
        let inner = self.inner.read();
        inner
            .positions
            .values()
            .filter(|v| v.record.is_listed())
            .map(|v| v.record.clone())
            .collect()
    }
}

impl MarketStore for MemoryStore {
    fn get_position(&self, id: &PositionId) -> Option<Versioned<Position>> {
        self.inner.read().positions.get(id).cloned()
    }

    fn get_account(&self, id: &AccountId) -> Option<Versioned<Account>> {
        self.inner.read().accounts.get(id).cloned()
    }

    fn get_account_pair(
        &self,
        first: &AccountId,
        second: &AccountId,
    ) -> (Option<Versioned<Account>>, Option<Versioned<Account>>) {
        // one lock acquisition so both reads come from the same snapshot
        let inner = self.inner.read();
        (
            inner.accounts.get(first).cloned(),
            inner.accounts.get(second).cloned(),
        )
    }

    fn commit(&self, txn: Transaction) -> Result<(), StoreConflict> {
        let mut inner = self.inner.write();

        // validate the whole read set before touching anything
        for (key, asserted) in txn.read_set() {
            let current = match key {
                RecordKey::Position(id) => inner.positions.get(id).map(|v| v.version),
                RecordKey::Account(id) => inner.accounts.get(id).map(|v| v.version),
            };
            if current != Some(*asserted) {
                return Err(StoreConflict { key: key.clone() });
            }
        }

        // apply every staged write, bumping version counters
        for position in txn.position_writes.iter() {
            let key = RecordKey::Position(position.id.clone());
            debug_assert!(txn.asserts(&key), "blind write to {key}");
            let entry = inner
                .positions
                .entry(position.id.clone())
                .or_insert_with(|| Versioned {
                    record: position.clone(),
                    version: 0,
                });
            entry.record = position.clone();
            entry.version += 1;
        }

        for account in txn.account_writes.iter() {
            let key = RecordKey::Account(account.id.clone());
            debug_assert!(txn.asserts(&key), "blind write to {key}");
            let entry = inner
                .accounts
                .entry(account.id.clone())
                .or_insert_with(|| Versioned {
                    record: account.clone(),
                    version: 0,
                });
            entry.record = account.clone();
            entry.version += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventRef, Money, Price, Side, Timestamp};
    use rust_decimal_macros::dec;

    fn seed_position(store: &MemoryStore, id: &str, owner: &str) -> PositionId {
        let position_id = PositionId::new(id);
        store.insert_position(Position::new(
            position_id.clone(),
            AccountId::new(owner),
            EventRef::new("game-1"),
            Side::Home,
            Money::new(dec!(80)),
            Timestamp::from_millis(0),
        ));
        position_id
    }

    fn seed_account(store: &MemoryStore, id: &str, balance: rust_decimal::Decimal) -> AccountId {
        let account_id = AccountId::new(id);
        store.insert_account(Account::with_balance(
            account_id.clone(),
            Money::new(balance),
            Timestamp::from_millis(0),
        ));
        account_id
    }

    #[test]
    fn commit_bumps_versions() {
        let store = MemoryStore::new();
        let id = seed_position(&store, "pos-1", "alice");

        let read = store.get_position(&id).unwrap();
        assert_eq!(read.version, 1);

        let mut updated = read.record.clone();
        updated.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(5));

        let txn = Transaction::new()
            .assert_position(&read)
            .write_position(updated);
        store.commit(txn).unwrap();

        let after = store.get_position(&id).unwrap();
        assert_eq!(after.version, 2);
        assert!(after.record.is_listed());
    }

    #[test]
    fn stale_read_conflicts() {
        let store = MemoryStore::new();
        let id = seed_position(&store, "pos-1", "alice");

        let stale = store.get_position(&id).unwrap();

        // someone else commits first
        let mut listed = stale.record.clone();
        listed.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(5));
        store
            .commit(
                Transaction::new()
                    .assert_position(&stale)
                    .write_position(listed),
            )
            .unwrap();

        // the stale transaction must be rejected
        let mut relisted = stale.record.clone();
        relisted.mark_listed(Price::new_unchecked(dec!(90)), Timestamp::from_millis(6));
        let result = store.commit(
            Transaction::new()
                .assert_position(&stale)
                .write_position(relisted),
        );

        assert_eq!(
            result,
            Err(StoreConflict {
                key: RecordKey::Position(id.clone())
            })
        );
        // and the winning write survives
        assert_eq!(
            store
                .get_position(&id)
                .unwrap()
                .record
                .asking_price()
                .unwrap()
                .value(),
            dec!(100)
        );
    }

    #[test]
    fn conflicted_commit_applies_nothing() {
        let store = MemoryStore::new();
        let pos_id = seed_position(&store, "pos-1", "alice");
        let alice = seed_account(&store, "alice", dec!(100));

        let pos_read = store.get_position(&pos_id).unwrap();
        let acct_read = store.get_account(&alice).unwrap();

        // invalidate the account read
        let mut bumped = acct_read.record.clone();
        bumped.credit(Money::new(dec!(1)));
        store
            .commit(
                Transaction::new()
                    .assert_account(&acct_read)
                    .write_account(bumped),
            )
            .unwrap();

        // multi-record transaction with one stale read: nothing may land
        let mut listed = pos_read.record.clone();
        listed.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(5));
        let mut debited = acct_read.record.clone();
        debited.debit(Money::new(dec!(50))).unwrap();

        let result = store.commit(
            Transaction::new()
                .assert_position(&pos_read)
                .assert_account(&acct_read)
                .write_position(listed)
                .write_account(debited),
        );

        assert!(result.is_err());
        assert!(!store.get_position(&pos_id).unwrap().record.is_listed());
        assert_eq!(
            store.get_account(&alice).unwrap().record.balance.value(),
            dec!(101)
        );
    }

    #[test]
    fn missing_record_in_read_set_conflicts() {
        let store = MemoryStore::new();
        let id = seed_position(&store, "pos-1", "alice");
        let read = store.get_position(&id).unwrap();

        // a read asserted against a record that no longer exists is stale
        let ghost = Versioned {
            record: Account::new(AccountId::new("ghost"), Timestamp::from_millis(0)),
            version: 1,
        };
        let result = store.commit(
            Transaction::new()
                .assert_position(&read)
                .assert_account(&ghost),
        );
        assert!(matches!(result, Err(StoreConflict { .. })));
    }

    #[test]
    fn account_pair_comes_from_one_snapshot() {
        let store = MemoryStore::new();
        let alice = seed_account(&store, "alice", dec!(150));
        let bob = seed_account(&store, "bob", dec!(0));

        let (a, b) = store.get_account_pair(&alice, &bob);
        assert_eq!(a.unwrap().record.balance.value(), dec!(150));
        assert_eq!(b.unwrap().record.balance.value(), dec!(0));

        let (a, missing) = store.get_account_pair(&alice, &AccountId::new("nobody"));
        assert!(a.is_some());
        assert!(missing.is_none());
    }

    #[test]
    fn listings_view_tracks_listed_positions() {
        let store = MemoryStore::new();
        let id = seed_position(&store, "pos-1", "alice");
        seed_position(&store, "pos-2", "bob");

        assert!(store.listings().is_empty());

        let read = store.get_position(&id).unwrap();
        let mut listed = read.record.clone();
        listed.mark_listed(Price::new_unchecked(dec!(100)), Timestamp::from_millis(5));
        store
            .commit(
                Transaction::new()
                    .assert_position(&read)
                    .write_position(listed),
            )
            .unwrap();

        let listings = store.listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, id);
    }
}
