// wager-market: marketplace settlement core for pending wager positions.
// transaction-first architecture: every cross-record mutation commits atomically.
// all computation is deterministic with no external I/O beyond the injected store.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: PositionId, AccountId, EventRef, Money, Price
//   2.x  position.rs: wager position, listing state, ownership transfer
//   3.x  account.rs: wallet balance + owned-position holdings
//   4.x  checks.rs: pure trade invariant checks shared by both operations
//   5.x  store.rs: transactional store contract + in-memory versioned store
//   6.x  engine/: marketplace operations: list-for-sale, settlement
//   7.x  config.rs: retry policy
//   8.x  events.rs: audit events for committed state changes

// core marketplace modules
pub mod account;
pub mod checks;
pub mod engine;
pub mod position;
pub mod types;

// integration modules
pub mod config;
pub mod events;
pub mod store;

// re exports for convenience
pub use account::*;
pub use checks::*;
pub use engine::*;
pub use position::*;
pub use types::*;
pub use config::MarketplaceConfig;
pub use events::{AuditLog, Event, EventId, EventPayload};
pub use store::{MarketStore, MemoryStore, RecordKey, StoreConflict, Transaction, Versioned};
