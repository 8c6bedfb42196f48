// 6.0: the marketplace operation layer. coordinates the two remote-callable
// operations (list-for-sale, settlement) over the injected transactional
// store. deterministic apart from timestamps; no I/O beyond the store.

mod core;
mod listing;
mod results;
mod settlement;

pub use self::core::Marketplace;
pub use self::results::{ListingReceipt, MarketError, SettlementReceipt, Status};
