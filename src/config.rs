// 7.0 config.rs: marketplace settings. retry policy lives here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    // Maximum read-check-write attempts for a settlement before the operation
    // gives up and reports Aborted. Bounds tail latency under contention; the
    // loser of a two-buyer race needs exactly one retry to observe the
    // delisted position and fail precondition cleanly.
    pub max_settle_attempts: u32,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            max_settle_attempts: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_bound() {
        let config = MarketplaceConfig::default();
        assert_eq!(config.max_settle_attempts, 5);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = MarketplaceConfig {
            max_settle_attempts: 3,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: MarketplaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_settle_attempts, 3);
    }
}
