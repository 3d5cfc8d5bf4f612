use thiserror::Error;

use crate::blockchain::{
    DEFAULT_BLOCK_REWARD, DEFAULT_INITIAL_DIFFICULTY, DEFAULT_RETARGET_WINDOW,
    DEFAULT_TARGET_BLOCK_INTERVAL_SECS,
};

/// Address the control API binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Parameters of a simulated network, fixed once the chain is built.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub miner_count: usize,
    pub target_block_interval: u64, // seconds
    pub initial_difficulty: f64,    // leading zero bits
    pub retarget_window: usize,
    pub block_reward: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            miner_count: 0,
            target_block_interval: DEFAULT_TARGET_BLOCK_INTERVAL_SECS,
            initial_difficulty: DEFAULT_INITIAL_DIFFICULTY,
            retarget_window: DEFAULT_RETARGET_WINDOW,
            block_reward: DEFAULT_BLOCK_REWARD,
        }
    }
}

impl NetworkConfig {
    /// Default parameters with `miner_count` initial miners.
    pub fn with_miners(miner_count: usize) -> Self {
        Self {
            miner_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_block_interval == 0 {
            return Err(ConfigError::ZeroBlockInterval);
        }
        if !(self.initial_difficulty > 0.0 && self.initial_difficulty < 256.0) {
            return Err(ConfigError::DifficultyOutOfRange(self.initial_difficulty));
        }
        if self.retarget_window == 0 {
            return Err(ConfigError::ZeroRetargetWindow);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("target block interval must be at least one second")]
    ZeroBlockInterval,

    #[error("initial difficulty {0} must be within (0, 256)")]
    DifficultyOutOfRange(f64),

    #[error("retarget window must be at least one block")]
    ZeroRetargetWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = NetworkConfig::with_miners(3);
        assert_eq!(cfg.miner_count, 3);
        assert_eq!(cfg.target_block_interval, 10);
        assert_eq!(cfg.initial_difficulty, 20.0);
        assert_eq!(cfg.retarget_window, 10);
        assert_eq!(cfg.block_reward, 20);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = NetworkConfig::default();
        cfg.target_block_interval = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBlockInterval));

        let mut cfg = NetworkConfig::default();
        cfg.initial_difficulty = 256.0;
        assert_eq!(cfg.validate(), Err(ConfigError::DifficultyOutOfRange(256.0)));
        cfg.initial_difficulty = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::DifficultyOutOfRange(0.0)));

        let mut cfg = NetworkConfig::default();
        cfg.retarget_window = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRetargetWindow));
    }
}
