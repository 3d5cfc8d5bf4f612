pub mod block;
pub mod error;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::{Blockchain, ChainSnapshot, MinerInfo};

/// Seconds the network aims to keep between accepted blocks.
pub const DEFAULT_TARGET_BLOCK_INTERVAL_SECS: u64 = 10;

/// Starting difficulty, in leading zero bits of the block hash.
pub const DEFAULT_INITIAL_DIFFICULTY: f64 = 20.0;

/// Accepted blocks between two difficulty retargets.
pub const DEFAULT_RETARGET_WINDOW: usize = 10;

/// Units credited to the miner of each accepted block.
pub const DEFAULT_BLOCK_REWARD: u64 = 20;

/// Bounds on the per-window difficulty multiplier.
pub const RETARGET_MIN_RATIO: f64 = 0.5;
pub const RETARGET_MAX_RATIO: f64 = 1.1;

/// Nonce search stops here without a solution (largest signed 64-bit value).
pub const MAX_NONCE: u64 = i64::MAX as u64;
