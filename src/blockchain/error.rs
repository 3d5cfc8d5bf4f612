use thiserror::Error;

/// Why the chain refused a submitted block.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("target bits {submitted} do not match current difficulty {current}")]
    DifficultyMismatch { submitted: f64, current: f64 },

    #[error("previous hash {0} is not the current tip")]
    StaleTip(String),

    #[error("timestamp out of range (created {created}, admitted {admitted}, now {now})")]
    TimestampOutOfRange { created: i64, admitted: i64, now: i64 },

    #[error("hash does not match block contents")]
    HashMismatch,

    #[error("hash does not meet a target of {0} zero bits")]
    AboveTarget(u32),

    #[error("coinbase {0} is not a registered miner")]
    UnknownMiner(u64),
}
