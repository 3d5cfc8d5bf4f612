use chrono::Utc;
use log::info;
use serde::Serialize;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::block::{Block, BlockHeader};
use super::error::Rejection;
use super::pow::{Preempt, Target};
use super::{RETARGET_MAX_RATIO, RETARGET_MIN_RATIO};
use crate::config::{ConfigError, NetworkConfig};

/// Ledger entry for a miner. The chain holds only the sending half of the
/// miner's preemption channel.
#[derive(Debug)]
struct MinerAccount {
    id: u64,
    balance: u64,
    preempt: SyncSender<Preempt>,
}

/// Public view of a miner's ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinerInfo {
    pub id: u64,
    pub balance: u64,
}

/// A difficulty adjustment, recorded at the block that triggered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retarget {
    pub height: usize,
    pub previous: f64,
    pub next: f64,
    pub ratio: f64,
}

/// Figures for the stats endpoint, read under a single lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    pub height: usize,
    pub difficulty: f64,
    pub miners: usize,
    pub rejected: u64,
    pub retargets: usize,
    pub last_interval_secs: Option<i64>,
    pub avg_interval_secs: Option<f64>,
}

/// Deep copy of the chain taken under the shared lock.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub blocks: Vec<Block>,
    pub miners: Vec<MinerInfo>,
}

impl ChainSnapshot {
    /// Height of the first block that breaks linkage, hash integrity or
    /// Proof-of-Work; `None` when the whole chain checks out.
    pub fn first_invalid_height(&self) -> Option<usize> {
        let Some(genesis) = self.blocks.first() else {
            return Some(0);
        };
        if !genesis.header.previous_hash.is_empty() || !genesis.has_consistent_hash() {
            return Some(0);
        }
        self.blocks
            .windows(2)
            .position(|pair| {
                pair[1].header.previous_hash != pair[0].proof.hash || !pair[1].is_valid()
            })
            .map(|i| i + 1)
    }

    pub fn is_valid_chain(&self) -> bool {
        self.first_invalid_height().is_none()
    }
}

/// Multiplier applied to the difficulty after a window: target time over
/// observed time, clamped. A window observed in zero (or negative) seconds
/// takes the upper bound.
pub fn retarget_ratio(target_elapsed: u64, actual_elapsed: i64) -> f64 {
    if actual_elapsed <= 0 {
        return RETARGET_MAX_RATIO;
    }
    (target_elapsed as f64 / actual_elapsed as f64).clamp(RETARGET_MIN_RATIO, RETARGET_MAX_RATIO)
}

#[derive(Debug)]
struct ChainState {
    blocks: Vec<Block>,
    miners: Vec<MinerAccount>,
    current_difficulty: f64,
    retargets: Vec<Retarget>,
    rejected: u64,
}

impl ChainState {
    fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    fn validate(&self, block: &Block) -> Result<(), Rejection> {
        let current = Target::from_bits(self.current_difficulty);
        if Target::from_bits(block.header.target_bits) != current {
            return Err(Rejection::DifficultyMismatch {
                submitted: block.header.target_bits,
                current: self.current_difficulty,
            });
        }

        if block.header.previous_hash != self.tip().proof.hash {
            return Err(Rejection::StaleTip(hex::encode(&block.header.previous_hash)));
        }

        let now = Utc::now().timestamp();
        let created = block.header.timestamp;
        let admitted = block.proof.actual_timestamp;
        // Same-second blocks are legal, hence `<=`.
        if !(created <= admitted && admitted <= now) {
            return Err(Rejection::TimestampOutOfRange {
                created,
                admitted,
                now,
            });
        }

        if !block.has_consistent_hash() {
            return Err(Rejection::HashMismatch);
        }
        if !current.is_met_by(&block.proof.hash) {
            return Err(Rejection::AboveTarget(current.zero_bits()));
        }

        if self.miners.get(block.header.coinbase as usize).is_none() {
            return Err(Rejection::UnknownMiner(block.header.coinbase));
        }
        Ok(())
    }

    /// Runs after every append; adjusts only when the chain length is a
    /// multiple of the window.
    fn apply_retarget(&mut self, config: &NetworkConfig) -> Option<Retarget> {
        let len = self.blocks.len();
        let window = config.retarget_window;
        if len % window != 0 {
            return None;
        }
        let newest = &self.blocks[len - 1];
        let oldest = &self.blocks[len - window];
        let actual_elapsed = newest.proof.actual_timestamp - oldest.proof.actual_timestamp;
        let target_elapsed = config.target_block_interval * window as u64;
        let ratio = retarget_ratio(target_elapsed, actual_elapsed);

        let previous = self.current_difficulty;
        self.current_difficulty = previous * ratio;
        let retarget = Retarget {
            height: len - 1,
            previous,
            next: self.current_difficulty,
            ratio,
        };
        self.retargets.push(retarget);
        Some(retarget)
    }

    fn preempt_all_except(&self, winner: Option<u64>) {
        for miner in &self.miners {
            if Some(miner.id) != winner {
                // A full slot already holds a signal; a closed one has no miner left.
                let _ = miner.preempt.try_send(Preempt);
            }
        }
    }
}

/// The shared chain: blocks, miner ledger and difficulty behind one
/// reader-writer lock. Every mutation goes through `admit` or
/// `register_miner`.
#[derive(Debug)]
pub struct Blockchain {
    config: NetworkConfig,
    state: RwLock<ChainState>,
}

impl Blockchain {
    /// Validate `config` and seed the chain with a genesis block. No miners
    /// are registered yet.
    pub fn new(config: NetworkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ChainState {
            blocks: vec![Block::genesis()],
            miners: Vec::new(),
            current_difficulty: config.initial_difficulty,
            retargets: Vec::new(),
            rejected: 0,
        };
        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Append a miner with the next free id and zero balance. Returns the id
    /// and the receiving half of its preemption channel.
    pub fn register_miner(&self) -> (u64, Receiver<Preempt>) {
        let (preempt, signal) = sync_channel(1);
        let mut state = self.write();
        let id = state.miners.len() as u64;
        state.miners.push(MinerAccount {
            id,
            balance: 0,
            preempt,
        });
        (id, signal)
    }

    /// Build a candidate header on top of the current tip.
    pub fn assemble_candidate(&self, miner_id: u64, payload: Vec<u8>) -> BlockHeader {
        let state = self.read();
        BlockHeader {
            coinbase: miner_id,
            timestamp: Utc::now().timestamp(),
            payload,
            previous_hash: state.tip().proof.hash.to_vec(),
            target_bits: state.current_difficulty,
        }
    }

    /// Validate and append a solved block, then retarget, pay the coinbase
    /// and preempt every other miner. Returns the new block's height.
    /// A rejected block leaves the chain untouched.
    pub fn admit(&self, mut block: Block) -> Result<usize, Rejection> {
        let mut state = self.write();
        block.proof.actual_timestamp = Utc::now().timestamp();
        if let Err(reason) = state.validate(&block) {
            state.rejected += 1;
            return Err(reason);
        }

        // Same floor as validated, so the hash is unaffected.
        block.header.target_bits = state.current_difficulty;
        let coinbase = block.header.coinbase;
        let hash_hex = block.proof.hash_hex.clone();
        state.blocks.push(block);
        let height = state.blocks.len() - 1;

        if let Some(r) = state.apply_retarget(&self.config) {
            info!(
                "difficulty retarget at #{}: {:.4} -> {:.4} (ratio {:.3})",
                r.height, r.previous, r.next, r.ratio
            );
        }

        let reward = self.config.block_reward;
        if let Some(account) = state.miners.get_mut(coinbase as usize) {
            account.balance += reward;
        }
        state.preempt_all_except(Some(coinbase));

        info!("miner {} mined block #{} {}", coinbase, height, hash_hex);
        Ok(height)
    }

    /// Signal every miner, e.g. on shutdown.
    pub fn preempt_all(&self) {
        self.read().preempt_all_except(None);
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        let state = self.read();
        ChainSnapshot {
            blocks: state.blocks.clone(),
            miners: state
                .miners
                .iter()
                .map(|m| MinerInfo {
                    id: m.id,
                    balance: m.balance,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().blocks.len()
    }

    pub fn difficulty(&self) -> f64 {
        self.read().current_difficulty
    }

    pub fn retargets(&self) -> Vec<Retarget> {
        self.read().retargets.clone()
    }

    pub fn rejected_count(&self) -> u64 {
        self.read().rejected
    }

    pub fn stats(&self) -> ChainStats {
        let state = self.read();
        let blocks = &state.blocks;
        let height = blocks.len();
        let window = self.config.retarget_window;

        let last_interval_secs = (height >= 2).then(|| {
            (blocks[height - 1].proof.actual_timestamp - blocks[height - 2].proof.actual_timestamp)
                .max(0)
        });

        // Average over the most recent retarget window.
        let avg_interval_secs = (height > window).then(|| {
            let span = blocks[height - 1].proof.actual_timestamp
                - blocks[height - 1 - window].proof.actual_timestamp;
            span.max(0) as f64 / window as f64
        });

        ChainStats {
            height,
            difficulty: state.current_difficulty,
            miners: state.miners.len(),
            rejected: state.rejected,
            retargets: state.retargets.len(),
            last_interval_secs,
            avg_interval_secs,
        }
    }
}
