use serde::Serialize;
use std::sync::Arc;

use crate::blockchain::{Block, MinerInfo};
use crate::network::Network;

/// Shared application state: the running network.
pub struct AppState {
    pub network: Arc<Network>,
}

impl AppState {
    pub fn new(network: Arc<Network>) -> Self {
        Self { network }
    }
}

/* ---------- Control API Models ---------- */

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Externally visible block fields. Raw hash bytes, creation timestamp and
/// payload stay private.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub coin_base: u64,
    pub prev_block_hash_hex: String,
    pub target_bit: f64,
    pub actual_timestamp: i64,
    pub nonce: u64,
    pub hash_hex: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            coin_base: block.header.coinbase,
            prev_block_hash_hex: hex::encode(&block.header.previous_hash),
            target_bit: block.header.target_bits,
            actual_timestamp: block.proof.actual_timestamp,
            nonce: block.proof.nonce,
            hash_hex: block.proof.hash_hex.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct BlockchainInfoResponse {
    pub blocks: Vec<BlockView>,
    pub miners: Vec<MinerInfo>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: f64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: f64,
    pub target_block_interval_secs: u64,
    pub retarget_window: usize,
    pub block_reward: u64,
    pub miners: usize,
    pub rejected_submissions: u64,
    pub retargets: usize,
    pub last_interval_secs: Option<i64>,
    pub avg_interval_secs: Option<f64>,
}
