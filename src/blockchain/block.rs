use chrono::Utc;
use sha2::{Digest, Sha256};

use super::pow::Target;

/// Size in bytes of a block hash (SHA-256).
pub const HASH_LEN: usize = 32;

pub type BlockHash = [u8; HASH_LEN];

/// The part of a block fixed before Proof-of-Work starts.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub coinbase: u64,  // id of the miner credited for this block
    pub timestamp: i64, // Unix seconds at candidate assembly
    pub payload: Vec<u8>,
    pub previous_hash: Vec<u8>, // empty only for genesis
    pub target_bits: f64,
}

impl BlockHeader {
    /// Bytes hashed for a given nonce: coinbase, previous hash, payload,
    /// timestamp, integer part of the target bits and nonce, concatenated
    /// without separators. Integers are 8 bytes big-endian.
    pub fn canonical_bytes(&self, nonce: u64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + self.previous_hash.len() + self.payload.len());
        buf.extend_from_slice(&self.coinbase.to_be_bytes());
        buf.extend_from_slice(&self.previous_hash);
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&(self.target_bits as i64).to_be_bytes());
        buf.extend_from_slice(&nonce.to_be_bytes());
        buf
    }

    /// SHA-256 of the canonical bytes for `nonce`.
    pub fn compute_hash(&self, nonce: u64) -> BlockHash {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes(nonce));
        let digest = hasher.finalize();
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&digest[..]);
        out
    }
}

/// Evidence that a header was sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct Proof {
    pub actual_timestamp: i64, // stamped by the chain at admission
    pub nonce: u64,
    pub hash: BlockHash,
    pub hash_hex: String,
}

/// A sealed block: header plus proof.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub proof: Proof,
}

impl Block {
    /// Create the genesis block (first block in the chain). Its hash is the
    /// digest of its own canonical bytes with nonce 0.
    pub fn genesis() -> Self {
        let now = Utc::now().timestamp();
        let header = BlockHeader {
            coinbase: 0,
            timestamp: now,
            payload: Vec::new(),
            previous_hash: Vec::new(),
            target_bits: 0.0,
        };
        let hash = header.compute_hash(0);
        let mut block = Self::sealed(header, 0, hash);
        block.proof.actual_timestamp = now;
        block
    }

    /// Attach a found nonce and its hash to a header. The actual timestamp
    /// stays zero until the chain admits the block.
    pub fn sealed(header: BlockHeader, nonce: u64, hash: BlockHash) -> Self {
        Self {
            header,
            proof: Proof {
                actual_timestamp: 0,
                nonce,
                hash,
                hash_hex: hex::encode(hash),
            },
        }
    }

    /// Recompute the hash from header and nonce.
    pub fn compute_hash(&self) -> BlockHash {
        self.header.compute_hash(self.proof.nonce)
    }

    /// Stored hash (raw and hex) matches the block contents.
    pub fn has_consistent_hash(&self) -> bool {
        self.compute_hash() == self.proof.hash && self.proof.hash_hex == hex::encode(self.proof.hash)
    }

    /// Stored hash is below the threshold derived from the block's own target bits.
    pub fn meets_target(&self) -> bool {
        Target::from_bits(self.header.target_bits).is_met_by(&self.proof.hash)
    }

    /// Validate hash integrity and Proof-of-Work. (Does NOT validate chain linkage.)
    pub fn is_valid(&self) -> bool {
        self.has_consistent_hash() && self.meets_target()
    }
}
