use std::sync::mpsc::{Receiver, TryRecvError};

use super::MAX_NONCE;
use super::block::{Block, BlockHash, BlockHeader, HASH_LEN};

/// Signal posted by the chain to make a miner abandon its current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preempt;

/// Acceptance threshold `2^(256 - zero_bits)`; a hash is valid iff it is
/// strictly below it when read as a 256-bit big-endian integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    zero_bits: u32,
}

impl Target {
    /// Only the integer floor of `target_bits` is used.
    pub fn from_bits(target_bits: f64) -> Self {
        let zero_bits = if target_bits.is_nan() || target_bits <= 0.0 {
            0
        } else {
            target_bits.floor().min(256.0) as u32
        };
        Self { zero_bits }
    }

    pub fn zero_bits(&self) -> u32 {
        self.zero_bits
    }

    /// Threshold as 32 big-endian bytes, or `None` when it is `2^256`
    /// (every hash qualifies).
    pub fn threshold(&self) -> Option<BlockHash> {
        if self.zero_bits == 0 {
            return None;
        }
        let shift = 256 - self.zero_bits as usize;
        let mut bytes = [0u8; HASH_LEN];
        bytes[HASH_LEN - 1 - shift / 8] = 1 << (shift % 8);
        Some(bytes)
    }

    pub fn is_met_by(&self, hash: &BlockHash) -> bool {
        match self.threshold() {
            // Lexicographic order on big-endian bytes is numeric order.
            Some(threshold) => hash < &threshold,
            None => true,
        }
    }
}

/// How a nonce search ended.
#[derive(Debug)]
pub enum SearchOutcome {
    Solved(Block),
    Preempted,
}

/// Search nonces from 0 upward for a hash below the header's target.
///
/// The preemption channel is polled before every hash; a pending signal
/// (or a closed channel) ends the search. Running out of nonces is reported
/// the same way.
pub fn search(header: BlockHeader, preempt: &Receiver<Preempt>) -> SearchOutcome {
    search_up_to(header, preempt, MAX_NONCE)
}

fn search_up_to(header: BlockHeader, preempt: &Receiver<Preempt>, ceiling: u64) -> SearchOutcome {
    let target = Target::from_bits(header.target_bits);
    let mut nonce = 0u64;
    while nonce != ceiling {
        match preempt.try_recv() {
            Ok(Preempt) | Err(TryRecvError::Disconnected) => return SearchOutcome::Preempted,
            Err(TryRecvError::Empty) => {}
        }
        let hash = header.compute_hash(nonce);
        if target.is_met_by(&hash) {
            return SearchOutcome::Solved(Block::sealed(header, nonce, hash));
        }
        nonce += 1;
    }
    SearchOutcome::Preempted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;

    fn header(target_bits: f64) -> BlockHeader {
        BlockHeader {
            coinbase: 7,
            timestamp: 1_700_000_000,
            payload: b"candidate".to_vec(),
            previous_hash: vec![0x11; 32],
            target_bits,
        }
    }

    #[test]
    fn threshold_is_single_bit_at_256_minus_bits() {
        let mut expected = [0u8; 32];
        expected[0] = 0x01;
        assert_eq!(Target::from_bits(8.0).threshold(), Some(expected));

        let mut expected = [0u8; 32];
        expected[0] = 0x80;
        assert_eq!(Target::from_bits(1.0).threshold(), Some(expected));

        let mut expected = [0u8; 32];
        expected[31] = 0x01;
        assert_eq!(Target::from_bits(256.0).threshold(), Some(expected));

        let mut expected = [0u8; 32];
        expected[2] = 0x10;
        assert_eq!(Target::from_bits(20.0).threshold(), Some(expected));
    }

    #[test]
    fn fractional_bits_are_floored() {
        assert_eq!(Target::from_bits(8.9), Target::from_bits(8.0));
        assert_eq!(Target::from_bits(19.99).zero_bits(), 19);
        assert_eq!(Target::from_bits(-3.0).zero_bits(), 0);
    }

    #[test]
    fn comparison_is_strict() {
        let target = Target::from_bits(8.0);
        let mut at_threshold = [0u8; 32];
        at_threshold[0] = 0x01;
        assert!(!target.is_met_by(&at_threshold));

        let mut just_below = [0xffu8; 32];
        just_below[0] = 0x00;
        assert!(target.is_met_by(&just_below));
    }

    #[test]
    fn zero_bits_accept_everything() {
        assert!(Target::from_bits(0.0).is_met_by(&[0xff; 32]));
        assert!(Target::from_bits(0.7).is_met_by(&[0xff; 32]));
    }

    #[test]
    fn search_finds_hash_below_target() {
        let (_tx, rx) = sync_channel(1);
        let h = header(8.0);
        let block = match search(h.clone(), &rx) {
            SearchOutcome::Solved(b) => b,
            SearchOutcome::Preempted => panic!("expected a solution"),
        };
        assert_eq!(block.proof.hash[0], 0);
        assert_eq!(block.proof.hash, h.compute_hash(block.proof.nonce));
        assert!(block.is_valid());
        // Every smaller nonce misses the target.
        let target = Target::from_bits(8.0);
        assert!((0..block.proof.nonce).all(|n| !target.is_met_by(&h.compute_hash(n))));
    }

    #[test]
    fn pending_signal_preempts_before_hashing() {
        let (tx, rx) = sync_channel(1);
        tx.try_send(Preempt).expect("empty slot");
        assert!(matches!(search(header(255.0), &rx), SearchOutcome::Preempted));
        // The signal was consumed by the search.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_preempts() {
        let (tx, rx) = sync_channel::<Preempt>(1);
        drop(tx);
        assert!(matches!(search(header(255.0), &rx), SearchOutcome::Preempted));
    }

    #[test]
    fn exhausted_nonces_report_preempted() {
        let (_tx, rx) = sync_channel(1);
        assert!(matches!(
            search_up_to(header(256.0), &rx, 16),
            SearchOutcome::Preempted
        ));
    }
}
