use log::{debug, info};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use crate::blockchain::pow::{self, Preempt, SearchOutcome};
use crate::blockchain::Blockchain;

/// A mining worker: repeatedly builds a candidate on the current tip,
/// searches for a nonce and submits what it finds.
pub struct Miner {
    id: u64,
    chain: Arc<Blockchain>,
    preempt: Receiver<Preempt>,
    stop: Arc<AtomicBool>,
}

impl Miner {
    pub fn new(
        id: u64,
        chain: Arc<Blockchain>,
        preempt: Receiver<Preempt>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            chain,
            preempt,
            stop,
        }
    }

    /// Run the mining loop on a dedicated OS thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("miner-{}", self.id))
            .spawn(move || self.run())
    }

    /// Mine until the stop flag is raised. Shutdown sets the flag before it
    /// signals, so a drained signal can never hide a stop request.
    pub fn run(self) {
        info!("miner {} started", self.id);
        let mut attempt: u64 = 0;
        loop {
            while self.preempt.try_recv().is_ok() {}
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let header = self.chain.assemble_candidate(self.id, self.payload(attempt));
            match pow::search(header, &self.preempt) {
                SearchOutcome::Solved(block) => {
                    if let Err(reason) = self.chain.admit(block) {
                        debug!("miner {} block rejected: {}", self.id, reason);
                    }
                }
                SearchOutcome::Preempted => {}
            }
            attempt = attempt.wrapping_add(1);
        }
        info!("miner {} stopped", self.id);
    }

    /// Per-attempt payload so no two attempts hash the same header.
    fn payload(&self, attempt: u64) -> Vec<u8> {
        format!("simulated block data: miner {} attempt {}", self.id, attempt).into_bytes()
    }
}
