use log::{error, info};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::blockchain::{Blockchain, ChainSnapshot};
use crate::config::NetworkConfig;
use crate::miner::Miner;

/// Owns the shared chain and the miner threads working on it.
pub struct Network {
    chain: Arc<Blockchain>,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Network {
    /// Build the chain from `config` and start its initial miners.
    pub fn launch(config: NetworkConfig) -> io::Result<Self> {
        let chain = Blockchain::new(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let network = Self {
            chain: Arc::new(chain),
            stop: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
        };
        for _ in 0..network.chain.config().miner_count {
            network.add_miner()?;
        }
        info!(
            "network launched with {} miners at difficulty {}",
            network.chain.config().miner_count,
            network.chain.difficulty()
        );
        Ok(network)
    }

    /// Register a new miner on the chain and start its worker thread.
    pub fn add_miner(&self) -> io::Result<u64> {
        let (id, preempt) = self.chain.register_miner();
        let miner = Miner::new(id, Arc::clone(&self.chain), preempt, Arc::clone(&self.stop));
        let handle = miner.spawn().inspect_err(|e| {
            error!("failed to start miner {id}: {e}");
        })?;
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
        info!("miner {id} joined the network");
        Ok(id)
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        self.chain.snapshot()
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    /// Stop every miner and wait for its thread. Later calls do nothing.
    pub fn shutdown(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        self.chain.preempt_all();
        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let count = workers.len();
        for handle in workers {
            if handle.join().is_err() {
                error!("a miner thread panicked");
            }
        }
        info!(
            "network stopped: {count} miners, {} blocks, {} retargets, {} rejected submissions",
            self.chain.len(),
            self.chain.retargets().len(),
            self.chain.rejected_count()
        );
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        self.shutdown();
    }
}
