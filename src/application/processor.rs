use crate::application::registry::LoanRegistry;
use crate::error::{LoanError, Result};
use crate::interfaces::csv::ledger_reader::{EntryType, LedgerEntry};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 1024;

/// Counts of ledger entries handled by the workers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReport {
    pub applied: usize,
    pub rejected: usize,
}

/// Replays ledger entries against a shared registry on a pool of tokio
/// workers.
///
/// Entries are routed by loan id, so every entry for one loan is handled by
/// the same worker in submission order while different loans proceed in
/// parallel. Entries without an id all go to the first worker.
pub struct LedgerProcessor {
    senders: Vec<mpsc::Sender<LedgerEntry>>,
    workers: Vec<JoinHandle<LedgerReport>>,
}

impl LedgerProcessor {
    /// Spawns `shards` workers (at least one). Must be called inside a tokio
    /// runtime.
    pub fn new(registry: Arc<LoanRegistry>, shards: usize) -> Self {
        let shards = shards.max(1);
        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);

        for shard in 0..shards {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            senders.push(tx);
            workers.push(tokio::spawn(run_worker(shard, Arc::clone(&registry), rx)));
        }

        Self { senders, workers }
    }

    pub async fn submit(&self, entry: LedgerEntry) -> Result<()> {
        let shard = self.shard_for(&entry);
        self.senders[shard]
            .send(entry)
            .await
            .map_err(|_| LoanError::WorkerStopped)
    }

    /// Closes the queues and waits for every worker to drain.
    pub async fn finish(self) -> Result<LedgerReport> {
        drop(self.senders);

        let mut report = LedgerReport::default();
        for worker in self.workers {
            let shard_report = worker.await?;
            report.applied += shard_report.applied;
            report.rejected += shard_report.rejected;
        }
        Ok(report)
    }

    fn shard_for(&self, entry: &LedgerEntry) -> usize {
        entry.loan.as_ref().map_or(0, |id| {
            let mut hasher = DefaultHasher::new();
            id.hash(&mut hasher);
            (hasher.finish() % self.senders.len() as u64) as usize
        })
    }
}

async fn run_worker(
    shard: usize,
    registry: Arc<LoanRegistry>,
    mut rx: mpsc::Receiver<LedgerEntry>,
) -> LedgerReport {
    let mut report = LedgerReport::default();
    while let Some(entry) = rx.recv().await {
        match apply_entry(&registry, &entry) {
            Ok(()) => {
                debug!(shard, loan = ?entry.loan, kind = ?entry.r#type, "Applied ledger entry");
                report.applied += 1;
            }
            Err(e) => {
                warn!(shard, loan = ?entry.loan, error = %e, "Error processing ledger entry");
                report.rejected += 1;
            }
        }
    }
    report
}

fn apply_entry(registry: &LoanRegistry, entry: &LedgerEntry) -> Result<()> {
    match entry.r#type {
        EntryType::Open => {
            registry.create(entry.loan_options()?)?;
        }
        EntryType::Pay => {
            let (id, amount) = entry.payment()?;
            registry.apply_payment(id.as_str(), amount)?;
        }
    }
    Ok(())
}
