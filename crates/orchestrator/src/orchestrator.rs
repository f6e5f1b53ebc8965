//! Fan-out/fan-in sweep execution over a bounded worker pool.

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::Utc;
use hostsweep_common::{
    ProbeFailure, ProbeResult, Prober, ScanBatch, ScanConfig, SweepError, SweepResult,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::debug;

use crate::progress::ProgressTracker;

/// Dispatches one probe task per address to a fixed pool of workers and
/// collects every outcome before returning. Tasks are independent: no
/// ordering or priority between addresses, and no task's outcome affects
/// another's.
pub struct ScanOrchestrator {
    prober: Arc<dyn Prober>,
    config: ScanConfig,
    live: Option<UnboundedSender<ProbeResult>>,
}

impl ScanOrchestrator {
    pub fn new(prober: Arc<dyn Prober>, config: ScanConfig) -> Self {
        Self {
            prober,
            config,
            live: None,
        }
    }

    /// Mirror each result into `tx` as it lands, for callers that want live
    /// updates (a UI table, a progress view). The returned batch is
    /// unaffected; a dropped receiver is ignored.
    #[must_use]
    pub fn with_live_results(mut self, tx: UnboundedSender<ProbeResult>) -> Self {
        self.live = Some(tx);
        self
    }

    /// Probe every address and return the complete batch. The call does not
    /// return until each input address is accounted for, either as a result
    /// or as an infrastructure failure.
    pub async fn scan(&self, addresses: &[Ipv4Addr]) -> SweepResult<ScanBatch> {
        // one timestamp for the whole sweep, captured before any probe
        let mut batch = ScanBatch::new(self.config.clone(), Utc::now());
        let started_at = batch.started_at;

        let queue: Arc<Mutex<VecDeque<Ipv4Addr>>> =
            Arc::new(Mutex::new(addresses.iter().copied().collect()));
        let results = Arc::new(Mutex::new(Vec::with_capacity(addresses.len())));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(ProgressTracker::new(addresses.len()));

        let workers = self.config.effective_workers(addresses.len());
        debug!(batch = %batch.id, targets = addresses.len(), workers, "dispatching sweep");

        // Fixed pool: each worker pops from the shared queue until it drains.
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = queue.clone();
            let results = results.clone();
            let failures = failures.clone();
            let progress = progress.clone();
            let prober = self.prober.clone();
            let live = self.live.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let popped = { queue.lock().await.pop_front() };
                    let Some(addr) = popped else { break };

                    match prober.probe(addr, started_at).await {
                        Ok(result) => {
                            progress.record(&result).await;
                            if let Some(tx) = &live {
                                let _ = tx.send(result.clone());
                            }
                            results.lock().await.push(result);
                        }
                        Err(e) => {
                            progress.record_failure().await;
                            failures.lock().await.push(ProbeFailure {
                                addr,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| SweepError::Pool(e.to_string()))?;
        }

        progress.log_summary().await;

        batch.results = std::mem::take(&mut *results.lock().await);
        batch.failures = std::mem::take(&mut *failures.lock().await);
        Ok(batch)
    }
}
