//! Per-sweep progress accounting.

use hostsweep_common::{HostStatus, ProbeResult};
use tokio::sync::Mutex;
use tracing::info;

pub struct ProgressTracker {
    total: usize,
    up: Mutex<usize>,
    down: Mutex<usize>,
    failed: Mutex<usize>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            up: Mutex::new(0),
            down: Mutex::new(0),
            failed: Mutex::new(0),
        }
    }

    pub async fn record(&self, result: &ProbeResult) {
        match result.status {
            HostStatus::Up => *self.up.lock().await += 1,
            HostStatus::Down => *self.down.lock().await += 1,
        }
    }

    pub async fn record_failure(&self) {
        *self.failed.lock().await += 1;
    }

    pub async fn log_summary(&self) {
        let up = *self.up.lock().await;
        let down = *self.down.lock().await;
        let failed = *self.failed.lock().await;
        info!(total = self.total, up, down, failed, "sweep finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    #[tokio::test]
    async fn counts_by_status() {
        let tracker = ProgressTracker::new(3);
        let ts = Utc::now();
        let a = Ipv4Addr::new(10, 0, 0, 1);

        tracker
            .record(&ProbeResult::up(a, Duration::from_millis(1), ts))
            .await;
        tracker.record(&ProbeResult::down(a, ts)).await;
        tracker.record_failure().await;

        assert_eq!(*tracker.up.lock().await, 1);
        assert_eq!(*tracker.down.lock().await, 1);
        assert_eq!(*tracker.failed.lock().await, 1);
    }
}
