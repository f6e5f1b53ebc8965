//! Traits at the engine's seams.
//!
//! The probe pipeline is assembled from three swappable capabilities: a
//! primary reachability check, a connection-oriented fallback, and a
//! best-effort name resolver. `Prober` is the whole per-address sequence,
//! `Storage` the persistence boundary.

use crate::error::SweepResult;
use crate::types::{ProbeResult, ScanBatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::net::Ipv4Addr;
use std::time::Duration;

/// A full per-address probe sequence. Implementations never fail on
/// ordinary unreachability; an `Err` means the probe could not be issued
/// at all.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one address. `batch_ts` is the batch's shared timestamp and is
    /// stamped onto the result verbatim.
    async fn probe(&self, addr: Ipv4Addr, batch_ts: DateTime<Utc>) -> SweepResult<ProbeResult>;

    /// Prober name/identifier
    fn name(&self) -> &str;
}

/// Primary reachability capability: did the host answer, and how fast.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    /// `Ok(Some(elapsed))` — host answered within `timeout`.
    /// `Ok(None)` — no answer within the bound (inconclusive, not an error).
    /// `Err(_)` — the check itself could not be issued.
    async fn check(&self, addr: Ipv4Addr, timeout: Duration) -> SweepResult<Option<Duration>>;
}

/// Connection-oriented secondary check, tried port by port in the given
/// order. Reports only whether any port accepted.
#[async_trait]
pub trait FallbackCheck: Send + Sync {
    async fn check(&self, addr: Ipv4Addr, ports: &[u16], timeout: Duration) -> bool;
}

/// Best-effort reverse name lookup. Failures and timeouts collapse to
/// `None`; this capability never escalates.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn reverse(&self, addr: Ipv4Addr, timeout: Duration) -> Option<String>;
}

/// Persistence backend for scan sessions and their result rows.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a scan session bracket; returns its row id.
    async fn begin_scan(
        &self,
        started_at: DateTime<Utc>,
        range_text: &str,
        cycle_seconds: u64,
    ) -> SweepResult<i64>;

    /// Close a scan session bracket.
    async fn finish_scan(&self, scan_id: i64, ended_at: DateTime<Utc>) -> SweepResult<()>;

    /// Bulk-append every result row of a batch to its session.
    async fn save_batch(&self, scan_id: i64, batch: &ScanBatch) -> SweepResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProber;

    #[async_trait]
    impl Prober for MockProber {
        async fn probe(
            &self,
            addr: Ipv4Addr,
            batch_ts: DateTime<Utc>,
        ) -> SweepResult<ProbeResult> {
            Ok(ProbeResult::up(addr, Duration::from_millis(1), batch_ts))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn prober_trait_object() {
        let prober: &dyn Prober = &MockProber;
        let ts = Utc::now();
        let result = prober.probe(Ipv4Addr::new(127, 0, 0, 1), ts).await.unwrap();
        assert!(result.status.is_up());
        assert_eq!(result.timestamp, ts);
    }
}
