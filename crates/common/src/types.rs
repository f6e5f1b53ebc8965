//! Core data types for the hostsweep engine.
//!
//! Result records are immutable once produced: a `ProbeResult` is built by
//! one probe task, appended to its batch exactly once, and never touched
//! again. Constructors encode the field invariants (an RTT exists only for
//! a primary-path UP, fallback UPs carry none) so callers cannot assemble
//! contradictory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;
use uuid::Uuid;

/// Reachability verdict for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostStatus {
    Up,
    Down,
}

impl HostStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Up => "UP",
            HostStatus::Down => "DOWN",
        }
    }

    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, HostStatus::Up)
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which check produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeMethod {
    /// The first-attempted reachability probe (echo-style).
    Primary,
    /// The connection-oriented secondary probe, attempted only after the
    /// primary check failed.
    Fallback,
}

impl ProbeMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProbeMethod::Primary => "primary",
            ProbeMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of probing a single address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub addr: Ipv4Addr,
    pub status: HostStatus,
    /// Elapsed time of the successful primary probe. Absent for DOWN hosts
    /// and for hosts detected via the fallback check (a TCP connect after a
    /// failed echo is not a latency signal).
    pub rtt: Option<Duration>,
    /// Reverse-DNS name, present only for UP hosts when resolution was
    /// requested and succeeded.
    pub hostname: Option<String>,
    pub method: ProbeMethod,
    /// The batch's shared "as of" instant, not this task's completion time.
    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// UP via the primary check, with its measured round-trip time.
    #[must_use]
    pub fn up(addr: Ipv4Addr, rtt: Duration, timestamp: DateTime<Utc>) -> Self {
        Self {
            addr,
            status: HostStatus::Up,
            rtt: Some(rtt),
            hostname: None,
            method: ProbeMethod::Primary,
            timestamp,
        }
    }

    /// UP via the fallback check. No RTT is recorded on this path.
    #[must_use]
    pub fn up_via_fallback(addr: Ipv4Addr, timestamp: DateTime<Utc>) -> Self {
        Self {
            addr,
            status: HostStatus::Up,
            rtt: None,
            hostname: None,
            method: ProbeMethod::Fallback,
            timestamp,
        }
    }

    /// Neither check reached the host.
    #[must_use]
    pub fn down(addr: Ipv4Addr, timestamp: DateTime<Utc>) -> Self {
        Self {
            addr,
            status: HostStatus::Down,
            rtt: None,
            hostname: None,
            method: ProbeMethod::Primary,
            timestamp,
        }
    }

    /// Builder: attach a resolved hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: String) -> Self {
        self.hostname = Some(hostname);
        self
    }

    /// RTT in milliseconds, the unit used for display and persistence.
    #[must_use]
    pub fn rtt_millis(&self) -> Option<f64> {
        self.rtt.map(|d| d.as_secs_f64() * 1000.0)
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.addr, self.status, self.method)
    }
}

/// A probe that could not even be issued for its address. Kept apart from
/// `ProbeResult` so an environment problem never masquerades as a down host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub addr: Ipv4Addr,
    pub reason: String,
}

/// Per-batch scan settings. Immutable for the lifetime of the batch; every
/// timeout is threaded explicitly into the operation that uses it, never
/// installed as a process-wide default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bound applied to each probe sub-step (primary, each fallback port,
    /// reverse lookup).
    pub timeout: Duration,
    /// Upper bound on concurrent probe workers.
    pub max_workers: usize,
    /// Reverse-resolve hostnames for UP hosts.
    pub resolve_names: bool,
    /// Try TCP connects when the primary check fails.
    pub tcp_fallback: bool,
    /// Ports attempted by the fallback check, in order.
    pub fallback_ports: Vec<u16>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(800),
            max_workers: 64,
            resolve_names: false,
            tcp_fallback: false,
            fallback_ports: vec![445, 3389, 80],
        }
    }
}

impl ScanConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Worker budgets below 1 are clamped up.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    #[must_use]
    pub fn with_resolve_names(mut self, resolve_names: bool) -> Self {
        self.resolve_names = resolve_names;
        self
    }

    #[must_use]
    pub fn with_tcp_fallback(mut self, tcp_fallback: bool) -> Self {
        self.tcp_fallback = tcp_fallback;
        self
    }

    #[must_use]
    pub fn with_fallback_ports(mut self, fallback_ports: Vec<u16>) -> Self {
        self.fallback_ports = fallback_ports;
        self
    }

    /// Pool size actually used for a batch: never more workers than
    /// addresses, never fewer than one.
    #[must_use]
    pub fn effective_workers(&self, targets: usize) -> usize {
        self.max_workers.min(targets).max(1)
    }
}

/// One complete sweep over a fixed address list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanBatch {
    pub id: Uuid,
    pub config: ScanConfig,
    /// Captured once, before any probe in the batch begins; every result
    /// carries this same instant.
    pub started_at: DateTime<Utc>,
    pub results: Vec<ProbeResult>,
    pub failures: Vec<ProbeFailure>,
}

impl ScanBatch {
    #[must_use]
    pub fn new(config: ScanConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            started_at,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn up_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_up()).count()
    }

    #[must_use]
    pub fn down_count(&self) -> usize {
        self.results.len() - self.up_count()
    }

    /// Every input address accounted for, either as a result or as an
    /// infrastructure failure.
    #[must_use]
    pub fn is_complete(&self, expected: usize) -> bool {
        self.results.len() + self.failures.len() == expected
    }
}
