//! The per-address probe sequence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostsweep_common::{
    FallbackCheck, NameResolver, ProbeResult, Prober, ReachabilityCheck, ScanConfig, SweepResult,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::trace;

use crate::dns::DnsReverse;
use crate::ping::SystemPing;
use crate::tcp::TcpConnectFallback;

/// Runs the layered sequence for one address: primary echo check, optional
/// TCP fallback, optional reverse DNS. Each sub-step is bounded by the
/// configured timeout. Holds no mutable state; one instance serves every
/// worker of a batch.
pub struct HostProber {
    config: ScanConfig,
    primary: Arc<dyn ReachabilityCheck>,
    fallback: Arc<dyn FallbackCheck>,
    resolver: Arc<dyn NameResolver>,
}

impl HostProber {
    pub fn new(config: ScanConfig) -> Self {
        let resolver = Arc::new(DnsReverse::new(config.timeout));
        Self {
            config,
            primary: Arc::new(SystemPing::new()),
            fallback: Arc::new(TcpConnectFallback::new()),
            resolver,
        }
    }

    /// Swap the primary check (e.g. a raw-socket prober on capable hosts).
    #[must_use]
    pub fn with_primary(mut self, primary: Arc<dyn ReachabilityCheck>) -> Self {
        self.primary = primary;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackCheck>) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

#[async_trait]
impl Prober for HostProber {
    async fn probe(&self, addr: Ipv4Addr, batch_ts: DateTime<Utc>) -> SweepResult<ProbeResult> {
        let timeout = self.config.timeout;

        let mut result = match self.primary.check(addr, timeout).await? {
            Some(rtt) => ProbeResult::up(addr, rtt, batch_ts),
            None => {
                let via_fallback = self.config.tcp_fallback
                    && self
                        .fallback
                        .check(addr, &self.config.fallback_ports, timeout)
                        .await;
                if via_fallback {
                    ProbeResult::up_via_fallback(addr, batch_ts)
                } else {
                    ProbeResult::down(addr, batch_ts)
                }
            }
        };

        if result.status.is_up() && self.config.resolve_names {
            if let Some(name) = self.resolver.reverse(addr, timeout).await {
                result = result.with_hostname(name);
            }
        }

        trace!(%result, "probe finished");
        Ok(result)
    }

    fn name(&self) -> &str {
        "host prober"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsweep_common::{HostStatus, ProbeMethod, SweepError};
    use std::time::Duration;

    struct Answers(Duration);

    #[async_trait]
    impl ReachabilityCheck for Answers {
        async fn check(&self, _: Ipv4Addr, _: Duration) -> SweepResult<Option<Duration>> {
            Ok(Some(self.0))
        }
    }

    struct Silent;

    #[async_trait]
    impl ReachabilityCheck for Silent {
        async fn check(&self, _: Ipv4Addr, _: Duration) -> SweepResult<Option<Duration>> {
            Ok(None)
        }
    }

    struct Broken;

    #[async_trait]
    impl ReachabilityCheck for Broken {
        async fn check(&self, addr: Ipv4Addr, _: Duration) -> SweepResult<Option<Duration>> {
            Err(SweepError::ProbeInfrastructure {
                addr,
                reason: "ping unavailable".to_string(),
            })
        }
    }

    struct PortOpen;

    #[async_trait]
    impl FallbackCheck for PortOpen {
        async fn check(&self, _: Ipv4Addr, _: &[u16], _: Duration) -> bool {
            true
        }
    }

    struct FixedName(&'static str);

    #[async_trait]
    impl NameResolver for FixedName {
        async fn reverse(&self, _: Ipv4Addr, _: Duration) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    struct NoName;

    #[async_trait]
    impl NameResolver for NoName {
        async fn reverse(&self, _: Ipv4Addr, _: Duration) -> Option<String> {
            None
        }
    }

    fn addr() -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, 9)
    }

    fn prober(config: ScanConfig) -> HostProber {
        HostProber::new(config).with_resolver(Arc::new(NoName))
    }

    #[tokio::test]
    async fn primary_up_carries_rtt() {
        let p = prober(ScanConfig::default())
            .with_primary(Arc::new(Answers(Duration::from_millis(7))));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Up);
        assert_eq!(result.method, ProbeMethod::Primary);
        assert_eq!(result.rtt, Some(Duration::from_millis(7)));
        assert!(result.hostname.is_none());
    }

    #[tokio::test]
    async fn silent_host_is_down_without_fallback() {
        let p = prober(ScanConfig::default()).with_primary(Arc::new(Silent));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Down);
        assert_eq!(result.method, ProbeMethod::Primary);
        assert!(result.rtt.is_none());
    }

    #[tokio::test]
    async fn fallback_up_records_method_and_no_rtt() {
        let p = prober(ScanConfig::default().with_tcp_fallback(true))
            .with_primary(Arc::new(Silent))
            .with_fallback(Arc::new(PortOpen));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Up);
        assert_eq!(result.method, ProbeMethod::Fallback);
        assert!(result.rtt.is_none());
    }

    #[tokio::test]
    async fn fallback_is_not_attempted_when_disabled() {
        // an open port must not matter while the fallback flag is off
        let p = prober(ScanConfig::default())
            .with_primary(Arc::new(Silent))
            .with_fallback(Arc::new(PortOpen));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Down);
    }

    #[tokio::test]
    async fn hostname_requires_resolution_flag() {
        let p = prober(ScanConfig::default())
            .with_primary(Arc::new(Answers(Duration::from_millis(1))))
            .with_resolver(Arc::new(FixedName("printer.lan")));
        let result = p.probe(addr(), Utc::now()).await.unwrap();
        assert!(result.hostname.is_none());

        let p = prober(ScanConfig::default().with_resolve_names(true))
            .with_primary(Arc::new(Answers(Duration::from_millis(1))))
            .with_resolver(Arc::new(FixedName("printer.lan")));
        let result = p.probe(addr(), Utc::now()).await.unwrap();
        assert_eq!(result.hostname.as_deref(), Some("printer.lan"));
    }

    #[tokio::test]
    async fn down_host_is_never_resolved() {
        let p = prober(ScanConfig::default().with_resolve_names(true))
            .with_primary(Arc::new(Silent))
            .with_resolver(Arc::new(FixedName("ghost.lan")));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Down);
        assert!(result.hostname.is_none());
    }

    #[tokio::test]
    async fn failed_resolution_leaves_hostname_absent() {
        let p = prober(ScanConfig::default().with_resolve_names(true))
            .with_primary(Arc::new(Answers(Duration::from_millis(1))));
        let result = p.probe(addr(), Utc::now()).await.unwrap();

        assert_eq!(result.status, HostStatus::Up);
        assert!(result.hostname.is_none());
    }

    #[tokio::test]
    async fn infrastructure_failure_propagates() {
        let p = prober(ScanConfig::default()).with_primary(Arc::new(Broken));
        let err = p.probe(addr(), Utc::now()).await.unwrap_err();

        assert!(matches!(err, SweepError::ProbeInfrastructure { .. }));
    }

    #[tokio::test]
    async fn batch_timestamp_is_stamped_verbatim() {
        let ts = Utc::now();
        let p = prober(ScanConfig::default())
            .with_primary(Arc::new(Answers(Duration::from_millis(1))));
        let result = p.probe(addr(), ts).await.unwrap();
        assert_eq!(result.timestamp, ts);
    }
}
