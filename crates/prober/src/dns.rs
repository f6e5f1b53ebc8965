//! Best-effort reverse DNS.

use async_trait::async_trait;
use hostsweep_common::NameResolver;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Floor applied to the lookup bound; resolvers rarely answer faster.
const MIN_LOOKUP_TIMEOUT: Duration = Duration::from_millis(100);

/// Reverse lookups against the system resolver configuration.
///
/// The per-request timeout is fixed on the resolver at construction and
/// every lookup gets its own outer bound. No process-wide resolver state is
/// mutated, so concurrent lookups never observe each other's timeouts.
pub struct DnsReverse {
    resolver: TokioAsyncResolver,
}

impl DnsReverse {
    pub fn new(timeout: Duration) -> Self {
        let bound = timeout.max(MIN_LOOKUP_TIMEOUT);
        let (config, mut opts) = read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
        opts.timeout = bound;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl NameResolver for DnsReverse {
    async fn reverse(&self, addr: Ipv4Addr, timeout: Duration) -> Option<String> {
        let bound = timeout.max(MIN_LOOKUP_TIMEOUT);
        let lookup =
            tokio::time::timeout(bound, self.resolver.reverse_lookup(IpAddr::V4(addr))).await;

        match lookup {
            Ok(Ok(names)) => names
                .iter()
                .next()
                .map(|ptr| ptr.to_utf8().trim_end_matches('.').to_string()),
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "reverse lookup failed");
                None
            }
            Err(_) => {
                debug!(%addr, "reverse lookup timed out");
                None
            }
        }
    }
}
