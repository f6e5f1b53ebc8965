//! Target parser - expands a target specification into IPv4 addresses.
//!
//! Supported forms, tried in this order:
//! - CIDR: "192.168.1.0/24" (usable hosts, ascending)
//! - range: "192.168.1.10-192.168.1.50" (inclusive, ascending)
//! - single address: "192.168.1.55"
//!
//! Parsing is pure: no network access, no side effects. The produced list
//! is ordered and deduplicated by construction, and is never empty on
//! success.

use hostsweep_common::{SweepError, SweepResult};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Parse a target specification into an ordered address list.
pub fn parse_targets(text: &str) -> SweepResult<Vec<Ipv4Addr>> {
    let spec = text.trim();
    if spec.is_empty() {
        return Err(invalid(text, "empty input"));
    }

    if spec.contains('/') {
        return expand_cidr(spec);
    }
    if spec.contains('-') {
        return expand_range(spec);
    }

    let addr: Ipv4Addr = spec
        .parse()
        .map_err(|_| invalid(spec, "not a valid IPv4 address"))?;
    Ok(vec![addr])
}

fn invalid(input: &str, reason: &str) -> SweepError {
    SweepError::InvalidSpec {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Usable hosts of the block, ascending. /31 and /32 have no usable hosts
/// and collapse to a single element: the network address itself.
fn expand_cidr(spec: &str) -> SweepResult<Vec<Ipv4Addr>> {
    let net: Ipv4Net = spec
        .parse()
        .map_err(|_| invalid(spec, "not a valid IPv4 CIDR block"))?;
    // host bits are tolerated: "192.168.1.5/24" means 192.168.1.0/24
    let net = net.trunc();

    if net.prefix_len() >= 31 {
        return Ok(vec![net.network()]);
    }

    let first = u32::from(net.network()) + 1;
    let last = u32::from(net.broadcast()) - 1;
    Ok((first..=last).map(Ipv4Addr::from).collect())
}

/// Inclusive range split on the first '-'. Both endpoints must parse and
/// the end must not precede the start.
fn expand_range(spec: &str) -> SweepResult<Vec<Ipv4Addr>> {
    let Some((start_text, end_text)) = spec.split_once('-') else {
        return Err(invalid(spec, "not a valid address range"));
    };

    let start: Ipv4Addr = start_text
        .trim()
        .parse()
        .map_err(|_| invalid(spec, "invalid range start address"))?;
    let end: Ipv4Addr = end_text
        .trim()
        .parse()
        .map_err(|_| invalid(spec, "invalid range end address"))?;

    if u32::from(end) < u32::from(start) {
        return Err(invalid(spec, "end precedes start"));
    }

    Ok((u32::from(start)..=u32::from(end))
        .map(Ipv4Addr::from)
        .collect())
}
