//! Client IP allowlist.
//!
//! # Responsibilities
//! - Parse `allowedIPs` entries (CIDR, bare IP, comma-separated mixes)
//! - Normalize bare addresses to single-host networks
//! - Store IPv4-mapped entries as plain IPv4 networks
//! - Answer whether a client address is inside any configured network
//!
//! # Design Decisions
//! - Invalid entries are skipped, never fatal
//! - Empty allowlist disables the check
//! - Unknown client address matches nothing (fail closed)

use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net};

use crate::filter::log::DecisionLog;

/// A set of allowed client networks.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    networks: Vec<IpNet>,
}

impl Allowlist {
    pub fn new(networks: Vec<IpNet>) -> Self {
        Self { networks }
    }

    /// Parse raw `allowedIPs` strings, skipping entries that are neither a
    /// CIDR nor an address.
    pub fn parse<S: AsRef<str>>(raw: &[S], log: Option<&dyn DecisionLog>) -> Self {
        let mut networks = Vec::new();

        for line in raw {
            for part in line.as_ref().split(',') {
                let entry = part.trim();
                if entry.is_empty() {
                    continue;
                }

                match parse_network(entry) {
                    Some(net) => networks.push(net),
                    None => {
                        crate::observability::metrics::record_invalid_allowlist_entry();
                        if let Some(log) = log {
                            log.invalid_allowlist_entry(entry);
                        }
                    }
                }
            }
        }

        Self { networks }
    }

    /// True when the client may proceed. Always true when no networks are
    /// configured.
    pub fn is_allowed(&self, client: Option<IpAddr>) -> bool {
        if self.networks.is_empty() {
            return true;
        }
        self.contains(client)
    }

    /// True when some configured network contains the client.
    pub fn contains(&self, client: Option<IpAddr>) -> bool {
        let Some(ip) = client.map(|ip| ip.to_canonical()) else {
            return false;
        };
        self.networks.iter().any(|net| net.contains(&ip))
    }

    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Parse one entry as a CIDR, falling back to a bare address widened to a
/// /32 or /128 network.
pub fn parse_network(entry: &str) -> Option<IpNet> {
    let net = match IpNet::from_str(entry) {
        Ok(net) => net,
        Err(_) => IpNet::from(IpAddr::from_str(entry).ok()?),
    };
    Some(unmap_network(net))
}

/// `::ffff:a.b.c.d/n` with `n >= 96` becomes `a.b.c.d/(n - 96)`, so it
/// compares against canonicalized clients.
fn unmap_network(net: IpNet) -> IpNet {
    let IpNet::V6(v6) = net else {
        return net;
    };
    if v6.prefix_len() < 96 {
        return net;
    }
    v6.addr()
        .to_ipv4_mapped()
        .and_then(|v4| Ipv4Net::new(v4, v6.prefix_len() - 96).ok())
        .map_or(net, IpNet::V4)
}

/// Extract the client address from a connection-level remote address.
///
/// A `host:port` or `[v6]:port` value has its port stripped; anything else
/// is parsed whole. Returns `None` when no address can be read.
#[cfg(test)]
pub(crate) fn client_ip_from_remote(remote: &str) -> Option<IpAddr> {
    let host = split_host(remote).unwrap_or(remote);
    IpAddr::from_str(host).ok()
}

#[cfg(test)]
fn split_host(remote: &str) -> Option<&str> {
    if let Some(rest) = remote.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return tail.starts_with(':').then_some(host);
    }

    let (host, port) = remote.split_once(':')?;
    // More than one colon without brackets is a bare IPv6 address.
    if port.contains(':') {
        return None;
    }
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::log::testing::RecordingLog;

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_empty_allowlist_allows_everything() {
        let list = Allowlist::default();
        assert!(list.is_allowed(ip("203.0.113.9")));
        assert!(list.is_allowed(ip("::1")));
        assert!(list.is_allowed(None));
        assert!(list.is_allowed(client_ip_from_remote("not an address")));
    }

    #[test]
    fn test_bare_addresses_normalize_to_host_networks() {
        let v4 = parse_network("192.168.1.10").unwrap();
        assert_eq!(v4.prefix_len(), 32);
        assert!(v4.contains(&"192.168.1.10".parse::<IpAddr>().unwrap()));
        assert!(!v4.contains(&"192.168.1.11".parse::<IpAddr>().unwrap()));

        let v6 = parse_network("2001:db8::1").unwrap();
        assert_eq!(v6.prefix_len(), 128);
        assert!(v6.contains(&"2001:db8::1".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_comma_separated_entries() {
        let list = Allowlist::parse(&["10.0.0.0/8, 192.168.1.10", " ,2001:db8::/32"], None);
        assert_eq!(list.len(), 3);

        assert!(list.is_allowed(ip("10.200.3.4")));
        assert!(list.is_allowed(ip("192.168.1.10")));
        assert!(list.is_allowed(ip("2001:db8:ffff::2")));
        assert!(!list.is_allowed(ip("192.168.1.11")));
    }

    #[test]
    fn test_invalid_entries_are_skipped_and_logged() {
        let log = RecordingLog::default();
        let list = Allowlist::parse(&["10.0.0.0/8, bogus", "300.1.1.1", "10.0.0.0/40"], Some(&log));

        assert_eq!(list.len(), 1);
        assert_eq!(
            log.lines(),
            vec!["invalid bogus", "invalid 300.1.1.1", "invalid 10.0.0.0/40"]
        );
    }

    #[test]
    fn test_unknown_client_fails_closed() {
        let list = Allowlist::parse(&["0.0.0.0/0"], None);
        assert!(!list.is_allowed(None));
        assert!(list.is_allowed(ip("8.8.8.8")));
    }

    #[test]
    fn test_ipv4_mapped_client_matches_ipv4_network() {
        let list = Allowlist::parse(&["10.0.0.0/8"], None);
        assert!(list.is_allowed(ip("::ffff:10.1.1.1")));
    }

    #[test]
    fn test_ipv4_mapped_entries_match_ipv4_clients() {
        let bare = parse_network("::ffff:10.1.1.1").unwrap();
        assert_eq!(bare, "10.1.1.1/32".parse::<IpNet>().unwrap());

        let cidr = parse_network("::ffff:10.0.0.0/104").unwrap();
        assert_eq!(cidr, "10.0.0.0/8".parse::<IpNet>().unwrap());

        let list = Allowlist::parse(&["::ffff:10.1.1.1, ::ffff:192.168.0.0/112"], None);
        assert!(list.is_allowed(ip("10.1.1.1")));
        assert!(list.is_allowed(ip("::ffff:10.1.1.1")));
        assert!(list.is_allowed(ip("192.168.7.7")));
        assert!(!list.is_allowed(ip("10.1.1.2")));

        // Too short a prefix to describe an IPv4 range: left as IPv6.
        assert!(parse_network("::ffff:0.0.0.0/80").unwrap().addr().is_ipv6());
    }

    #[test]
    fn test_client_ip_from_remote() {
        assert_eq!(client_ip_from_remote("10.1.1.1:1234"), ip("10.1.1.1"));
        assert_eq!(client_ip_from_remote("10.1.1.1"), ip("10.1.1.1"));
        assert_eq!(client_ip_from_remote("[2001:db8::1]:443"), ip("2001:db8::1"));
        assert_eq!(client_ip_from_remote("2001:db8::1"), ip("2001:db8::1"));
        assert_eq!(client_ip_from_remote("[2001:db8::1]"), None);
        assert_eq!(client_ip_from_remote("example.com:80"), None);
        assert_eq!(client_ip_from_remote(""), None);
    }
}
