use std::net::{SocketAddr, ToSocketAddrs};

use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::ResolveErrorKind;

use super::SmtpVerifyError;

#[derive(Debug, Clone)]
pub(crate) struct HostCandidate {
    pub host: String,
    pub preference: u16,
    pub addresses: Vec<SocketAddr>,
}

/// MX hosts by ascending preference, or the domain itself (implicit MX).
pub(crate) fn resolve_hosts(
    resolver: &Resolver,
    domain: &str,
    port: u16,
    max_hosts: usize,
) -> Result<Vec<HostCandidate>, SmtpVerifyError> {
    let mut hosts = Vec::new();
    match resolver.mx_lookup(domain) {
        Ok(lookup) => {
            for record in lookup.iter() {
                let host = record.exchange().to_utf8();
                let host = host.trim_end_matches('.').to_ascii_lowercase();
                // MX nul (RFC 7505)
                if host.is_empty() {
                    continue;
                }
                let addresses = resolve_addrs(&host, port);
                if addresses.is_empty() {
                    continue;
                }
                hosts.push(HostCandidate {
                    host,
                    preference: record.preference(),
                    addresses,
                });
            }
        }
        Err(err) => match err.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => {}
            _ => {
                return Err(SmtpVerifyError::MxLookup {
                    domain: domain.to_string(),
                    source: err,
                });
            }
        },
    }

    if hosts.is_empty() {
        let addresses = resolve_addrs(domain, port);
        if addresses.is_empty() {
            return Err(SmtpVerifyError::NoMailHost {
                domain: domain.to_string(),
            });
        }
        hosts.push(HostCandidate {
            host: domain.to_string(),
            preference: 0,
            addresses,
        });
    }

    hosts.sort_by_key(|h| h.preference);
    hosts.truncate(max_hosts.max(1));
    Ok(hosts)
}

fn resolve_addrs(host: &str, port: u16) -> Vec<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map(|iter| iter.collect())
        .unwrap_or_default()
}
