use std::io;
use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

use super::{HostLookup, LookupError, ResolverError};

/// [`HostLookup`] over the synchronous `trust-dns` resolver.
pub struct DnsLookup {
    resolver: Resolver,
}

impl DnsLookup {
    /// System configuration with one attempt per query and `timeout` as the
    /// per-query deadline.
    pub fn from_system_conf(timeout: Duration) -> Result<Self, ResolverError> {
        let (config, mut opts) =
            read_system_conf().map_err(|err| ResolverError::init(io::Error::other(err)))?;
        opts.timeout = timeout;
        opts.attempts = 1;
        let resolver = Resolver::new(config, opts).map_err(ResolverError::init)?;
        Ok(Self { resolver })
    }

    pub fn from_resolver(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

impl std::fmt::Debug for DnsLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsLookup").finish_non_exhaustive()
    }
}

impl HostLookup for DnsLookup {
    fn has_mx(&self, host: &str) -> Result<bool, LookupError> {
        match self.resolver.mx_lookup(host) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => absent_or_failed(host, err),
        }
    }

    fn has_address(&self, host: &str) -> Result<bool, LookupError> {
        match self.resolver.lookup_ip(host) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => absent_or_failed(host, err),
        }
    }
}

fn absent_or_failed(host: &str, err: ResolveError) -> Result<bool, LookupError> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => Ok(false),
        ResolveErrorKind::Timeout => Err(LookupError::timeout(host)),
        _ => Err(LookupError::failed(host, err)),
    }
}
