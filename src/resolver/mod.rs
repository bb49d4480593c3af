//! Host resolution: is a host plausibly a mail destination?
//!
//! A host resolves when it has an MX record or, failing that, an A/AAAA
//! record. DNS access goes through the [`HostLookup`] seam; the system
//! implementation lives behind the `with-dns` feature.

#[cfg(feature = "with-dns")]
mod dns;
mod error;
mod types;

#[cfg(feature = "with-dns")]
pub use dns::DnsLookup;
pub use error::{LookupError, ResolverError};
pub use types::{RecordKind, Resolution, ResolverOptions, UnresolvableCause};

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use phf::phf_set;
use tracing::{debug, warn};

use crate::cancel::{CancelToken, Cancelled};

static SENTINEL_HOSTS: phf::Set<&'static str> = phf_set! {
    "localhost",
    "example.com",
};

// intervalle de vérification du jeton pendant une requête en vol
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// Minimal DNS surface needed by [`HostResolver`].
///
/// Both queries answer `Ok(false)` when the name exists but carries no such
/// record, or does not exist at all. Queries run on a worker thread so that
/// a cancelled caller does not wait for them.
pub trait HostLookup: Send + Sync + 'static {
    fn has_mx(&self, host: &str) -> Result<bool, LookupError>;
    fn has_address(&self, host: &str) -> Result<bool, LookupError>;
}

impl<L: HostLookup + ?Sized> HostLookup for Arc<L> {
    fn has_mx(&self, host: &str) -> Result<bool, LookupError> {
        (**self).has_mx(host)
    }

    fn has_address(&self, host: &str) -> Result<bool, LookupError> {
        (**self).has_address(host)
    }
}

pub fn is_sentinel(host: &str) -> bool {
    SENTINEL_HOSTS.contains(host)
}

#[derive(Clone, Copy)]
enum Query {
    Mx,
    Address,
}

#[derive(Debug)]
pub struct HostResolver<L> {
    lookup: Arc<L>,
    options: ResolverOptions,
}

impl<L> Clone for HostResolver<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            options: self.options.clone(),
        }
    }
}

#[cfg(feature = "with-dns")]
impl HostResolver<DnsLookup> {
    /// Resolver backed by the system configuration (`/etc/resolv.conf`).
    pub fn system(options: ResolverOptions) -> Result<Self, ResolverError> {
        let lookup = DnsLookup::from_system_conf(options.timeout)?;
        Ok(Self::new(lookup, options))
    }
}

impl<L: HostLookup> HostResolver<L> {
    pub fn new(lookup: L, options: ResolverOptions) -> Self {
        Self {
            lookup: Arc::new(lookup),
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// MX first, then A/AAAA. Lookup failures map to
    /// [`UnresolvableCause::LookupFailed`]; only cancellation is an error.
    ///
    /// Cancelling `cancel` aborts the query in flight: the call returns
    /// within a few milliseconds and the abandoned answer is dropped.
    pub fn resolve(&self, host: &str, cancel: &CancelToken) -> Result<Resolution, ResolverError> {
        if self.options.sentinels && is_sentinel(host) {
            return Ok(Resolution::Unresolvable(UnresolvableCause::Sentinel));
        }
        let ascii = match idna::domain_to_ascii(host) {
            Ok(ascii) if !ascii.is_empty() => ascii,
            _ => return Ok(Resolution::Unresolvable(UnresolvableCause::InvalidName)),
        };

        let mx = self.query(&ascii, Query::Mx, cancel)?;
        if let Ok(true) = mx {
            return Ok(Resolution::Resolvable(RecordKind::Mx));
        }

        let address = self.query(&ascii, Query::Address, cancel)?;
        if let Ok(true) = address {
            return Ok(Resolution::Resolvable(RecordKind::Address));
        }

        let failure = match (mx, address) {
            (Err(err), _) | (_, Err(err)) => err,
            _ => return Ok(Resolution::Unresolvable(UnresolvableCause::NoRecords)),
        };
        debug!(host = %ascii, error = %failure, "lookup failed, host treated as unresolvable");
        Ok(Resolution::Unresolvable(UnresolvableCause::LookupFailed(
            failure.to_string(),
        )))
    }
}

impl<L: HostLookup> HostResolver<L> {
    fn query(
        &self,
        host: &str,
        query: Query,
        cancel: &CancelToken,
    ) -> Result<Result<bool, LookupError>, Cancelled> {
        cancel.check()?;
        let (tx, rx) = mpsc::sync_channel(1);
        let lookup = Arc::clone(&self.lookup);
        let name = host.to_string();
        let spawned = thread::Builder::new()
            .name("mailfix-dns".into())
            .spawn(move || {
                let answer = match query {
                    Query::Mx => lookup.has_mx(&name),
                    Query::Address => lookup.has_address(&name),
                };
                // l'appelant a pu abandonner entre-temps
                let _ = tx.send(answer);
            });
        if let Err(err) = spawned {
            warn!(host, error = %err, "cannot spawn DNS worker, querying inline");
            let answer = match query {
                Query::Mx => self.lookup.has_mx(host),
                Query::Address => self.lookup.has_address(host),
            };
            cancel.check()?;
            return Ok(answer);
        }

        loop {
            match rx.recv_timeout(CANCEL_POLL) {
                Ok(answer) => {
                    cancel.check()?;
                    return Ok(answer);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if cancel.is_cancelled() {
                        warn!(host, "lookup aborted by caller");
                        return Err(Cancelled);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Ok(Err(LookupError::failed(host, "DNS worker exited")));
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests;
