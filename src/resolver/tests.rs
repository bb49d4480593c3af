use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use super::{
    HostLookup, HostResolver, LookupError, RecordKind, Resolution, ResolverOptions,
    UnresolvableCause,
};
use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Answer {
    pub mx: Result<bool, ()>,
    pub address: Result<bool, ()>,
}

impl Answer {
    pub(crate) const MX: Self = Self {
        mx: Ok(true),
        address: Ok(true),
    };
    pub(crate) const A_ONLY: Self = Self {
        mx: Ok(false),
        address: Ok(true),
    };
    pub(crate) const SERVFAIL: Self = Self {
        mx: Err(()),
        address: Err(()),
    };
}

/// In-memory DNS: unknown names have no records.
#[derive(Default)]
pub(crate) struct StubLookup {
    answers: HashMap<String, Answer>,
    pub queries: Mutex<Vec<String>>,
}

impl StubLookup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, host: &str, answer: Answer) -> Self {
        self.answers.insert(host.to_string(), answer);
        self
    }

    pub(crate) fn resolving<'a>(hosts: impl IntoIterator<Item = &'a str>) -> Self {
        hosts
            .into_iter()
            .fold(Self::new(), |stub, host| stub.with(host, Answer::MX))
    }

    fn answer(&self, host: &str) -> Answer {
        self.queries.lock().unwrap().push(host.to_string());
        self.answers.get(host).copied().unwrap_or(Answer {
            mx: Ok(false),
            address: Ok(false),
        })
    }
}

impl HostLookup for StubLookup {
    fn has_mx(&self, host: &str) -> Result<bool, LookupError> {
        self.answer(host)
            .mx
            .map_err(|_| LookupError::failed(host, "SERVFAIL"))
    }

    fn has_address(&self, host: &str) -> Result<bool, LookupError> {
        self.answer(host)
            .address
            .map_err(|_| LookupError::timeout(host))
    }
}

/// Lookup that hangs until its release channel is dropped.
struct HangingLookup {
    release: Mutex<Receiver<()>>,
}

impl HangingLookup {
    fn wait(&self, host: &str) -> Result<bool, LookupError> {
        let _ = self.release.lock().unwrap().recv();
        Err(LookupError::timeout(host))
    }
}

impl HostLookup for HangingLookup {
    fn has_mx(&self, host: &str) -> Result<bool, LookupError> {
        self.wait(host)
    }

    fn has_address(&self, host: &str) -> Result<bool, LookupError> {
        self.wait(host)
    }
}

pub(crate) fn stub_resolver(stub: StubLookup) -> HostResolver<StubLookup> {
    stub_resolver_with(stub)
}

fn stub_resolver_with<L: HostLookup>(lookup: L) -> HostResolver<L> {
    HostResolver::new(lookup, ResolverOptions::default())
}

#[test]
fn mx_is_enough() {
    let resolver = stub_resolver(StubLookup::new().with("gmail.com", Answer::MX));
    let res = resolver
        .resolve("gmail.com", &CancelToken::new())
        .expect("not cancelled");
    assert_eq!(res, Resolution::Resolvable(RecordKind::Mx));
    // pas de requête A quand le MX suffit
    assert_eq!(resolver.lookup.queries.lock().unwrap().len(), 1);
}

#[test]
fn address_record_is_implicit_mx() {
    let resolver = stub_resolver(StubLookup::new().with("smallhost.net", Answer::A_ONLY));
    let res = resolver
        .resolve("smallhost.net", &CancelToken::new())
        .expect("not cancelled");
    assert_eq!(res, Resolution::Resolvable(RecordKind::Address));
}

#[test]
fn no_records_is_unresolvable() {
    let resolver = stub_resolver(StubLookup::new());
    let res = resolver
        .resolve("gmai.com", &CancelToken::new())
        .expect("not cancelled");
    assert_eq!(res, Resolution::Unresolvable(UnresolvableCause::NoRecords));
}

#[test]
fn lookup_failure_maps_to_unresolvable() {
    let resolver = stub_resolver(StubLookup::new().with("flaky.org", Answer::SERVFAIL));
    let res = resolver
        .resolve("flaky.org", &CancelToken::new())
        .expect("not cancelled");
    match res {
        Resolution::Unresolvable(UnresolvableCause::LookupFailed(msg)) => {
            assert!(msg.contains("SERVFAIL"), "{msg}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn sentinels_skip_dns() {
    let resolver = stub_resolver(StubLookup::resolving(["localhost", "example.com"]));
    for host in ["localhost", "example.com"] {
        let res = resolver
            .resolve(host, &CancelToken::new())
            .expect("not cancelled");
        assert_eq!(res, Resolution::Unresolvable(UnresolvableCause::Sentinel));
    }
    assert!(resolver.lookup.queries.lock().unwrap().is_empty());
}

#[test]
fn sentinels_can_be_disabled() {
    let options = ResolverOptions {
        sentinels: false,
        ..ResolverOptions::default()
    };
    let resolver = HostResolver::new(StubLookup::resolving(["example.com"]), options);
    let res = resolver
        .resolve("example.com", &CancelToken::new())
        .expect("not cancelled");
    assert!(res.is_resolvable());
}

#[test]
fn cancelled_before_lookup() {
    let resolver = stub_resolver(StubLookup::resolving(["gmail.com"]));
    let token = CancelToken::new();
    token.cancel();
    let err = resolver
        .resolve("gmail.com", &token)
        .expect_err("cancelled");
    assert!(matches!(err, super::ResolverError::Cancelled(_)));
    assert!(resolver.lookup.queries.lock().unwrap().is_empty());
}

#[test]
fn cancellation_aborts_lookup_in_flight() {
    let (release, rx) = mpsc::channel::<()>();
    let resolver = stub_resolver_with(HangingLookup {
        release: Mutex::new(rx),
    });
    let token = CancelToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };

    let started = Instant::now();
    let err = resolver
        .resolve("gmail.com", &token)
        .expect_err("cancelled mid-query");
    assert!(matches!(err, super::ResolverError::Cancelled(_)));
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());

    canceller.join().unwrap();
    drop(release);
}
