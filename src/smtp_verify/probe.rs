use std::time::Duration;

use native_tls::TlsConnector;
use tracing::debug;
use trust_dns_resolver::Resolver;

use super::SmtpVerifyError;
use super::dns::{HostCandidate, resolve_hosts};
use super::session::{SmtpReply, SmtpSession};
use crate::pipeline::{MailboxProbe, ProbeOutcome};

/// Configuration knobs for [`SmtpProbe`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    /// EHLO name; falls back to the domain of `from`.
    pub helo_domain: Option<String>,
    pub port: u16,
    /// Connect, read and write deadline.
    pub timeout: Duration,
    pub max_mx: usize,
    /// Upgrade with STARTTLS when the server advertises it.
    pub starttls: bool,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            helo_domain: None,
            port: 25,
            timeout: Duration::from_secs(5),
            max_mx: 3,
            starttls: true,
        }
    }
}

impl SmtpProbeOptions {
    fn helo_name<'a>(&'a self, from: &'a str) -> &'a str {
        self.helo_domain
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| from.rsplit_once('@').map(|(_, domain)| domain))
            .filter(|name| !name.is_empty())
            .unwrap_or("localhost")
    }
}

pub struct SmtpProbe {
    resolver: Resolver,
    connector: Option<TlsConnector>,
    options: SmtpProbeOptions,
}

impl SmtpProbe {
    pub fn new(options: SmtpProbeOptions) -> Result<Self, SmtpVerifyError> {
        let resolver =
            Resolver::from_system_conf().map_err(|source| SmtpVerifyError::ResolverInit { source })?;
        let connector = if options.starttls {
            Some(TlsConnector::new().map_err(|source| SmtpVerifyError::TlsInit { source })?)
        } else {
            None
        };
        Ok(Self {
            resolver,
            connector,
            options,
        })
    }

    /// Runs the dialogue against each MX in turn until one gives a
    /// definitive answer about `to`.
    pub fn verify(&self, from: &str, to: &str) -> Result<ProbeOutcome, SmtpVerifyError> {
        let Some((_, domain)) = to.rsplit_once('@') else {
            return Ok(ProbeOutcome::Invalid("recipient has no domain".to_string()));
        };
        let hosts = resolve_hosts(&self.resolver, domain, self.options.port, self.options.max_mx)?;

        let mut last = None;
        for candidate in &hosts {
            match self.probe_host(candidate, from, to) {
                Ok(outcome @ (ProbeOutcome::Valid | ProbeOutcome::Invalid(_))) => {
                    return Ok(outcome);
                }
                Ok(outcome) => last = Some(outcome),
                Err(err) => {
                    debug!(host = %candidate.host, error = %err, "SMTP probe failed");
                    last = Some(ProbeOutcome::TransportError(err.to_string()));
                }
            }
        }
        Ok(last.unwrap_or_else(|| ProbeOutcome::TransportError("no server responded".into())))
    }

    fn probe_host(
        &self,
        candidate: &HostCandidate,
        from: &str,
        to: &str,
    ) -> Result<ProbeOutcome, SmtpVerifyError> {
        let timeout = self.options.timeout;
        let mut session = SmtpSession::connect(&candidate.host, &candidate.addresses, timeout)?;
        let banner = session.read_reply()?;
        if !banner.is_positive_completion() {
            session.quit();
            return Ok(ProbeOutcome::TransportError(format!(
                "{} refused the session: {}",
                session.host(),
                banner.summary()
            )));
        }

        let helo = format!("EHLO {}", self.options.helo_name(from));
        let mut ehlo = session.send_command(&helo)?;
        if let Some(connector) = &self.connector {
            if ehlo.has_capability("STARTTLS") {
                let reply = session.starttls(connector, timeout)?;
                if reply.is_positive_completion() {
                    ehlo = session.send_command(&helo)?;
                }
            }
        }
        if !ehlo.is_positive_completion() {
            session.quit();
            return Ok(ProbeOutcome::TransportError(format!(
                "EHLO rejected: {}",
                ehlo.summary()
            )));
        }

        let mail = session.send_command(&format!("MAIL FROM:<{from}>"))?;
        if !mail.is_positive_completion() {
            session.quit();
            return Ok(ProbeOutcome::TransportError(format!(
                "MAIL FROM rejected: {}",
                mail.summary()
            )));
        }

        let rcpt = session.send_command(&format!("RCPT TO:<{to}>"))?;
        session.quit();
        Ok(classify_rcpt(&rcpt))
    }
}

impl MailboxProbe for SmtpProbe {
    fn probe(&self, from: &str, to: &str) -> ProbeOutcome {
        self.verify(from, to)
            .unwrap_or_else(|err| ProbeOutcome::TransportError(err.to_string()))
    }
}

fn classify_rcpt(reply: &SmtpReply) -> ProbeOutcome {
    if reply.is_positive_completion() {
        ProbeOutcome::Valid
    } else if reply.is_permanent_failure() {
        ProbeOutcome::Invalid(reply.summary())
    } else {
        ProbeOutcome::TransportError(format!("RCPT TO: {}", reply.summary()))
    }
}
