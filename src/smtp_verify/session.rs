use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use native_tls::{HandshakeError, TlsConnector, TlsStream};

use super::SmtpVerifyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    pub fn has_capability(&self, cap: &str) -> bool {
        self.lines.iter().any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|token| token.eq_ignore_ascii_case(cap))
        })
    }

    /// `"550 5.1.1 user unknown"`, lines joined by `" / "`.
    pub fn summary(&self) -> String {
        if self.lines.is_empty() {
            self.code.to_string()
        } else {
            format!("{} {}", self.code, self.lines.join(" / "))
        }
    }
}

/// One reply line: `(code, is_last, text)`.
pub(crate) fn parse_reply_line(line: &str) -> Result<(u16, bool, String), SmtpVerifyError> {
    let code = line
        .get(..3)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| SmtpVerifyError::malformed(line))?;
    let is_last = line.as_bytes().get(3) != Some(&b'-');
    let text = line.get(4..).unwrap_or_default().to_string();
    Ok((code, is_last, text))
}

enum StreamState {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    Invalid,
}

pub(crate) struct SmtpSession {
    host: String,
    state: StreamState,
    buffer: Vec<u8>,
}

impl SmtpSession {
    pub fn connect(
        host: &str,
        addresses: &[SocketAddr],
        timeout: Duration,
    ) -> Result<Self, SmtpVerifyError> {
        let mut last_err = None;
        for addr in addresses {
            match open_stream(addr, timeout) {
                Ok(stream) => {
                    return Ok(Self {
                        host: host.to_string(),
                        state: StreamState::Plain(stream),
                        buffer: Vec::new(),
                    });
                }
                Err(source) => {
                    last_err = Some(SmtpVerifyError::Connect {
                        host: host.to_string(),
                        source,
                    })
                }
            }
        }
        Err(last_err.unwrap_or_else(|| SmtpVerifyError::NoMailHost {
            domain: host.to_string(),
        }))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn read_reply(&mut self) -> Result<SmtpReply, SmtpVerifyError> {
        let mut lines = Vec::new();
        let mut code = None;
        loop {
            let line = self.read_line()?;
            let (line_code, is_last, text) = parse_reply_line(&line)?;
            match code {
                Some(existing) if existing != line_code => {
                    return Err(SmtpVerifyError::malformed(format!(
                        "inconsistent reply codes: {existing} vs {line_code}"
                    )));
                }
                _ => code = Some(line_code),
            }
            lines.push(text);
            if is_last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or(0),
            lines,
        })
    }

    pub fn send_command(&mut self, command: &str) -> Result<SmtpReply, SmtpVerifyError> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        let written = match &mut self.state {
            StreamState::Plain(stream) => stream.write_all(&data).and_then(|()| stream.flush()),
            StreamState::Tls(stream) => stream.write_all(&data).and_then(|()| stream.flush()),
            StreamState::Invalid => {
                return Err(SmtpVerifyError::malformed("stream unusable after failed STARTTLS"));
            }
        };
        written.map_err(|err| SmtpVerifyError::session(&self.host, err))?;
        self.read_reply()
    }

    /// Issues STARTTLS and upgrades the stream when the server agrees.
    pub fn starttls(
        &mut self,
        connector: &TlsConnector,
        timeout: Duration,
    ) -> Result<SmtpReply, SmtpVerifyError> {
        let reply = self.send_command("STARTTLS")?;
        if !reply.is_positive_completion() {
            return Ok(reply);
        }
        let plain = match std::mem::replace(&mut self.state, StreamState::Invalid) {
            StreamState::Plain(stream) => stream,
            other => {
                self.state = other;
                return Ok(reply);
            }
        };
        let tls = complete_handshake(connector, &self.host, plain)?;
        tls.get_ref()
            .set_read_timeout(Some(timeout))
            .map_err(|err| SmtpVerifyError::session(&self.host, err))?;
        self.state = StreamState::Tls(Box::new(tls));
        self.buffer.clear();
        Ok(reply)
    }

    pub fn quit(&mut self) {
        // la réponse au QUIT n'a aucune importance
        let _ = self.send_command("QUIT");
    }

    fn read_line(&mut self) -> Result<String, SmtpVerifyError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                while line.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
                    line.pop();
                }
                return String::from_utf8(line)
                    .map_err(|err| SmtpVerifyError::malformed(format!("non UTF-8 reply: {err}")));
            }

            let mut buf = [0u8; 512];
            let read = match &mut self.state {
                StreamState::Plain(stream) => stream.read(&mut buf),
                StreamState::Tls(stream) => stream.read(&mut buf),
                StreamState::Invalid => {
                    return Err(SmtpVerifyError::malformed("stream unusable after failed STARTTLS"));
                }
            };
            let read = read.map_err(|err| SmtpVerifyError::session(&self.host, err))?;
            if read == 0 {
                return Err(SmtpVerifyError::session(
                    &self.host,
                    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"),
                ));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}

fn open_stream(addr: &SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    let stream = TcpStream::connect_timeout(addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(stream)
}

fn complete_handshake(
    connector: &TlsConnector,
    domain: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, SmtpVerifyError> {
    let mut attempt = connector.connect(domain, stream);
    loop {
        match attempt {
            Ok(tls) => return Ok(tls),
            Err(HandshakeError::Failure(source)) => {
                return Err(SmtpVerifyError::Handshake {
                    host: domain.to_string(),
                    source,
                });
            }
            Err(HandshakeError::WouldBlock(mid)) => attempt = mid.handshake(),
        }
    }
}
