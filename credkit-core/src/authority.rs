//! The trust-authority boundary.
//!
//! Everything cryptographic about a credential happens on the other side
//! of this seam. The pipeline sees the authority as a single atomic
//! operation: hand over the raw credential bytes, get back a verdict. A
//! failed decode is final for the invocation; the call is never retried,
//! because a repeated call on the same bytes is expected to yield the same
//! verdict.
//!
//! # Wire format
//!
//! [`SocketAuthority`] reaches the local authority daemon over a blocking
//! Unix-domain socket and exchanges one newline-delimited JSON message in
//! each direction:
//!
//! ```text
//! -> {"credential": "<base64>"}
//! <- {"status": 0, "payload": "<base64>", "uid": 1000, "gid": 100}
//! <- {"status": 6, "detail": "credential expired"}
//! ```
//!
//! A non-zero `status` is one of the classified codes in
//! [`FailureKind`]; unrecognized codes are forwarded verbatim. Transport
//! failures surface as the classified `Unavailable` kind and malformed
//! replies as `Protocol` -- neither is fatal to the pipeline, which still
//! renders the status metadata and exits with the classified code.

use std::io::{self, BufRead, BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{DecodeStatus, FailureKind};

/// Default Unix-domain socket endpoint of the local trust authority.
pub const DEFAULT_ENDPOINT: &str = "/var/run/credkit/authority.sock";

/// Per-direction socket timeout for the decode exchange.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Payload and identities recovered from a successfully decoded
/// credential.
///
/// The payload buffer is [`Zeroizing`], so it is scrubbed before its
/// memory is released.
#[derive(Debug)]
pub struct Recovered {
    payload: Zeroizing<Vec<u8>>,
    uid: u32,
    gid: u32,
}

impl Recovered {
    /// Wraps the decoded payload and identities.
    #[must_use]
    pub fn new(payload: Vec<u8>, uid: u32, gid: u32) -> Self {
        Self {
            payload: Zeroizing::new(payload),
            uid,
            gid,
        }
    }

    /// The recovered payload bytes, which may be empty.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The numeric user identity embedded in the credential.
    #[must_use]
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// The numeric group identity embedded in the credential.
    #[must_use]
    pub const fn gid(&self) -> u32 {
        self.gid
    }
}

/// The trust authority's verdict for one decode call.
#[derive(Debug)]
pub enum Verdict {
    /// The credential was validated; payload and identities recovered.
    Granted(Recovered),
    /// The authority reported a classified failure.
    Denied(FailureKind),
}

impl Verdict {
    /// The decode status this verdict corresponds to.
    #[must_use]
    pub const fn status(&self) -> DecodeStatus {
        match self {
            Self::Granted(_) => DecodeStatus::Success,
            Self::Denied(kind) => DecodeStatus::Failed(*kind),
        }
    }
}

/// The external trust authority that validates and decodes credentials.
///
/// Implementations must treat the credential buffer as read-only and must
/// report failures as classified verdicts rather than panicking or
/// retrying internally.
pub trait TrustAuthority {
    /// Performs the single decode operation for `credential`.
    fn decode(&self, credential: &[u8]) -> Verdict;
}

/// One decode request on the wire.
#[derive(Serialize)]
struct DecodeRequest<'a> {
    credential: &'a str,
}

/// One decode reply on the wire.
#[derive(Deserialize)]
struct DecodeReply {
    status: u8,
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    uid: Option<u32>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    detail: Option<String>,
}

enum ExchangeError {
    /// The daemon could not be reached or the socket failed mid-exchange.
    Transport(io::Error),
    /// The daemon replied with something that is not a decode reply.
    Protocol(String),
}

/// Blocking Unix-domain-socket client for the local trust authority.
///
/// The endpoint may be overridden before any decode occurs; after the
/// first (and only) decode call of an invocation it is never consulted
/// again.
#[derive(Debug, Clone)]
pub struct SocketAuthority {
    endpoint: PathBuf,
}

impl SocketAuthority {
    /// Client for the default local endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Client for a non-default local endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint this client will connect to.
    #[must_use]
    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    /// Runs the request/reply exchange over a fresh connection.
    fn exchange(&self, credential: &[u8]) -> Result<DecodeReply, ExchangeError> {
        let mut stream =
            UnixStream::connect(&self.endpoint).map_err(ExchangeError::Transport)?;
        stream
            .set_read_timeout(Some(IO_TIMEOUT))
            .map_err(ExchangeError::Transport)?;
        stream
            .set_write_timeout(Some(IO_TIMEOUT))
            .map_err(ExchangeError::Transport)?;

        let encoded = Zeroizing::new(BASE64.encode(credential));
        let mut request = serde_json::to_vec(&DecodeRequest {
            credential: &encoded,
        })
        .map_err(|err| ExchangeError::Protocol(err.to_string()))?;
        request.push(b'\n');
        stream.write_all(&request).map_err(ExchangeError::Transport)?;
        stream
            .shutdown(Shutdown::Write)
            .map_err(ExchangeError::Transport)?;

        let mut line = String::new();
        BufReader::new(stream)
            .read_line(&mut line)
            .map_err(ExchangeError::Transport)?;
        if line.trim().is_empty() {
            return Err(ExchangeError::Protocol("empty reply".to_string()));
        }
        serde_json::from_str(&line)
            .map_err(|err| ExchangeError::Protocol(err.to_string()))
    }

    /// Turns a wire reply into a verdict.
    fn interpret(reply: DecodeReply) -> Verdict {
        if reply.status != 0 {
            let kind = FailureKind::from_code(reply.status);
            if let Some(detail) = reply.detail {
                tracing::debug!(code = reply.status, detail = %detail, "decode denied");
            }
            return Verdict::Denied(kind);
        }
        let (Some(payload), Some(uid), Some(gid)) = (reply.payload, reply.uid, reply.gid)
        else {
            tracing::warn!("success reply is missing payload or identities");
            return Verdict::Denied(FailureKind::Protocol);
        };
        match BASE64.decode(payload) {
            Ok(bytes) => Verdict::Granted(Recovered::new(bytes, uid, gid)),
            Err(err) => {
                tracing::warn!(%err, "success reply carries undecodable payload");
                Verdict::Denied(FailureKind::Protocol)
            }
        }
    }
}

impl Default for SocketAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustAuthority for SocketAuthority {
    fn decode(&self, credential: &[u8]) -> Verdict {
        tracing::debug!(
            bytes = credential.len(),
            endpoint = %self.endpoint.display(),
            "requesting decode"
        );
        match self.exchange(credential) {
            Ok(reply) => Self::interpret(reply),
            Err(ExchangeError::Transport(err)) => {
                tracing::warn!(
                    %err,
                    endpoint = %self.endpoint.display(),
                    "trust authority unreachable"
                );
                Verdict::Denied(FailureKind::Unavailable)
            }
            Err(ExchangeError::Protocol(reason)) => {
                tracing::warn!(reason = %reason, "malformed trust authority reply");
                Verdict::Denied(FailureKind::Protocol)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> DecodeReply {
        serde_json::from_str(json).expect("reply parses")
    }

    #[test]
    fn success_reply_becomes_a_granted_verdict() {
        let verdict = SocketAuthority::interpret(reply(
            r#"{"status":0,"payload":"aGVsbG8=","uid":1000,"gid":100}"#,
        ));
        let Verdict::Granted(recovered) = verdict else {
            panic!("expected a granted verdict");
        };
        assert_eq!(recovered.payload(), b"hello");
        assert_eq!(recovered.uid(), 1000);
        assert_eq!(recovered.gid(), 100);
    }

    #[test]
    fn denied_reply_keeps_the_classified_code() {
        let verdict =
            SocketAuthority::interpret(reply(r#"{"status":6,"detail":"expired"}"#));
        assert_eq!(
            verdict.status(),
            DecodeStatus::Failed(FailureKind::Expired)
        );

        let verdict = SocketAuthority::interpret(reply(r#"{"status":200}"#));
        assert_eq!(
            verdict.status(),
            DecodeStatus::Failed(FailureKind::Other(200))
        );
    }

    #[test]
    fn success_reply_without_identities_is_a_protocol_failure() {
        let verdict = SocketAuthority::interpret(reply(r#"{"status":0}"#));
        assert_eq!(
            verdict.status(),
            DecodeStatus::Failed(FailureKind::Protocol)
        );

        let verdict = SocketAuthority::interpret(reply(
            r#"{"status":0,"payload":"!!not-base64!!","uid":1,"gid":1}"#,
        ));
        assert_eq!(
            verdict.status(),
            DecodeStatus::Failed(FailureKind::Protocol)
        );
    }

    #[test]
    fn unreachable_endpoint_is_classified_unavailable() {
        let authority = SocketAuthority::with_endpoint("/nonexistent/authority.sock");
        let verdict = authority.decode(b"blob");
        assert_eq!(
            verdict.status(),
            DecodeStatus::Failed(FailureKind::Unavailable)
        );
    }

    #[test]
    fn zero_length_payload_is_a_valid_success() {
        let verdict = SocketAuthority::interpret(reply(
            r#"{"status":0,"payload":"","uid":0,"gid":0}"#,
        ));
        let Verdict::Granted(recovered) = verdict else {
            panic!("expected a granted verdict");
        };
        assert!(recovered.payload().is_empty());
    }
}
