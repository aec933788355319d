//! The decode-orchestration pipeline.

use crate::router::Streams;
use crate::{emit, render, DecodeStatus, Result, RunConfig, Session, TrustAuthority};

/// Runs one full invocation of the pipeline.
///
/// Control flow: resolve the configured destinations, read the credential
/// source to exhaustion, make the single decode call against `authority`,
/// render the selected metadata, emit the payload, and flush. Buffers are
/// scrubbed and streams closed when the session and streams drop at the
/// end (the stdio sentinels are never closed).
///
/// The returned [`DecodeStatus`] is the invocation's verdict; its code is
/// meant to become the process exit status. A classified decode failure is
/// *not* an `Err` -- the pipeline still renders the status metadata for it.
///
/// # Errors
///
/// Returns a fatal [`crate::Error`] for stream open failures, read/write
/// aliasing between the input and an output destination, an unreadable
/// credential source, or a failed write.
pub fn run(config: &RunConfig, authority: &dyn TrustAuthority) -> Result<DecodeStatus> {
    let mut session = Session::new();
    let mut streams = Streams::resolve(config)?;

    session.set_credential(streams.read_credential()?);
    session.apply_verdict(authority.decode(session.credential()));
    tracing::info!(status = %session.status(), code = session.status().code(), "decode complete");

    render::render_metadata(&session, config, &mut streams)?;
    emit::emit_payload(&session, &mut streams)?;
    streams.finish()?;

    Ok(session.status())
}
