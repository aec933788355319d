//! Verbatim emission of the recovered payload.

use crate::router::Streams;
use crate::{Error, Result, Session};

/// Writes the recovered payload, byte for byte, to the payload stream.
///
/// No-op unless the decode succeeded and a payload stream is configured.
/// A zero-length payload writes zero bytes and is not an error. No
/// transformation or line-ending translation is applied; a short or
/// failed write is fatal.
pub(crate) fn emit_payload(session: &Session, streams: &mut Streams) -> Result<()> {
    let Some(recovered) = session.recovered() else {
        return Ok(());
    };
    let Some(writer) = streams.payload_writer() else {
        return Ok(());
    };
    writer
        .write_all(recovered.payload())
        .map_err(|source| Error::WritePayload { source })?;
    tracing::debug!(bytes = recovered.payload().len(), "payload emitted");
    Ok(())
}
