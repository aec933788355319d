//! Rendering of verdict metadata as aligned text lines.

use std::fmt::Display;
use std::io::Write;

use crate::router::Streams;
use crate::{Attribute, Error, Result, RunConfig, Session};

/// Renders the selected attributes, in registry order, to the metadata
/// stream. No-op when no metadata stream is configured.
///
/// Status code and text are the only attributes safe to report on a
/// failed decode, so they render whenever selected regardless of outcome;
/// identity and length attributes render only on success. When metadata
/// and payload share a stream, a single blank line separates the rendered
/// lines from the payload bytes that follow.
pub(crate) fn render_metadata(
    session: &Session,
    config: &RunConfig,
    streams: &mut Streams,
) -> Result<()> {
    let shared = streams.payload_shares_metadata();
    let Some(writer) = streams.metadata_writer() else {
        return Ok(());
    };

    let mask = config.attributes;
    let pad = session.label_pad_width();
    let status = session.status();

    if mask.contains(Attribute::StatusCode) {
        write_line(writer, Attribute::StatusCode, &status.code(), pad)?;
    }
    if mask.contains(Attribute::StatusText) {
        write_line(writer, Attribute::StatusText, &status.text(), pad)?;
    }

    // On failure nothing beyond the status attributes may be exposed.
    let Some(recovered) = session.recovered() else {
        return Ok(());
    };

    if mask.contains(Attribute::Uid) {
        write_line(writer, Attribute::Uid, &recovered.uid(), pad)?;
    }
    if mask.contains(Attribute::Gid) {
        write_line(writer, Attribute::Gid, &recovered.gid(), pad)?;
    }
    if mask.contains(Attribute::Length) {
        write_line(writer, Attribute::Length, &recovered.payload().len(), pad)?;
    }

    if shared {
        writer
            .write_all(b"\n")
            .map_err(|source| Error::WriteMetadata { source })?;
    }
    Ok(())
}

/// Writes one `name:<padding>value` line as a single atomic write call,
/// padding so the value columns align across attributes.
fn write_line(
    writer: &mut dyn Write,
    attribute: Attribute,
    value: &dyn Display,
    pad: usize,
) -> Result<()> {
    let name = attribute.name();
    let width = pad.saturating_sub(name.len());
    let line = format!("{name}:{:width$}{value}\n", "");
    writer
        .write_all(line.as_bytes())
        .map_err(|source| Error::WriteMetadata { source })
}
