//! Resolution of the three logical destinations to concrete streams.
//!
//! Resolution order matters: aliasing between the input and either output
//! is rejected before any stream is opened, so a misconfiguration never
//! clobbers the credential source or leaves a truncated output file
//! behind. Path comparison is literal and byte-for-byte -- two different
//! spellings of the same file are treated as distinct destinations.
//!
//! A metadata and payload destination naming the same target (byte-equal
//! paths, or both the stdio sentinel) share a single handle; the payload
//! side carries a marker instead of a second open file, so the shared
//! handle is neither written through two buffers nor closed twice.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use zeroize::Zeroizing;

use crate::{Destination, Error, Result, RunConfig};

/// Resolved credential source.
#[derive(Debug)]
enum Source {
    Stdin(io::Stdin),
    File(File),
}

/// Resolved writable stream.
///
/// The stdout variant holds no closeable handle of its own; dropping it
/// never closes the process's standard output.
#[derive(Debug)]
enum Sink {
    Stdout(io::Stdout),
    File(File),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(stdout) => stdout,
            Self::File(file) => file,
        }
    }
}

/// How payload bytes reach their destination.
#[derive(Debug)]
enum PayloadRoute {
    /// A stream of the payload's own.
    Own(Sink),
    /// The payload shares the metadata stream; no second handle exists.
    SharedWithMetadata,
}

/// The streams for one invocation, resolved from a [`RunConfig`].
#[derive(Debug)]
pub(crate) struct Streams {
    input: Source,
    metadata: Option<Sink>,
    payload: Option<PayloadRoute>,
}

impl Streams {
    /// Resolves the configured destinations.
    ///
    /// Aliasing checks run first, then the input opens, then metadata,
    /// then payload. At most one writable handle exists per distinct
    /// destination afterwards.
    pub(crate) fn resolve(config: &RunConfig) -> Result<Self> {
        let input_path = config.input.as_path();
        reject_aliasing(input_path, config.metadata.as_ref())?;
        reject_aliasing(input_path, config.payload.as_ref())?;

        let input = match &config.input {
            Destination::Stdio => Source::Stdin(io::stdin()),
            Destination::Path(path) => {
                tracing::debug!(path = %path.display(), "reading credential from file");
                Source::File(File::open(path).map_err(|source| Error::OpenInput {
                    path: path.clone(),
                    source,
                })?)
            }
        };

        let metadata = config
            .metadata
            .as_ref()
            .map(|destination| open_sink(destination))
            .transpose()?;

        let payload = match (&config.payload, &config.metadata) {
            (None, _) => None,
            (Some(destination), Some(metadata_destination))
                if shares_target(destination, metadata_destination) =>
            {
                tracing::debug!("payload shares the metadata stream");
                Some(PayloadRoute::SharedWithMetadata)
            }
            (Some(destination), _) => Some(PayloadRoute::Own(open_sink(destination)?)),
        };

        Ok(Self {
            input,
            metadata,
            payload,
        })
    }

    /// Reads the credential source to exhaustion into a scrubbed buffer.
    pub(crate) fn read_credential(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut buffer = Zeroizing::new(Vec::new());
        let reader: &mut dyn Read = match &mut self.input {
            Source::Stdin(stdin) => stdin,
            Source::File(file) => file,
        };
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| Error::ReadCredential { source })?;
        tracing::debug!(bytes = buffer.len(), "credential read");
        Ok(buffer)
    }

    /// The metadata stream, if one is configured.
    pub(crate) fn metadata_writer(&mut self) -> Option<&mut dyn Write> {
        self.metadata.as_mut().map(Sink::writer)
    }

    /// The payload stream, if one is configured. For a shared destination
    /// this is the metadata stream itself.
    pub(crate) fn payload_writer(&mut self) -> Option<&mut dyn Write> {
        match &mut self.payload {
            None => None,
            Some(PayloadRoute::Own(sink)) => Some(sink.writer()),
            Some(PayloadRoute::SharedWithMetadata) => {
                self.metadata.as_mut().map(Sink::writer)
            }
        }
    }

    /// Whether metadata and payload resolve to the identical stream.
    pub(crate) fn payload_shares_metadata(&self) -> bool {
        matches!(self.payload, Some(PayloadRoute::SharedWithMetadata))
    }

    /// Flushes whatever streams are open. Write failures here are as
    /// fatal as anywhere else in the pipeline.
    pub(crate) fn finish(&mut self) -> Result<()> {
        if let Some(sink) = &mut self.metadata {
            sink.writer()
                .flush()
                .map_err(|source| Error::WriteMetadata { source })?;
        }
        if let Some(PayloadRoute::Own(sink)) = &mut self.payload {
            sink.writer()
                .flush()
                .map_err(|source| Error::WritePayload { source })?;
        }
        Ok(())
    }
}

/// Rejects an output destination that names the credential input's file.
///
/// Comparison is a literal byte-for-byte check of the two path strings,
/// performed before anything is opened. The stdio sentinel never aliases:
/// standard input and standard output are distinct streams.
fn reject_aliasing(
    input_path: Option<&std::path::PathBuf>,
    output: Option<&Destination>,
) -> Result<()> {
    let (Some(input_path), Some(Destination::Path(output_path))) = (input_path, output)
    else {
        return Ok(());
    };
    if paths_equal(input_path, output_path) {
        return Err(Error::AliasedDestination {
            path: output_path.clone(),
        });
    }
    Ok(())
}

/// Whether metadata and payload destinations name the same target.
fn shares_target(payload: &Destination, metadata: &Destination) -> bool {
    match (payload, metadata) {
        (Destination::Stdio, Destination::Stdio) => true,
        (Destination::Path(a), Destination::Path(b)) => paths_equal(a, b),
        _ => false,
    }
}

/// Literal path equality, not canonicalized.
fn paths_equal(a: &Path, b: &Path) -> bool {
    a.as_os_str() == b.as_os_str()
}

/// Opens a writable stream for a destination, truncating an existing file.
fn open_sink(destination: &Destination) -> Result<Sink> {
    match destination {
        Destination::Stdio => Ok(Sink::Stdout(io::stdout())),
        Destination::Path(path) => {
            tracing::debug!(path = %path.display(), "opening output file");
            File::create(path)
                .map(Sink::File)
                .map_err(|source| Error::OpenOutput {
                    path: path.clone(),
                    source,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunConfigBuilder;

    #[test]
    fn input_aliasing_fails_before_any_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cred.in");
        std::fs::write(&path, b"blob").expect("write credential");

        let config = RunConfigBuilder::new()
            .input(Destination::Path(path.clone()))
            .metadata(Destination::Path(path.clone()))
            .build();
        let err = Streams::resolve(&config).expect_err("aliasing must be rejected");
        assert!(matches!(err, Error::AliasedDestination { .. }));

        // Rejected before opening: the input file is not truncated.
        assert_eq!(std::fs::read(&path).expect("read back"), b"blob");
    }

    #[test]
    fn payload_aliasing_with_input_is_rejected_too() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cred.in");
        std::fs::write(&path, b"blob").expect("write credential");

        let config = RunConfigBuilder::new()
            .input(Destination::Path(path.clone()))
            .metadata(Destination::Path(dir.path().join("meta.out")))
            .payload(Destination::Path(path))
            .build();
        let err = Streams::resolve(&config).expect_err("aliasing must be rejected");
        assert!(matches!(err, Error::AliasedDestination { .. }));
        // Nothing was opened, so the metadata file was never created.
        assert!(!dir.path().join("meta.out").exists());
    }

    #[test]
    fn aliasing_comparison_is_literal_not_canonical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cred.in");
        std::fs::write(&path, b"blob").expect("write credential");

        // Same file via a different spelling: literal comparison lets it
        // through (matching the original tool's semantics).
        let mut spelled_differently = dir.path().join(".");
        spelled_differently.push("cred.in");
        assert!(!paths_equal(&path, &spelled_differently));
    }

    #[test]
    fn shared_output_destination_opens_one_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("both.out");
        let cred = dir.path().join("cred.in");
        std::fs::write(&cred, b"blob").expect("write credential");

        let config = RunConfigBuilder::new()
            .input(Destination::Path(cred))
            .metadata(Destination::Path(out.clone()))
            .payload(Destination::Path(out))
            .build();
        let streams = Streams::resolve(&config).expect("resolution succeeds");
        assert!(streams.payload_shares_metadata());
    }

    #[test]
    fn both_stdio_outputs_share_a_stream() {
        let config = RunConfigBuilder::new().build();
        assert!(shares_target(
            config.payload.as_ref().expect("payload destination"),
            config.metadata.as_ref().expect("metadata destination"),
        ));
    }

    #[test]
    fn distinct_outputs_get_distinct_handles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cred = dir.path().join("cred.in");
        std::fs::write(&cred, b"blob").expect("write credential");

        let config = RunConfigBuilder::new()
            .input(Destination::Path(cred))
            .metadata(Destination::Path(dir.path().join("meta.out")))
            .payload(Destination::Path(dir.path().join("data.out")))
            .build();
        let mut streams = Streams::resolve(&config).expect("resolution succeeds");
        assert!(!streams.payload_shares_metadata());
        assert!(streams.metadata_writer().is_some());
        assert!(streams.payload_writer().is_some());
    }

    #[test]
    fn missing_input_file_reports_the_path() {
        let config = RunConfigBuilder::new()
            .input(Destination::Path("/nonexistent/cred.in".into()))
            .build();
        let err = Streams::resolve(&config).expect_err("open must fail");
        let message = err.to_string();
        assert!(message.contains("/nonexistent/cred.in"), "got: {message}");
    }

    #[test]
    fn read_credential_consumes_the_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cred = dir.path().join("cred.in");
        std::fs::write(&cred, b"the-credential").expect("write credential");

        let config = RunConfigBuilder::new()
            .input(Destination::Path(cred))
            .discard_output()
            .build();
        let mut streams = Streams::resolve(&config).expect("resolution succeeds");
        let buffer = streams.read_credential().expect("read succeeds");
        assert_eq!(&**buffer, b"the-credential");
        assert!(streams.metadata_writer().is_none());
        assert!(streams.payload_writer().is_none());
    }
}
