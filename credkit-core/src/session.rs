//! Run configuration and the per-invocation session state.

use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::{Attribute, AttributeMask, DecodeStatus, Recovered, Verdict};

/// A logical input or output destination for the pipeline.
///
/// `Stdio` is the sentinel for the process's standard input or output
/// stream (depending on the role the destination is used in); a path names
/// a concrete file. Roles that may be switched off entirely (metadata,
/// payload) wrap this in `Option`, where `None` means "produce nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The standard input/output stream of the process.
    Stdio,
    /// A concrete filesystem path.
    Path(PathBuf),
}

impl Destination {
    /// Parses a CLI-style destination spec, where `-` is the stdio
    /// sentinel and anything else is a concrete path.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        if spec == "-" {
            Self::Stdio
        } else {
            Self::Path(PathBuf::from(spec))
        }
    }

    /// The concrete path, if this destination is not the stdio sentinel.
    #[must_use]
    pub const fn as_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Stdio => None,
            Self::Path(path) => Some(path),
        }
    }
}

/// Immutable configuration for one pipeline invocation.
///
/// Built once by [`RunConfigBuilder`] and then passed by reference through
/// the pipeline stages.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where the raw credential is read from. Input is always required.
    pub input: Destination,
    /// Where verdict metadata goes; `None` renders nothing.
    pub metadata: Option<Destination>,
    /// Where the recovered payload goes; `None` emits nothing.
    pub payload: Option<Destination>,
    /// The attributes selected for rendering.
    pub attributes: AttributeMask,
}

/// Builder for [`RunConfig`].
///
/// Defaults: credential from standard input, metadata and payload to
/// standard output, all attributes selected.
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    input: Option<Destination>,
    metadata: Option<Option<Destination>>,
    payload: Option<Option<Destination>>,
    attributes: Option<AttributeMask>,
}

impl RunConfigBuilder {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential input destination.
    #[must_use]
    pub fn input(mut self, destination: Destination) -> Self {
        self.input = Some(destination);
        self
    }

    /// Sets the metadata output destination.
    #[must_use]
    pub fn metadata(mut self, destination: Destination) -> Self {
        self.metadata = Some(Some(destination));
        self
    }

    /// Sets the payload output destination.
    #[must_use]
    pub fn payload(mut self, destination: Destination) -> Self {
        self.payload = Some(Some(destination));
        self
    }

    /// Discards all output: both the metadata and payload destinations
    /// become absent.
    #[must_use]
    pub fn discard_output(mut self) -> Self {
        self.metadata = Some(None);
        self.payload = Some(None);
        self
    }

    /// Sets an explicit attribute selection. Without one, all attributes
    /// are selected.
    #[must_use]
    pub fn attributes(mut self, mask: AttributeMask) -> Self {
        self.attributes = Some(mask);
        self
    }

    /// Finalizes the configuration.
    #[must_use]
    pub fn build(self) -> RunConfig {
        RunConfig {
            input: self.input.unwrap_or(Destination::Stdio),
            metadata: self.metadata.unwrap_or(Some(Destination::Stdio)),
            payload: self.payload.unwrap_or(Some(Destination::Stdio)),
            attributes: self.attributes.unwrap_or(AttributeMask::ALL),
        }
    }
}

/// The mutable aggregate for one invocation.
///
/// Holds the decode status, the raw credential buffer, and whatever the
/// trust authority recovered. The credential and payload buffers live in
/// [`Zeroizing`] wrappers, so they are overwritten with zero bytes before
/// their memory is released.
#[derive(Debug)]
pub struct Session {
    status: DecodeStatus,
    credential: Option<Zeroizing<Vec<u8>>>,
    recovered: Option<Recovered>,
    label_pad_width: usize,
}

impl Session {
    /// Creates the state for a fresh invocation, computing the label pad
    /// width from the attribute registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: DecodeStatus::Pending,
            credential: None,
            recovered: None,
            label_pad_width: Attribute::label_pad_width(),
        }
    }

    /// Stores the raw credential bytes.
    ///
    /// The buffer is allocated at most once per invocation.
    pub fn set_credential(&mut self, credential: Zeroizing<Vec<u8>>) {
        debug_assert!(self.credential.is_none(), "credential already read");
        self.credential = Some(credential);
    }

    /// The raw credential bytes; empty before the credential is read.
    #[must_use]
    pub fn credential(&self) -> &[u8] {
        self.credential.as_deref().map_or(&[], Vec::as_slice)
    }

    /// Records the trust authority's verdict.
    pub fn apply_verdict(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Granted(recovered) => {
                self.status = DecodeStatus::Success;
                self.recovered = Some(recovered);
            }
            Verdict::Denied(kind) => self.status = DecodeStatus::Failed(kind),
        }
    }

    /// The current decode status.
    #[must_use]
    pub const fn status(&self) -> DecodeStatus {
        self.status
    }

    /// The recovered payload and identities; `Some` only after a
    /// successful decode.
    #[must_use]
    pub const fn recovered(&self) -> Option<&Recovered> {
        self.recovered.as_ref()
    }

    /// Column-alignment width for rendered metadata labels.
    #[must_use]
    pub const fn label_pad_width(&self) -> usize {
        self.label_pad_width
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
