//! Fatal pipeline errors.
//!
//! Everything in here terminates the invocation: the CLI prints one
//! diagnostic and exits with the generic internal failure code. Classified
//! decode failures are *not* errors -- they travel through the pipeline as
//! [`crate::DecodeStatus`] data.

use std::path::PathBuf;

use thiserror::Error;

/// A process-fatal pipeline condition.
#[derive(Debug, Error)]
pub enum Error {
    /// A credential input destination could not be opened for reading.
    #[error("unable to read from \"{}\": {source}", path.display())]
    OpenInput {
        /// The offending path.
        path: PathBuf,
        /// The underlying reason.
        source: std::io::Error,
    },
    /// An output destination could not be opened for writing.
    #[error("unable to write to \"{}\": {source}", path.display())]
    OpenOutput {
        /// The offending path.
        path: PathBuf,
        /// The underlying reason.
        source: std::io::Error,
    },
    /// An output destination names the same file as the credential input.
    ///
    /// Rejected before any stream is opened: writing to the input source
    /// mid-read would clobber it.
    #[error("cannot read and write to the same file \"{}\"", path.display())]
    AliasedDestination {
        /// The path named by both roles.
        path: PathBuf,
    },
    /// The credential source could not be read to exhaustion.
    #[error("error reading credential: {source}")]
    ReadCredential {
        /// The underlying reason.
        source: std::io::Error,
    },
    /// A metadata line could not be written.
    #[error("error writing metadata: {source}")]
    WriteMetadata {
        /// The underlying reason.
        source: std::io::Error,
    },
    /// The payload could not be written in full.
    #[error("error writing payload: {source}")]
    WritePayload {
        /// The underlying reason.
        source: std::io::Error,
    },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
