//! Decode status and the classified failure kinds a trust authority can
//! report.

use std::fmt;

/// Status code reserved for "decode not yet attempted".
const PENDING_CODE: i32 = -1;

/// A specific, enumerated reason a decode did not succeed.
///
/// These are the trust authority's verdict codes, distinct from the fatal
/// pipeline errors in [`crate::Error`]: a classified failure flows through
/// the pipeline as ordinary data and ends up as the process exit status.
/// Codes are stable; codes this build does not recognize are carried
/// through verbatim as [`FailureKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Generic internal failure. Fatal pipeline errors also exit with this
    /// code.
    Internal,
    /// The trust authority could not be reached.
    Unavailable,
    /// The trust authority's response could not be understood.
    Protocol,
    /// The credential encoding is malformed.
    BadFormat,
    /// The credential's authentication check failed.
    BadSignature,
    /// The credential has expired.
    Expired,
    /// The credential was issued in the future (rewound clock).
    Rewound,
    /// The credential was already presented once (replay).
    Replayed,
    /// The presenting client is not authorized to decode this credential.
    Unauthorized,
    /// A classified code this build does not recognize, forwarded verbatim.
    Other(u8),
}

impl FailureKind {
    /// The stable numeric code for this failure kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Internal => 1,
            Self::Unavailable => 2,
            Self::Protocol => 3,
            Self::BadFormat => 4,
            Self::BadSignature => 5,
            Self::Expired => 6,
            Self::Rewound => 7,
            Self::Replayed => 8,
            Self::Unauthorized => 9,
            Self::Other(code) => code,
        }
    }

    /// Maps a wire status code to a failure kind.
    ///
    /// Zero is the success code and is not a failure kind; callers must
    /// handle it before mapping. Unrecognized codes become
    /// [`FailureKind::Other`] so the exit status still matches the
    /// authority's verdict.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Internal,
            2 => Self::Unavailable,
            3 => Self::Protocol,
            4 => Self::BadFormat,
            5 => Self::BadSignature,
            6 => Self::Expired,
            7 => Self::Rewound,
            8 => Self::Replayed,
            9 => Self::Unauthorized,
            code => Self::Other(code),
        }
    }

    /// Fixed human-readable status text for this failure kind.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Internal => "Internal error",
            Self::Unavailable => "Trust authority unavailable",
            Self::Protocol => "Bad trust authority response",
            Self::BadFormat => "Bad credential format",
            Self::BadSignature => "Credential signature check failed",
            Self::Expired => "Credential expired",
            Self::Rewound => "Credential issued in the future",
            Self::Replayed => "Credential replayed",
            Self::Unauthorized => "Credential decode unauthorized",
            Self::Other(_) => "Unrecognized failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Outcome of the single decode call for one invocation.
///
/// Tri-state: an invocation starts [`Pending`](Self::Pending) and moves to
/// exactly one of [`Success`](Self::Success) or [`Failed`](Self::Failed)
/// after the trust authority has been asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeStatus {
    /// Decode has not been attempted yet.
    #[default]
    Pending,
    /// The credential was validated and decoded.
    Success,
    /// The trust authority reported a classified failure.
    Failed(FailureKind),
}

impl DecodeStatus {
    /// The numeric status code: `0` for success, the classified code for a
    /// failure, and `-1` while the decode has not been attempted.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Pending => PENDING_CODE,
            Self::Success => 0,
            Self::Failed(kind) => kind.code() as i32,
        }
    }

    /// Fixed human-readable status text.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Pending => "Not yet attempted",
            Self::Success => "Success",
            Self::Failed(kind) => kind.text(),
        }
    }

    /// Whether the decode succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
