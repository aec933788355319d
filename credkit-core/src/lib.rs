#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

//! Decode-orchestration pipeline for the `credkit` credential-verification
//! tool.
//!
//! A previously issued credential is an opaque blob; only the local trust
//! authority can validate and decode it. This crate owns everything on the
//! client side of that boundary: reading the credential bytes, making the
//! single decode call, rendering the selected verdict metadata, emitting
//! the recovered payload, and scrubbing sensitive buffers on teardown.
//!
//! The authority itself (wire format of the credential, cryptography, key
//! management) is out of scope; it is reached through the
//! [`TrustAuthority`] trait, with [`SocketAuthority`] as the stock
//! Unix-domain-socket client.

mod attribute;
pub use attribute::*;

mod authority;
pub use authority::*;

mod error;
pub use error::*;

mod render;

mod emit;

mod pipeline;
pub use pipeline::*;

mod router;

mod session;
pub use session::*;

mod status;
pub use status::*;
