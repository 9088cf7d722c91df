//! This crate provides a non-blocking, rate-limit aware transport for
//! delivering events to a [Sentry]-compatible ingestion endpoint.
//!
//! The transport sits between an application's error capture layer and the
//! remote envelope endpoint. Its central contract is that the caller is
//! never blocked or interrupted by delivery: [`Transport::send`] performs
//! only in-memory work (rate limit lookups and serialization) and hands the
//! envelope to a background sender, returning a [`SendOutcome`] that states
//! whether the send was *initiated*. The eventual network result is
//! observable only through the leveled records emitted via the [`log`]
//! crate.
//!
//! Server-supplied backoff windows (`X-Sentry-Rate-Limits`, `Retry-After`,
//! bare `429`s) are tracked per event category by the [`RateLimiter`] and
//! gate future sends of that category synchronously, at negligible cost.
//!
//! # Examples
//!
//! ```
//! use sentry_transport::{Event, Transport, TransportOptions};
//!
//! let transport = Transport::new();
//! transport.configure(TransportOptions {
//!     dsn: "https://public@example.com/1".parse().ok(),
//!     ..Default::default()
//! })?;
//!
//! let outcome = transport.send(Event::new())?;
//! # let _ = outcome;
//! # Ok::<(), sentry_transport::TransportError>(())
//! ```
//!
//! # Features
//!
//! - `native-tls` (default): TLS support through the system library.
//! - `rustls`: TLS support through `rustls`.
//!
//! [Sentry]: https://sentry.io/

#![doc(html_favicon_url = "https://sentry-brand.storage.googleapis.com/favicon.ico")]
#![doc(html_logo_url = "https://sentry-brand.storage.googleapis.com/sentry-glyph-black.png")]
#![warn(missing_docs)]

mod auth;
mod constants;
mod dsn;
mod envelope;
mod options;
mod project_id;
mod protocol;
mod ratelimit;
mod sender;
mod transport;

pub use crate::auth::Auth;
pub use crate::constants::{ENVELOPE_CONTENT_TYPE, PROTOCOL_VERSION, USER_AGENT, VERSION};
pub use crate::dsn::{Dsn, DsnParseError, Scheme};
pub use crate::envelope::{EnvelopeSerializer, PayloadSerializer};
pub use crate::options::TransportOptions;
pub use crate::project_id::{ParseProjectIdError, ProjectId};
pub use crate::protocol::{Event, Level, PROFILE_KEY};
pub use crate::ratelimit::{RateLimitCategory, RateLimiter};
pub use crate::transport::{SendOutcome, Transport, TransportError};
