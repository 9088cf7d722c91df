/// The version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The user agent reported to the ingestion endpoint.
pub const USER_AGENT: &str = concat!("sentry-transport/", env!("CARGO_PKG_VERSION"));

/// The sentry protocol version spoken by this transport.
pub const PROTOCOL_VERSION: u16 = 7;

/// The media type of a serialized envelope.
pub const ENVELOPE_CONTENT_TYPE: &str = "application/x-sentry-envelope";
