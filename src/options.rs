use std::borrow::Cow;
use std::time::Duration;

use crate::constants::USER_AGENT;
use crate::dsn::Dsn;

/// Configuration settings for the transport.
///
/// # Examples
///
/// ```
/// let options = sentry_transport::TransportOptions {
///     dsn: "https://public@example.com/1".parse().ok(),
///     ..Default::default()
/// };
/// assert!(options.dsn.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct TransportOptions {
    /// The DSN to use.  If not set the transport is effectively disabled.
    pub dsn: Option<Dsn>,
    /// The user agent that should be reported.
    pub user_agent: Cow<'static, str>,
    /// How long the background send may take to establish a connection.
    pub connect_timeout: Duration,
    /// How long one background send may take overall before it is abandoned
    /// and treated as a failure.
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> TransportOptions {
        TransportOptions {
            dsn: None,
            user_agent: Cow::Borrowed(USER_AGENT),
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TransportOptions::default();
        assert!(options.dsn.is_none());
        assert!(options.user_agent.starts_with("sentry-transport/"));
        assert_eq!(options.connect_timeout, Duration::from_secs(1));
        assert_eq!(options.request_timeout, Duration::from_secs(2));
    }
}
