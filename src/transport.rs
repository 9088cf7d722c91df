use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::envelope::{EnvelopeSerializer, PayloadSerializer};
use crate::options::TransportOptions;
use crate::protocol::Event;
use crate::ratelimit::{RateLimitCategory, RateLimiter};
use crate::sender::{EnvelopeRequest, HttpSender};

/// The synchronous result of initiating a send.
///
/// This reflects whether the background send was *initiated*, not whether it
/// eventually succeeded. The network outcome is only observable through the
/// log records emitted by the completion handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    /// The envelope was handed to the background sender.
    Sent,
    /// No DSN is configured, nothing was attempted.
    Skipped,
    /// The event's category is inside an active rate limit window.
    RateLimited,
}

/// Errors surfaced by [`Transport::configure`] and [`Transport::send`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Raised when `send` is called before the transport was configured.
    #[error("transport has not been configured")]
    Unconfigured,
    /// Raised when `configure` is called a second time.
    #[error("transport was already configured")]
    AlreadyConfigured,
    /// Raised when the http client could not be constructed.
    #[error("failed to initialize http client")]
    Http(#[source] reqwest::Error),
}

struct Inner {
    serializer: Arc<dyn PayloadSerializer>,
    rate_limiter: Arc<RateLimiter>,
    sender: Option<HttpSender>,
}

/// A non-blocking transport for sentry events.
///
/// The transport is constructed unbound and configured exactly once; the
/// bindings are immutable afterwards. Every [`send`](Transport::send) call
/// that passes the configuration and rate limit gates hands its envelope to
/// a background sender and returns immediately — delivery problems never
/// reach the caller.
///
/// # Examples
///
/// ```
/// use sentry_transport::{Transport, TransportOptions};
///
/// let transport = Transport::new();
/// transport
///     .configure(TransportOptions {
///         dsn: "https://public@example.com/1".parse().ok(),
///         ..Default::default()
///     })
///     .unwrap();
/// ```
#[derive(Default)]
pub struct Transport {
    inner: OnceLock<Inner>,
}

impl Transport {
    /// Creates a new unconfigured transport.
    pub fn new() -> Transport {
        Transport {
            inner: OnceLock::new(),
        }
    }

    /// Binds client options with the default envelope serializer and a fresh
    /// rate limiter.
    pub fn configure(&self, options: TransportOptions) -> Result<(), TransportError> {
        self.configure_with(
            options,
            Arc::new(EnvelopeSerializer),
            Arc::new(RateLimiter::new()),
        )
    }

    /// Binds client options together with an explicit serializer and rate
    /// limiter.
    ///
    /// The transport binds exactly once; a second call fails with
    /// [`TransportError::AlreadyConfigured`]. If the options carry a DSN,
    /// the endpoint and the background sender are created here so that every
    /// later `send` only performs in-memory work on the caller thread.
    pub fn configure_with(
        &self,
        options: TransportOptions,
        serializer: Arc<dyn PayloadSerializer>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Result<(), TransportError> {
        let sender = match options.dsn {
            Some(ref dsn) => Some(
                HttpSender::new(
                    &options,
                    dsn.envelope_api_url(),
                    dsn.to_auth(None).to_string(),
                    rate_limiter.clone(),
                )
                .map_err(TransportError::Http)?,
            ),
            None => None,
        };

        let inner = Inner {
            serializer,
            rate_limiter,
            sender,
        };
        self.inner
            .set(inner)
            .map_err(|_| TransportError::AlreadyConfigured)
    }

    /// Initiates the delivery of an event.
    ///
    /// The call never waits on the network. The returned outcome states
    /// whether a background send was started, or why it was not; the only
    /// error is a missing configuration.
    pub fn send(&self, mut event: Event) -> Result<SendOutcome, TransportError> {
        let inner = self.inner.get().ok_or(TransportError::Unconfigured)?;

        if event.event_id.is_nil() {
            event.event_id = Uuid::new_v4();
        }

        let sender = match inner.sender {
            Some(ref sender) => sender,
            None => {
                log::info!("skipped sending event {}: no DSN configured", event.event_id);
                return Ok(SendOutcome::Skipped);
            }
        };

        let category = RateLimitCategory::for_item_type(&event.ty);
        if let Some(time_left) = inner.rate_limiter.is_disabled(category) {
            log::warn!(
                "skipped sending event {}: rate limits for {category} are active for {}s",
                event.event_id,
                time_left.as_secs()
            );
            return Ok(SendOutcome::RateLimited);
        }

        // a profile limit does not reject the event, it only travels without
        // its profiling data
        if event.has_profile() && inner.rate_limiter.is_limited(RateLimitCategory::Profile) {
            event.take_profile();
            log::warn!(
                "removed profiling data from event {}: rate limits for profile are active",
                event.event_id
            );
        }

        match inner.serializer.serialize(&event) {
            Ok(body) => {
                log::info!("sending envelope for event {}", event.event_id);
                sender.send(EnvelopeRequest {
                    event_id: event.event_id,
                    body,
                });
            }
            Err(err) => {
                // only a missing configuration may interrupt the caller;
                // everything past that gate becomes a log record
                log::error!("failed to serialize event {}: {err}", event.event_id);
            }
        }
        Ok(SendOutcome::Sent)
    }

    /// Shuts the transport down.
    ///
    /// Always reports success immediately: sends are fire-and-forget, so
    /// there is no queued state to drain within the given timeout.
    pub fn close(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_options() -> TransportOptions {
        TransportOptions {
            dsn: "http://public@127.0.0.1:1/1".parse().ok(),
            ..Default::default()
        }
    }

    #[test]
    fn test_send_before_configure_fails() {
        let transport = Transport::new();
        assert!(matches!(
            transport.send(Event::new()),
            Err(TransportError::Unconfigured)
        ));
    }

    #[test]
    fn test_configure_binds_once() {
        let transport = Transport::new();
        transport.configure(TransportOptions::default()).unwrap();
        assert!(matches!(
            transport.configure(TransportOptions::default()),
            Err(TransportError::AlreadyConfigured)
        ));
    }

    #[test]
    fn test_send_without_dsn_is_skipped() {
        let transport = Transport::new();
        transport.configure(TransportOptions::default()).unwrap();
        assert_eq!(transport.send(Event::new()).unwrap(), SendOutcome::Skipped);
    }

    #[test]
    fn test_limited_category_is_rejected() {
        let transport = Transport::new();
        let rate_limiter = Arc::new(RateLimiter::new());
        rate_limiter.update_from_sentry_header("60:error:organization");
        transport
            .configure_with(
                unreachable_options(),
                Arc::new(EnvelopeSerializer),
                rate_limiter,
            )
            .unwrap();

        assert_eq!(
            transport.send(Event::new()).unwrap(),
            SendOutcome::RateLimited
        );
    }

    #[test]
    fn test_category_check_precedes_profile_strip() {
        // an event whose own category is "profile" is rejected outright; its
        // profiling data is never inspected or stripped
        let transport = Transport::new();
        let rate_limiter = Arc::new(RateLimiter::new());
        rate_limiter.update_from_sentry_header("60:profile:organization");
        transport
            .configure_with(
                unreachable_options(),
                Arc::new(EnvelopeSerializer),
                rate_limiter,
            )
            .unwrap();

        let mut event = Event::new();
        event.ty = "profile".into();
        event
            .extra
            .insert(crate::protocol::PROFILE_KEY.into(), serde_json::json!({}));
        assert_eq!(transport.send(event).unwrap(), SendOutcome::RateLimited);
    }

    #[test]
    fn test_close_succeeds_immediately() {
        let transport = Transport::new();
        transport.configure(unreachable_options()).unwrap();
        transport.send(Event::new()).unwrap();

        let started = std::time::Instant::now();
        assert!(transport.close(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
