use std::sync::Arc;
use std::thread::{self, JoinHandle};

use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use url::Url;
use uuid::Uuid;

use crate::constants::ENVELOPE_CONTENT_TYPE;
use crate::options::TransportOptions;
use crate::ratelimit::RateLimiter;

/// One serialized envelope on its way to the ingestion endpoint.
pub(crate) struct EnvelopeRequest {
    pub event_id: Uuid,
    pub body: Vec<u8>,
}

/// Performs the non-blocking transmission of envelopes.
///
/// A dedicated worker thread runs a current-thread tokio runtime; envelopes
/// are handed over through an unbounded channel so the producer never waits.
/// Every envelope becomes its own detached task, bounded by the configured
/// connect and request timeouts.
pub(crate) struct HttpSender {
    jobs: Option<UnboundedSender<EnvelopeRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl HttpSender {
    pub fn new(
        options: &TransportOptions,
        url: Url,
        auth: String,
        rate_limiter: Arc<RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .user_agent(options.user_agent.to_string())
            .build()?;

        let (jobs, mut receiver) = unbounded_channel::<EnvelopeRequest>();
        let handle = thread::Builder::new()
            .name("sentry-transport".into())
            .spawn(move || {
                // create a runtime on the transport thread
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                rt.block_on(async move {
                    while let Some(EnvelopeRequest { event_id, body }) = receiver.recv().await {
                        let request = client
                            .post(url.clone())
                            .header("X-Sentry-Auth", auth.as_str())
                            .header(CONTENT_TYPE, ENVELOPE_CONTENT_TYPE)
                            .body(body)
                            .build();

                        // a request that cannot even be constructed never
                        // reaches the network; it is logged and dropped here
                        let request = match request {
                            Ok(request) => request,
                            Err(err) => {
                                log::error!(
                                    "failed to prepare envelope request for event {event_id}: {err}"
                                );
                                continue;
                            }
                        };

                        let client = client.clone();
                        let rl = rate_limiter.clone();
                        // each envelope is an independent task, completions
                        // may arrive in any order
                        tokio::spawn(async move {
                            match client.execute(request).await {
                                Ok(response) => handle_response(event_id, response, &rl).await,
                                Err(err) => {
                                    log::error!(
                                        "failed to send envelope for event {event_id}: {err}"
                                    );
                                }
                            }
                        });
                    }
                })
            })
            .ok();

        Ok(Self {
            jobs: Some(jobs),
            handle,
        })
    }

    /// Hands an envelope to the worker without waiting on it.
    pub fn send(&self, request: EnvelopeRequest) {
        if let Some(ref jobs) = self.jobs {
            // A failed hand-off means the worker is already gone (shutdown
            // in progress). Fire-and-forget accepts the dropped envelope;
            // failures of sends that did go out are reported by the
            // completion task itself.
            let _ = jobs.send(request);
        }
    }
}

impl Drop for HttpSender {
    fn drop(&mut self) {
        // closing the channel ends the worker loop; tasks still in flight
        // are abandoned together with the runtime
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

async fn handle_response(event_id: Uuid, response: reqwest::Response, rl: &RateLimiter) {
    let status = response.status();
    let headers = response.headers();

    if let Some(sentry_header) = headers
        .get("x-sentry-rate-limits")
        .and_then(|x| x.to_str().ok())
    {
        rl.update_from_sentry_header(sentry_header);
    } else if let Some(retry_after) = headers.get(RETRY_AFTER).and_then(|x| x.to_str().ok()) {
        rl.update_from_retry_after(retry_after);
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        rl.update_from_429();
    }

    let outcome = if status.is_success() {
        "success"
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        "rate limited"
    } else {
        "rejected"
    };
    log::info!(
        "envelope for event {event_id} completed: {outcome} (status {})",
        status.as_u16()
    );

    match response.text().await {
        Ok(text) if !text.is_empty() => log::debug!("server response: `{text}`"),
        Ok(_) => {}
        Err(err) => log::debug!("failed to read server response: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsn::Dsn;

    #[test]
    fn test_send_and_shutdown_do_not_block() {
        // nothing listens on this endpoint; the background failure must stay
        // in the background
        let dsn: Dsn = "http://public@127.0.0.1:1/1".parse().unwrap();
        let options = TransportOptions::default();
        let sender = HttpSender::new(
            &options,
            dsn.envelope_api_url(),
            dsn.to_auth(None).to_string(),
            Arc::new(RateLimiter::new()),
        )
        .unwrap();

        let started = std::time::Instant::now();
        sender.send(EnvelopeRequest {
            event_id: Uuid::new_v4(),
            body: b"{}\n".to_vec(),
        });
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
        drop(sender);
    }
}
