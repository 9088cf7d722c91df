use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use httpdate::parse_http_date;

/// The Category of payload that a Rate Limit refers to.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RateLimitCategory {
    /// Rate Limit pertaining to Errors.
    Error,
    /// Rate Limit pertaining to Sessions.
    Session,
    /// Rate Limit pertaining to Transactions.
    Transaction,
    /// Rate Limit pertaining to Profiles.
    Profile,
}

impl RateLimitCategory {
    /// Returns the category that limits events of the given envelope item type.
    pub fn for_item_type(ty: &str) -> RateLimitCategory {
        match ty {
            "session" => RateLimitCategory::Session,
            "transaction" => RateLimitCategory::Transaction,
            "profile" => RateLimitCategory::Profile,
            _ => RateLimitCategory::Error,
        }
    }
}

impl fmt::Display for RateLimitCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RateLimitCategory::Error => write!(f, "error"),
            RateLimitCategory::Session => write!(f, "session"),
            RateLimitCategory::Transaction => write!(f, "transaction"),
            RateLimitCategory::Profile => write!(f, "profile"),
        }
    }
}

#[derive(Debug, Default)]
struct Limits {
    global: Option<SystemTime>,
    error: Option<SystemTime>,
    session: Option<SystemTime>,
    transaction: Option<SystemTime>,
    profile: Option<SystemTime>,
}

// Server-supplied windows only ever widen; a shorter retry-after must not
// cut an existing window short.
fn extend(slot: &mut Option<SystemTime>, new_time: SystemTime) {
    if slot.map_or(true, |existing| new_time > existing) {
        *slot = Some(new_time);
    }
}

/// A Utility that helps with rate limiting sentry requests.
///
/// The expiry slots are read on the caller path and written from background
/// completion tasks, so all state lives behind a mutex and every read or
/// write is a single locked step. Expired slots are left in place; they
/// simply read as not-limited until a later response overwrites them.
#[derive(Debug, Default)]
pub struct RateLimiter {
    limits: Mutex<Limits>,
}

impl RateLimiter {
    /// Create a new RateLimiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the RateLimiter with information from a `Retry-After` header.
    pub fn update_from_retry_after(&self, header: &str) {
        let new_time = if let Ok(value) = header.parse::<f64>() {
            Some(SystemTime::now() + Duration::from_secs(value.ceil() as u64))
        } else if let Ok(value) = parse_http_date(header) {
            Some(value)
        } else {
            None
        };

        if let Some(new_time) = new_time {
            let mut limits = self.limits.lock().unwrap();
            extend(&mut limits.global, new_time);
        }
    }

    /// Updates the RateLimiter with information from a `X-Sentry-Rate-Limits` header.
    pub fn update_from_sentry_header(&self, header: &str) {
        // <rate-limit> = (<group>,)+
        // <group> = <time>:(<category>;)+:<scope>(:<reason>)?

        let parse_group = |group: &str| {
            let mut splits = group.split(':');
            let seconds = splits.next()?.parse::<f64>().ok()?;
            let categories = splits.next()?;
            let _scope = splits.next()?;

            let new_time = SystemTime::now() + Duration::from_secs(seconds.ceil() as u64);

            let mut limits = self.limits.lock().unwrap();
            if categories.is_empty() {
                extend(&mut limits.global, new_time);
            }

            for category in categories.split(';') {
                match category {
                    "error" => extend(&mut limits.error, new_time),
                    "session" => extend(&mut limits.session, new_time),
                    "transaction" => extend(&mut limits.transaction, new_time),
                    "profile" => extend(&mut limits.profile, new_time),
                    _ => {}
                }
            }
            Some(())
        };

        for group in header.split(',') {
            parse_group(group.trim());
        }
    }

    /// Updates the RateLimiter after a `429` response that carried neither
    /// rate limit header, using a default backoff window.
    pub fn update_from_429(&self) {
        let new_time = SystemTime::now() + Duration::from_secs(60);
        let mut limits = self.limits.lock().unwrap();
        extend(&mut limits.global, new_time);
    }

    /// Query the RateLimiter for a certain category of event.
    ///
    /// Returns the time left in the active window, if any. This is a pure
    /// read with no side effects.
    pub fn is_disabled(&self, category: RateLimitCategory) -> Option<Duration> {
        let limits = self.limits.lock().unwrap();
        if let Some(ts) = limits.global {
            let time_left = ts.duration_since(SystemTime::now()).ok();
            if time_left.is_some() {
                return time_left;
            }
        }
        let time_left = match category {
            RateLimitCategory::Error => limits.error,
            RateLimitCategory::Session => limits.session,
            RateLimitCategory::Transaction => limits.transaction,
            RateLimitCategory::Profile => limits.profile,
        }?;
        time_left.duration_since(SystemTime::now()).ok()
    }

    /// Returns `true` iff the category is currently inside a limit window.
    pub fn is_limited(&self, category: RateLimitCategory) -> bool {
        self.is_disabled(category).is_some()
    }
}
