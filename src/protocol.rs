use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The metadata key under which profiling data travels with an event.
pub const PROFILE_KEY: &str = "profile";

/// Represents the level of severity of an event or breadcrumb.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Indicates very spammy debug information.
    Debug,
    /// Informational messages.
    Info,
    /// A warning.
    Warning,
    /// An error.
    Error,
    /// Similar to error but indicates a critical event that usually causes a shutdown.
    Fatal,
}

impl Default for Level {
    fn default() -> Level {
        Level::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
        }
    }
}

fn default_ty() -> Cow<'static, str> {
    Cow::Borrowed("event")
}

/// Represents a full event for Sentry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The ID of the event
    #[serde(default = "Uuid::nil")]
    pub event_id: Uuid,
    /// The level of the event (defaults to error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// The envelope item type of this event (`"event"`, `"transaction"`, ...).
    #[serde(rename = "type", default = "default_ty")]
    pub ty: Cow<'static, str>,
    /// Optionally a log message that is attached to the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arbitrary metadata the client attached to the event.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Event {
    fn default() -> Self {
        Event {
            event_id: Uuid::nil(),
            level: None,
            ty: default_ty(),
            message: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Event {
    /// Creates a new event with a random ID.
    pub fn new() -> Event {
        Event {
            event_id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    /// Returns `true` if profiling data is attached to this event.
    pub fn has_profile(&self) -> bool {
        self.extra.contains_key(PROFILE_KEY)
    }

    /// Removes and returns the attached profiling data, if any.
    pub fn take_profile(&mut self) -> Option<Value> {
        self.extra.remove(PROFILE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serde() {
        assert_eq!(serde_json::to_string(&Level::Warning).unwrap(), "\"warning\"");
        let level: Level = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, Level::Fatal);
    }

    #[test]
    fn test_event_defaults() {
        let event = Event::default();
        assert!(event.event_id.is_nil());
        assert_eq!(event.ty, "event");
        assert!(!event.has_profile());

        let event = Event::new();
        assert!(!event.event_id.is_nil());
    }

    #[test]
    fn test_take_profile() {
        let mut event = Event::new();
        event
            .extra
            .insert(PROFILE_KEY.into(), serde_json::json!({"samples": []}));
        assert!(event.has_profile());
        assert!(event.take_profile().is_some());
        assert!(!event.has_profile());
        assert!(event.take_profile().is_none());
    }

    #[test]
    fn test_event_serialization() {
        let mut event = Event::default();
        event.level = Some(Level::Error);
        event.message = Some("Hello World!".into());
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            "{\"event_id\":\"00000000-0000-0000-0000-000000000000\",\
             \"level\":\"error\",\"type\":\"event\",\"message\":\"Hello World!\"}"
        );
    }
}
