use std::fmt;

/// Represents an `X-Sentry-Auth` header.
///
/// The header carries the protocol version and the public key of the dsn the
/// request is authorized by, and optionally identifies the sending client.
#[derive(Clone, Debug)]
pub struct Auth {
    version: u16,
    key: String,
    client: Option<String>,
}

impl Auth {
    pub(crate) fn new(version: u16, key: String, client: Option<String>) -> Auth {
        Auth {
            version,
            key,
            client,
        }
    }

    /// Returns the protocol version the client speaks
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Returns the public key
    pub fn public_key(&self) -> &str {
        &self.key
    }

    /// Returns the client's agent
    pub fn client_agent(&self) -> Option<&str> {
        self.client.as_deref()
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Sentry sentry_version={}, sentry_key={}",
            self.version, self.key
        )?;
        if let Some(ref client) = self.client {
            write!(f, ", sentry_client={}", client)?;
        }
        Ok(())
    }
}
