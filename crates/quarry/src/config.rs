//! Connection settings.
//!
//! Settings come from a connection URI of the form
//! `rethinkdb://[:auth_key@]host[:port]/db`, or from any serde format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

use crate::error::ConfigError;

/// URI scheme accepted by [`ConnectionConfig::from_uri`].
pub const SCHEME: &str = "rethinkdb";

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 28015;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Where and how to connect to the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub db: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
}

impl ConnectionConfig {
    /// Settings for `db` on `host`, default port and no auth key.
    pub fn new(host: impl Into<String>, db: impl Into<String>) -> Self {
        ConnectionConfig {
            host: host.into(),
            port: DEFAULT_PORT,
            db: db.into(),
            auth_key: None,
        }
    }

    /// Parses a connection URI.
    ///
    /// ```
    /// use quarry::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_uri("rethinkdb://:secret@db.local/blog").unwrap();
    /// assert_eq!(config.host, "db.local");
    /// assert_eq!(config.port, 28015);
    /// assert_eq!(config.db, "blog");
    /// assert_eq!(config.auth_key.as_deref(), Some("secret"));
    /// ```
    pub fn from_uri(uri: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(uri)?;

        if parsed.scheme() != SCHEME {
            return Err(ConfigError::UnsupportedScheme {
                scheme: parsed.scheme().to_string(),
            });
        }

        let db = parsed.path().trim_start_matches('/');
        if db.is_empty() {
            return Err(ConfigError::MissingDatabase {
                uri: uri.to_string(),
            });
        }

        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ConfigError::MissingHost {
                uri: uri.to_string(),
            })?;

        Ok(ConnectionConfig {
            host: host.to_string(),
            port: parsed.port().unwrap_or(DEFAULT_PORT),
            db: db.to_string(),
            auth_key: parsed.password().map(decode_auth_key).transpose()?,
        })
    }

    /// Renders the settings back into a connection URI.
    ///
    /// The auth key is percent-encoded, so any key survives
    /// [`from_uri`](Self::from_uri).
    pub fn to_uri(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse(&format!("{SCHEME}://{}:{}/{}", self.host, self.port, self.db))?;
        if let Some(key) = &self.auth_key {
            let encoded = utf8_percent_encode(key, NON_ALPHANUMERIC).to_string();
            url.set_password(Some(&encoded))
                .map_err(|()| ConfigError::MissingHost {
                    uri: url.to_string(),
                })?;
        }
        Ok(url.into())
    }
}

fn decode_auth_key(encoded: &str) -> Result<String, ConfigError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|_| ConfigError::InvalidAuthKey)
}

impl FromStr for ConnectionConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionConfig::from_uri(s)
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}:{}/{}", self.host, self.port, self.db)
    }
}
