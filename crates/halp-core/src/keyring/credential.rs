//! Credential type and its serialized backend value

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use subtle::ConstantTimeEq;

/// Separator between expiry and secret in a stored value
pub const VALUE_SEPARATOR: &str = "  ";

/// Lifetime given to freshly prompted tokens
pub const TOKEN_LIFETIME_HOURS: i64 = 720;

/// An expiring secret owned by a user
#[derive(Clone)]
pub struct Credential {
    /// Owning username
    pub username: String,
    password: SecretString,
    /// Absolute expiry, unix seconds
    pub expire: i64,
}

impl Credential {
    /// Create a new credential
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, expire: i64) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            expire,
        }
    }

    /// Get the secret value
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Expired once `now` reaches the expiry instant
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire <= now
    }

    /// Expired relative to the system clock
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Expiry as a timestamp, if representable
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expire, 0)
    }

    /// Expiry for a token created at `now`
    #[must_use]
    pub fn expiry_from(now: i64) -> i64 {
        now + TOKEN_LIFETIME_HOURS * 3600
    }

    /// Encode as `"<expire>  <secret>"`
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.expire, VALUE_SEPARATOR, self.password())
    }

    /// Decode a stored value; the username is left empty for the caller to fill
    pub fn decode(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(VALUE_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(Error::Decode(format!(
                "expected 2 parts, got {}",
                parts.len()
            )));
        }

        let expire = parts[0]
            .parse::<i64>()
            .map_err(|e| Error::Decode(format!("invalid expiry {:?}: {}", parts[0], e)))?;

        Ok(Self::new(String::new(), parts[1], expire))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("expire", &self.expire)
            .finish()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        let same_secret: bool = self
            .password()
            .as_bytes()
            .ct_eq(other.password().as_bytes())
            .into();
        same_secret && self.username == other.username && self.expire == other.expire
    }
}

impl Eq for Credential {}
