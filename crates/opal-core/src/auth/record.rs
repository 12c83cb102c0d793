use std::fmt;

use serde::{Deserialize, Serialize};

use super::Cookie;

/// Persisted identity of a session: credentials plus the last-known cookies.
///
/// Credentials are opaque and never change at runtime; only `cookies` does.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

impl AuthRecord {
    /// A record with credentials and no session yet.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            cookies: Vec::new(),
        }
    }

    /// Same credentials, different cookie set.
    pub fn with_cookies(&self, cookies: Vec<Cookie>) -> Self {
        Self {
            username: self.username.clone(),
            password: self.password.clone(),
            cookies,
        }
    }
}

impl fmt::Debug for AuthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRecord")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("cookies", &self.cookies)
            .finish()
    }
}
