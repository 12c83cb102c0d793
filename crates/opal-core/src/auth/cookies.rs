//! Session cookies and the site-scoped cookie jar.
//!
//! The jar is a plain value owned by the [`Session`](super::Session), backed
//! by a `cookie_store::CookieStore`. Responses never mutate it behind the
//! session's back: `Set-Cookie` headers become [`IssuedCookie`] values that
//! are applied explicitly with [`CookieJar::apply`].
//!
//! [`Cookie`] is the persisted form kept in an [`AuthRecord`](super::AuthRecord).
//! It is converted to and from the store at the jar's boundary.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use cookie_store::{CookieDomain, CookieExpiration, CookieStore, RawCookie};
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

/// A cookie as persisted in the auth record.
///
/// The value is redacted in Debug output so a session never ends up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    value: String,
    /// Domain without a leading dot.
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Absolute expiry. `None` is a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Sent only to `domain` itself, not its subdomains.
    #[serde(default)]
    pub host_only: bool,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Create a host-only session cookie for `domain` with path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_cookie_path(),
            expires: None,
            secure: false,
            http_only: false,
            host_only: true,
        }
    }

    /// Set an absolute expiry time.
    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set the path scope.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the cookie value. Avoid logging it.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The `Set-Cookie` header that recreates this cookie. Host-only
    /// cookies carry no `Domain` attribute.
    fn to_set_cookie(&self) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.value, self.path);
        if !self.host_only {
            header.push_str(&format!("; Domain={}", self.domain));
        }
        if let Some(expires) = self.expires {
            let at = httpdate::fmt_http_date(SystemTime::from(expires));
            header.push_str(&format!("; Expires={at}"));
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }

    fn from_stored(stored: &cookie_store::Cookie<'static>) -> Option<Self> {
        let (domain, host_only) = match &stored.domain {
            CookieDomain::HostOnly(d) => (d.clone(), true),
            CookieDomain::Suffix(d) => (d.clone(), false),
            _ => return None,
        };
        let expires = match &stored.expires {
            CookieExpiration::AtUtc(at) => DateTime::from_timestamp(at.unix_timestamp(), 0),
            CookieExpiration::SessionEnd => None,
        };
        Some(Self {
            name: stored.name().to_string(),
            value: stored.value().to_string(),
            domain,
            path: String::from(&stored.path),
            expires,
            secure: stored.secure().unwrap_or(false),
            http_only: stored.http_only().unwrap_or(false),
            host_only,
        })
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("host_only", &self.host_only)
            .finish()
    }
}

/// A cookie set by the server, together with the URL of the request it
/// answered. Scope defaults are resolved when it is applied to a jar.
#[derive(Clone)]
pub struct IssuedCookie {
    raw: RawCookie<'static>,
    request_url: Url,
}

impl IssuedCookie {
    /// Parse a `Set-Cookie` header value received in response to `request_url`.
    ///
    /// Returns `None` for malformed headers and for a `Domain` attribute that
    /// names a public suffix other than the request host itself.
    pub fn parse(header: &str, request_url: &Url) -> Option<Self> {
        let raw = match RawCookie::parse(header.to_string()) {
            Ok(raw) => raw,
            Err(e) => {
                trace!(error = %e, "Ignoring malformed Set-Cookie header");
                return None;
            }
        };

        if let Some(domain) = raw.domain() {
            let domain = domain.trim_start_matches('.').to_ascii_lowercase();
            let host = request_url.host_str().unwrap_or_default().to_ascii_lowercase();
            if domain != host && psl::suffix_str(&domain) == Some(domain.as_str()) {
                trace!(cookie = raw.name(), domain = %domain, "Ignoring cookie for public suffix");
                return None;
            }
        }

        Some(Self {
            raw,
            request_url: request_url.clone(),
        })
    }

    pub fn name(&self) -> &str {
        self.raw.name()
    }
}

impl fmt::Debug for IssuedCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCookie")
            .field("name", &self.raw.name())
            .field("value", &"[REDACTED]")
            .field("request_url", &self.request_url.as_str())
            .finish()
    }
}

/// Cookie state for one site, keyed on the site's base URL.
#[derive(Debug, Clone)]
pub struct CookieJar {
    base_url: Url,
    store: CookieStore,
}

impl CookieJar {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            store: CookieStore::default(),
        }
    }

    /// Seed a jar from persisted cookies. Cookies with no domain are bound
    /// to the base URL's host; host-only cookies for other hosts are dropped.
    pub fn with_cookies(base_url: Url, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let host = base_url.host_str().unwrap_or_default().to_ascii_lowercase();
        let mut jar = Self::new(base_url);
        let seeded: Vec<IssuedCookie> = cookies
            .into_iter()
            .filter_map(|mut c| {
                if c.domain.is_empty() {
                    c.domain = host.clone();
                    c.host_only = true;
                }
                if c.host_only && c.domain != host {
                    trace!(cookie = %c.name, domain = %c.domain, "Dropping saved cookie for another host");
                    return None;
                }
                IssuedCookie::parse(&c.to_set_cookie(), jar.base_url())
            })
            .collect();
        jar.apply(seeded);
        jar
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Apply cookies issued by the server, in order. A later cookie replaces
    /// an earlier one with the same name, domain and path; an already-expired
    /// cookie deletes it.
    pub fn apply(&mut self, cookies: impl IntoIterator<Item = IssuedCookie>) {
        for cookie in cookies {
            match self.store.insert_raw(&cookie.raw, &cookie.request_url) {
                Ok(action) => trace!(cookie = cookie.name(), ?action, "Applied cookie"),
                Err(e) => trace!(cookie = cookie.name(), error = %e, "Rejected cookie"),
            }
        }
    }

    /// The `Cookie` request header for `url`, or `None` when nothing matches.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .store
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Live cookies scoped to the base URL's host, in persisted form.
    pub fn cookies(&self) -> Vec<Cookie> {
        let host = self.base_url.host_str().unwrap_or_default().to_ascii_lowercase();
        self.store
            .iter_unexpired()
            .filter_map(Cookie::from_stored)
            .filter(|c| {
                if c.host_only {
                    c.domain == host
                } else {
                    host == c.domain || host.ends_with(&format!(".{}", c.domain))
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.iter_unexpired().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
