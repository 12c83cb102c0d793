//! Logged-in session with transparent re-authentication.
//!
//! The server signals an expired session by redirecting to the login page.
//! [`Session::get`] turns that redirect into a login followed by exactly one
//! retry, so callers only ever see the page they asked for or an error.

use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

use super::login;
use super::cookies::IssuedCookie;
use super::{AuthRecord, CookieJar};
use crate::api::transport::{RawResponse, RequestDescriptor, Transport};
use crate::api::{LoginError, ReqwestTransport, SessionError, TransportError};

/// Redirects into this path namespace mean the session has expired.
pub const LOGIN_NAMESPACE: &str = "/login/";

/// Result of a single request attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A final (non-redirect) response, whatever its status.
    Success(RawResponse),
    /// Redirected into the login namespace.
    ExpiredSession,
    /// Redirected anywhere else.
    ProtocolFault(String),
    Failure(TransportError),
}

impl FetchOutcome {
    /// Classify a response to a request for `request_url`.
    pub fn classify(request_url: &Url, response: RawResponse) -> Self {
        if !response.status.is_redirection() {
            return FetchOutcome::Success(response);
        }
        // A redirect status without a target is just a final response
        let Some(location) = response.location() else {
            return FetchOutcome::Success(response);
        };

        match request_url.join(location) {
            Ok(target) if target.path().starts_with(LOGIN_NAMESPACE) => FetchOutcome::ExpiredSession,
            Ok(target) => FetchOutcome::ProtocolFault(target.to_string()),
            Err(_) => FetchOutcome::ProtocolFault(location.to_string()),
        }
    }

    /// Body of a successful `200 OK` response, or the error this outcome represents.
    pub fn into_body(self) -> Result<Vec<u8>, SessionError> {
        match self {
            FetchOutcome::Success(response) if response.status == StatusCode::OK => Ok(response.body),
            FetchOutcome::Success(response) => Err(SessionError::HttpStatus {
                status: response.status,
            }),
            FetchOutcome::ExpiredSession => Err(SessionError::SessionExpired),
            FetchOutcome::ProtocolFault(target) => Err(SessionError::UnexpectedRedirect { target }),
            FetchOutcome::Failure(e) => Err(SessionError::Transport(e)),
        }
    }
}

/// Cookies set by `response` to a request for `request_url`.
pub(crate) fn response_cookies(response: &RawResponse, request_url: &Url) -> Vec<IssuedCookie> {
    response
        .set_cookie_headers()
        .filter_map(|h| IssuedCookie::parse(h, request_url))
        .collect()
}

/// One attempt at `request` with the cookies in `jar`. Returns the outcome and
/// every cookie the server set along the way; the jar itself is untouched.
pub(crate) async fn fetch_once<T: Transport + ?Sized>(
    transport: &T,
    jar: &CookieJar,
    request: &RequestDescriptor,
) -> (FetchOutcome, Vec<IssuedCookie>) {
    let cookie_header = jar.header_for(&request.url);
    trace!(method = %request.method, url = %request.url, cookies = cookie_header.is_some(), "Sending request");

    match transport.send(request, cookie_header.as_deref()).await {
        Ok(response) => {
            let cookies = response_cookies(&response, &request.url);
            (FetchOutcome::classify(&request.url, response), cookies)
        }
        Err(e) => (FetchOutcome::Failure(e), Vec::new()),
    }
}

/// A single logical session against the site.
///
/// Every operation takes `&mut self`; a session is used serially by whoever
/// owns it. Wrap it in a mutex to share it between tasks.
pub struct Session<T = ReqwestTransport> {
    transport: T,
    jar: CookieJar,
    record: AuthRecord,
}

impl<T: Transport> Session<T> {
    /// Start a session for `record`, seeding the jar with its saved cookies.
    pub fn new(record: AuthRecord, base_url: Url, transport: T) -> Self {
        let jar = CookieJar::with_cookies(base_url, record.cookies.iter().cloned());
        debug!(username = %record.username, cookies = jar.len(), "Session created");
        Self {
            transport,
            jar,
            record,
        }
    }

    pub fn base_url(&self) -> &Url {
        self.jar.base_url()
    }

    pub fn record(&self) -> &AuthRecord {
        &self.record
    }

    /// Resolve a site-relative path (with optional query) against the base URL.
    pub fn url(&self, path_and_query: &str) -> Result<Url, SessionError> {
        site_url(self.base_url(), path_and_query)
    }

    /// GET `url`, logging in and retrying once if the session has expired.
    pub async fn get(&mut self, url: &Url) -> Result<Vec<u8>, SessionError> {
        let request = RequestDescriptor::get(url.clone());
        let mut logged_in = false;

        loop {
            match self.fetch(&request).await {
                FetchOutcome::ExpiredSession if !logged_in => {
                    debug!(url = %url, "Session expired; logging in");
                    self.login().await?;
                    logged_in = true;
                }
                FetchOutcome::ExpiredSession => {
                    debug!(url = %url, "Session expired again after login; giving up");
                    return Err(SessionError::SessionExpired);
                }
                outcome => return outcome.into_body(),
            }
        }
    }

    /// Single attempt at `request`. Cookies the server sets are applied.
    pub async fn fetch(&mut self, request: &RequestDescriptor) -> FetchOutcome {
        let (outcome, cookies) = fetch_once(&self.transport, &self.jar, request).await;
        if !cookies.is_empty() {
            self.jar.apply(cookies);
        }
        outcome
    }

    /// Run the login flow. The cookies it collected are applied even when
    /// it fails.
    pub async fn login(&mut self) -> Result<(), LoginError> {
        let attempt = login::login(&self.transport, &self.jar, &self.record).await;
        debug!(
            username = %self.record.username,
            cookies = attempt.cookies.len(),
            ok = attempt.result.is_ok(),
            "Login finished"
        );
        self.apply_cookies(attempt.cookies);
        attempt.result
    }

    /// Apply server-issued cookies and refresh the record's cookie list.
    pub fn apply_cookies(&mut self, cookies: impl IntoIterator<Item = IssuedCookie>) {
        self.jar.apply(cookies);
        self.record.cookies = self.jar.cookies();
    }

    /// The record as it should be persisted now: same credentials, the jar's
    /// current cookies for the site.
    pub fn snapshot(&mut self) -> AuthRecord {
        self.record.cookies = self.jar.cookies();
        self.record.clone()
    }
}

/// Join a site-relative path onto `base`.
pub(crate) fn site_url(base: &Url, path_and_query: &str) -> Result<Url, SessionError> {
    base.join(path_and_query)
        .map_err(|source| SessionError::InvalidUrl {
            url: path_and_query.to_string(),
            source,
        })
}
