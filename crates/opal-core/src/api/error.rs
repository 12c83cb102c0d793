use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::StoreError;
use crate::parse::ParseError;

/// Failure to complete one HTTP exchange.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Send(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// For transports not backed by reqwest
    #[error("transport error: {0}")]
    Other(String),
}

/// Failure of the credential exchange, tagged by the step that failed.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("GETting login form: {0}")]
    FetchForm(#[source] Box<SessionError>),

    /// The login page itself redirected into the login namespace.
    #[error("GETting login form: login page redirected back to the login namespace")]
    RedirectLoop,

    #[error("extracting login token: {0}")]
    Token(#[source] ParseError),

    #[error("POSTing login form: {0}")]
    Submit(#[source] TransportError),

    #[error("reading login form response: {0}")]
    ReadResponse(#[source] TransportError),

    #[error("login form response was {status}")]
    Rejected { status: StatusCode },
}

/// Failure of an authenticated fetch.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server redirected somewhere other than the login page.
    #[error("unexpected redirect to {target}")]
    UnexpectedRedirect { target: String },

    #[error("HTTP response {status}")]
    HttpStatus { status: StatusCode },

    #[error("login failed: {0}")]
    Login(#[from] LoginError),

    /// Still redirected to login after a fresh login.
    #[error("session expired again after logging in; credentials may be stale")]
    SessionExpired,

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Top-level error for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<LoginError> for Error {
    fn from(e: LoginError) -> Self {
        Error::Session(SessionError::Login(e))
    }
}

impl SessionError {
    /// Whether a login was attempted and failed
    pub fn is_login_failure(&self) -> bool {
        matches!(self, SessionError::Login(_) | SessionError::SessionExpired)
    }
}
