//! Client for the Opal card site.
//!
//! `OpalClient` pairs a [`Session`] with the [`AuthStore`] it was loaded
//! from. Fetch operations build a URL, GET it through the session and hand
//! the body to a parser. Cookie changes stay in memory until
//! [`OpalClient::save_session`] is called.

use tracing::debug;
use url::Url;

use crate::auth::session::site_url;
use crate::auth::{AuthRecord, AuthStore, Session};
use crate::config::ClientConfig;
use crate::models::{Activity, Overview};
use crate::parse::{parse_activity, parse_overview};

use super::transport::{ReqwestTransport, Transport};
use super::{Error, SessionError};

/// Account overview page
pub const OVERVIEW_PATH: &str = "/registered/index";

/// Card activity pages, selected by `cardIndex` and `pageIndex`
pub const TRANSACTIONS_PATH: &str = "/registered/opal-card-transactions/";

/// Which page of which card's activity to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityRequest {
    /// Position of the card in the overview, starting at 0.
    pub card_index: u32,
    /// Pages into the past. Zero is the most recent activity.
    pub offset: u32,
}

impl ActivityRequest {
    pub fn new(card_index: u32) -> Self {
        Self {
            card_index,
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// URL of the activity page described by `request`.
/// `pageIndex` is only sent for pages other than the most recent.
pub fn activity_url(base: &Url, request: &ActivityRequest) -> Result<Url, SessionError> {
    let mut path = format!("{}?cardIndex={}", TRANSACTIONS_PATH, request.card_index);
    if request.offset > 0 {
        path.push_str(&format!("&pageIndex={}", request.offset));
    }
    site_url(base, &path)
}

/// Logged-in client for one account.
pub struct OpalClient<T = ReqwestTransport> {
    session: Session<T>,
    store: Box<dyn AuthStore + Send + Sync>,
}

impl OpalClient<ReqwestTransport> {
    /// Load the auth record from `store` and prepare a reqwest-backed session.
    /// No network traffic happens until the first fetch.
    pub fn new<S>(store: S, config: &ClientConfig) -> Result<Self, Error>
    where
        S: AuthStore + Send + Sync + 'static,
    {
        let transport = ReqwestTransport::new(config).map_err(Error::Client)?;
        Self::with_transport(store, config.base_url.clone(), transport)
    }
}

impl<T: Transport> OpalClient<T> {
    /// Like [`OpalClient::new`] with a caller-supplied transport.
    pub fn with_transport<S>(store: S, base_url: Url, transport: T) -> Result<Self, Error>
    where
        S: AuthStore + Send + Sync + 'static,
    {
        let record = store.load()?;
        Ok(Self {
            session: Session::new(record, base_url, transport),
            store: Box::new(store),
        })
    }

    /// Fetch the account overview.
    pub async fn overview(&mut self) -> Result<Overview, Error> {
        let url = self.session.url(OVERVIEW_PATH)?;
        debug!(url = %url, "Fetching overview");
        let body = self.session.get(&url).await?;
        let overview = parse_overview(&body)?;
        debug!(cards = overview.cards.len(), "Overview parsed");
        Ok(overview)
    }

    /// Fetch one page of activity for a card.
    pub async fn activity(&mut self, request: &ActivityRequest) -> Result<Activity, Error> {
        let url = activity_url(self.session.base_url(), request)?;
        debug!(url = %url, card = request.card_index, page = request.offset, "Fetching activity");
        let body = self.session.get(&url).await?;
        let activity = parse_activity(&body)?;
        debug!(
            transactions = activity.transactions.len(),
            has_more = activity.has_more,
            "Activity parsed"
        );
        Ok(activity)
    }

    /// Log in now instead of waiting for the site to report an expired session.
    pub async fn login(&mut self) -> Result<(), Error> {
        self.session.login().await?;
        Ok(())
    }

    /// Write the credentials and the session's current cookies back to the store.
    pub fn save_session(&mut self) -> Result<(), Error> {
        let record = self.session.snapshot();
        debug!(cookies = record.cookies.len(), "Saving session");
        self.store.save(&record)?;
        Ok(())
    }

    pub fn record(&self) -> &AuthRecord {
        self.session.record()
    }
}
