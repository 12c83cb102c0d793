//! Core library for opal.
//!
//! A client for the Opal card site that keeps a logged-in cookie session,
//! logs in again when the site reports the session expired, and reads the
//! account overview and card activity pages.
//!
//! ```no_run
//! use opal_core::{ActivityRequest, ClientConfig, FileAuthStore, OpalClient};
//!
//! # async fn run() -> Result<(), opal_core::Error> {
//! let store = FileAuthStore::new("/home/me/.opal");
//! let mut client = OpalClient::new(store, &ClientConfig::default())?;
//! let overview = client.overview().await?;
//! let activity = client.activity(&ActivityRequest::new(0)).await?;
//! client.save_session()?;
//! # let _ = (overview, activity);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod parse;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use api::{ActivityRequest, Error, OpalClient};
pub use auth::{AuthRecord, AuthStore, FileAuthStore, KeychainAuthStore, StoreError};
pub use config::ClientConfig;
pub use models::{Activity, Card, Mode, Overview, Transaction};
