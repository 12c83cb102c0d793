//! Authentication module for managing the logged-in session and its persistence.
//!
//! This module provides:
//! - `Session`: cookie-based session with transparent re-login on expiry
//! - `login`: the form-based credential exchange
//! - `AuthStore`: pluggable persistence for credentials + cookies, with a
//!   file implementation (`FileAuthStore`) and an OS keychain one
//!   (`KeychainAuthStore`)
//!
//! Sessions are written back to the store only when the caller asks.

pub mod cookies;
pub mod credentials;
pub mod login;
pub mod record;
pub mod session;
pub mod store;

pub use cookies::{Cookie, CookieJar, IssuedCookie};
pub use login::LoginAttempt;
pub use credentials::{KeychainAuthStore, SERVICE_NAME};
pub use record::AuthRecord;
pub use session::{FetchOutcome, Session, LOGIN_NAMESPACE};
pub use store::{AuthStore, FileAuthStore, StoreError};
