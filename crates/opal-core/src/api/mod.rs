//! HTTP side of the client.
//!
//! This module provides the `OpalClient` with the data-fetching operations,
//! the `Transport` seam it talks through, and the error types for both.
//!
//! The site uses cookie sessions obtained through a form login; expiry is
//! detected and handled by `auth::Session`.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{activity_url, ActivityRequest, OpalClient, OVERVIEW_PATH, TRANSACTIONS_PATH};
pub use error::{Error, LoginError, SessionError, TransportError};
pub use transport::{RawResponse, RequestBody, RequestDescriptor, ReqwestTransport, Transport};
