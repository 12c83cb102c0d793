//! Data models for Opal pages.
//!
//! This module contains the records the page parsers produce:
//!
//! - `Overview`, `Card`: the account dashboard with card balances
//! - `Activity`, `Transaction`, `Mode`: one page of a card's transaction history

pub mod activity;
pub mod overview;

pub use activity::{Activity, Mode, Transaction};
pub use overview::{Card, Overview};
