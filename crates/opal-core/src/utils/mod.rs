//! Utility functions for money formatting and HTML text cleanup.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{decode_entities, format_cents, parse_cents, strip_html, truncate_string};
