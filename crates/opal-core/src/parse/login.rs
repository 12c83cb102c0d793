use std::sync::LazyLock;

use regex::Regex;

use super::{attr_value, compile_static_regex, ParseError};
use crate::auth::login::TOKEN_FIELD;

static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<input\b([^>]*)>"));

/// Extract the anti-forgery token from the login form page.
pub fn parse_login(body: &[u8]) -> Result<String, ParseError> {
    let html = String::from_utf8_lossy(body);

    INPUT_RE
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .find(|attrs| attr_value(attrs, "name").as_deref() == Some(TOKEN_FIELD))
        .and_then(|attrs| attr_value(attrs, "value"))
        .filter(|token| !token.trim().is_empty())
        .ok_or(ParseError::Missing("login token"))
}
