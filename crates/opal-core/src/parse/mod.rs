//! Page parsers.
//!
//! Pure functions from a response body to a record. They know the markup of
//! the three pages the client reads and nothing about sessions or HTTP.
//! Extraction is regex based, the same way the rest of the code base scrapes
//! HTML; the pages are server-rendered tables, not script-built documents.

mod activity;
mod login;
mod overview;

use std::sync::LazyLock;

use regex::Regex;

pub use activity::parse_activity;
pub use login::parse_login;
pub use overview::parse_overview;

/// Errors for pages that do not look the way the parsers expect.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A required element is absent.
    #[error("page has no {0}")]
    Missing(&'static str),

    #[error("row {row}: expected {expected} cells, found {found}")]
    CellCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: cannot parse {field} from {value:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<table\b([^>]*)>(.*?)</table>"));
static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<tr\b[^>]*>(.*?)</tr>"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<td\b[^>]*>(.*?)</td>"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
});

/// Value of attribute `name` inside a tag's attribute text.
pub(crate) fn attr_value(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .map(|m| crate::utils::decode_entities(m.as_str()))
    })
}

/// Inner HTML of the first table whose `id` is `id`.
fn table_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    TABLE_RE.captures_iter(html).find_map(|caps| {
        let attrs = caps.get(1)?.as_str();
        if attr_value(attrs, "id").as_deref() == Some(id) {
            caps.get(2).map(|m| m.as_str())
        } else {
            None
        }
    })
}

/// Data rows of a table as raw cell HTML. Header rows (no `<td>`) are skipped.
fn data_rows(table: &str) -> Vec<Vec<&str>> {
    ROW_RE
        .captures_iter(table)
        .filter_map(|row| row.get(1))
        .map(|row| {
            CELL_RE
                .captures_iter(row.as_str())
                .filter_map(|cell| cell.get(1).map(|m| m.as_str()))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_any_quote_style() {
        let attrs = r#" type="hidden" name='CSRFToken' value="a&amp;b""#;
        assert_eq!(attr_value(attrs, "name").as_deref(), Some("CSRFToken"));
        assert_eq!(attr_value(attrs, "value").as_deref(), Some("a&b"));
        assert_eq!(attr_value(attrs, "VALUE").as_deref(), Some("a&b"));
        assert!(attr_value(attrs, "id").is_none());
    }

    #[test]
    fn test_table_by_id_and_rows() {
        let html = r#"
            <table id="other"><tr><td>x</td></tr></table>
            <table class="t" id="wanted">
              <tr><th>A</th><th>B</th></tr>
              <tr><td>1</td><td><b>2</b></td></tr>
              <tr><td colspan="2">note</td></tr>
            </table>"#;
        let table = table_by_id(html, "wanted").unwrap();
        let rows = data_rows(table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["1", "<b>2</b>"]);
        assert_eq!(rows[1], vec!["note"]);
        assert!(table_by_id(html, "missing").is_none());
    }
}
