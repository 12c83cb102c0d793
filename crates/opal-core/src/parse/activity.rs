use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::{attr_value, compile_static_regex, data_rows, table_by_id, ParseError};
use crate::models::{Activity, Mode, Transaction};
use crate::utils::{parse_cents, strip_html};

/// `id` of the transaction history table
const TRANSACTIONS_TABLE_ID: &str = "transaction-data";

/// Cells per transaction row: number, date/time, mode, details, journey
/// number, fare applied, fare, discount, amount
const TRANSACTION_CELLS: usize = 9;

/// Date/time as shown after the weekday: "14/10/2014 08:15"
const WHEN_FORMAT: &str = "%d/%m/%Y %H:%M";

static BR_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?i)<br\s*/?>"));
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?is)<img\b([^>]*)>"));
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<a\b([^>]*)>(.*?)</a>"));

/// Parse one page of card activity.
pub fn parse_activity(body: &[u8]) -> Result<Activity, ParseError> {
    let html = String::from_utf8_lossy(body);
    let table = table_by_id(&html, TRANSACTIONS_TABLE_ID)
        .ok_or(ParseError::Missing("transaction table"))?;

    let mut transactions = Vec::new();
    for (row, cells) in data_rows(table).into_iter().enumerate() {
        // Single spanning cell: "No transactions" and similar notices
        if cells.len() == 1 {
            continue;
        }
        if cells.len() != TRANSACTION_CELLS {
            return Err(ParseError::CellCount {
                row,
                expected: TRANSACTION_CELLS,
                found: cells.len(),
            });
        }
        transactions.push(parse_row(row, &cells)?);
    }

    Ok(Activity {
        transactions,
        has_more: has_next_page(&html),
    })
}

fn parse_row(row: usize, cells: &[&str]) -> Result<Transaction, ParseError> {
    let invalid = |field: &'static str, value: String| ParseError::InvalidField { row, field, value };

    let number_text = strip_html(cells[0]);
    let number = number_text
        .parse::<u32>()
        .map_err(|_| invalid("transaction number", number_text.clone()))?;

    // The weekday sits on its own line
    let when_text = strip_html(&BR_RE.replace_all(cells[1], " "));
    let when = parse_when(&when_text).ok_or_else(|| invalid("date", when_text.clone()))?;

    let journey_text = strip_html(cells[4]);
    let journey_number = if journey_text.is_empty() {
        None
    } else {
        Some(
            journey_text
                .parse::<u32>()
                .map_err(|_| invalid("journey number", journey_text.clone()))?,
        )
    };

    Ok(Transaction {
        number,
        when,
        mode: parse_mode(cells[2]),
        details: strip_html(cells[3]),
        journey_number,
        fare_applied: strip_html(cells[5]),
        fare_cents: parse_money(row, "fare", cells[6])?,
        discount_cents: parse_money(row, "discount", cells[7])?,
        amount_cents: parse_money(row, "amount", cells[8])?,
    })
}

/// Accepts an optional leading weekday: "Tue 14/10/2014 08:15".
fn parse_when(text: &str) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let tail = parts[parts.len() - 2..].join(" ");
    NaiveDateTime::parse_from_str(&tail, WHEN_FORMAT).ok()
}

/// The mode is either text or an icon whose alt text names it.
fn parse_mode(cell: &str) -> Mode {
    let text = strip_html(cell);
    if !text.is_empty() {
        return Mode::from_label(&text);
    }
    let alt = IMG_RE
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .and_then(|attrs| attr_value(attrs.as_str(), "alt"))
        .unwrap_or_default();
    Mode::from_label(&alt)
}

/// Empty cells are `None`; anything else must be an amount.
fn parse_money(row: usize, field: &'static str, cell: &str) -> Result<Option<i64>, ParseError> {
    let text = strip_html(cell);
    if text.is_empty() {
        return Ok(None);
    }
    parse_cents(&text)
        .map(Some)
        .ok_or(ParseError::InvalidField { row, field, value: text })
}

/// A link to another `pageIndex` labelled "next" means older activity exists.
fn has_next_page(html: &str) -> bool {
    ANCHOR_RE.captures_iter(html).any(|caps| {
        let href = caps
            .get(1)
            .and_then(|attrs| attr_value(attrs.as_str(), "href"))
            .unwrap_or_default();
        let label = caps.get(2).map(|m| strip_html(m.as_str())).unwrap_or_default();
        href.contains("pageIndex=") && label.to_ascii_lowercase().contains("next")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAGE: &str = r#"<html><body>
      <table id="transaction-data">
        <thead><tr><th>Transaction number</th><th>Date/time</th><th>Mode</th><th>Details</th>
          <th>Journey number</th><th>Fare Applied</th><th>Fare</th><th>Discount</th><th>Amount</th></tr></thead>
        <tbody>
          <tr><td>12</td><td>Tue<br/>14/10/2014 08:15</td><td><img src="/images/bus.png" alt="bus"/></td>
              <td>Railway Square to Glebe Pt Rd</td><td>4</td><td></td><td>$2.10</td><td>$0.00</td><td>-$2.10</td></tr>
          <tr><td>11</td><td>Mon 13/10/2014 17:40</td><td>Train</td>
              <td>Central to Town Hall</td><td></td><td>Travel Reward</td><td></td><td></td><td>$20.00</td></tr>
        </tbody>
      </table>
      <a href="/registered/opal-card-transactions/?cardIndex=0&amp;pageIndex=2">Next &gt;</a>
    </body></html>"#;

    #[test]
    fn test_parse_activity() {
        let activity = parse_activity(PAGE.as_bytes()).unwrap();
        assert!(activity.has_more);
        assert_eq!(activity.transactions.len(), 2);

        let first = &activity.transactions[0];
        assert_eq!(first.number, 12);
        assert_eq!(
            first.when,
            NaiveDate::from_ymd_opt(2014, 10, 14)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap()
        );
        assert_eq!(first.mode, Mode::Bus);
        assert_eq!(first.details, "Railway Square to Glebe Pt Rd");
        assert_eq!(first.journey_number, Some(4));
        assert_eq!(first.fare_cents, Some(210));
        assert_eq!(first.discount_cents, Some(0));
        assert_eq!(first.amount_cents, Some(-210));

        let second = &activity.transactions[1];
        assert_eq!(second.mode, Mode::Train);
        assert_eq!(second.journey_number, None);
        assert_eq!(second.fare_applied, "Travel Reward");
        assert_eq!(second.fare_cents, None);
        assert_eq!(second.amount_cents, Some(2000));
    }

    #[test]
    fn test_parse_activity_empty_page() {
        let page = r#"<table id="transaction-data">
            <tr><th>Transaction number</th></tr>
            <tr><td colspan="9">No transactions found</td></tr>
        </table>"#;
        let activity = parse_activity(page.as_bytes()).unwrap();
        assert!(activity.transactions.is_empty());
        assert!(!activity.has_more);
    }

    #[test]
    fn test_parse_activity_errors() {
        assert!(matches!(
            parse_activity(b"<html></html>"),
            Err(ParseError::Missing(_))
        ));

        let short = r#"<table id="transaction-data"><tr><td>1</td><td>2</td></tr></table>"#;
        assert!(matches!(
            parse_activity(short.as_bytes()),
            Err(ParseError::CellCount { expected: 9, found: 2, .. })
        ));

        let bad_date = r#"<table id="transaction-data"><tr><td>1</td><td>yesterday</td>
            <td>Bus</td><td></td><td></td><td></td><td></td><td></td><td></td></tr></table>"#;
        assert!(matches!(
            parse_activity(bad_date.as_bytes()),
            Err(ParseError::InvalidField { field: "date", .. })
        ));
    }

    #[test]
    fn test_parse_when() {
        assert!(parse_when("14/10/2014 08:15").is_some());
        assert!(parse_when("Tue 14/10/2014 08:15").is_some());
        assert!(parse_when("14/10/2014").is_none());
    }
}
