use super::{data_rows, table_by_id, ParseError};
use crate::models::{Card, Overview};
use crate::utils::{parse_cents, strip_html};

/// `id` of the dashboard table listing the account's cards
const CARDS_TABLE_ID: &str = "dashboard-cards";

/// Cells per card row: name, number, balance
const CARD_CELLS: usize = 3;

/// Parse the account overview page.
pub fn parse_overview(body: &[u8]) -> Result<Overview, ParseError> {
    let html = String::from_utf8_lossy(body);
    let table = table_by_id(&html, CARDS_TABLE_ID).ok_or(ParseError::Missing("card table"))?;

    let mut cards = Vec::new();
    for (row, cells) in data_rows(table).into_iter().enumerate() {
        if cells.len() < CARD_CELLS {
            return Err(ParseError::CellCount {
                row,
                expected: CARD_CELLS,
                found: cells.len(),
            });
        }

        let balance_text = strip_html(cells[2]);
        let balance_cents =
            parse_cents(&balance_text).ok_or_else(|| ParseError::InvalidField {
                row,
                field: "balance",
                value: balance_text.clone(),
            })?;

        cards.push(Card {
            name: strip_html(cells[0]),
            number: strip_html(cells[1]),
            balance_cents,
        });
    }

    Ok(Overview { cards })
}
