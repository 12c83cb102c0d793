//! Plain-text rendering of fetched pages.

use opal_core::utils::{format_cents, truncate_string};
use opal_core::{Activity, Overview};

/// Widest the details column gets before it is cut short
const DETAILS_WIDTH: usize = 40;

pub fn overview_table(overview: &Overview) -> String {
    if overview.cards.is_empty() {
        return "No cards on this account.\n".to_string();
    }

    let name_width = overview
        .cards
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Card".len());

    let mut out = format!("{:>3}  {:<name_width$}  {:<19}  {:>10}\n", "#", "Card", "Number", "Balance");
    for (index, card) in overview.cards.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<name_width$}  {:<19}  {:>10}\n",
            index,
            card.name,
            card.number,
            card.balance_display()
        ));
    }
    out.push_str(&format!(
        "{:>3}  {:<name_width$}  {:<19}  {:>10}\n",
        "",
        "Total",
        "",
        format_cents(overview.total_balance_cents())
    ));
    out
}

pub fn activity_table(activity: &Activity, page: u32) -> String {
    if activity.transactions.is_empty() {
        return "No transactions on this page.\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<12}  {:<10}  {:<DETAILS_WIDTH$}  {:>9}\n",
        "#", "When", "Mode", "Details", "Amount"
    );
    for tx in &activity.transactions {
        out.push_str(&format!(
            "{:>5}  {:<12}  {:<10}  {:<DETAILS_WIDTH$}  {:>9}\n",
            tx.number,
            tx.formatted_when(),
            tx.mode.to_string(),
            truncate_string(&tx.details, DETAILS_WIDTH),
            tx.amount_display()
        ));
    }
    if activity.has_more {
        out.push_str(&format!("More: --page {}\n", page + 1));
    }
    out
}
