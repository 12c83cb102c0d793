use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::format_cents;

/// Mode of travel for a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Train,
    Bus,
    Ferry,
    LightRail,
    /// Top-ups, adjustments and anything the site labels differently
    Other(String),
}

impl Mode {
    /// Map the site's label (cell text or icon alt text) to a mode.
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_ascii_lowercase();
        match lower.as_str() {
            "train" | "rail" => Mode::Train,
            "bus" => Mode::Bus,
            "ferry" => Mode::Ferry,
            "light rail" | "lightrail" | "light-rail" => Mode::LightRail,
            _ => Mode::Other(label.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Train => write!(f, "Train"),
            Mode::Bus => write!(f, "Bus"),
            Mode::Ferry => write!(f, "Ferry"),
            Mode::LightRail => write!(f, "Light Rail"),
            Mode::Other(label) if label.is_empty() => write!(f, "-"),
            Mode::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One page of a card's activity, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Activity {
    pub transactions: Vec<Transaction>,
    /// Whether an older page exists
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub number: u32,
    /// Local (Sydney) time as shown by the site
    pub when: NaiveDateTime,
    pub mode: Mode,
    pub details: String,
    pub journey_number: Option<u32>,
    pub fare_applied: String,
    pub fare_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub amount_cents: Option<i64>,
}

impl Transaction {
    pub fn amount_display(&self) -> String {
        self.amount_cents
            .map(format_cents)
            .unwrap_or_else(|| "-".to_string())
    }

    /// Compact date/time for list view: "14 Oct 08:15"
    pub fn formatted_when(&self) -> String {
        self.when.format("%d %b %H:%M").to_string()
    }
}
