use serde::{Deserialize, Serialize};

use crate::utils::format_cents;

/// The account dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Overview {
    pub cards: Vec<Card>,
}

/// One Opal card on the account. Its position in `Overview::cards` is the
/// card index used by activity requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub number: String,
    /// Balance in cents; negative when the card is overdrawn.
    pub balance_cents: i64,
}

impl Card {
    pub fn balance_display(&self) -> String {
        format_cents(self.balance_cents)
    }
}

impl Overview {
    /// Sum of all card balances in cents
    pub fn total_balance_cents(&self) -> i64 {
        self.cards.iter().map(|c| c.balance_cents).sum()
    }
}
