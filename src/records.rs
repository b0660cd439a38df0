//! Raw records as delivered by the provider.
//!
//! Only the fields the metrics read are modelled; everything else in the
//! provider payload is ignored on deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency_code: String,
}

/// One sale transaction, completed or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub transaction_user_status: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub brand: Option<String>,
}

/// One buy transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPurchase {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub transaction_user_status: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConversation {
    #[serde(default)]
    pub unread: bool,
}

/// Fields shared by orders and purchases.
pub trait Transaction {
    fn status(&self) -> &str;
    fn transaction_user_status(&self) -> &str;
    fn price(&self) -> Option<&Price>;
    fn date(&self) -> &str;

    /// A transaction is completed when either status field says so.
    fn is_completed(&self) -> bool {
        self.status().to_lowercase().contains("completed")
            || self.transaction_user_status() == "completed"
    }

    /// The raw amount string, `None` when there is no price or it is empty.
    fn amount(&self) -> Option<&str> {
        self.price()
            .map(|p| p.amount.as_str())
            .filter(|a| !a.is_empty())
    }
}

impl Transaction for RawOrder {
    fn status(&self) -> &str {
        &self.status
    }
    fn transaction_user_status(&self) -> &str {
        &self.transaction_user_status
    }
    fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }
    fn date(&self) -> &str {
        &self.date
    }
}

impl Transaction for RawPurchase {
    fn status(&self) -> &str {
        &self.status
    }
    fn transaction_user_status(&self) -> &str {
        &self.transaction_user_status
    }
    fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }
    fn date(&self) -> &str {
        &self.date
    }
}

/// The three record sets of one fetch.
#[derive(Debug, Clone, Default)]
pub struct RawRecords {
    pub orders: Vec<RawOrder>,
    pub purchases: Vec<RawPurchase>,
    pub conversations: Vec<RawConversation>,
}

/// Parse the longest leading decimal number of `s`, skipping leading
/// whitespace. `"12.50 EUR"` parses as 12.5; `"abc"` has no number.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
