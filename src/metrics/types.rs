use serde::{Deserialize, Deserializer, Serialize};

/// Currency used when the orders carry none.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Busiest-day value when no order is completed.
pub const NO_SALES_YET: &str = "No sales yet";

/// Month value when there is nothing to bucket.
pub const NO_ACTIVITY_YET: &str = "No activity yet";

/// The month with the most records and how many it had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthActivity {
    pub month: String,
    pub activity: u64,
}

impl MonthActivity {
    pub fn none() -> Self {
        Self {
            month: NO_ACTIVITY_YET.to_string(),
            activity: 0,
        }
    }
}

/// The aggregate "wrapped" statistics for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sales: f64,
    pub items_sold: u64,
    pub best_month: String,
    pub most_expensive_sale: f64,
    /// Rounded to two decimals.
    pub average_sale_price: f64,
    pub busiest_day: String,
    /// NaN when a completed purchase carries a non-numeric amount. JSON has no
    /// NaN, so it is written as `null` and read back as NaN.
    #[serde(deserialize_with = "nan_from_null")]
    pub total_spent: f64,
    pub items_purchased: u64,
    pub total_conversations: u64,
    pub active_conversations: u64,
    pub most_active_month: MonthActivity,
    pub currency: String,
    #[serde(default)]
    pub best_selling_brand: Option<String>,
}

fn nan_from_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
