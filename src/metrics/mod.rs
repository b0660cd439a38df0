pub mod reducers;
pub mod types;

pub use types::*;

use crate::records::{RawConversation, RawOrder, RawPurchase, RawRecords, Transaction};

/// Compute the summary for one fetch.
///
/// Every reducer runs exactly once. Empty inputs produce the empty-state
/// values (`"No sales yet"`, `"No activity yet"`, zeros) rather than failing.
/// The currency is the first order's currency code; purchases are not
/// consulted.
pub fn aggregate(
    orders: &[RawOrder],
    purchases: &[RawPurchase],
    conversations: &[RawConversation],
) -> Summary {
    log::debug!(
        "Aggregating {} orders, {} purchases, {} conversations",
        orders.len(),
        purchases.len(),
        conversations.len()
    );

    let activity = orders
        .iter()
        .map(|o| o as &dyn Transaction)
        .chain(purchases.iter().map(|p| p as &dyn Transaction));

    Summary {
        total_sales: reducers::total_sales(orders),
        items_sold: reducers::items_sold(orders),
        best_month: reducers::best_month(orders)
            .unwrap_or_else(|| NO_ACTIVITY_YET.to_string()),
        most_expensive_sale: reducers::most_expensive_sale(orders),
        average_sale_price: reducers::average_sale_price(orders),
        busiest_day: reducers::busiest_day(orders),
        total_spent: reducers::total_spent(purchases),
        items_purchased: reducers::items_purchased(purchases),
        total_conversations: reducers::total_conversations(conversations),
        active_conversations: reducers::active_conversations(conversations),
        most_active_month: reducers::most_active_month(activity)
            .unwrap_or_else(MonthActivity::none),
        currency: currency_of(orders),
        best_selling_brand: reducers::best_selling_brand(orders),
    }
}

pub fn aggregate_records(records: &RawRecords) -> Summary {
    aggregate(&records.orders, &records.purchases, &records.conversations)
}

fn currency_of(orders: &[RawOrder]) -> String {
    orders
        .first()
        .and_then(|o| o.price.as_ref())
        .map(|p| p.currency_code.as_str())
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}
