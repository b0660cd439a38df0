//! Independent reducers, one statistic each.
//!
//! Each reducer keeps its own tolerance for missing or malformed amounts:
//! `total_sales` skips them, `most_expensive_sale` and `average_sale_price`
//! count them as zero, and `total_spent` lets a malformed amount turn the
//! total into NaN. Displayed values depend on these differences.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::Datelike;

use super::types::{MonthActivity, NO_SALES_YET};
use crate::date_util::{month_name, parse_record_date, weekday_name};
use crate::records::{parse_leading_float, RawConversation, RawOrder, RawPurchase, Transaction};

/// Fallback bucket for orders without a brand.
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

/// Count keys in first-seen order and return the most frequent one.
/// Ties go to the key that was seen first.
fn top_bucket<K: Eq + Hash + Clone>(keys: impl IntoIterator<Item = K>) -> Option<(K, u64)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u64)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    let mut best: Option<(K, u64)> = None;
    for (key, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((key, count));
        }
    }
    best
}

fn month_buckets<'a, T, I>(records: I) -> Option<(String, u64)>
where
    T: Transaction + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let keys = records
        .into_iter()
        .filter_map(|r| parse_record_date(r.date()))
        .map(|d| (d.year(), d.month()));
    let ((_, month), count) = top_bucket(keys)?;
    month_name(month).map(|name| (name.to_string(), count))
}

pub fn most_expensive_sale(orders: &[RawOrder]) -> f64 {
    orders
        .iter()
        .filter(|o| o.is_completed())
        .map(|o| o.amount().and_then(parse_leading_float).unwrap_or(0.0))
        .fold(0.0, |max, price| if price > max { price } else { max })
}

pub fn average_sale_price(orders: &[RawOrder]) -> f64 {
    let completed: Vec<&RawOrder> = orders.iter().filter(|o| o.is_completed()).collect();
    if completed.is_empty() {
        return 0.0;
    }
    let total: f64 = completed
        .iter()
        .map(|o| o.amount().and_then(parse_leading_float).unwrap_or(0.0))
        .sum();
    round2(total / completed.len() as f64)
}

/// Weekday with the most completed orders, or `"No sales yet"`.
pub fn busiest_day(orders: &[RawOrder]) -> String {
    let days = orders
        .iter()
        .filter(|o| o.is_completed())
        .filter_map(|o| parse_record_date(&o.date))
        .map(|d| weekday_name(d.weekday()));
    match top_bucket(days) {
        Some((day, _)) => day.to_string(),
        None => NO_SALES_YET.to_string(),
    }
}

/// Month name with the most records. `None` when no record has a usable date.
pub fn best_month<'a, T, I>(records: I) -> Option<String>
where
    T: Transaction + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    month_buckets(records).map(|(month, _)| month)
}

/// Like [`best_month`], also reporting the winning month's record count.
pub fn most_active_month<'a, T, I>(records: I) -> Option<MonthActivity>
where
    T: Transaction + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    month_buckets(records).map(|(month, activity)| MonthActivity { month, activity })
}

pub fn total_sales(orders: &[RawOrder]) -> f64 {
    orders
        .iter()
        .filter(|o| o.is_completed())
        .filter_map(|o| o.amount().and_then(parse_leading_float))
        .filter(|amount| amount.is_finite())
        .sum()
}

pub fn total_spent(purchases: &[RawPurchase]) -> f64 {
    purchases
        .iter()
        .filter(|p| p.is_completed())
        .map(|p| match p.amount() {
            Some(amount) => parse_leading_float(amount).unwrap_or(f64::NAN),
            None => 0.0,
        })
        .sum()
}

/// Completed orders that carry an amount.
pub fn items_sold(orders: &[RawOrder]) -> u64 {
    orders
        .iter()
        .filter(|o| o.is_completed() && o.amount().is_some())
        .count() as u64
}

pub fn items_purchased(purchases: &[RawPurchase]) -> u64 {
    purchases.iter().filter(|p| p.is_completed()).count() as u64
}

pub fn total_conversations(conversations: &[RawConversation]) -> u64 {
    conversations.len() as u64
}

pub fn active_conversations(conversations: &[RawConversation]) -> u64 {
    conversations.iter().filter(|c| c.unread).count() as u64
}

/// Most frequent brand over all orders, completed or not.
pub fn best_selling_brand(orders: &[RawOrder]) -> Option<String> {
    let brands = orders.iter().map(|o| {
        o.brand
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(UNKNOWN_BRAND)
    });
    top_bucket(brands).map(|(brand, _)| brand.to_string())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
