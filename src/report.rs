//! Slide sequence for presenting a summary.

use crate::currency::format_money;
use crate::metrics::Summary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub title: String,
    pub value: String,
    pub description: String,
}

impl Slide {
    fn new(
        title: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            description: description.into(),
        }
    }
}

/// Build the wrapped slides for `summary`, opening with `year`.
pub fn slides(summary: &Summary, year: i32) -> Vec<Slide> {
    let money = |amount: f64| format_money(amount, &summary.currency);

    let mut slides = vec![
        Slide::new(
            "Welcome to Your Vinted Wrapped",
            year.to_string(),
            "Let's explore your journey!",
        ),
        Slide::new(
            format!("Your Total Sales in {year}"),
            money(summary.total_sales),
            "Amazing work!",
        ),
        Slide::new(
            "Items Found New Homes",
            summary.items_sold.to_string(),
            "items sold",
        ),
        Slide::new(
            "Your Best Month Was",
            summary.best_month.clone(),
            "Keep that momentum going!",
        ),
        Slide::new(
            "Your Biggest Sale",
            money(summary.most_expensive_sale),
            "was your highest sale!",
        ),
        Slide::new(
            "Average Sale Price",
            money(summary.average_sale_price),
            "per item sold",
        ),
        Slide::new(
            "Your Best Day",
            summary.busiest_day.clone(),
            "was your busiest day!",
        ),
        Slide::new(
            "Your Shopping Spree",
            money(summary.total_spent),
            "spent on purchases",
        ),
        Slide::new(
            "Items You Bought",
            summary.items_purchased.to_string(),
            "new treasures found",
        ),
        Slide::new(
            "Conversations Started",
            summary.total_conversations.to_string(),
            format!(
                "connections made ({} still unread)",
                summary.active_conversations
            ),
        ),
        Slide::new(
            "Your Most Active Month",
            summary.most_active_month.month.clone(),
            format!(
                "{} sales and purchases",
                summary.most_active_month.activity
            ),
        ),
    ];

    if let Some(brand) = &summary.best_selling_brand {
        slides.push(Slide::new(
            "Your Top Brand",
            brand.clone(),
            "appeared most in your sales",
        ));
    }

    slides.push(Slide::new(
        "Hope you enjoyed!",
        "Want More?",
        "See you next year.",
    ));
    slides
}

/// Plain-text rendering, one block per slide.
pub fn render_text(slides: &[Slide]) -> String {
    slides
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "[{}/{}] {}\n      {}\n      {}\n",
                i + 1,
                slides.len(),
                s.title,
                s.value,
                s.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
