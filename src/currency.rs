/// Display symbol for an ISO currency code. Unknown codes render as the code
/// followed by a space, e.g. `"SEK "`.
pub fn symbol_for(code: &str) -> String {
    match code {
        "GBP" => "£".to_string(),
        "EUR" => "€".to_string(),
        "USD" => "$".to_string(),
        "PLN" => "zł".to_string(),
        "CZK" => "Kč".to_string(),
        other => format!("{other} "),
    }
}

/// Symbol followed by the amount with two decimals.
pub fn format_money(amount: f64, code: &str) -> String {
    format!("{}{:.2}", symbol_for(code), amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(symbol_for("EUR"), "€");
        assert_eq!(symbol_for("GBP"), "£");
        assert_eq!(symbol_for("USD"), "$");
        assert_eq!(symbol_for("PLN"), "zł");
        assert_eq!(symbol_for("CZK"), "Kč");
    }

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        assert_eq!(symbol_for("SEK"), "SEK ");
        assert_eq!(format_money(3.0, "HUF"), "HUF 3.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(60.0, "EUR"), "€60.00");
        assert_eq!(format_money(8.333, "GBP"), "£8.33");
        assert_eq!(format_money(0.0, "PLN"), "zł0.00");
    }
}
