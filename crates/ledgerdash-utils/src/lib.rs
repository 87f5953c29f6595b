//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Insert `separator` between groups of three digits
fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a money amount, e.g. `1234.5` with `"£", 2, ","` gives `"£1,234.50"`
pub fn format_money(amount: Decimal, symbol: &str, decimal_places: u32, separator: &str) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.*}", decimal_places as usize, rounded);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed.clone(), None),
    };

    let mut out = String::new();
    // -0.00 prints without a sign
    if amount.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_thousands(&int_part, separator));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate an unguessable session token
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("1234.5"), "£", 2, ","), "£1,234.50");
        assert_eq!(format_money(Decimal::ZERO, "£", 2, ","), "£0.00");
        assert_eq!(format_money(dec("-42.5"), "$", 2, ","), "-$42.50");
        assert_eq!(format_money(dec("-0.001"), "$", 2, ","), "$0.00");
        assert_eq!(format_money(dec("1000000"), "", 0, " "), "1 000 000");
    }

    #[test]
    fn test_format_money_rounds_half_away_from_zero() {
        assert_eq!(format_money(dec("0.125"), "£", 2, ","), "£0.13");
        assert_eq!(format_money(dec("2.5"), "", 0, ","), "3");
        assert_eq!(format_money(dec("0.1") + dec("0.2"), "£", 2, ","), "£0.30");
        assert_eq!(format_money(dec("12.5"), "€", 4, "."), "€12.5000");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("🛒 Groceries"), "🛒 Groceries");
    }

    #[test]
    fn test_generate_token_is_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
