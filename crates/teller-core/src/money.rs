use rust_decimal::Decimal;

use crate::locale::Locale;

pub const CURRENCY: &str = "VND";

/// Group an amount the way the locale writes money, e.g. `1.000.000` in
/// Vietnamese and `1,000,000` in English. Trailing fractional zeros are
/// dropped.
pub fn format_amount(amount: Decimal, locale: Locale) -> String {
    let (group_sep, decimal_mark) = locale.number_marks();
    let normalized = amount.normalize().to_string();

    let (sign, unsigned) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(*d);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}{decimal_mark}{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Amount with the currency code appended
pub fn format_money(amount: Decimal, locale: Locale) -> String {
    format!("{} {}", format_amount(amount, locale), CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_vietnamese_grouping() {
        assert_eq!(format_amount(dec("1000000"), Locale::Vietnamese), "1.000.000");
        assert_eq!(format_amount(dec("500000"), Locale::Vietnamese), "500.000");
        assert_eq!(format_amount(dec("999"), Locale::Vietnamese), "999");
    }

    #[test]
    fn test_english_grouping_with_fraction() {
        assert_eq!(format_amount(dec("1234567.50"), Locale::English), "1,234,567.5");
        assert_eq!(format_amount(dec("1234567.50"), Locale::Vietnamese), "1.234.567,5");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("500000"), Locale::English), "500,000 VND");
    }
}
