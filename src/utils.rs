//! Helper functions could be used in api/, front/, ...

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::consts;

/// Brazilian currency format: `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}R$ {grouped},{cents}")
}

/// `dd/mm/yyyy`
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `mm/yyyy`
pub fn format_month_br(date: NaiveDate) -> String {
    date.format("%m/%Y").to_string()
}

/// Calendar day in Brasilia for an instant
pub fn billing_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&consts::BILLING_TIMEZONE).date_naive()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Digits of a phone number in the international format WhatsApp expects.
///
/// Local brazilian numbers (area code plus 8 or 9 digits) get the country
/// code, anything shorter is not a reachable number.
pub fn whatsapp_phone_digits(phone: &str) -> Option<String> {
    let digits = phone
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();

    match digits.len() {
        10 | 11 => Some(format!("{}{digits}", consts::BRAZIL_COUNTRY_CALLING_CODE)),
        12..=15 => Some(digits),
        _ => None,
    }
}

/// Escapes text so typst renders it literally
pub fn escape_typst(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '*' | '_' | '`' | '$' | '<' | '>' | '@' | '[' | ']' | '~' | '/' | '='
                | '-' | '+' | '"' | '\''
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec!(150)), "R$ 150,00");
        assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_brl(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec!(0.005)), "R$ 0,01");
        assert_eq!(format_brl(dec!(-5.5)), "-R$ 5,50");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_format_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(format_date_br(date), "05/03/2026");
        assert_eq!(format_month_br(date), "03/2026");
        assert_eq!(
            first_day_of_month(date),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_billing_today_uses_brasilia_time() {
        // 01:30 UTC is still the previous day in Sao Paulo (UTC-3)
        let now = Utc.with_ymd_and_hms(2026, 10, 11, 1, 30, 0).unwrap();
        assert_eq!(
            billing_today(now),
            NaiveDate::from_ymd_opt(2026, 10, 10).unwrap()
        );
    }

    #[test]
    fn test_whatsapp_phone_digits() {
        assert_eq!(
            whatsapp_phone_digits("(11) 99999-9999").as_deref(),
            Some("5511999999999")
        );
        assert_eq!(
            whatsapp_phone_digits("+55 11 3333-4444").as_deref(),
            Some("551133334444")
        );
        assert_eq!(whatsapp_phone_digits("9999-9999"), None);
        assert_eq!(whatsapp_phone_digits(""), None);
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("Ana #1 *vip*"), "Ana \\#1 \\*vip\\*");
        assert_eq!(escape_typst("10/2026"), "10\\/2026");
        assert_eq!(escape_typst("Sao Paulo"), "Sao Paulo");
    }
}
