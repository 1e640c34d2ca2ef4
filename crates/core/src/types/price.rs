//! Money parsing and display formatting using decimal arithmetic.
//!
//! Amounts travel through the system as the backend's decimal strings
//! (`"1234.5"`) and are only turned into [`Decimal`] for display or for
//! threshold comparisons. Formatting follows fixed en-US currency rules:
//!
//! ```rust
//! # use shopfront_core::format_money;
//! assert_eq!(format_money("1234.5", "USD"), "$1,234.50");
//! assert_eq!(format_money("-3", "EUR"), "-€3.00");
//! assert_eq!(format_money("1500", "JPY"), "¥1,500");
//! ```

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Non-breaking space placed between an ISO code and the number.
const NBSP: char = '\u{a0}';

/// Display rules for one currency under the en-US locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat<'a> {
    /// Prefix written before the number (symbol, or ISO code for currencies
    /// without a dedicated en-US symbol).
    pub symbol: &'a str,
    /// Whether the prefix is an ISO code that needs a separating space.
    pub is_code: bool,
    /// Number of fraction digits (minor units).
    pub minor_units: u32,
}

impl<'a> CurrencyFormat<'a> {
    /// Look up the display rules for an ISO 4217 currency code.
    ///
    /// Unknown codes fall back to the code itself with two minor units.
    #[must_use]
    pub fn for_code(code: &'a str) -> Self {
        let known = |symbol, minor_units| Self {
            symbol,
            is_code: false,
            minor_units,
        };

        match code {
            "USD" => known("$", 2),
            "EUR" => known("€", 2),
            "GBP" => known("£", 2),
            "JPY" => known("¥", 0),
            "CAD" => known("CA$", 2),
            "AUD" => known("A$", 2),
            "NZD" => known("NZ$", 2),
            "HKD" => known("HK$", 2),
            "MXN" => known("MX$", 2),
            "TWD" => known("NT$", 2),
            "BRL" => known("R$", 2),
            "CNY" => known("CN¥", 2),
            "INR" => known("₹", 2),
            "KRW" => known("₩", 0),
            "ILS" => known("₪", 2),
            "VND" => known("₫", 0),
            "PHP" => known("₱", 2),
            _ => Self {
                symbol: code,
                is_code: true,
                minor_units: 2,
            },
        }
    }

    fn prefix(&self) -> String {
        if self.is_code {
            format!("{}{NBSP}", self.symbol)
        } else {
            self.symbol.to_string()
        }
    }
}

/// Parse a backend decimal amount string.
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is
/// not a plain decimal number.
#[must_use]
pub fn parse_amount(amount: &str) -> Option<Decimal> {
    Decimal::from_str(amount.trim()).ok()
}

/// Format an amount string for display in the given currency.
///
/// Rounds half away from zero to the currency's minor units and groups the
/// integer part by thousands. Amounts that cannot be parsed are shown
/// verbatim after the currency prefix rather than dropped.
#[must_use]
pub fn format_money(amount: &str, currency_code: &str) -> String {
    let format = CurrencyFormat::for_code(currency_code);

    let Some(value) = parse_amount(amount) else {
        return format!("{}{}", format.prefix(), amount.trim());
    };

    let mut rounded = value
        .round_dp_with_strategy(format.minor_units, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    rounded.rescale(format.minor_units);

    let digits = rounded.to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut out = String::with_capacity(digits.len() + 8);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&format.prefix());
    out.push_str(&group_thousands(whole));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
