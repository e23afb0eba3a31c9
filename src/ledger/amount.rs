//! Amount normalization for locale-formatted currency text.
//!
//! The ledger stores amounts the way the user writes them: a currency
//! symbol, `.` as thousands separator and `,` as decimal separator
//! (e.g. `$1.500.000,00`). Internally everything is an exact `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a locale-formatted amount string into an exact decimal.
///
/// Returns `None` for empty or unparsable input; the loader drops such rows.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_symbol = trimmed.replace('$', "");

    // "." is a thousands separator, "," the decimal separator.
    let canonical = without_symbol.trim().replace('.', "").replace(',', ".");
    if canonical.is_empty() {
        return None;
    }

    Decimal::from_str(&canonical).ok()
}

/// Format an amount for display: currency symbol, thousands separators,
/// no fractional digits. Rounding happens only here, never in aggregation.
pub fn format_amount(value: &Decimal) -> String {
    format!(
        "${}",
        format_num::format_num!(",.0", value.to_f64().unwrap_or_default())
    )
}
