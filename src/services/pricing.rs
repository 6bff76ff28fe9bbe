//! Yen pricing helpers shared by the catalog seeder, aggregation and the
//! document generator.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Selling prices are rounded up to this step.
pub const PRICE_STEP: i64 = 10_000;

/// Fixed markup: selling = cost / 0.7, rounded up to the next [`PRICE_STEP`].
///
/// Integer form of `ceil(cost / 0.7 / 10000) * 10000`, i.e.
/// `ceil(cost / 7000) * 10000`, so exact multiples never drift upwards.
pub fn calculate_selling_price(cost: i64) -> i64 {
    ceil_div(cost, 7_000) * PRICE_STEP
}

fn ceil_div(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d > 0 {
        q + 1
    } else {
        q
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `1234` -> `"￥1,234"`, `-500` -> `"-￥500"`
pub fn format_currency(amount: i64) -> String {
    if amount < 0 {
        format!("-￥{}", format_number(amount).trim_start_matches('-'))
    } else {
        format!("￥{}", format_number(amount))
    }
}

/// Percentage with one decimal place, e.g. `"30.0%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Lenient quantity parse; anything non-numeric counts as zero.
pub fn parse_quantity(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Lenient yen amount parse from a JSON number or numeric string.
/// Fractions round half away from zero; anything else becomes 0.
pub fn parse_amount(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let d = parse_quantity(s.replace(',', "").as_str());
            round_yen(d)
        }
        _ => 0,
    }
}

/// Rounds to whole yen, half away from zero, saturating at the i64 range.
pub fn round_yen(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if amount.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

/// `unit_price × quantity`, rounded to whole yen.
pub fn line_amount(unit_price: i64, quantity: &str) -> i64 {
    let qty = parse_quantity(quantity);
    Decimal::from(unit_price)
        .checked_mul(qty)
        .map(round_yen)
        .unwrap_or(0)
}
