use serde_json::Value;
use sqlx::types::BigDecimal;
use std::str::FromStr;

/// Parse a JSON number or numeric string into an exact decimal.
///
/// Floats are parsed from their shortest textual form, so `0.3` stays `0.3`.
pub fn decimal_from_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Parse a JSON number or numeric string into a non-negative count
pub fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Non-empty string field
pub fn string_from_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Clamp a decimal into `[min, max]`
pub fn clamp(value: BigDecimal, min: &BigDecimal, max: &BigDecimal) -> BigDecimal {
    if &value < min {
        min.clone()
    } else if &value > max {
        max.clone()
    } else {
        value
    }
}

/// `numerator / denominator`, or `None` when the denominator is not positive
pub fn ratio(numerator: &BigDecimal, denominator: &BigDecimal) -> Option<BigDecimal> {
    if denominator > &BigDecimal::from(0) {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Render a decimal as a whole number with thousands separators (`1234567.8` -> `1,234,568`)
pub fn format_thousands(value: &BigDecimal) -> String {
    let (digits, _) = value.round(0).with_scale(0).into_bigint_and_exponent();
    let raw = digits.to_string();
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };

    let mut grouped = String::with_capacity(body.len() + body.len() / 3);
    for (i, ch) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}

/// Render a `[0,1]` share as a percentage with one decimal (`0.3` -> `30.0%`)
pub fn format_percent(share: &BigDecimal) -> String {
    let pct = (share * &BigDecimal::from(100)).round(1).with_scale(1);
    format!("{pct}%")
}
