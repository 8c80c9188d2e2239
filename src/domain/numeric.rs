use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse a loosely-typed JSON value into a decimal.
///
/// Accepts JSON numbers and numeric strings (plain or scientific notation).
/// Anything else (null, booleans, blank or non-numeric strings, containers)
/// yields `None`, which every check treats as "does not match".
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// Parse an optional JSON value into a decimal.
pub fn parse_decimal_opt(value: Option<&Value>) -> Option<Decimal> {
    value.and_then(parse_decimal)
}

/// Parse a textual number.
pub fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Comparison bound for threshold checks.
///
/// A zero bound is treated as unset, matching how rule records leave
/// thresholds at `0` when they are not configured.
#[inline]
pub fn effective_bound(bound: Option<Decimal>) -> Option<Decimal> {
    bound.filter(|b| !b.is_zero())
}

/// Strictly-greater comparison that only fires when both sides are present.
#[inline]
pub fn exceeds(value: Option<Decimal>, bound: Option<Decimal>) -> bool {
    match (value, effective_bound(bound)) {
        (Some(value), Some(bound)) => value > bound,
        _ => false,
    }
}
