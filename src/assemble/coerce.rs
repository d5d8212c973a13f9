//! Per-value coercion of raw attribute values to declared field types.
//!
//! Coercion never fails: an absent value becomes [`Value::Null`] and a value
//! that cannot be read as the declared type becomes [`Value::Missing`].

use serde_json::Value as Raw;
use time::macros::format_description;
use time::Date;

use crate::catalog::DataType;
use crate::result::Value;

/// Coerce one raw value to `data_type`.
pub fn coerce(raw: Option<&Raw>, data_type: DataType) -> Value {
    let raw = match raw {
        None | Some(Raw::Null) => return Value::Null,
        Some(raw) => raw,
    };

    // Blank text carries no value for anything but strings.
    if data_type != DataType::String {
        if let Raw::String(s) = raw {
            if s.trim().is_empty() {
                return Value::Null;
            }
        }
    }

    let coerced = match data_type {
        DataType::String => to_string(raw).map(Value::String),
        DataType::Integer => to_integer(raw).map(Value::Integer),
        DataType::Float => to_float(raw).map(Value::Float),
        DataType::Date => to_date(raw).map(Value::Date),
        DataType::Boolean => to_boolean(raw).map(Value::Boolean),
    };

    coerced.unwrap_or(Value::Missing)
}

fn to_string(raw: &Raw) -> Option<String> {
    match raw {
        Raw::String(s) => Some(s.trim().to_string()),
        Raw::Number(n) => Some(n.to_string()),
        Raw::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_integer(raw: &Raw) -> Option<i64> {
    match raw {
        Raw::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Raw::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(raw: &Raw) -> Option<f64> {
    let value = match raw {
        Raw::Number(n) => n.as_f64(),
        Raw::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Accepts `YYYY-MM-DD`, optionally followed by `Z` or a `T...` time part.
pub(crate) fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    let day = text.split('T').next().unwrap_or(text);
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

/// A `Z`-suffixed service date is the UTC rendering of the next local day.
fn to_date(raw: &Raw) -> Option<Date> {
    match raw {
        Raw::String(s) => match s.trim().strip_suffix('Z') {
            Some(day) => parse_date(day)?.next_day(),
            None => parse_date(s),
        },
        _ => None,
    }
}

pub(crate) fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn to_boolean(raw: &Raw) -> Option<bool> {
    match raw {
        Raw::Bool(b) => Some(*b),
        Raw::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Raw::String(s) => parse_boolean(s),
        _ => None,
    }
}
