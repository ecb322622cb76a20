use crate::{
    criteria::FilterError,
    value::{Value, ValueType},
};
use chrono::{DateTime, NaiveDate, NaiveTime};

//
// JSON-to-runtime value coercion.
//
// The boundary is permissive about shape where the original system was:
// numbers and booleans also arrive as their string spellings. Everything
// else is strict.
//

pub(crate) fn coerce_scalar(
    field: &str,
    raw: &serde_json::Value,
    target: ValueType,
    enum_values: &[&'static str],
) -> Result<Value, FilterError> {
    let fail = |reason: String| FilterError::ValueCoercion {
        field: field.to_string(),
        reason,
    };

    match target {
        ValueType::String => raw
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| fail(format!("expected a string, got {raw}"))),

        ValueType::Number => match raw {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| fail(format!("non-finite number {n}"))),
            serde_json::Value::String(s) => s
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| fail(format!("'{s}' is not a number"))),
            other => Err(fail(format!("expected a number, got {other}"))),
        },

        ValueType::Boolean => match raw {
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(fail(format!("'{s}' is not a boolean"))),
            },
            other => Err(fail(format!("expected a boolean, got {other}"))),
        },

        ValueType::Date => {
            let s = raw
                .as_str()
                .ok_or_else(|| fail(format!("expected a date string, got {raw}")))?;
            s.parse::<NaiveDate>()
                .map(Value::Date)
                .map_err(|e| fail(format!("'{s}' is not a date: {e}")))
        }

        ValueType::DateTime => {
            let s = raw
                .as_str()
                .ok_or_else(|| fail(format!("expected a datetime string, got {raw}")))?;
            DateTime::parse_from_rfc3339(s)
                .map(Value::DateTime)
                .map_err(|e| fail(format!("'{s}' is not an RFC 3339 datetime: {e}")))
        }

        ValueType::Time => {
            let s = raw
                .as_str()
                .ok_or_else(|| fail(format!("expected a time string, got {raw}")))?;
            s.parse::<NaiveTime>()
                .map(Value::Time)
                .map_err(|e| fail(format!("'{s}' is not a time: {e}")))
        }

        // An unknown code is not a request error: it normalizes to the
        // match-nothing sentinel and the compiler lowers it to False.
        ValueType::Enum => {
            let s = raw
                .as_str()
                .ok_or_else(|| fail(format!("expected an enum code, got {raw}")))?;
            Ok(enum_values
                .iter()
                .find(|member| **member == s)
                .map_or(Value::NoMatch, |member| Value::Enum((*member).to_string())))
        }
    }
}

///
/// TESTS
///
