mod compare;

pub use compare::{compare_eq, compare_order};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

///
/// ValueType
///
/// Declared type of a filterable field or attribute value. Operator
/// compatibility is decided against this type, never against the runtime
/// representation.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    #[display("STRING")]
    String,
    #[display("NUMBER")]
    Number,
    #[display("DATE")]
    Date,
    #[display("DATETIME")]
    DateTime,
    #[display("TIME")]
    Time,
    #[display("BOOLEAN")]
    Boolean,
    #[display("ENUM")]
    Enum,
}

impl ValueType {
    /// Ordering operators apply only to naturally ordered types.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(self, Self::Number | Self::Date | Self::DateTime | Self::Time)
    }

    /// Substring operators apply only to text.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::String)
    }
}

///
/// TextMode
///
/// Explicit case handling for text comparisons. The compile default is
/// case-sensitive; case-insensitive matching is an opt-in, never a storage
/// collation accident.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TextMode {
    #[default]
    Cs,
    Ci,
}

///
/// Value
///
/// Runtime scalar carried by compiled predicates and evaluated rows.
/// Multi-value criteria are decomposed during normalization, so lists never
/// appear here.
///
/// `NoMatch` is the sentinel produced when an enum code fails to resolve
/// against the field's member set: it compares equal to nothing, so any
/// comparison against it selects no rows.
///

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    Enum(String),
    Id(Uuid),
    NoMatch,
}

impl Value {
    /// Declared type this runtime value satisfies, if any.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Text(_) => Some(ValueType::String),
            Self::Number(_) => Some(ValueType::Number),
            Self::Bool(_) => Some(ValueType::Boolean),
            Self::Date(_) => Some(ValueType::Date),
            Self::DateTime(_) => Some(ValueType::DateTime),
            Self::Time(_) => Some(ValueType::Time),
            Self::Enum(_) => Some(ValueType::Enum),
            Self::Id(_) | Self::NoMatch => None,
        }
    }

    /// Substring containment; `None` when either side is not text.
    #[must_use]
    pub fn text_contains(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, pat| hay.contains(pat))
    }

    /// Prefix match; `None` when either side is not text.
    #[must_use]
    pub fn text_starts_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, pat| hay.starts_with(pat))
    }

    /// Suffix match; `None` when either side is not text.
    #[must_use]
    pub fn text_ends_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, pat| hay.ends_with(pat))
    }
}

fn text_op(
    left: &Value,
    right: &Value,
    mode: TextMode,
    op: impl FnOnce(&str, &str) -> bool,
) -> Option<bool> {
    let (Value::Text(hay), Value::Text(pat)) = (left, right) else {
        return None;
    };

    match mode {
        TextMode::Cs => Some(op(hay, pat)),
        TextMode::Ci => Some(op(&casefold(hay), &casefold(pat))),
    }
}

pub(crate) fn casefold(input: &str) -> String {
    if input.is_ascii() {
        return input.to_ascii_lowercase();
    }

    input.to_lowercase()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            // Total bitwise order keeps Eq lawful for NaN payloads.
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b).is_eq(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Id(a), Self::Id(b)) => a == b,
            // Structural equality only; match semantics live in `compare_eq`.
            (Self::NoMatch, Self::NoMatch) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Time(v) => write!(f, "{v}"),
            Self::Id(v) => write!(f, "{v}"),
            Self::NoMatch => write!(f, "<no-match>"),
        }
    }
}

///
/// TESTS
///
