mod coerce;
mod normalize;

pub use normalize::{FieldRef, NormalizedCriterion, normalize, normalize_all};

use crate::{registry::ResourceKind, value::ValueType};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// FilterError
///
/// Request-validation failures. All of these are terminal for the request;
/// nothing here is retryable.
///

#[derive(Debug, ThisError)]
pub enum FilterError {
    #[error("unknown field '{field}' for {kind}")]
    UnknownField { kind: ResourceKind, field: String },

    #[error("operator {operator} is not supported for {value_type} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: FilterOperator,
        value_type: ValueType,
    },

    #[error("malformed attribute identifier '{identifier}'")]
    MalformedIdentifier { identifier: String },

    #[error("cannot coerce value for field '{field}': {reason}")]
    ValueCoercion { field: String, reason: String },
}

///
/// FilterSource
///
/// Where a criterion's field identifier resolves. PROPERTY goes through the
/// field registry; METADATA and CUSTOM carry composite attribute
/// identifiers.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterSource {
    #[display("PROPERTY")]
    Property,
    #[display("METADATA")]
    Metadata,
    #[display("CUSTOM")]
    Custom,
}

///
/// FilterOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    #[display("EQUALS")]
    Equals,
    #[display("NOT_EQUALS")]
    NotEquals,
    #[display("GREATER")]
    Greater,
    #[display("GREATER_OR_EQUAL")]
    GreaterOrEqual,
    #[display("LESSER")]
    Lesser,
    #[display("LESSER_OR_EQUAL")]
    LesserOrEqual,
    #[display("CONTAINS")]
    Contains,
    #[display("NOT_CONTAINS")]
    NotContains,
    #[display("STARTS_WITH")]
    StartsWith,
    #[display("ENDS_WITH")]
    EndsWith,
    #[display("EMPTY")]
    Empty,
    #[display("NOT_EMPTY")]
    NotEmpty,
}

impl FilterOperator {
    /// Operator/type compatibility. Equality and presence apply everywhere,
    /// ordering only to naturally ordered types, substring only to text.
    #[must_use]
    pub const fn supports(self, value_type: ValueType) -> bool {
        match self {
            Self::Equals | Self::NotEquals | Self::Empty | Self::NotEmpty => true,
            Self::Greater | Self::GreaterOrEqual | Self::Lesser | Self::LesserOrEqual => {
                value_type.is_orderable()
            }
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith => {
                value_type.is_text()
            }
        }
    }

    /// Only the equality pair accepts multi-value input.
    #[must_use]
    pub const fn accepts_list(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    /// Presence operators take no value; anything supplied is ignored.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, Self::Empty | Self::NotEmpty)
    }
}

///
/// FilterCriterion
///
/// One boundary-shape filter condition. The value stays JSON-shaped until
/// normalization binds it to a descriptor's declared type.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    pub field_source: FilterSource,
    pub field_identifier: String,
    pub condition: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FilterCriterion {
    #[must_use]
    pub fn new(
        field_source: FilterSource,
        field_identifier: impl Into<String>,
        condition: FilterOperator,
        value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            field_source,
            field_identifier: field_identifier.into(),
            condition,
            value,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_matrix_gates_ordering_and_substring() {
        assert!(FilterOperator::Greater.supports(ValueType::Number));
        assert!(FilterOperator::Greater.supports(ValueType::Date));
        assert!(!FilterOperator::Greater.supports(ValueType::String));
        assert!(!FilterOperator::Greater.supports(ValueType::Enum));

        assert!(FilterOperator::Contains.supports(ValueType::String));
        assert!(!FilterOperator::Contains.supports(ValueType::Number));

        assert!(FilterOperator::Equals.supports(ValueType::Boolean));
        assert!(FilterOperator::Empty.supports(ValueType::Enum));
    }

    #[test]
    fn only_the_equality_pair_accepts_lists() {
        assert!(FilterOperator::Equals.accepts_list());
        assert!(FilterOperator::NotEquals.accepts_list());
        assert!(!FilterOperator::Contains.accepts_list());
        assert!(!FilterOperator::Greater.accepts_list());
    }

    #[test]
    fn criterion_wire_shape_round_trips() {
        let criterion = FilterCriterion::new(
            FilterSource::Property,
            "common_name",
            FilterOperator::Contains,
            Some(serde_json::json!("example.org")),
        );

        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["fieldSource"], "PROPERTY");
        assert_eq!(json["condition"], "CONTAINS");

        let back: FilterCriterion = serde_json::from_value(json).unwrap();
        assert_eq!(back, criterion);
    }

    #[test]
    fn presence_criteria_deserialize_without_a_value() {
        let criterion: FilterCriterion = serde_json::from_str(
            r#"{"fieldSource":"PROPERTY","fieldIdentifier":"not_after","condition":"EMPTY"}"#,
        )
        .unwrap();

        assert_eq!(criterion.condition, FilterOperator::Empty);
        assert!(criterion.value.is_none());
    }
}
