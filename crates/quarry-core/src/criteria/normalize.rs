use crate::{
    attribute::{self, AttributeError, AttributeKind, ContentType},
    criteria::{FilterCriterion, FilterError, FilterOperator, FilterSource, coerce},
    registry::{FieldDescriptor, FieldRegistry, ResourceKind},
    value::{Value, ValueType},
};

///
/// FieldRef
///
/// A criterion's field identifier after resolution. Property fields borrow
/// their registry descriptor; attribute fields carry the parsed composite
/// identity.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldRef {
    Property(&'static FieldDescriptor),
    Attribute {
        kind: AttributeKind,
        name: String,
        content_type: ContentType,
    },
}

impl FieldRef {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Property(descriptor) => descriptor.value_type,
            Self::Attribute { content_type, .. } => content_type.value_type(),
        }
    }

    /// Identifier as the caller wrote it, for error context.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Property(descriptor) => descriptor.id.to_string(),
            Self::Attribute {
                name, content_type, ..
            } => attribute::format_identifier(name, *content_type),
        }
    }
}

///
/// NormalizedCriterion
///
/// One validated, type-coerced criterion ready for compilation. Presence
/// operators carry no values; multi-value input is preserved in order for
/// the compiler's OR/AND decomposition.
///

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCriterion {
    pub field: FieldRef,
    pub operator: FilterOperator,
    pub values: Vec<Value>,
}

/// Normalize one boundary criterion against the registry for `kind`.
pub fn normalize(
    kind: ResourceKind,
    criterion: &FilterCriterion,
) -> Result<NormalizedCriterion, FilterError> {
    let field = resolve_field(kind, criterion)?;
    let value_type = field.value_type();
    let operator = criterion.condition;

    if !operator.supports(value_type) {
        return Err(FilterError::UnsupportedOperator {
            field: field.identifier(),
            operator,
            value_type,
        });
    }

    // Presence tests ignore any supplied value rather than rejecting it.
    if !operator.takes_value() {
        return Ok(NormalizedCriterion {
            field,
            operator,
            values: Vec::new(),
        });
    }

    let enum_values = match &field {
        FieldRef::Property(descriptor) => descriptor.enum_values,
        FieldRef::Attribute { .. } => &[],
    };

    let raw = criterion
        .value
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| FilterError::ValueCoercion {
            field: field.identifier(),
            reason: format!("operator {operator} requires a value"),
        })?;

    let values = match raw {
        serde_json::Value::Array(items) => {
            if !operator.accepts_list() {
                return Err(FilterError::UnsupportedOperator {
                    field: field.identifier(),
                    operator,
                    value_type,
                });
            }
            if items.is_empty() {
                return Err(FilterError::ValueCoercion {
                    field: field.identifier(),
                    reason: "value list is empty".to_string(),
                });
            }

            items
                .iter()
                .map(|item| coerce::coerce_scalar(&field.identifier(), item, value_type, enum_values))
                .collect::<Result<Vec<_>, _>>()?
        }
        scalar => vec![coerce::coerce_scalar(
            &field.identifier(),
            scalar,
            value_type,
            enum_values,
        )?],
    };

    Ok(NormalizedCriterion {
        field,
        operator,
        values,
    })
}

/// Normalize a whole criteria list, preserving order.
pub fn normalize_all(
    kind: ResourceKind,
    criteria: &[FilterCriterion],
) -> Result<Vec<NormalizedCriterion>, FilterError> {
    criteria
        .iter()
        .map(|criterion| normalize(kind, criterion))
        .collect()
}

fn resolve_field(kind: ResourceKind, criterion: &FilterCriterion) -> Result<FieldRef, FilterError> {
    match criterion.field_source {
        FilterSource::Property => FieldRegistry::get()
            .lookup(kind, &criterion.field_identifier)
            .map(FieldRef::Property)
            .ok_or_else(|| FilterError::UnknownField {
                kind,
                field: criterion.field_identifier.clone(),
            }),

        FilterSource::Metadata | FilterSource::Custom => {
            let attribute_kind = match criterion.field_source {
                FilterSource::Metadata => AttributeKind::Metadata,
                _ => AttributeKind::Custom,
            };

            let (name, content_type) = attribute::parse_identifier(&criterion.field_identifier)
                .map_err(|err| match err {
                    AttributeError::MalformedIdentifier { identifier }
                    | AttributeError::UnknownContentType { token: identifier } => {
                        FilterError::MalformedIdentifier { identifier }
                    }
                })?;

            Ok(FieldRef::Attribute {
                kind: attribute_kind,
                name,
                content_type,
            })
        }
    }
}

///
/// TESTS
///
