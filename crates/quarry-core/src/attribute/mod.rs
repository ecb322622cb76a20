use crate::{registry::ResourceKind, value::ValueType};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// AttributeError
///

#[derive(Debug, ThisError)]
pub enum AttributeError {
    #[error("malformed attribute identifier '{identifier}'")]
    MalformedIdentifier { identifier: String },

    #[error("unknown attribute content type '{token}'")]
    UnknownContentType { token: String },
}

///
/// AttributeKind
///
/// Which side of the dynamic-attribute split a definition belongs to.
/// Metadata is connector-sourced and read-only; custom attributes are
/// operator-defined. The two namespaces never merge, so a name can exist
/// in both with different content types.
///

#[derive(
    Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    #[display("metadata")]
    Metadata,
    #[display("custom")]
    Custom,
}

///
/// ContentType
///
/// Declared content type of an attribute definition. The wire token is
/// SCREAMING_SNAKE_CASE and round-trips through composite identifiers
/// unchanged.
///

#[derive(
    Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    #[display("STRING")]
    String,
    #[display("INTEGER")]
    Integer,
    #[display("FLOAT")]
    Float,
    #[display("BOOLEAN")]
    Boolean,
    #[display("DATE")]
    Date,
    #[display("DATETIME")]
    DateTime,
    #[display("TIME")]
    Time,
}

impl ContentType {
    /// Filter type this content coerces under. Integer and float widths
    /// collapse to one numeric type.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::String => ValueType::String,
            Self::Integer | Self::Float => ValueType::Number,
            Self::Boolean => ValueType::Boolean,
            Self::Date => ValueType::Date,
            Self::DateTime => ValueType::DateTime,
            Self::Time => ValueType::Time,
        }
    }

    fn parse(token: &str) -> Result<Self, AttributeError> {
        match token {
            "STRING" => Ok(Self::String),
            "INTEGER" => Ok(Self::Integer),
            "FLOAT" => Ok(Self::Float),
            "BOOLEAN" => Ok(Self::Boolean),
            "DATE" => Ok(Self::Date),
            "DATETIME" => Ok(Self::DateTime),
            "TIME" => Ok(Self::Time),
            _ => Err(AttributeError::UnknownContentType {
                token: token.to_string(),
            }),
        }
    }
}

///
/// AttributeDescriptor
///
/// One discovered filterable attribute definition. Identity is the full
/// (kind, name, content type) triple: definitions sharing a name but
/// differing in content type are distinct filterable fields.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    pub name: String,
    pub content_type: ContentType,
}

impl AttributeDescriptor {
    #[must_use]
    pub fn new(kind: AttributeKind, name: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            kind,
            name: name.into(),
            content_type,
        }
    }

    /// Composite public identifier, `name|CONTENT_TYPE`.
    #[must_use]
    pub fn identifier(&self) -> String {
        format_identifier(&self.name, self.content_type)
    }
}

/// Render the composite identifier for an attribute field.
#[must_use]
pub fn format_identifier(name: &str, content_type: ContentType) -> String {
    format!("{name}|{content_type}")
}

/// Split a composite identifier back into name and content type.
///
/// The separator splits on the LAST `|`, so attribute names containing the
/// separator survive the round trip. A missing separator, empty name, or
/// unknown content-type token is a request error.
pub fn parse_identifier(identifier: &str) -> Result<(String, ContentType), AttributeError> {
    let Some((name, token)) = identifier.rsplit_once('|') else {
        return Err(AttributeError::MalformedIdentifier {
            identifier: identifier.to_string(),
        });
    };

    if name.is_empty() {
        return Err(AttributeError::MalformedIdentifier {
            identifier: identifier.to_string(),
        });
    }

    let content_type =
        ContentType::parse(token).map_err(|_| AttributeError::MalformedIdentifier {
            identifier: identifier.to_string(),
        })?;

    Ok((name.to_string(), content_type))
}

///
/// AttributeStore
///
/// Source of attribute definitions currently attached to objects of a
/// resource. Implemented over storage; the in-memory engine implements it
/// over its attribute rows.
///

pub trait AttributeStore {
    /// Distinct (kind, name, content type) triples with at least one value
    /// attached to an object of `resource`.
    fn distinct_definitions(
        &self,
        resource: ResourceKind,
        kind: AttributeKind,
    ) -> Vec<AttributeDescriptor>;
}

/// Discover the filterable attribute catalog for one side of the split.
///
/// Content types without filter semantics never reach this point because
/// `AttributeStore` implementations only surface the types `ContentType`
/// models. Output is deduplicated and deterministically ordered.
pub fn discover_filterable(
    store: &dyn AttributeStore,
    resource: ResourceKind,
    kind: AttributeKind,
) -> BTreeSet<AttributeDescriptor> {
    store.distinct_definitions(resource, kind).into_iter().collect()
}

///
/// TESTS
///
