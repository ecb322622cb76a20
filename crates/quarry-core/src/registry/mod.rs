mod table;

use crate::value::ValueType;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::LazyLock};

///
/// ResourceKind
///
/// Filterable object types. Every compiled query is bound to exactly one
/// kind; descriptors and criteria never cross kinds except along a declared
/// join path.
///

#[derive(
    Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    #[display("certificate")]
    Certificate,
    #[display("cryptographic_key")]
    CryptographicKey,
    #[display("discovery_run")]
    DiscoveryRun,
    #[display("entity_instance")]
    EntityInstance,
    #[display("location")]
    Location,
    // Related-only kinds: valid join targets, never query roots.
    #[display("group")]
    Group,
    #[display("user")]
    User,
    #[display("token_profile")]
    TokenProfile,
}

impl ResourceKind {
    /// Storage table name used by the SQL renderer. Identifiers come from
    /// this table only, never from request input.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::CryptographicKey => "cryptographic_key_item",
            Self::DiscoveryRun => "discovery_run",
            Self::EntityInstance => "entity_instance",
            Self::Location => "location",
            Self::Group => "resource_group",
            Self::User => "owner_association",
            Self::TokenProfile => "token_profile",
        }
    }
}

///
/// JoinStep
///
/// One relation traversal from the query root toward the table owning the
/// filtered column. `to_many` marks traversals that can fan out; any path
/// containing one makes the descriptor a multivalued relation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinStep {
    pub relation: &'static str,
    pub to_many: bool,
}

///
/// ExistenceOverride
///
/// Implementation note for boolean fields that are really "does a related
/// row with this property exist". The filter presents a BOOLEAN field; the
/// compiler lowers it to EXISTS / NOT EXISTS over the join path.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExistenceOverride {
    /// Column on the far end of the join path.
    pub column: &'static str,
    /// Enum code the related row must carry.
    pub equals: &'static str,
}

///
/// FieldDescriptor
///
/// One intrinsic filterable field. The catalog is declarative: descriptors
/// name storage accessors as plain strings, and every engine maps
/// (root kind, column) to its own accessor at the execution boundary.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    /// Public filter identifier, unique per kind.
    pub id: &'static str,
    /// Query root this field belongs to.
    pub kind: ResourceKind,
    /// Kind of the related object when the field lives across a join.
    pub related: Option<ResourceKind>,
    /// Relation traversals from the root to the owning table; empty for
    /// direct columns.
    pub join_path: &'static [JoinStep],
    /// Column holding the compared value at the end of the join path.
    pub column: &'static str,
    pub value_type: ValueType,
    /// Member codes for ENUM fields; empty otherwise.
    pub enum_values: &'static [&'static str],
    /// Human-facing label for UI catalogs.
    pub label: &'static str,
    pub existence: Option<ExistenceOverride>,
}

impl FieldDescriptor {
    /// True when the join path crosses a to-many relation, which switches
    /// NOT_EQUALS to NOT-EXISTS semantics.
    #[must_use]
    pub fn multivalued_relation(&self) -> bool {
        self.join_path.iter().any(|step| step.to_many)
    }

    /// Resolve an enum code against this field's member set.
    ///
    /// Unknown codes are reported as `None`; the normalizer turns them into
    /// the match-nothing sentinel rather than failing the request.
    #[must_use]
    pub fn resolve_enum_code(&self, code: &str) -> Option<&'static str> {
        self.enum_values.iter().find(|member| **member == code).copied()
    }
}

///
/// FieldRegistry
///
/// Immutable catalog of intrinsic filterable fields, built once from the
/// declarative table on first access and safe for unsynchronized concurrent
/// reads afterwards. Duplicate (kind, id) entries are a construction-time
/// panic: they are a catalog authoring error, not a request error.
///

pub struct FieldRegistry {
    by_key: BTreeMap<(ResourceKind, &'static str), &'static FieldDescriptor>,
}

static REGISTRY: LazyLock<FieldRegistry> = LazyLock::new(|| FieldRegistry::build(table::CATALOG));

impl FieldRegistry {
    /// Process-wide registry instance.
    #[must_use]
    pub fn get() -> &'static Self {
        &REGISTRY
    }

    fn build(catalog: &'static [FieldDescriptor]) -> Self {
        let mut by_key = BTreeMap::new();

        for descriptor in catalog {
            let previous = by_key.insert((descriptor.kind, descriptor.id), descriptor);
            assert!(
                previous.is_none(),
                "duplicate field descriptor {}/{}",
                descriptor.kind,
                descriptor.id
            );
        }

        Self { by_key }
    }

    /// Look up one descriptor by (kind, field id).
    #[must_use]
    pub fn lookup(&self, kind: ResourceKind, field_id: &str) -> Option<&'static FieldDescriptor> {
        self.by_key.get(&(kind, field_id)).copied()
    }

    /// All descriptors for one kind, in catalog order. Feeds UI field
    /// catalogs.
    #[must_use]
    pub fn list_for_kind(&self, kind: ResourceKind) -> Vec<&'static FieldDescriptor> {
        table::CATALOG
            .iter()
            .filter(|descriptor| descriptor.kind == kind)
            .collect()
    }
}

///
/// TESTS
///
