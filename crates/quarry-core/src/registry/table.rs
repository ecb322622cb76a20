use crate::{
    registry::{ExistenceOverride, FieldDescriptor, JoinStep, ResourceKind},
    value::ValueType,
};

//
// Declarative field catalog.
//
// One row per intrinsic filterable field. Join paths name relation
// accessors; engines map them to joins or nested records at their own
// boundary.
//

const fn direct(
    kind: ResourceKind,
    id: &'static str,
    column: &'static str,
    value_type: ValueType,
    label: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        kind,
        related: None,
        join_path: &[],
        column,
        value_type,
        enum_values: &[],
        label,
        existence: None,
    }
}

const fn enumerated(
    kind: ResourceKind,
    id: &'static str,
    column: &'static str,
    enum_values: &'static [&'static str],
    label: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        kind,
        related: None,
        join_path: &[],
        column,
        value_type: ValueType::Enum,
        enum_values,
        label,
        existence: None,
    }
}

const fn joined(
    kind: ResourceKind,
    related: ResourceKind,
    id: &'static str,
    join_path: &'static [JoinStep],
    column: &'static str,
    value_type: ValueType,
    label: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        kind,
        related: Some(related),
        join_path,
        column,
        value_type,
        enum_values: &[],
        label,
        existence: None,
    }
}

const TO_ONE: bool = false;
const TO_MANY: bool = true;

const fn step(relation: &'static str, to_many: bool) -> JoinStep {
    JoinStep { relation, to_many }
}

pub(super) const CERTIFICATE_STATE: &[&str] = &[
    "requested", "rekeyed", "issued", "revoked", "archived", "failed",
];
pub(super) const VALIDATION_STATUS: &[&str] = &[
    "valid", "invalid", "expiring", "expired", "revoked", "not_checked", "inactive", "failed",
];
pub(super) const COMPLIANCE_STATUS: &[&str] = &["ok", "nok", "na", "not_checked"];
pub(super) const KEY_TYPE: &[&str] = &["private_key", "public_key", "secret_key", "split_key"];
pub(super) const KEY_STATE: &[&str] = &[
    "pre_active", "active", "deactivated", "compromised", "destroyed",
];
pub(super) const KEY_FORMAT: &[&str] = &["raw", "spki", "prki", "epki", "custom"];
pub(super) const KEY_ALGORITHM: &[&str] = &["rsa", "ecdsa", "falcon", "mldsa", "slhdsa"];
pub(super) const KEY_USAGE: &[&str] = &["sign", "verify", "encrypt", "decrypt", "wrap", "unwrap"];
pub(super) const DISCOVERY_STATUS: &[&str] = &[
    "in_progress", "processing", "completed", "failed", "warning",
];

pub(super) static CATALOG: &[FieldDescriptor] = &[
    // Certificate
    direct(
        ResourceKind::Certificate,
        "common_name",
        "common_name",
        ValueType::String,
        "Common Name",
    ),
    direct(
        ResourceKind::Certificate,
        "serial_number",
        "serial_number",
        ValueType::String,
        "Serial Number",
    ),
    direct(
        ResourceKind::Certificate,
        "subject_dn",
        "subject_dn",
        ValueType::String,
        "Subject DN",
    ),
    direct(
        ResourceKind::Certificate,
        "issuer_dn",
        "issuer_dn",
        ValueType::String,
        "Issuer DN",
    ),
    direct(
        ResourceKind::Certificate,
        "issuer_common_name",
        "issuer_common_name",
        ValueType::String,
        "Issuer Common Name",
    ),
    direct(
        ResourceKind::Certificate,
        "fingerprint",
        "fingerprint",
        ValueType::String,
        "Fingerprint",
    ),
    direct(
        ResourceKind::Certificate,
        "not_before",
        "not_before",
        ValueType::Date,
        "Valid From",
    ),
    direct(
        ResourceKind::Certificate,
        "not_after",
        "not_after",
        ValueType::Date,
        "Expires At",
    ),
    direct(
        ResourceKind::Certificate,
        "key_size",
        "key_size",
        ValueType::Number,
        "Key Size",
    ),
    direct(
        ResourceKind::Certificate,
        "signature_algorithm",
        "signature_algorithm",
        ValueType::String,
        "Signature Algorithm",
    ),
    direct(
        ResourceKind::Certificate,
        "trusted_ca",
        "trusted_ca",
        ValueType::Boolean,
        "Trusted CA",
    ),
    enumerated(
        ResourceKind::Certificate,
        "state",
        "state",
        CERTIFICATE_STATE,
        "State",
    ),
    enumerated(
        ResourceKind::Certificate,
        "validation_status",
        "validation_status",
        VALIDATION_STATUS,
        "Validation Status",
    ),
    enumerated(
        ResourceKind::Certificate,
        "compliance_status",
        "compliance_status",
        COMPLIANCE_STATUS,
        "Compliance Status",
    ),
    joined(
        ResourceKind::Certificate,
        ResourceKind::Group,
        "group_name",
        &[step("groups", TO_MANY)],
        "name",
        ValueType::String,
        "Groups",
    ),
    joined(
        ResourceKind::Certificate,
        ResourceKind::User,
        "owner",
        &[step("owner", TO_ONE)],
        "owner_username",
        ValueType::String,
        "Owner",
    ),
    joined(
        ResourceKind::Certificate,
        ResourceKind::Location,
        "location_name",
        &[step("locations", TO_MANY), step("location", TO_ONE)],
        "name",
        ValueType::String,
        "Locations",
    ),
    FieldDescriptor {
        id: "private_key",
        kind: ResourceKind::Certificate,
        related: Some(ResourceKind::CryptographicKey),
        join_path: &[step("key", TO_ONE), step("items", TO_MANY)],
        column: "key_type",
        value_type: ValueType::Boolean,
        enum_values: &[],
        label: "Has Private Key",
        existence: Some(ExistenceOverride {
            column: "key_type",
            equals: "private_key",
        }),
    },
    // Cryptographic key
    direct(
        ResourceKind::CryptographicKey,
        "name",
        "name",
        ValueType::String,
        "Name",
    ),
    enumerated(
        ResourceKind::CryptographicKey,
        "key_type",
        "key_type",
        KEY_TYPE,
        "Key Type",
    ),
    enumerated(
        ResourceKind::CryptographicKey,
        "format",
        "format",
        KEY_FORMAT,
        "Key Format",
    ),
    enumerated(
        ResourceKind::CryptographicKey,
        "state",
        "state",
        KEY_STATE,
        "State",
    ),
    enumerated(
        ResourceKind::CryptographicKey,
        "algorithm",
        "algorithm",
        KEY_ALGORITHM,
        "Cryptographic Algorithm",
    ),
    enumerated(
        ResourceKind::CryptographicKey,
        "usage",
        "usage",
        KEY_USAGE,
        "Key Usage",
    ),
    direct(
        ResourceKind::CryptographicKey,
        "length",
        "length",
        ValueType::Number,
        "Key Size",
    ),
    joined(
        ResourceKind::CryptographicKey,
        ResourceKind::TokenProfile,
        "token_profile",
        &[step("key", TO_ONE), step("token_profile", TO_ONE)],
        "name",
        ValueType::String,
        "Token Profile",
    ),
    joined(
        ResourceKind::CryptographicKey,
        ResourceKind::Group,
        "group_name",
        &[step("key", TO_ONE), step("groups", TO_MANY)],
        "name",
        ValueType::String,
        "Groups",
    ),
    joined(
        ResourceKind::CryptographicKey,
        ResourceKind::User,
        "owner",
        &[step("key", TO_ONE), step("owner", TO_ONE)],
        "owner_username",
        ValueType::String,
        "Owner",
    ),
    // Discovery run
    direct(
        ResourceKind::DiscoveryRun,
        "name",
        "name",
        ValueType::String,
        "Name",
    ),
    direct(
        ResourceKind::DiscoveryRun,
        "start_time",
        "start_time",
        ValueType::DateTime,
        "Start Time",
    ),
    direct(
        ResourceKind::DiscoveryRun,
        "end_time",
        "end_time",
        ValueType::DateTime,
        "End Time",
    ),
    enumerated(
        ResourceKind::DiscoveryRun,
        "status",
        "status",
        DISCOVERY_STATUS,
        "Status",
    ),
    direct(
        ResourceKind::DiscoveryRun,
        "total_certificates",
        "total_certificates_discovered",
        ValueType::Number,
        "Total Certificates Discovered",
    ),
    direct(
        ResourceKind::DiscoveryRun,
        "connector_name",
        "connector_name",
        ValueType::String,
        "Discovery Provider",
    ),
    direct(
        ResourceKind::DiscoveryRun,
        "kind",
        "kind",
        ValueType::String,
        "Kind",
    ),
    // Entity instance
    direct(
        ResourceKind::EntityInstance,
        "name",
        "name",
        ValueType::String,
        "Name",
    ),
    direct(
        ResourceKind::EntityInstance,
        "connector_name",
        "connector_name",
        ValueType::String,
        "Entity Provider",
    ),
    direct(
        ResourceKind::EntityInstance,
        "kind",
        "kind",
        ValueType::String,
        "Kind",
    ),
    // Location
    direct(
        ResourceKind::Location,
        "name",
        "name",
        ValueType::String,
        "Name",
    ),
    direct(
        ResourceKind::Location,
        "entity_instance_name",
        "entity_instance_name",
        ValueType::String,
        "Entity Instance",
    ),
    direct(
        ResourceKind::Location,
        "enabled",
        "enabled",
        ValueType::Boolean,
        "Enabled",
    ),
    direct(
        ResourceKind::Location,
        "support_multiple_entries",
        "support_multiple_entries",
        ValueType::Boolean,
        "Support Multiple Entries",
    ),
    direct(
        ResourceKind::Location,
        "support_key_management",
        "support_key_management",
        ValueType::Boolean,
        "Support Key Management",
    ),
];
