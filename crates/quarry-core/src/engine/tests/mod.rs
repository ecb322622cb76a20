mod scenarios;

use crate::{
    criteria::{FilterCriterion, FilterOperator, FilterSource},
    engine::{MemoryEngine, StorageEngine},
    predicate::{CompileOptions, compile},
    registry::ResourceKind,
};
use uuid::Uuid;

pub(super) fn property(
    field: &str,
    operator: FilterOperator,
    value: Option<serde_json::Value>,
) -> FilterCriterion {
    FilterCriterion::new(FilterSource::Property, field, operator, value)
}

pub(super) fn custom(
    identifier: &str,
    operator: FilterOperator,
    value: Option<serde_json::Value>,
) -> FilterCriterion {
    FilterCriterion::new(FilterSource::Custom, identifier, operator, value)
}

pub(super) fn run(
    engine: &MemoryEngine,
    kind: ResourceKind,
    criteria: &[FilterCriterion],
) -> Vec<Uuid> {
    let query = compile(kind, criteria, &CompileOptions::default()).expect("criteria compile");
    engine.select_ids(&query).expect("in-memory engine queries are infallible")
}
