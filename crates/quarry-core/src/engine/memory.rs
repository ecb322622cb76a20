use crate::{
    attribute::{AttributeDescriptor, AttributeKind, AttributeStore, ContentType},
    engine::{EngineError, StorageEngine},
    obs::{self, MetricsEvent},
    predicate::{Compare, CompareOp, CompiledQuery, IdField, Predicate},
    registry::{JoinStep, ResourceKind},
    value::{TextMode, Value, casefold, compare_eq, compare_order},
};
use std::cmp::Ordering;
use uuid::Uuid;

///
/// Record
///
/// One in-memory object: scalar fields by column name plus named relations
/// to other records. Absent map entries model absent values; there is no
/// null sentinel.
///

#[derive(Clone, Debug, Default)]
pub struct Record {
    pub id: Uuid,
    pub fields: std::collections::BTreeMap<String, Value>,
    pub relations: std::collections::BTreeMap<String, Vec<Record>>,
}

impl Record {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field(mut self, column: impl Into<String>, value: Value) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    #[must_use]
    pub fn with_relation(mut self, relation: impl Into<String>, records: Vec<Self>) -> Self {
        self.relations.insert(relation.into(), records);
        self
    }
}

///
/// AttributeRow
///
/// One stored attribute value, keyed the way the attribute store contract
/// requires: (object id, kind, name, content type).
///

#[derive(Clone, Debug)]
pub struct AttributeRow {
    pub object: Uuid,
    pub kind: AttributeKind,
    pub name: String,
    pub content_type: ContentType,
    pub value: Value,
}

///
/// MemoryEngine
///
/// Reference execution engine: walks the predicate tree directly over
/// in-memory records. Exists to pin the compiled semantics in tests; the
/// SQL renderer is the production-shaped consumer of the same tree.
///

#[derive(Debug, Default)]
pub struct MemoryEngine {
    records: std::collections::BTreeMap<ResourceKind, Vec<Record>>,
    attributes: Vec<AttributeRow>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ResourceKind, record: Record) {
        self.records.entry(kind).or_default().push(record);
    }

    pub fn insert_attribute(&mut self, row: AttributeRow) {
        self.attributes.push(row);
    }

    #[must_use]
    pub fn records(&self, kind: ResourceKind) -> &[Record] {
        self.records.get(&kind).map_or(&[], Vec::as_slice)
    }

    fn matches(&self, predicate: &Predicate, record: &Record) -> bool {
        match predicate {
            Predicate::True => true,
            Predicate::False => false,

            Predicate::And(children) => children.iter().all(|c| self.matches(c, record)),
            Predicate::Or(children) => children.iter().any(|c| self.matches(c, record)),
            Predicate::Not(inner) => !self.matches(inner, record),

            Predicate::Compare(cmp) => eval_compare(cmp, record.fields.get(&cmp.column)),

            Predicate::IsEmpty { column } => !record.fields.contains_key(column),
            Predicate::IsNotEmpty { column } => record.fields.contains_key(column),

            Predicate::RelatedMatch { path, inner, .. } => self
                .traverse(record, path)
                .iter()
                .any(|related| self.matches(inner, related)),

            Predicate::AttributeMatch {
                kind,
                name,
                content_type,
                inner,
            } => self
                .attributes
                .iter()
                .filter(|row| {
                    row.object == record.id
                        && row.kind == *kind
                        && row.name == *name
                        && row.content_type == *content_type
                })
                .any(|row| match inner {
                    Some(inner) => eval_on_value(inner, &row.value),
                    None => true,
                }),

            Predicate::InIds { field, ids } => match field {
                IdField::OwnId => ids.contains(&record.id),
                IdField::ParentLink(column) => match record.fields.get(column) {
                    Some(Value::Id(parent)) => ids.contains(parent),
                    _ => false,
                },
            },
        }
    }

    fn traverse<'a>(&self, record: &'a Record, path: &[JoinStep]) -> Vec<&'a Record> {
        let mut frontier = vec![record];

        for step in path {
            frontier = frontier
                .into_iter()
                .flat_map(|r| {
                    r.relations
                        .get(step.relation)
                        .map_or(&[][..], Vec::as_slice)
                })
                .collect();
        }

        frontier
    }
}

// Comparison inside an attribute EXISTS: every column reference resolves to
// the stored value.
fn eval_on_value(predicate: &Predicate, value: &Value) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::And(children) => children.iter().all(|c| eval_on_value(c, value)),
        Predicate::Or(children) => children.iter().any(|c| eval_on_value(c, value)),
        Predicate::Not(inner) => !eval_on_value(inner, value),
        Predicate::Compare(cmp) => eval_compare(cmp, Some(value)),
        Predicate::IsEmpty { .. } => false,
        Predicate::IsNotEmpty { .. } => true,
        _ => false,
    }
}

// Absent values never satisfy a comparison; the compiler encodes absence
// semantics with explicit IsEmpty arms.
fn eval_compare(cmp: &Compare, actual: Option<&Value>) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    match cmp.op {
        CompareOp::Eq => eval_eq(actual, &cmp.value, cmp.text_mode),
        CompareOp::Ne => !eval_eq(actual, &cmp.value, cmp.text_mode),
        CompareOp::Lt => ordering_is(actual, &cmp.value, Ordering::is_lt),
        CompareOp::Lte => ordering_is(actual, &cmp.value, Ordering::is_le),
        CompareOp::Gt => ordering_is(actual, &cmp.value, Ordering::is_gt),
        CompareOp::Gte => ordering_is(actual, &cmp.value, Ordering::is_ge),
        CompareOp::Contains => actual
            .text_contains(&cmp.value, cmp.text_mode)
            .unwrap_or(false),
        CompareOp::NotContains => actual
            .text_contains(&cmp.value, cmp.text_mode)
            .is_some_and(|contained| !contained),
        CompareOp::StartsWith => actual
            .text_starts_with(&cmp.value, cmp.text_mode)
            .unwrap_or(false),
        CompareOp::EndsWith => actual
            .text_ends_with(&cmp.value, cmp.text_mode)
            .unwrap_or(false),
    }
}

fn eval_eq(actual: &Value, expected: &Value, mode: TextMode) -> bool {
    if let (Value::Text(a), Value::Text(b), TextMode::Ci) = (actual, expected, mode) {
        return casefold(a) == casefold(b);
    }

    compare_eq(actual, expected)
}

fn ordering_is(actual: &Value, expected: &Value, check: impl FnOnce(Ordering) -> bool) -> bool {
    compare_order(actual, expected).is_some_and(check)
}

impl StorageEngine for MemoryEngine {
    fn select_ids(&self, query: &CompiledQuery) -> Result<Vec<Uuid>, EngineError> {
        let mut ids: Vec<Uuid> = self
            .records(query.root)
            .iter()
            .filter(|record| self.matches(&query.predicate, record))
            .map(|record| record.id)
            .collect();

        ids.sort_unstable();
        obs::record(MetricsEvent::EngineQuery {
            rows_matched: ids.len() as u64,
        });

        Ok(ids)
    }

    fn update_ids(
        &mut self,
        root: ResourceKind,
        ids: &[Uuid],
        patch: &[(String, Value)],
    ) -> Result<u64, EngineError> {
        let mut touched = 0;

        if let Some(records) = self.records.get_mut(&root) {
            for record in records.iter_mut().filter(|r| ids.contains(&r.id)) {
                for (column, value) in patch {
                    record.fields.insert(column.clone(), value.clone());
                }
                touched += 1;
            }
        }

        Ok(touched)
    }

    fn delete_ids(&mut self, root: ResourceKind, ids: &[Uuid]) -> Result<u64, EngineError> {
        let Some(records) = self.records.get_mut(&root) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|record| !ids.contains(&record.id));

        Ok((before - records.len()) as u64)
    }
}

impl AttributeStore for MemoryEngine {
    fn distinct_definitions(
        &self,
        resource: ResourceKind,
        kind: AttributeKind,
    ) -> Vec<AttributeDescriptor> {
        let objects: Vec<Uuid> = self.records(resource).iter().map(|r| r.id).collect();

        self.attributes
            .iter()
            .filter(|row| row.kind == kind && objects.contains(&row.object))
            .map(|row| AttributeDescriptor::new(row.kind, row.name.clone(), row.content_type))
            .collect()
    }
}
