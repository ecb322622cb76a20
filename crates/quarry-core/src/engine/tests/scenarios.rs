use crate::{
    attribute::{AttributeKind, ContentType},
    engine::{AttributeRow, MemoryEngine, PageRequest, Record, StorageEngine},
    criteria::FilterOperator,
    engine::tests::{custom, property, run},
    predicate::{CompileOptions, compile},
    registry::ResourceKind,
    security::SecurityFilter,
    value::Value,
};
use serde_json::json;
use uuid::Uuid;

fn ids(n: usize) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
    out.sort_unstable();
    out
}

fn sorted(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort_unstable();
    ids
}

// Three certificates on a NUMBER field: present 1, present 2, absent.
fn number_fixture() -> (MemoryEngine, Vec<Uuid>) {
    let objects = ids(3);
    let mut engine = MemoryEngine::new();

    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0]).with_field("key_size", Value::Number(1.0)),
    );
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[1]).with_field("key_size", Value::Number(2.0)),
    );
    engine.insert(ResourceKind::Certificate, Record::new(objects[2]));

    (engine, objects)
}

#[test]
fn ordering_skips_objects_lacking_the_field() {
    let (engine, o) = number_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::GreaterOrEqual, Some(json!(1)))],
    );

    assert_eq!(matched, sorted(vec![o[0], o[1]]));
}

#[test]
fn empty_selects_exactly_the_absent_objects() {
    let (engine, o) = number_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::Empty, None)],
    );

    assert_eq!(matched, vec![o[2]]);
}

#[test]
fn not_equals_includes_absent_objects() {
    let (engine, o) = number_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::NotEquals, Some(json!(1)))],
    );

    assert_eq!(matched, sorted(vec![o[1], o[2]]));
}

#[test]
fn empty_and_not_empty_are_exact_complements() {
    let (engine, o) = number_fixture();

    let empty = run(
        &engine,
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::Empty, None)],
    );
    let not_empty = run(
        &engine,
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::NotEmpty, None)],
    );

    let mut union = empty.clone();
    union.extend(&not_empty);
    assert_eq!(sorted(union), o);
    assert!(empty.iter().all(|id| !not_empty.contains(id)));
}

// Three certificates on a STRING field: two present, one absent.
fn text_fixture() -> (MemoryEngine, Vec<Uuid>) {
    let objects = ids(3);
    let mut engine = MemoryEngine::new();

    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0])
            .with_field("common_name", Value::Text("alpha.example.org".to_string())),
    );
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[1])
            .with_field("common_name", Value::Text("beta.example.org".to_string())),
    );
    engine.insert(ResourceKind::Certificate, Record::new(objects[2]));

    (engine, objects)
}

#[test]
fn not_contains_admits_objects_lacking_the_field() {
    let (engine, o) = text_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("common_name", FilterOperator::NotContains, Some(json!("alpha")))],
    );

    assert_eq!(matched, sorted(vec![o[1], o[2]]));
}

#[test]
fn substring_anchors_match_prefix_and_suffix() {
    let (engine, o) = text_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("common_name", FilterOperator::StartsWith, Some(json!("alpha")))],
    );
    assert_eq!(matched, vec![o[0]]);

    // Anchored matches still require a present value.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("common_name", FilterOperator::EndsWith, Some(json!(".org")))],
    );
    assert_eq!(matched, sorted(vec![o[0], o[1]]));
}

// Custom attribute color|STRING: "red", "blue", unset.
fn color_fixture() -> (MemoryEngine, Vec<Uuid>) {
    let objects = ids(3);
    let mut engine = MemoryEngine::new();

    for id in &objects {
        engine.insert(ResourceKind::Certificate, Record::new(*id));
    }
    engine.insert_attribute(AttributeRow {
        object: objects[0],
        kind: AttributeKind::Custom,
        name: "color".to_string(),
        content_type: ContentType::String,
        value: Value::Text("red".to_string()),
    });
    engine.insert_attribute(AttributeRow {
        object: objects[1],
        kind: AttributeKind::Custom,
        name: "color".to_string(),
        content_type: ContentType::String,
        value: Value::Text("blue".to_string()),
    });

    (engine, objects)
}

#[test]
fn attribute_contains_matches_stored_values() {
    let (engine, o) = color_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("color|STRING", FilterOperator::Contains, Some(json!("r")))],
    );

    assert_eq!(matched, vec![o[0]]);
}

#[test]
fn attribute_not_empty_requires_a_stored_row() {
    let (engine, o) = color_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("color|STRING", FilterOperator::NotEmpty, None)],
    );

    assert_eq!(matched, sorted(vec![o[0], o[1]]));
}

#[test]
fn attribute_not_contains_admits_objects_without_the_attribute() {
    let (engine, o) = color_fixture();

    // "blue" carries the attribute without the needle; the attribute-less
    // object satisfies the negation vacuously.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("color|STRING", FilterOperator::NotContains, Some(json!("r")))],
    );

    assert_eq!(matched, sorted(vec![o[1], o[2]]));
}

#[test]
fn attribute_not_equals_holds_for_objects_without_the_attribute() {
    let (engine, o) = color_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("color|STRING", FilterOperator::NotEquals, Some(json!("red")))],
    );

    assert_eq!(matched, sorted(vec![o[1], o[2]]));
}

#[test]
fn numeric_attributes_support_ordering() {
    let objects = ids(2);
    let mut engine = MemoryEngine::new();

    for (id, age) in objects.iter().zip([3.0, 7.0]) {
        engine.insert(ResourceKind::Certificate, Record::new(*id));
        engine.insert_attribute(AttributeRow {
            object: *id,
            kind: AttributeKind::Custom,
            name: "age".to_string(),
            content_type: ContentType::Integer,
            value: Value::Number(age),
        });
    }

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("age|INTEGER", FilterOperator::Greater, Some(json!(5)))],
    );

    assert_eq!(matched, vec![objects[1]]);
}

#[test]
fn metadata_and_custom_namespaces_never_merge() {
    let objects = ids(1);
    let mut engine = MemoryEngine::new();
    engine.insert(ResourceKind::Certificate, Record::new(objects[0]));
    engine.insert_attribute(AttributeRow {
        object: objects[0],
        kind: AttributeKind::Metadata,
        name: "source".to_string(),
        content_type: ContentType::String,
        value: Value::Text("scan".to_string()),
    });

    let as_custom = run(
        &engine,
        ResourceKind::Certificate,
        &[custom("source|STRING", FilterOperator::Equals, Some(json!("scan")))],
    );

    assert!(as_custom.is_empty());
}

// Security scenario: base criteria match two objects, overlay narrows.
#[test]
fn security_overlay_narrows_the_result() {
    let (engine, o) = number_fixture();
    let base = compile(
        ResourceKind::Certificate,
        &[property("key_size", FilterOperator::NotEmpty, None)],
        &CompileOptions::default(),
    )
    .unwrap();

    let allow_one = SecurityFilter {
        allowed: std::iter::once(o[0]).collect(),
        only_specific_allowed: true,
        ..SecurityFilter::default()
    };
    let scoped = allow_one.apply(&base).unwrap();
    assert_eq!(engine.select_ids(&scoped).unwrap(), vec![o[0]]);

    let allow_none = SecurityFilter {
        only_specific_allowed: true,
        ..SecurityFilter::default()
    };
    let scoped = allow_none.apply(&base).unwrap();
    assert!(engine.select_ids(&scoped).unwrap().is_empty());
}

#[test]
fn security_parent_link_scopes_on_the_linked_column() {
    let parents = ids(2);
    let objects = ids(2);
    let mut engine = MemoryEngine::new();

    for (object, parent) in objects.iter().zip(&parents) {
        engine.insert(
            ResourceKind::Certificate,
            Record::new(*object).with_field("ra_profile_uuid", Value::Id(*parent)),
        );
    }

    let filter = SecurityFilter {
        allowed: std::iter::once(parents[0]).collect(),
        only_specific_allowed: true,
        parent_link: Some("ra_profile_uuid".to_string()),
        ..SecurityFilter::default()
    };
    let query = filter
        .apply(&compile(ResourceKind::Certificate, &[], &CompileOptions::default()).unwrap())
        .unwrap();

    assert_eq!(engine.select_ids(&query).unwrap(), vec![objects[0]]);
}

// Join scenario: groups A/B, A, none.
fn group_fixture() -> (MemoryEngine, Vec<Uuid>) {
    let objects = ids(3);
    let mut engine = MemoryEngine::new();

    let group = |name: &str| Record::new(Uuid::new_v4()).with_field("name", Value::Text(name.to_string()));

    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0]).with_relation("groups", vec![group("A"), group("B")]),
    );
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[1]).with_relation("groups", vec![group("A")]),
    );
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[2]).with_relation("groups", Vec::new()),
    );

    (engine, objects)
}

#[test]
fn join_equals_matches_any_related_row() {
    let (engine, o) = group_fixture();

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("group_name", FilterOperator::Equals, Some(json!("A")))],
    );

    assert_eq!(matched, sorted(vec![o[0], o[1]]));
}

#[test]
fn join_not_equals_is_not_exists_of_a_match() {
    let (engine, o) = group_fixture();

    // O1 is excluded even though it also carries group B; O3 matches
    // vacuously with no groups at all.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("group_name", FilterOperator::NotEquals, Some(json!("A")))],
    );

    assert_eq!(matched, vec![o[2]]);
}

#[test]
fn join_not_contains_is_vacuous_without_related_rows() {
    let (engine, o) = group_fixture();

    // O1 carries a group containing the needle; O2's sole group matches
    // too; only the groupless object passes.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("group_name", FilterOperator::NotContains, Some(json!("A")))],
    );

    assert_eq!(matched, vec![o[2]]);
}

#[test]
fn to_one_join_filters_through_the_association() {
    let objects = ids(2);
    let mut engine = MemoryEngine::new();

    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0]).with_relation(
            "owner",
            vec![Record::new(Uuid::new_v4())
                .with_field("owner_username", Value::Text("alice".to_string()))],
        ),
    );
    engine.insert(ResourceKind::Certificate, Record::new(objects[1]));

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("owner", FilterOperator::Equals, Some(json!("alice")))],
    );
    assert_eq!(matched, vec![objects[0]]);

    // The ownerless certificate satisfies NOT_EQUALS vacuously.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("owner", FilterOperator::NotEquals, Some(json!("alice")))],
    );
    assert_eq!(matched, vec![objects[1]]);
}

#[test]
fn existence_override_tests_the_related_row() {
    let objects = ids(2);
    let mut engine = MemoryEngine::new();

    let key_item = Record::new(Uuid::new_v4())
        .with_field("key_type", Value::Enum("private_key".to_string()));
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0])
            .with_relation("key", vec![Record::new(Uuid::new_v4()).with_relation("items", vec![key_item])]),
    );
    engine.insert(ResourceKind::Certificate, Record::new(objects[1]));

    let with_key = run(
        &engine,
        ResourceKind::Certificate,
        &[property("private_key", FilterOperator::Equals, Some(json!(true)))],
    );
    assert_eq!(with_key, vec![objects[0]]);

    let without_key = run(
        &engine,
        ResourceKind::Certificate,
        &[property("private_key", FilterOperator::Equals, Some(json!(false)))],
    );
    assert_eq!(without_key, vec![objects[1]]);
}

#[test]
fn enum_fields_filter_by_resolved_code() {
    let objects = ids(2);
    let mut engine = MemoryEngine::new();

    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[0]).with_field("state", Value::Enum("revoked".to_string())),
    );
    engine.insert(
        ResourceKind::Certificate,
        Record::new(objects[1]).with_field("state", Value::Enum("issued".to_string())),
    );

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("state", FilterOperator::Equals, Some(json!("revoked")))],
    );
    assert_eq!(matched, vec![objects[0]]);

    // An unresolvable code selects no rows under either polarity.
    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("state", FilterOperator::Equals, Some(json!("shredded")))],
    );
    assert!(matched.is_empty());

    let matched = run(
        &engine,
        ResourceKind::Certificate,
        &[property("state", FilterOperator::NotEquals, Some(json!("shredded")))],
    );
    assert!(matched.is_empty());
}

#[test]
fn paging_returns_totals_across_all_pages() {
    let (engine, _) = number_fixture();
    let query = compile(ResourceKind::Certificate, &[], &CompileOptions::default()).unwrap();

    let page = engine.execute(&query, &PageRequest::new(0, 2)).unwrap();
    assert_eq!(page.ids.len(), 2);
    assert_eq!(page.total, 3);

    let rest = engine.execute(&query, &PageRequest::new(2, 2)).unwrap();
    assert_eq!(rest.ids.len(), 1);
    assert_eq!(rest.total, 3);
}
