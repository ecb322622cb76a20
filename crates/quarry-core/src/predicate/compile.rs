use crate::{
    criteria::{
        FieldRef, FilterCriterion, FilterError, FilterOperator, NormalizedCriterion, normalize_all,
    },
    obs::{self, MetricsEvent},
    predicate::{
        ast::{Compare, CompareOp, CompiledQuery, Predicate},
        normalize,
    },
    registry::{FieldDescriptor, ResourceKind},
    value::{TextMode, Value},
};
use serde::{Deserialize, Serialize};

///
/// CompileOptions
///
/// Per-call compilation settings. Text comparisons default to
/// case-sensitive; case-insensitive matching is an explicit opt-in. The
/// chunk size bounds bulk mutation batches.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub text_mode: TextMode,
    pub bulk_chunk_size: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Cs,
            bulk_chunk_size: 1000,
        }
    }
}

/// Compile an ordered criteria list into a normalized predicate bound to
/// `kind`.
///
/// Criteria are implicitly ANDed. An empty list compiles to the match-all
/// predicate; the security overlay is applied separately and is never
/// optional for callers that have one.
pub fn compile(
    kind: ResourceKind,
    criteria: &[FilterCriterion],
    options: &CompileOptions,
) -> Result<CompiledQuery, FilterError> {
    let normalized = match normalize_all(kind, criteria) {
        Ok(normalized) => normalized,
        Err(err) => {
            obs::record(MetricsEvent::CompileRejected);
            return Err(err);
        }
    };

    let fragments = normalized
        .iter()
        .map(|criterion| compile_criterion(criterion, options))
        .collect::<Result<Vec<_>, _>>();

    let fragments = match fragments {
        Ok(fragments) => fragments,
        Err(err) => {
            obs::record(MetricsEvent::CompileRejected);
            return Err(err);
        }
    };

    obs::record(MetricsEvent::CompileOk {
        criteria: criteria.len() as u64,
    });

    let predicate = normalize::normalize(&Predicate::And(fragments));

    Ok(CompiledQuery::new(kind, predicate))
}

fn compile_criterion(
    criterion: &NormalizedCriterion,
    options: &CompileOptions,
) -> Result<Predicate, FilterError> {
    match &criterion.field {
        FieldRef::Property(descriptor) => {
            if descriptor.existence.is_some() {
                compile_existence(descriptor, criterion)
            } else if descriptor.join_path.is_empty() {
                Ok(compile_direct(descriptor.column, criterion, options))
            } else {
                Ok(compile_joined(descriptor, criterion, options))
            }
        }
        FieldRef::Attribute {
            kind,
            name,
            content_type,
        } => Ok(compile_attribute(
            *kind,
            name,
            *content_type,
            criterion,
            options,
        )),
    }
}

// Direct column on the query root. NOT_EQUALS and NOT_CONTAINS carry the
// absent-row convention: objects without the value satisfy them.
fn compile_direct(
    column: &str,
    criterion: &NormalizedCriterion,
    options: &CompileOptions,
) -> Predicate {
    let mode = options.text_mode;

    match criterion.operator {
        FilterOperator::Empty => Predicate::IsEmpty {
            column: column.to_string(),
        },
        FilterOperator::NotEmpty => Predicate::IsNotEmpty {
            column: column.to_string(),
        },

        FilterOperator::Equals => Predicate::Or(
            criterion
                .values
                .iter()
                .map(|value| scalar_compare(column, CompareOp::Eq, value, mode))
                .collect(),
        ),

        FilterOperator::NotEquals => Predicate::And(
            criterion
                .values
                .iter()
                .map(|value| match value {
                    Value::NoMatch => Predicate::False,
                    _ => Predicate::Or(vec![
                        Predicate::Compare(Compare::ne(column, value.clone())),
                        Predicate::IsEmpty {
                            column: column.to_string(),
                        },
                    ]),
                })
                .collect(),
        ),

        FilterOperator::NotContains => Predicate::Or(vec![
            Predicate::not(single_compare(column, CompareOp::Contains, criterion, mode)),
            Predicate::IsEmpty {
                column: column.to_string(),
            },
        ]),

        FilterOperator::Greater => single_compare(column, CompareOp::Gt, criterion, mode),
        FilterOperator::GreaterOrEqual => single_compare(column, CompareOp::Gte, criterion, mode),
        FilterOperator::Lesser => single_compare(column, CompareOp::Lt, criterion, mode),
        FilterOperator::LesserOrEqual => single_compare(column, CompareOp::Lte, criterion, mode),
        FilterOperator::Contains => single_compare(column, CompareOp::Contains, criterion, mode),
        FilterOperator::StartsWith => single_compare(column, CompareOp::StartsWith, criterion, mode),
        FilterOperator::EndsWith => single_compare(column, CompareOp::EndsWith, criterion, mode),
    }
}

// Field across a join path. Positive operators compile to a correlated
// existence test with the comparison at the far end; negative operators to
// NOT EXISTS(matching row), so objects with zero related rows satisfy them
// vacuously.
fn compile_joined(
    descriptor: &'static FieldDescriptor,
    criterion: &NormalizedCriterion,
    options: &CompileOptions,
) -> Predicate {
    let table = descriptor
        .related
        .map_or_else(|| descriptor.kind.table(), ResourceKind::table);
    let related = |inner: Predicate| Predicate::related(descriptor.join_path, table, inner);
    let column = descriptor.column;

    match criterion.operator {
        FilterOperator::Empty => Predicate::not(related(Predicate::IsNotEmpty {
            column: column.to_string(),
        })),
        FilterOperator::NotEmpty => related(Predicate::IsNotEmpty {
            column: column.to_string(),
        }),

        FilterOperator::NotEquals => {
            // Per-value AND law: one unresolvable-enum sentinel makes the
            // whole conjunction match nothing, even when other values in
            // the list would resolve.
            if criterion.values.iter().any(|v| matches!(v, Value::NoMatch)) {
                return Predicate::False;
            }

            let matching = compile_direct(
                column,
                &NormalizedCriterion {
                    field: criterion.field.clone(),
                    operator: FilterOperator::Equals,
                    values: criterion.values.clone(),
                },
                options,
            );
            Predicate::not(related(matching))
        }
        FilterOperator::NotContains => {
            let matching = compile_direct(
                column,
                &NormalizedCriterion {
                    field: criterion.field.clone(),
                    operator: FilterOperator::Contains,
                    values: criterion.values.clone(),
                },
                options,
            );
            Predicate::not(related(matching))
        }

        _ => related(compile_direct(column, criterion, options)),
    }
}

// Boolean field implemented as "does a related row with the override
// property exist". Only the equality pair is meaningful; presence tests
// are rejected because the field has no column of its own.
fn compile_existence(
    descriptor: &'static FieldDescriptor,
    criterion: &NormalizedCriterion,
) -> Result<Predicate, FilterError> {
    let Some(existence) = descriptor.existence else {
        return Ok(Predicate::False);
    };

    if !matches!(
        criterion.operator,
        FilterOperator::Equals | FilterOperator::NotEquals
    ) {
        return Err(FilterError::UnsupportedOperator {
            field: descriptor.id.to_string(),
            operator: criterion.operator,
            value_type: descriptor.value_type,
        });
    }

    let table = descriptor
        .related
        .map_or_else(|| descriptor.kind.table(), ResourceKind::table);
    let exists = || {
        Predicate::related(
            descriptor.join_path,
            table,
            Predicate::Compare(Compare::eq(
                existence.column,
                Value::Enum(existence.equals.to_string()),
            )),
        )
    };

    let per_value = |value: &Value| {
        let want = matches!(value, Value::Bool(true))
            == matches!(criterion.operator, FilterOperator::Equals);
        if want {
            exists()
        } else {
            Predicate::not(exists())
        }
    };

    let fragments: Vec<_> = criterion.values.iter().map(per_value).collect();
    Ok(match criterion.operator {
        FilterOperator::Equals => Predicate::Or(fragments),
        _ => Predicate::And(fragments),
    })
}

// Attribute-sourced field. The comparison runs against the stored value
// inside an EXISTS over the attribute store; negative operators become
// NOT EXISTS so objects without the attribute satisfy them.
fn compile_attribute(
    kind: crate::attribute::AttributeKind,
    name: &str,
    content_type: crate::attribute::ContentType,
    criterion: &NormalizedCriterion,
    options: &CompileOptions,
) -> Predicate {
    const VALUE_COLUMN: &str = "value";

    let attr =
        |inner: Option<Predicate>| Predicate::attribute(kind, name, content_type, inner);

    match criterion.operator {
        FilterOperator::Empty => Predicate::not(attr(None)),
        FilterOperator::NotEmpty => attr(None),

        FilterOperator::NotEquals => {
            let matching = compile_direct(
                VALUE_COLUMN,
                &NormalizedCriterion {
                    field: criterion.field.clone(),
                    operator: FilterOperator::Equals,
                    values: criterion.values.clone(),
                },
                options,
            );
            Predicate::not(attr(Some(matching)))
        }
        FilterOperator::NotContains => {
            let matching = compile_direct(
                VALUE_COLUMN,
                &NormalizedCriterion {
                    field: criterion.field.clone(),
                    operator: FilterOperator::Contains,
                    values: criterion.values.clone(),
                },
                options,
            );
            Predicate::not(attr(Some(matching)))
        }

        _ => attr(Some(compile_direct(VALUE_COLUMN, criterion, options))),
    }
}

// The sentinel produced for unresolvable enum codes matches nothing under
// any operator.
fn scalar_compare(column: &str, op: CompareOp, value: &Value, mode: TextMode) -> Predicate {
    match value {
        Value::NoMatch => Predicate::False,
        _ => Predicate::Compare(Compare::new(column, op, value.clone(), mode)),
    }
}

fn single_compare(
    column: &str,
    op: CompareOp,
    criterion: &NormalizedCriterion,
    mode: TextMode,
) -> Predicate {
    criterion
        .values
        .first()
        .map_or(Predicate::False, |value| {
            scalar_compare(column, op, value, mode)
        })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::FilterSource;
    use serde_json::json;

    fn property(
        field: &str,
        operator: FilterOperator,
        value: Option<serde_json::Value>,
    ) -> FilterCriterion {
        FilterCriterion::new(FilterSource::Property, field, operator, value)
    }

    fn compile_one(kind: ResourceKind, criterion: FilterCriterion) -> CompiledQuery {
        compile(kind, &[criterion], &CompileOptions::default()).unwrap()
    }

    #[test]
    fn empty_criteria_compile_to_match_all() {
        let query = compile(
            ResourceKind::Certificate,
            &[],
            &CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(query.predicate, Predicate::True);
    }

    #[test]
    fn direct_not_equals_admits_absent_values() {
        let query = compile_one(
            ResourceKind::Certificate,
            property("key_size", FilterOperator::NotEquals, Some(json!(2048))),
        );

        let Predicate::Or(children) = &query.predicate else {
            panic!("expected OR, got {:?}", query.predicate);
        };
        assert!(children.contains(&Predicate::IsEmpty {
            column: "key_size".to_string()
        }));
        assert!(
            children
                .iter()
                .any(|c| matches!(c, Predicate::Compare(cmp) if cmp.op == CompareOp::Ne))
        );
    }

    #[test]
    fn multi_value_equals_decomposes_to_or() {
        let query = compile_one(
            ResourceKind::Certificate,
            property(
                "common_name",
                FilterOperator::Equals,
                Some(json!(["a.example", "b.example"])),
            ),
        );

        let Predicate::Or(children) = &query.predicate else {
            panic!("expected OR, got {:?}", query.predicate);
        };
        assert_eq!(children.len(), 2);
        assert!(
            children
                .iter()
                .all(|c| matches!(c, Predicate::Compare(cmp) if cmp.op == CompareOp::Eq))
        );
    }

    #[test]
    fn joined_not_equals_compiles_to_not_exists() {
        let query = compile_one(
            ResourceKind::Certificate,
            property("group_name", FilterOperator::NotEquals, Some(json!("ops"))),
        );

        let Predicate::Not(inner) = &query.predicate else {
            panic!("expected NOT, got {:?}", query.predicate);
        };
        assert!(matches!(**inner, Predicate::RelatedMatch { .. }));
    }

    #[test]
    fn unresolvable_enum_code_matches_nothing_for_both_polarities() {
        let equals = compile_one(
            ResourceKind::Certificate,
            property("state", FilterOperator::Equals, Some(json!("shredded"))),
        );
        assert_eq!(equals.predicate, Predicate::False);

        let not_equals = compile_one(
            ResourceKind::Certificate,
            property("state", FilterOperator::NotEquals, Some(json!("shredded"))),
        );
        assert_eq!(not_equals.predicate, Predicate::False);
    }

    #[test]
    fn joined_not_equals_with_a_sentinel_matches_nothing() {
        let descriptor = crate::registry::FieldRegistry::get()
            .lookup(ResourceKind::Certificate, "group_name")
            .expect("certificate group_name is in the catalog");

        // One unresolvable code in the list collapses the conjunction,
        // resolvable siblings notwithstanding.
        let criterion = NormalizedCriterion {
            field: FieldRef::Property(descriptor),
            operator: FilterOperator::NotEquals,
            values: vec![Value::Text("ops".to_string()), Value::NoMatch],
        };

        let fragment = compile_criterion(&criterion, &CompileOptions::default()).unwrap();
        assert_eq!(fragment, Predicate::False);
    }

    #[test]
    fn existence_override_lowers_to_exists() {
        let has_key = compile_one(
            ResourceKind::Certificate,
            property("private_key", FilterOperator::Equals, Some(json!(true))),
        );
        assert!(matches!(has_key.predicate, Predicate::RelatedMatch { .. }));

        let lacks_key = compile_one(
            ResourceKind::Certificate,
            property("private_key", FilterOperator::Equals, Some(json!(false))),
        );
        assert!(matches!(lacks_key.predicate, Predicate::Not(_)));
    }

    #[test]
    fn existence_override_rejects_presence_operators() {
        let err = compile(
            ResourceKind::Certificate,
            &[property("private_key", FilterOperator::Empty, None)],
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, FilterError::UnsupportedOperator { .. }));
    }

    #[test]
    fn attribute_empty_is_not_exists() {
        let query = compile_one(
            ResourceKind::Certificate,
            FilterCriterion::new(
                FilterSource::Custom,
                "department|STRING",
                FilterOperator::Empty,
                None,
            ),
        );

        let Predicate::Not(inner) = &query.predicate else {
            panic!("expected NOT, got {:?}", query.predicate);
        };
        assert!(
            matches!(&**inner, Predicate::AttributeMatch { inner: None, name, .. } if name == "department")
        );
    }

    #[test]
    fn criteria_order_does_not_change_the_compiled_tree() {
        let a = property("common_name", FilterOperator::Contains, Some(json!("x")));
        let b = property("key_size", FilterOperator::Greater, Some(json!(1024)));

        let forward = compile(
            ResourceKind::Certificate,
            &[a.clone(), b.clone()],
            &CompileOptions::default(),
        )
        .unwrap();
        let reversed =
            compile(ResourceKind::Certificate, &[b, a], &CompileOptions::default()).unwrap();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn text_mode_flows_into_compares() {
        let options = CompileOptions {
            text_mode: TextMode::Ci,
            ..CompileOptions::default()
        };
        let query = compile(
            ResourceKind::Certificate,
            &[property(
                "common_name",
                FilterOperator::Contains,
                Some(json!("EXAMPLE")),
            )],
            &options,
        )
        .unwrap();

        let Predicate::Compare(cmp) = &query.predicate else {
            panic!("expected Compare, got {:?}", query.predicate);
        };
        assert_eq!(cmp.text_mode, TextMode::Ci);
    }
}
