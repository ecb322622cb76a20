use crate::{
    predicate::ast::{IdField, Predicate},
    value::{TextMode, Value},
};

///
/// Normalize a predicate into a canonical, deterministic form.
///
/// Guarantees:
/// - Logical equivalence is preserved
/// - Nested AND / OR nodes are flattened
/// - Neutral elements are removed (True / False)
/// - Double negation is eliminated
/// - Child predicates are deterministically ordered
///
/// Identical criteria therefore compile to identical trees regardless of
/// AND-operand order, which is what the equality of compiled queries in
/// tests relies on.
///
#[must_use]
pub(crate) fn normalize(predicate: &Predicate) -> Predicate {
    match predicate {
        Predicate::True => Predicate::True,
        Predicate::False => Predicate::False,

        Predicate::And(children) => normalize_and(children),
        Predicate::Or(children) => normalize_or(children),
        Predicate::Not(inner) => normalize_not(inner),

        Predicate::Compare(cmp) => Predicate::Compare(cmp.clone()),
        Predicate::IsEmpty { column } => Predicate::IsEmpty {
            column: column.clone(),
        },
        Predicate::IsNotEmpty { column } => Predicate::IsNotEmpty {
            column: column.clone(),
        },

        Predicate::RelatedMatch { path, table, inner } => match normalize(inner) {
            // An existence test over an unsatisfiable inner selects nothing.
            Predicate::False => Predicate::False,
            normalized => Predicate::RelatedMatch {
                path: *path,
                table: *table,
                inner: Box::new(normalized),
            },
        },

        Predicate::AttributeMatch {
            kind,
            name,
            content_type,
            inner,
        } => match inner.as_deref().map(normalize) {
            Some(Predicate::False) => Predicate::False,
            normalized => Predicate::AttributeMatch {
                kind: *kind,
                name: name.clone(),
                content_type: *content_type,
                inner: normalized.map(Box::new),
            },
        },

        Predicate::InIds { field, ids } => {
            if ids.is_empty() {
                return Predicate::False;
            }

            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();

            Predicate::InIds {
                field: field.clone(),
                ids,
            }
        }
    }
}

fn normalize_not(inner: &Predicate) -> Predicate {
    match normalize(inner) {
        Predicate::Not(double) => normalize(&double),
        Predicate::True => Predicate::False,
        Predicate::False => Predicate::True,
        normalized => Predicate::Not(Box::new(normalized)),
    }
}

/// AND(True, x) → x; AND(False, x) → False; nested ANDs flatten; AND() →
/// True. Children are sorted deterministically.
fn normalize_and(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::True => {}
            Predicate::False => return Predicate::False,
            Predicate::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return Predicate::True;
    }
    if out.len() == 1 {
        return out.pop().unwrap_or(Predicate::True);
    }

    out.sort_by_cached_key(sort_key);
    Predicate::And(out)
}

/// OR(False, x) → x; OR(True, x) → True; nested ORs flatten; OR() → False.
/// Children are sorted deterministically.
fn normalize_or(children: &[Predicate]) -> Predicate {
    let mut out = Vec::new();

    for child in children {
        match normalize(child) {
            Predicate::False => {}
            Predicate::True => return Predicate::True,
            Predicate::Or(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return Predicate::False;
    }
    if out.len() == 1 {
        return out.pop().unwrap_or(Predicate::False);
    }

    out.sort_by_cached_key(sort_key);
    Predicate::Or(out)
}

// Deterministic, length-prefixed sort keys. Used only for ordering, never
// for display or hashing.

const PRED_TRUE: u8 = 0x00;
const PRED_FALSE: u8 = 0x01;
const PRED_AND: u8 = 0x02;
const PRED_OR: u8 = 0x03;
const PRED_NOT: u8 = 0x04;
const PRED_COMPARE: u8 = 0x05;
const PRED_IS_EMPTY: u8 = 0x06;
const PRED_IS_NOT_EMPTY: u8 = 0x07;
const PRED_RELATED: u8 = 0x08;
const PRED_ATTRIBUTE: u8 = 0x09;
const PRED_IN_IDS: u8 = 0x0a;

fn sort_key(predicate: &Predicate) -> Vec<u8> {
    let mut out = Vec::new();
    encode_predicate(&mut out, predicate);
    out
}

fn encode_predicate(out: &mut Vec<u8>, predicate: &Predicate) {
    match predicate {
        Predicate::True => out.push(PRED_TRUE),
        Predicate::False => out.push(PRED_FALSE),
        Predicate::And(children) | Predicate::Or(children) => {
            out.push(if matches!(predicate, Predicate::And(_)) {
                PRED_AND
            } else {
                PRED_OR
            });
            push_len(out, children.len());
            for child in children {
                encode_predicate(out, child);
            }
        }
        Predicate::Not(inner) => {
            out.push(PRED_NOT);
            encode_predicate(out, inner);
        }
        Predicate::Compare(cmp) => {
            out.push(PRED_COMPARE);
            push_str(out, &cmp.column);
            out.push(cmp.op.tag());
            out.push(match cmp.text_mode {
                TextMode::Cs => 0,
                TextMode::Ci => 1,
            });
            encode_value(out, &cmp.value);
        }
        Predicate::IsEmpty { column } => {
            out.push(PRED_IS_EMPTY);
            push_str(out, column);
        }
        Predicate::IsNotEmpty { column } => {
            out.push(PRED_IS_NOT_EMPTY);
            push_str(out, column);
        }
        Predicate::RelatedMatch { path, table, inner } => {
            out.push(PRED_RELATED);
            push_str(out, table);
            push_len(out, path.len());
            for step in *path {
                push_str(out, step.relation);
                out.push(u8::from(step.to_many));
            }
            encode_predicate(out, inner);
        }
        Predicate::AttributeMatch {
            kind,
            name,
            content_type,
            inner,
        } => {
            out.push(PRED_ATTRIBUTE);
            push_str(out, &kind.to_string());
            push_str(out, name);
            push_str(out, &content_type.to_string());
            if let Some(inner) = inner {
                out.push(1);
                encode_predicate(out, inner);
            } else {
                out.push(0);
            }
        }
        Predicate::InIds { field, ids } => {
            out.push(PRED_IN_IDS);
            match field {
                IdField::OwnId => out.push(0),
                IdField::ParentLink(column) => {
                    out.push(1);
                    push_str(out, column);
                }
            }
            push_len(out, ids.len());
            for id in ids {
                out.extend_from_slice(id.as_bytes());
            }
        }
    }
}

fn encode_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Text(s) => {
            out.push(0x01);
            push_str(out, s);
        }
        Value::Number(n) => {
            out.push(0x02);
            // Total-order bit pattern keeps NaN payloads deterministic.
            out.extend_from_slice(&n.to_bits().to_be_bytes());
        }
        Value::Bool(b) => {
            out.push(0x03);
            out.push(u8::from(*b));
        }
        Value::Date(d) => {
            out.push(0x04);
            push_str(out, &d.to_string());
        }
        Value::DateTime(dt) => {
            out.push(0x05);
            push_str(out, &dt.to_rfc3339());
        }
        Value::Time(t) => {
            out.push(0x06);
            push_str(out, &t.to_string());
        }
        Value::Enum(code) => {
            out.push(0x07);
            push_str(out, code);
        }
        Value::Id(id) => {
            out.push(0x08);
            out.extend_from_slice(id.as_bytes());
        }
        Value::NoMatch => out.push(0x09),
    }
}

fn push_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_be_bytes());
}

fn push_str(out: &mut Vec<u8>, s: &str) {
    push_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

///
/// TESTS
///
