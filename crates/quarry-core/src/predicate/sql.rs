use crate::{
    predicate::ast::{Compare, CompareOp, CompiledQuery, IdField, Predicate},
    value::{TextMode, Value, casefold},
};
use std::fmt::Write;

///
/// Parameterized SQL rendering.
///
/// One of the two consumers of the canonical predicate tree. Identifiers
/// come exclusively from the static catalog; every request-supplied value
/// is emitted as a `$n` placeholder, never interpolated. LIKE patterns are
/// built parameter-side with wildcard escaping.
///
/// The output targets a denormalized reference schema: every related table
/// carries a direct `<root_table>_uuid` correlation column, so a join path
/// of any length renders as one EXISTS against the path's final table and
/// the intermediate steps are not traversed. The attribute store is a
/// single `attribute_content_item` table keyed by (object uuid, object
/// type, attribute kind, name, content type). Engines backed by a
/// normalized schema should consume the predicate tree directly; the
/// `RelatedMatch` nodes keep their full step lists for that purpose.
///

///
/// SqlQuery
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<Value>,
}

/// Render the page statement: ids of matching root objects.
#[must_use]
pub fn render_select(query: &CompiledQuery) -> SqlQuery {
    render(query, "t.uuid")
}

/// Render the count statement for the same predicate.
#[must_use]
pub fn render_count(query: &CompiledQuery) -> SqlQuery {
    render(query, "COUNT(*)")
}

fn render(query: &CompiledQuery, projection: &str) -> SqlQuery {
    let table = query.root.table();
    let mut renderer = Renderer {
        params: Vec::new(),
        depth: 0,
        root: query.root,
    };

    let scope = Scope { alias: "t", table };
    let condition = renderer.predicate(&query.predicate, &scope);

    SqlQuery {
        text: format!("SELECT {projection} FROM {table} t WHERE {condition}"),
        params: renderer.params,
    }
}

struct Scope<'a> {
    alias: &'a str,
    table: &'a str,
}

struct Renderer {
    params: Vec<Value>,
    depth: usize,
    root: crate::registry::ResourceKind,
}

impl Renderer {
    fn predicate(&mut self, predicate: &Predicate, scope: &Scope<'_>) -> String {
        match predicate {
            Predicate::True => "1 = 1".to_string(),
            Predicate::False => "1 = 0".to_string(),

            Predicate::And(children) => self.combine(children, " AND ", scope),
            Predicate::Or(children) => self.combine(children, " OR ", scope),
            Predicate::Not(inner) => {
                let inner = self.predicate(inner, scope);
                format!("NOT ({inner})")
            }

            Predicate::Compare(cmp) => self.compare(cmp, scope),

            Predicate::IsEmpty { column } => format!("{}.{column} IS NULL", scope.alias),
            Predicate::IsNotEmpty { column } => format!("{}.{column} IS NOT NULL", scope.alias),

            Predicate::RelatedMatch { table, inner, .. } => {
                self.depth += 1;
                let alias = format!("r{}", self.depth);
                let related = Scope {
                    alias: &alias,
                    table,
                };
                let inner = self.predicate(inner, &related);

                format!(
                    "EXISTS (SELECT 1 FROM {table} {alias} WHERE {alias}.{parent}_uuid = {outer}.uuid AND ({inner}))",
                    parent = scope.table,
                    outer = scope.alias,
                )
            }

            Predicate::AttributeMatch {
                kind,
                name,
                content_type,
                inner,
            } => {
                self.depth += 1;
                let alias = format!("a{}", self.depth);

                let object_type = self.param(Value::Text(self.root.to_string()));
                let attr_kind = self.param(Value::Text(kind.to_string()));
                let attr_name = self.param(Value::Text(name.clone()));
                let attr_content = self.param(Value::Text(content_type.to_string()));

                let mut sql = format!(
                    "EXISTS (SELECT 1 FROM attribute_content_item {alias} \
                     WHERE {alias}.object_uuid = {outer}.uuid \
                     AND {alias}.object_type = {object_type} \
                     AND {alias}.attribute_kind = {attr_kind} \
                     AND {alias}.attribute_name = {attr_name} \
                     AND {alias}.content_type = {attr_content}",
                    outer = scope.alias,
                );

                if let Some(inner) = inner {
                    let attribute = Scope {
                        alias: &alias,
                        table: "attribute_content_item",
                    };
                    let condition = self.predicate(inner, &attribute);
                    let _ = write!(sql, " AND ({condition})");
                }
                sql.push(')');
                sql
            }

            Predicate::InIds { field, ids } => {
                if ids.is_empty() {
                    return "1 = 0".to_string();
                }

                let column = match field {
                    IdField::OwnId => "uuid",
                    IdField::ParentLink(column) => column.as_str(),
                };
                let placeholders: Vec<_> = ids
                    .iter()
                    .map(|id| self.param(Value::Id(*id)))
                    .collect();

                format!(
                    "{}.{column} IN ({})",
                    scope.alias,
                    placeholders.join(", ")
                )
            }
        }
    }

    fn combine(&mut self, children: &[Predicate], joiner: &str, scope: &Scope<'_>) -> String {
        let rendered: Vec<_> = children
            .iter()
            .map(|child| self.predicate(child, scope))
            .collect();

        if rendered.len() == 1 {
            return rendered.into_iter().next().unwrap_or_default();
        }

        format!("({})", rendered.join(joiner))
    }

    fn compare(&mut self, cmp: &Compare, scope: &Scope<'_>) -> String {
        let column = column_expr(&cmp.column, cmp, scope);

        match cmp.op {
            CompareOp::Eq => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} = {p}")
            }
            CompareOp::Ne => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} <> {p}")
            }
            CompareOp::Lt => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} < {p}")
            }
            CompareOp::Lte => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} <= {p}")
            }
            CompareOp::Gt => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} > {p}")
            }
            CompareOp::Gte => {
                let p = self.param(self.bind_value(cmp));
                format!("{column} >= {p}")
            }
            CompareOp::Contains => self.like(column, cmp, "%", "%", false),
            CompareOp::NotContains => self.like(column, cmp, "%", "%", true),
            CompareOp::StartsWith => self.like(column, cmp, "", "%", false),
            CompareOp::EndsWith => self.like(column, cmp, "%", "", false),
        }
    }

    fn like(
        &mut self,
        column: String,
        cmp: &Compare,
        prefix: &str,
        suffix: &str,
        negated: bool,
    ) -> String {
        let needle = match &cmp.value {
            Value::Text(s) => s.as_str(),
            // Normalization restricts substring operators to text fields.
            _ => return "1 = 0".to_string(),
        };

        let needle = match cmp.text_mode {
            TextMode::Cs => escape_like(needle),
            TextMode::Ci => escape_like(&casefold(needle)),
        };

        let p = self.param(Value::Text(format!("{prefix}{needle}{suffix}")));
        let keyword = if negated { "NOT LIKE" } else { "LIKE" };
        format!("{column} {keyword} {p} ESCAPE '\\'")
    }

    fn bind_value(&self, cmp: &Compare) -> Value {
        match (&cmp.value, cmp.text_mode) {
            (Value::Text(s), TextMode::Ci) => Value::Text(casefold(s)),
            (value, _) => value.clone(),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

fn column_expr(column: &str, cmp: &Compare, scope: &Scope<'_>) -> String {
    let qualified = format!("{}.{column}", scope.alias);

    // Case folding happens on both sides so the parameter stays a plain
    // equality/LIKE operand.
    if matches!(cmp.text_mode, TextMode::Ci) && matches!(cmp.value, Value::Text(_)) {
        return format!("LOWER({qualified})");
    }

    qualified
}

// Backslash-escape the LIKE metacharacters in request input.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

///
/// TESTS
///
