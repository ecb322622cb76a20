use crate::{
    attribute::{AttributeKind, ContentType},
    registry::{JoinStep, ResourceKind},
    value::{TextMode, Value},
};
use uuid::Uuid;

///
/// Predicate AST
///
/// Canonical boolean-expression tree produced by compilation, bound to one
/// query root. The tree is the single representation both execution paths
/// consume: the in-memory engine walks it directly, the SQL renderer turns
/// it into parameterized text. No interpretation happens here.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
    Contains = 0x07,
    NotContains = 0x08,
    StartsWith = 0x09,
    EndsWith = 0x0a,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

///
/// Compare
///
/// One column-against-constant comparison. The column is relative to the
/// enclosing scope: the query root for top-level comparisons, the related
/// table inside `RelatedMatch`, the stored value inside `AttributeMatch`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Compare {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
    pub text_mode: TextMode,
}

impl Compare {
    #[must_use]
    pub fn new(column: impl Into<String>, op: CompareOp, value: Value, text_mode: TextMode) -> Self {
        Self {
            column: column.into(),
            op,
            value,
            text_mode,
        }
    }

    #[must_use]
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, CompareOp::Eq, value, TextMode::Cs)
    }

    #[must_use]
    pub fn ne(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, CompareOp::Ne, value, TextMode::Cs)
    }
}

///
/// IdField
///
/// Which identifier the security overlay scopes on: the object's own id, or
/// a parent-link column when access is granted through a parent object.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IdField {
    OwnId,
    ParentLink(String),
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare(Compare),
    /// Column holds no value (SQL NULL / absent record field).
    IsEmpty { column: String },
    IsNotEmpty { column: String },
    /// Correlated existence test over a join path; `inner` is scoped to the
    /// far end of the path.
    RelatedMatch {
        path: &'static [JoinStep],
        table: &'static str,
        inner: Box<Predicate>,
    },
    /// Existence test against the attribute store for one (kind, name,
    /// content type) triple. `inner` compares the stored value; `None`
    /// tests bare presence.
    AttributeMatch {
        kind: AttributeKind,
        name: String,
        content_type: ContentType,
        inner: Option<Box<Predicate>>,
    },
    /// Id-set membership, produced by the security overlay.
    InIds { field: IdField, ids: Vec<Uuid> },
}

impl Predicate {
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    #[must_use]
    pub fn compare(compare: Compare) -> Self {
        Self::Compare(compare)
    }

    #[must_use]
    pub fn related(path: &'static [JoinStep], table: &'static str, inner: Self) -> Self {
        Self::RelatedMatch {
            path,
            table,
            inner: Box::new(inner),
        }
    }

    #[must_use]
    pub fn attribute(
        kind: AttributeKind,
        name: impl Into<String>,
        content_type: ContentType,
        inner: Option<Self>,
    ) -> Self {
        Self::AttributeMatch {
            kind,
            name: name.into(),
            content_type,
            inner: inner.map(Box::new),
        }
    }
}

///
/// CompiledQuery
///
/// The compiler's output: a normalized predicate bound to its query root.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    pub root: ResourceKind,
    pub predicate: Predicate,
}

impl CompiledQuery {
    #[must_use]
    pub const fn new(root: ResourceKind, predicate: Predicate) -> Self {
        Self { root, predicate }
    }
}
