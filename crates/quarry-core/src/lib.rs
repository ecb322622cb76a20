//! Filter-to-predicate compiler for inventory search: criteria lists plus an
//! authorization overlay compile into one canonical predicate tree, executed
//! by a storage engine or rendered as parameterized SQL. Exported domain
//! vocabulary lives in the `prelude`.

pub mod attribute;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod obs;
pub mod predicate;
pub mod registry;
pub mod security;
pub mod value;

pub use error::Error;

///
/// Prelude
///
/// Domain vocabulary only. Errors, engines, and renderers are imported from
/// their modules.
///

pub mod prelude {
    pub use crate::{
        attribute::{AttributeDescriptor, AttributeKind, ContentType},
        criteria::{FilterCriterion, FilterOperator, FilterSource},
        predicate::{CompileOptions, CompiledQuery, Predicate, compile},
        registry::{FieldDescriptor, FieldRegistry, ResourceKind},
        security::SecurityFilter,
        value::{TextMode, Value, ValueType},
    };
}
