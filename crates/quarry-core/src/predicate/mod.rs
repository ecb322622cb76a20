mod ast;
mod compile;
mod normalize;
mod sql;


pub use ast::{Compare, CompareOp, CompiledQuery, IdField, Predicate};
pub use compile::{CompileOptions, compile};
pub use sql::{SqlQuery, render_count, render_select};

pub(crate) use normalize::normalize;
