mod bulk;
mod memory;

#[cfg(test)]
mod tests;

pub use bulk::{bulk_delete, bulk_update};
pub use memory::{AttributeRow, MemoryEngine, Record};

use crate::{predicate::CompiledQuery, registry::ResourceKind, value::Value};
use thiserror::Error as ThisError;
use uuid::Uuid;

///
/// EngineError
///
/// Execution failures are transient from the compiler's point of view: the
/// caller may retry, the compiler never does.
///

#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("storage backend unavailable: {reason}")]
    Transient { reason: String },

    #[error("predicate not executable by this engine: {reason}")]
    Unsupported { reason: String },
}

///
/// PageRequest
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// First page at the default size.
    #[must_use]
    pub const fn first() -> Self {
        Self::new(0, 100)
    }
}

///
/// Page
///
/// One page of matching object ids plus the total match count across all
/// pages.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page {
    pub ids: Vec<Uuid>,
    pub total: u64,
}

///
/// StorageEngine
///
/// Execution boundary for compiled queries. The predicate tree is the only
/// contract; engines decide how to traverse or translate it. Mutation
/// entrypoints operate on explicit id sets so bulk flows can batch them.
///

pub trait StorageEngine {
    /// Ids of all objects matching the query, deterministically ordered.
    fn select_ids(&self, query: &CompiledQuery) -> Result<Vec<Uuid>, EngineError>;

    /// One page of matches plus the total count.
    fn execute(&self, query: &CompiledQuery, page: &PageRequest) -> Result<Page, EngineError> {
        let ids = self.select_ids(query)?;
        let total = ids.len() as u64;

        let ids = ids
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();

        Ok(Page { ids, total })
    }

    /// Apply field updates to the identified objects, returning the number
    /// of rows touched.
    fn update_ids(
        &mut self,
        root: ResourceKind,
        ids: &[Uuid],
        patch: &[(String, Value)],
    ) -> Result<u64, EngineError>;

    /// Delete the identified objects, returning the number of rows removed.
    fn delete_ids(&mut self, root: ResourceKind, ids: &[Uuid]) -> Result<u64, EngineError>;
}
