use crate::{
    engine::{EngineError, StorageEngine},
    obs::{self, MetricsEvent},
    predicate::{CompileOptions, CompiledQuery},
    value::Value,
};

///
/// Bulk mutation over a compiled predicate.
///
/// Matching ids are resolved once, then mutated in fixed-size batches to
/// bound transaction duration. Batches are independent units: a failed
/// batch leaves earlier batches applied, and the caller may retry it alone.
///

/// Apply `patch` to every object matching `query`. Returns rows touched.
pub fn bulk_update<E: StorageEngine>(
    engine: &mut E,
    query: &CompiledQuery,
    patch: &[(String, Value)],
    options: &CompileOptions,
) -> Result<u64, EngineError> {
    let ids = engine.select_ids(query)?;
    let mut touched = 0;

    for chunk in ids.chunks(options.bulk_chunk_size.max(1)) {
        let batch = engine.update_ids(query.root, chunk, patch)?;
        obs::record(MetricsEvent::BulkBatch {
            rows_touched: batch,
        });
        touched += batch;
    }

    Ok(touched)
}

/// Delete every object matching `query`. Returns rows removed.
pub fn bulk_delete<E: StorageEngine>(
    engine: &mut E,
    query: &CompiledQuery,
    options: &CompileOptions,
) -> Result<u64, EngineError> {
    let ids = engine.select_ids(query)?;
    let mut removed = 0;

    for chunk in ids.chunks(options.bulk_chunk_size.max(1)) {
        let batch = engine.delete_ids(query.root, chunk)?;
        obs::record(MetricsEvent::BulkBatch {
            rows_touched: batch,
        });
        removed += batch;
    }

    Ok(removed)
}
