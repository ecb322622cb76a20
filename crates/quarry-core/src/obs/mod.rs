//! Observability: ephemeral in-memory counters behind an event boundary.
//!
//! Compiler and engine logic never touch the counter state directly; all
//! instrumentation flows through [`MetricsEvent`] and [`record`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    /// A criteria list compiled successfully.
    CompileOk { criteria: u64 },
    /// A criteria list was rejected during validation.
    CompileRejected,
    /// A security overlay was applied to a compiled query.
    SecurityApplied,
    /// One engine round trip (page query or count).
    EngineQuery { rows_matched: u64 },
    /// One bulk mutation batch.
    BulkBatch { rows_touched: u64 },
}

///
/// EventReport
///
/// Point-in-time snapshot of the counters.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub compiles: u64,
    pub criteria_seen: u64,
    pub rejections: u64,
    pub security_applied: u64,
    pub engine_queries: u64,
    pub rows_matched: u64,
    pub bulk_batches: u64,
    pub rows_touched: u64,
}

thread_local! {
    static STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Record one instrumentation event.
pub fn record(event: MetricsEvent) {
    STATE.with_borrow_mut(|state| match event {
        MetricsEvent::CompileOk { criteria } => {
            state.compiles += 1;
            state.criteria_seen += criteria;
        }
        MetricsEvent::CompileRejected => state.rejections += 1,
        MetricsEvent::SecurityApplied => state.security_applied += 1,
        MetricsEvent::EngineQuery { rows_matched } => {
            state.engine_queries += 1;
            state.rows_matched += rows_matched;
        }
        MetricsEvent::BulkBatch { rows_touched } => {
            state.bulk_batches += 1;
            state.rows_touched += rows_touched;
        }
    });
}

/// Snapshot the current counters.
#[must_use]
pub fn report() -> EventReport {
    STATE.with_borrow(Clone::clone)
}

/// Reset all counters to zero.
pub fn reset() {
    STATE.with_borrow_mut(|state| *state = EventReport::default());
}

///
/// TESTS
///
