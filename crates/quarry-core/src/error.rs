use crate::{
    attribute::AttributeError, criteria::FilterError, engine::EngineError, security::SecurityError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level aggregation of the error families. Request-validation errors
/// (`Filter`, `Attribute`, `Security`) are terminal for the request; only
/// `Engine` failures are candidates for caller-side retry.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Error {
    /// True when the caller may meaningfully retry the same request.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Engine(EngineError::Transient { .. }))
    }
}

///
/// TESTS
///
