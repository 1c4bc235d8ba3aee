//! Error types for selection and indexing.
//!
//! Every error here is a usage error: the engine is a pure computation over
//! an in-memory snapshot, so nothing is transient and nothing is retried.
//! A well-formed query that finds nothing returns an empty result instead.

use thiserror::Error;

/// Errors surfaced by the store and the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// A single-result query matched more than one annotation.
    #[error("expected a single {type_name} annotation, found {count}")]
    AmbiguousSelection { type_name: String, count: usize },

    /// A single-result query matched nothing.
    #[error("no {type_name} annotation {detail}")]
    NotFound { type_name: String, detail: String },

    /// Boundaries that cannot be compared or used as a range.
    #[error("invalid boundary: {reason}")]
    InvalidBoundary { reason: String },

    /// A span whose end lies before its begin.
    #[error("invalid span [{begin}, {end}): end before begin")]
    InvalidSpan { begin: usize, end: usize },

    /// An annotation handle that belongs to another store.
    #[error("annotation belongs to store {found}, not store {expected}")]
    ForeignAnnotation { expected: u64, found: u64 },

    /// A type id that belongs to another type system.
    #[error("type belongs to type system {found}, not type system {expected}")]
    ForeignType { expected: u32, found: u32 },

    /// A type name that is not declared in the type system.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// A type system declaration that cannot be built.
    #[error("invalid type system: {0}")]
    InvalidTypeSystem(String),

    /// Priority lists that order two types both ways.
    #[error("type priorities form a cycle through '{0}'")]
    PriorityCycle(String),

    /// A configuration document that could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for selection operations.
pub type SelectResult<T> = Result<T, SelectError>;
