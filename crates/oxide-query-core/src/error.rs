//! Error types for query assembly.

use thiserror::Error;

/// Errors raised while assembling or compiling a query.
///
/// Fluent mutators never return these directly. The first one encountered is
/// latched on the [`Query`](crate::Query) and surfaced by
/// [`Query::build`](crate::Query::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A column name was blank.
    #[error("column name must not be empty")]
    EmptyColumn,

    /// No table was set, or the table name was blank.
    #[error("table name must not be empty")]
    EmptyTable,

    /// A raw expression was blank.
    #[error("raw expression must not be empty")]
    EmptyExpression,

    /// A subquery column or table has no alias.
    #[error("subquery alias must not be empty")]
    EmptyAlias,

    /// A null value appeared where one is not allowed (IN, BETWEEN).
    #[error("null value not allowed in argument list")]
    NilNotAllowed,

    /// An argument list was nested more than one level deep.
    #[error("nested argument lists are not allowed")]
    NestedSlice,

    /// A subquery was requested without a configuration function.
    #[error("subquery configuration function is missing")]
    NilFunc,

    /// A join condition was incomplete or used an unknown operator.
    #[error("invalid join condition: {0}")]
    InvalidJoinCondition(String),

    /// A whitelisted table lookup did not match any permitted input.
    #[error("table input not permitted: {0}")]
    InvalidTableInput(String),

    /// A value had a shape that cannot be bound here.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// The query has no dialect to compile against.
    #[error("no dialect configured")]
    NoDialect,

    /// The query action is not one this compiler handles.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// A raw template's `?` count disagrees with its argument count.
    #[error("raw expression has {placeholders} placeholder(s) but {args} argument(s)")]
    ArgumentCount {
        /// Number of `?` tokens in the template.
        placeholders: usize,
        /// Number of arguments supplied.
        args: usize,
    },

    /// The dialect lacks a capability the query needs.
    #[error("dialect does not support {0}")]
    UnsupportedFeature(&'static str),
}

/// Result type alias for query assembly.
pub type Result<T> = std::result::Result<T, BuildError>;
