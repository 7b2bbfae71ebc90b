//! Flattening of membership argument lists.

use crate::error::{BuildError, Result};
use crate::value::{Arg, SqlValue};

/// Flattens an argument list by exactly one level.
///
/// Nested sequences are expanded in place, preserving order. Nulls are
/// rejected with [`BuildError::NilNotAllowed`] at the top level and inside a
/// first-level sequence; a sequence inside a sequence is rejected with
/// [`BuildError::NestedSlice`]. An empty input yields an empty list.
///
/// # Errors
///
/// Returns the first violation found, scanning left to right.
pub fn normalize_args<I>(args: I) -> Result<Vec<SqlValue>>
where
    I: IntoIterator<Item = Arg>,
{
    let mut out = Vec::new();
    for arg in args {
        match into_items(arg) {
            Items::Scalar(value) => {
                if value.is_null() {
                    return Err(BuildError::NilNotAllowed);
                }
                out.push(value);
            }
            Items::Sequence(items) => {
                for item in items {
                    match into_items(item) {
                        Items::Scalar(value) if value.is_null() => {
                            return Err(BuildError::NilNotAllowed);
                        }
                        Items::Scalar(value) => out.push(value),
                        Items::Sequence(_) => return Err(BuildError::NestedSlice),
                    }
                }
            }
        }
    }
    Ok(out)
}

enum Items {
    Scalar(SqlValue),
    Sequence(Vec<Arg>),
}

// Array values count as sequences so pre-built arrays flatten the same way.
fn into_items(arg: Arg) -> Items {
    match arg {
        Arg::List(items) => Items::Sequence(items),
        Arg::Value(SqlValue::Array(values)) => {
            Items::Sequence(values.into_iter().map(Arg::Value).collect())
        }
        Arg::Value(value) => Items::Scalar(value),
    }
}
