//! Bound values and dynamically-typed arguments.
//!
//! Every value that reaches the database goes through a placeholder; the
//! types here are what the compiler collects into the parameter list.

use crate::error::BuildError;

/// A SQL value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Array value, bound as a single parameter.
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Only meant for logging and debugging. Execute the
    /// parameterized form instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Array(items) => {
                let inner: Vec<String> = items.iter().map(Self::to_sql_inline).collect();
                format!("ARRAY[{}]", inner.join(", "))
            }
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// A dynamically-typed argument handed to a fluent mutator.
///
/// Arguments are either single values or sequences of arguments. How many
/// levels of sequence are accepted depends on the operator; see
/// [`normalize_args`](crate::args::normalize_args).
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A single value.
    Value(SqlValue),
    /// A sequence of arguments.
    List(Vec<Arg>),
}

impl Arg {
    /// Creates a null argument.
    #[must_use]
    pub const fn null() -> Self {
        Self::Value(SqlValue::Null)
    }

    /// Creates a sequence argument from any iterable of convertible items.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoArg,
    {
        Self::List(items.into_iter().map(IntoArg::into_arg).collect())
    }

    /// Returns `true` if this is a null value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }

    /// Collapses the argument into one bindable value.
    ///
    /// Sequences become [`SqlValue::Array`].
    #[must_use]
    pub fn into_value(self) -> SqlValue {
        match self {
            Self::Value(v) => v,
            Self::List(items) => SqlValue::Array(items.into_iter().map(Self::into_value).collect()),
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Self::List(items)
    }
}

impl TryFrom<serde_json::Value> for Arg {
    type Error = BuildError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::null()),
            Value::Bool(b) => Ok(Self::Value(SqlValue::Bool(b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Value(SqlValue::Int(i)))
                } else if n.is_u64() {
                    Err(BuildError::TypeMismatch(format!("integer {n} exceeds i64")))
                } else {
                    n.as_f64()
                        .map(|f| Self::Value(SqlValue::Float(f)))
                        .ok_or_else(|| BuildError::TypeMismatch(format!("number {n}")))
                }
            }
            Value::String(s) => Ok(Self::Value(SqlValue::Text(s))),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(_) => Err(BuildError::TypeMismatch(String::from(
                "JSON objects cannot be bound as arguments",
            ))),
        }
    }
}

/// Conversion into an [`Arg`].
pub trait IntoArg {
    /// Converts `self` into an argument.
    fn into_arg(self) -> Arg;
}

impl<T: ToSqlValue> IntoArg for T {
    fn into_arg(self) -> Arg {
        Arg::Value(self.to_sql_value())
    }
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

/// Builds a `Vec<Arg>` from heterogeneous values.
///
/// ```rust
/// use oxide_query_core::{args, Arg};
///
/// let a = args![1, "two", Arg::list([3, 4])];
/// assert_eq!(a.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::IntoArg::into_arg($value)),+]
    };
}
