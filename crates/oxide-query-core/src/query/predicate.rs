//! WHERE predicates and the mutators that append them.

use std::fmt;

use tracing::trace;

use super::Query;
use crate::args::normalize_args;
use crate::error::{BuildError, Result};
use crate::value::{Arg, IntoArg, SqlValue};

/// How a predicate joins the one before it.
///
/// Ignored on the first predicate of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    /// `AND`
    #[default]
    And,
    /// `OR`
    Or,
}

impl Conjunction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One WHERE predicate and its link to the previous one.
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Conjunction with the previous sibling.
    pub conjunction: Conjunction,
    /// What the predicate tests.
    pub kind: PredicateKind,
}

/// The shapes a predicate can take.
#[derive(Debug, Clone)]
pub enum PredicateKind {
    /// `column op $n`, with the arguments collapsed into one parameter.
    Comparison {
        /// Column reference.
        column: String,
        /// Operator, stored verbatim.
        op: String,
        /// The bound value.
        value: SqlValue,
    },
    /// `column [NOT] BETWEEN $n AND $m`.
    Between {
        /// Column reference.
        column: String,
        /// `true` for `NOT BETWEEN`.
        negated: bool,
        /// Lower bound.
        low: SqlValue,
        /// Upper bound.
        high: SqlValue,
    },
    /// `column [NOT] IN (...)`. An empty list compiles to a tautology.
    In {
        /// Column reference.
        column: String,
        /// `true` for `NOT IN`.
        negated: bool,
        /// Flattened members.
        values: Vec<SqlValue>,
    },
    /// `column IS [NOT] NULL`.
    Null {
        /// Column reference.
        column: String,
        /// `true` for `IS NOT NULL`.
        negated: bool,
    },
    /// A raw template whose `?` markers bind `args` in order.
    Raw {
        /// Template text.
        expr: String,
        /// Bound arguments.
        args: Vec<SqlValue>,
    },
    /// A parenthesized group of predicates.
    Group(Vec<Predicate>),
    /// `[column] op (subquery)`, e.g. `EXISTS (...)` or `id IN (...)`.
    Subquery {
        /// Column reference, empty for `EXISTS`.
        column: String,
        /// Upper-cased operator.
        op: String,
        /// The child query.
        query: Box<Query>,
    },
}

/// Upper-cases and collapses whitespace: ` not  in ` becomes `NOT IN`.
fn canonical_operator(op: &str) -> String {
    op.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves the two bounds of a BETWEEN from either two scalars or one
/// two-element sequence. Any other shape resolves to two nulls.
fn between_bounds(mut args: Vec<Arg>) -> Result<(SqlValue, SqlValue)> {
    let pair = match args.len() {
        2 => {
            let high = args.pop();
            let low = args.pop();
            low.zip(high)
        }
        1 => match args.pop() {
            Some(Arg::List(mut items)) if items.len() == 2 => {
                let high = items.pop();
                let low = items.pop();
                low.zip(high)
            }
            Some(Arg::Value(SqlValue::Array(mut values))) if values.len() == 2 => {
                let high = values.pop().map(Arg::Value);
                let low = values.pop().map(Arg::Value);
                low.zip(high)
            }
            _ => None,
        },
        _ => None,
    };
    let Some((low, high)) = pair else {
        return Ok((SqlValue::Null, SqlValue::Null));
    };
    Ok((bound(low)?, bound(high)?))
}

fn bound(arg: Arg) -> Result<SqlValue> {
    match arg {
        Arg::Value(SqlValue::Array(_)) | Arg::List(_) => Err(BuildError::TypeMismatch(
            String::from("BETWEEN bounds must be scalar values"),
        )),
        Arg::Value(value) => Ok(value),
    }
}

/// Collapses comparison arguments into the single bound parameter.
fn comparison_value(mut args: Vec<Arg>) -> SqlValue {
    match args.len() {
        0 => SqlValue::Null,
        1 => args.pop().map_or(SqlValue::Null, Arg::into_value),
        _ => Arg::List(args).into_value(),
    }
}

fn blank(column: &str) -> bool {
    column.trim().is_empty()
}

impl Query {
    fn push_predicate(mut self, conjunction: Conjunction, kind: PredicateKind) -> Self {
        self.predicates.push(Predicate { conjunction, kind });
        self
    }

    /// Appends a predicate, dispatching on the operator.
    ///
    /// - `BETWEEN` / `NOT BETWEEN` take two scalars or one two-element list.
    /// - `IN` / `NOT IN` flatten `args` one level.
    /// - `IS NULL` / `IS NOT NULL` ignore `args`.
    /// - `EXISTS` / `NOT EXISTS` need a subquery; see [`Query::where_subquery`].
    /// - Anything else is a comparison binding `args` as one parameter.
    #[must_use]
    pub fn where_op(self, conjunction: Conjunction, column: &str, op: &str, args: Vec<Arg>) -> Self {
        let canonical = canonical_operator(op);
        match canonical.as_str() {
            "BETWEEN" | "NOT BETWEEN" => {
                self.push_between(conjunction, column, canonical.starts_with("NOT"), args)
            }
            "IN" | "NOT IN" => self.push_in(conjunction, column, canonical.starts_with("NOT"), args),
            "IS NULL" | "IS NOT NULL" => {
                if blank(column) {
                    return self.fail(BuildError::EmptyColumn);
                }
                self.push_predicate(
                    conjunction,
                    PredicateKind::Null {
                        column: column.trim().to_string(),
                        negated: canonical == "IS NOT NULL",
                    },
                )
            }
            "EXISTS" | "NOT EXISTS" => self.fail(BuildError::NilFunc),
            _ => {
                if blank(column) {
                    return self.fail(BuildError::EmptyColumn);
                }
                self.push_predicate(
                    conjunction,
                    PredicateKind::Comparison {
                        column: column.trim().to_string(),
                        op: op.trim().to_string(),
                        value: comparison_value(args),
                    },
                )
            }
        }
    }

    fn push_between(
        self,
        conjunction: Conjunction,
        column: &str,
        negated: bool,
        args: Vec<Arg>,
    ) -> Self {
        if blank(column) {
            return self.fail(BuildError::EmptyColumn);
        }
        let (low, high) = match between_bounds(args) {
            Ok(bounds) => bounds,
            Err(err) => return self.fail(err),
        };
        if low.is_null() || high.is_null() {
            return self.fail(BuildError::NilNotAllowed);
        }
        self.push_predicate(
            conjunction,
            PredicateKind::Between {
                column: column.trim().to_string(),
                negated,
                low,
                high,
            },
        )
    }

    fn push_in(self, conjunction: Conjunction, column: &str, negated: bool, args: Vec<Arg>) -> Self {
        if blank(column) {
            return self.fail(BuildError::EmptyColumn);
        }
        let values = match normalize_args(args) {
            Ok(values) => values,
            Err(err) => return self.fail(err),
        };
        self.push_predicate(
            conjunction,
            PredicateKind::In {
                column: column.trim().to_string(),
                negated,
                values,
            },
        )
    }

    /// `AND column op value`.
    #[must_use]
    pub fn where_<V: IntoArg>(self, column: &str, op: &str, value: V) -> Self {
        self.where_op(Conjunction::And, column, op, vec![value.into_arg()])
    }

    /// `OR column op value`.
    #[must_use]
    pub fn or_where<V: IntoArg>(self, column: &str, op: &str, value: V) -> Self {
        self.where_op(Conjunction::Or, column, op, vec![value.into_arg()])
    }

    /// `AND column IN (...)`.
    #[must_use]
    pub fn where_in(self, column: &str, values: Vec<Arg>) -> Self {
        self.push_in(Conjunction::And, column, false, values)
    }

    /// `OR column IN (...)`.
    #[must_use]
    pub fn or_where_in(self, column: &str, values: Vec<Arg>) -> Self {
        self.push_in(Conjunction::Or, column, false, values)
    }

    /// `AND column NOT IN (...)`.
    #[must_use]
    pub fn where_not_in(self, column: &str, values: Vec<Arg>) -> Self {
        self.push_in(Conjunction::And, column, true, values)
    }

    /// `OR column NOT IN (...)`.
    #[must_use]
    pub fn or_where_not_in(self, column: &str, values: Vec<Arg>) -> Self {
        self.push_in(Conjunction::Or, column, true, values)
    }

    /// `AND column BETWEEN low AND high`.
    #[must_use]
    pub fn where_between<L, H>(self, column: &str, low: L, high: H) -> Self
    where
        L: IntoArg,
        H: IntoArg,
    {
        let args = vec![low.into_arg(), high.into_arg()];
        self.push_between(Conjunction::And, column, false, args)
    }

    /// `OR column BETWEEN low AND high`.
    #[must_use]
    pub fn or_where_between<L, H>(self, column: &str, low: L, high: H) -> Self
    where
        L: IntoArg,
        H: IntoArg,
    {
        let args = vec![low.into_arg(), high.into_arg()];
        self.push_between(Conjunction::Or, column, false, args)
    }

    /// `AND column NOT BETWEEN low AND high`.
    #[must_use]
    pub fn where_not_between<L, H>(self, column: &str, low: L, high: H) -> Self
    where
        L: IntoArg,
        H: IntoArg,
    {
        let args = vec![low.into_arg(), high.into_arg()];
        self.push_between(Conjunction::And, column, true, args)
    }

    /// `AND column IS NULL`.
    #[must_use]
    pub fn where_null(self, column: &str) -> Self {
        self.where_op(Conjunction::And, column, "IS NULL", vec![])
    }

    /// `OR column IS NULL`.
    #[must_use]
    pub fn or_where_null(self, column: &str) -> Self {
        self.where_op(Conjunction::Or, column, "IS NULL", vec![])
    }

    /// `AND column IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(self, column: &str) -> Self {
        self.where_op(Conjunction::And, column, "IS NOT NULL", vec![])
    }

    /// `OR column IS NOT NULL`.
    #[must_use]
    pub fn or_where_not_null(self, column: &str) -> Self {
        self.where_op(Conjunction::Or, column, "IS NOT NULL", vec![])
    }

    /// `AND <expr>`, with each `?` in `expr` binding the next argument.
    ///
    /// The template is not validated; the argument count is checked when
    /// the query is compiled.
    #[must_use]
    pub fn where_raw(self, expr: &str, args: Vec<Arg>) -> Self {
        self.push_raw(Conjunction::And, expr, args)
    }

    /// `OR <expr>`, with each `?` in `expr` binding the next argument.
    #[must_use]
    pub fn or_where_raw(self, expr: &str, args: Vec<Arg>) -> Self {
        self.push_raw(Conjunction::Or, expr, args)
    }

    fn push_raw(self, conjunction: Conjunction, expr: &str, args: Vec<Arg>) -> Self {
        self.push_predicate(
            conjunction,
            PredicateKind::Raw {
                expr: expr.to_string(),
                args: args.into_iter().map(Arg::into_value).collect(),
            },
        )
    }

    /// `AND (...)`, where `configure` adds the grouped predicates.
    ///
    /// A group that ends up empty is dropped.
    #[must_use]
    pub fn where_group<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.push_group(Conjunction::And, configure)
    }

    /// `OR (...)`, where `configure` adds the grouped predicates.
    #[must_use]
    pub fn or_where_group<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.push_group(Conjunction::Or, configure)
    }

    fn push_group<F>(mut self, conjunction: Conjunction, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let group = configure(self.sibling());
        if let Some(err) = group.error {
            self = self.fail(err);
        }
        if group.predicates.is_empty() {
            trace!("eliding empty where group");
            return self;
        }
        self.push_predicate(conjunction, PredicateKind::Group(group.predicates))
    }

    /// Appends `[column] op (subquery)`.
    ///
    /// `column` may be empty for operators such as `EXISTS`. Latches
    /// [`BuildError::NilFunc`] when `configure` is `None`. Errors inside the
    /// subquery surface when the enclosing query is compiled.
    #[must_use]
    pub fn where_subquery<F>(
        self,
        conjunction: Conjunction,
        column: &str,
        op: &str,
        configure: Option<F>,
    ) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let Some(configure) = configure else {
            return self.fail(BuildError::NilFunc);
        };
        let op = canonical_operator(op);
        let column = column.trim();
        if column.is_empty() && op != "EXISTS" && op != "NOT EXISTS" {
            return self.fail(BuildError::EmptyColumn);
        }
        let child = configure(self.child());
        self.push_predicate(
            conjunction,
            PredicateKind::Subquery {
                column: column.to_string(),
                op,
                query: Box::new(child),
            },
        )
    }

    /// `AND column op (subquery)`, e.g. `id IN (SELECT ...)`.
    #[must_use]
    pub fn where_sub<F>(self, column: &str, op: &str, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.where_subquery(Conjunction::And, column, op, Some(configure))
    }

    /// `AND EXISTS (subquery)`.
    #[must_use]
    pub fn where_exists<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.where_subquery(Conjunction::And, "", "EXISTS", Some(configure))
    }

    /// `OR EXISTS (subquery)`.
    #[must_use]
    pub fn or_where_exists<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.where_subquery(Conjunction::Or, "", "EXISTS", Some(configure))
    }

    /// `AND NOT EXISTS (subquery)`.
    #[must_use]
    pub fn where_not_exists<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.where_subquery(Conjunction::And, "", "NOT EXISTS", Some(configure))
    }

    /// `OR NOT EXISTS (subquery)`.
    #[must_use]
    pub fn or_where_not_exists<F>(self, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.where_subquery(Conjunction::Or, "", "NOT EXISTS", Some(configure))
    }
}
