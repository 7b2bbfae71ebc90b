//! The query accumulator and its fluent mutators.
//!
//! A [`Query`] is built by chaining by-value calls. Mutators never fail
//! loudly: the first validation error is latched on the query, later errors
//! are dropped, and [`Query::build`] reports the latched one.
//!
//! ```rust
//! use oxide_query_core::{PostgresDialect, Query};
//!
//! let (sql, params) = Query::with_dialect(PostgresDialect::new())
//!     .select(&["id"])
//!     .from("users")
//!     .where_("status", "=", "active")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "status" = $1"#);
//! assert_eq!(params.len(), 1);
//! ```

mod predicate;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use predicate::{Conjunction, Predicate, PredicateKind};

use crate::dialect::Dialect;
use crate::error::{BuildError, Result};
use crate::value::{Arg, SqlValue};

/// The statement a query compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `SELECT`.
    Select,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
        }
    }
}

/// One entry of the SELECT list.
#[derive(Debug, Clone)]
pub enum SelectColumn {
    /// A column name, optionally `alias.column` and/or `... AS alias`.
    Literal(String),
    /// A raw expression, emitted verbatim. Its arguments are appended to the
    /// parameter list and must use the dialect's own placeholder syntax.
    Raw {
        /// Expression text.
        expr: String,
        /// Bound arguments.
        args: Vec<SqlValue>,
    },
    /// A subquery selected as a named column.
    Subquery {
        /// Column alias.
        alias: String,
        /// The child query, `None` if no configuration function was given.
        query: Option<Box<Query>>,
    },
}

/// The FROM target.
#[derive(Debug, Clone)]
pub enum TableRef {
    /// A table name, optionally `schema.table` and/or with an alias.
    Literal(String),
    /// A raw expression with `?` argument markers.
    Raw {
        /// Expression text.
        expr: String,
        /// Bound arguments.
        args: Vec<SqlValue>,
    },
    /// A subquery used as a derived table.
    Subquery {
        /// Table alias.
        alias: String,
        /// The child query, `None` if no configuration function was given.
        query: Option<Box<Query>>,
    },
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    #[default]
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl OrderDirection {
    /// Parses a direction, case-insensitively. Anything but `desc` is `Asc`.
    #[must_use]
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("DESC") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone)]
pub enum OrderTerm {
    /// A column and its direction.
    Column {
        /// Column reference.
        column: String,
        /// Sort direction.
        direction: OrderDirection,
    },
    /// A raw expression with `?` argument markers.
    Raw {
        /// Expression text.
        expr: String,
        /// Bound arguments.
        args: Vec<SqlValue>,
    },
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `FULL JOIN`
    Full,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// A flat join: `<kind> <table> ON <left> <op> <right>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Join type.
    pub kind: JoinKind,
    /// Joined table, optionally with an alias.
    pub table: String,
    /// Left-hand column.
    pub left: String,
    /// Comparison operator.
    pub op: String,
    /// Right-hand column.
    pub right: String,
}

const JOIN_OPERATORS: &[&str] = &["=", "!=", "<>", "<", "<=", ">", ">="];

/// A SELECT query under construction.
///
/// Cloning is cheap enough for reuse as a template; the dialect is shared.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) dialect: Option<Arc<dyn Dialect>>,
    pub(crate) action: Option<Action>,
    pub(crate) table: Option<TableRef>,
    pub(crate) columns: Vec<SelectColumn>,
    pub(crate) joins: Vec<Join>,
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) order_by: Vec<OrderTerm>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) error: Option<BuildError>,
}

impl Query {
    /// Creates an empty query with no dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty query bound to `dialect`.
    #[must_use]
    pub fn with_dialect<D: Dialect + 'static>(dialect: D) -> Self {
        Self::new().dialect(Arc::new(dialect))
    }

    /// Binds the query to a shared dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Returns the latched error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Returns the SELECT list.
    #[must_use]
    pub fn columns(&self) -> &[SelectColumn] {
        &self.columns
    }

    /// Returns the FROM target.
    #[must_use]
    pub const fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    /// Returns the joins.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Returns the WHERE predicates.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns the ORDER BY terms.
    #[must_use]
    pub fn order_terms(&self) -> &[OrderTerm] {
        &self.order_by
    }

    /// Latches `err` unless an earlier error is already latched.
    #[must_use]
    pub(crate) fn fail(mut self, err: BuildError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    /// A fresh query sharing this one's dialect, for groups.
    pub(crate) fn sibling(&self) -> Self {
        Self {
            dialect: self.dialect.clone(),
            ..Self::default()
        }
    }

    /// A fresh SELECT sharing this one's dialect, for subqueries.
    pub(crate) fn child(&self) -> Self {
        Self {
            action: Some(Action::Select),
            ..self.sibling()
        }
    }

    fn subquery<F>(&self, configure: Option<F>) -> Option<Box<Self>>
    where
        F: FnOnce(Self) -> Self,
    {
        configure.map(|f| Box::new(f(self.child())))
    }

    // SELECT list

    /// Selects columns and marks the query as a SELECT. With no columns at
    /// all the query selects `*`.
    ///
    /// Blank names latch [`BuildError::EmptyColumn`] and are skipped.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.action = Some(Action::Select);
        for column in columns {
            let column = column.trim();
            if column.is_empty() {
                self = self.fail(BuildError::EmptyColumn);
                continue;
            }
            self.columns.push(SelectColumn::Literal(column.to_string()));
        }
        self
    }

    /// Selects a raw expression written in the dialect's own placeholder
    /// syntax (e.g. `$1` for PostgreSQL).
    #[must_use]
    pub fn select_raw(mut self, expr: &str, args: Vec<Arg>) -> Self {
        self.action = Some(Action::Select);
        if expr.trim().is_empty() {
            return self.fail(BuildError::EmptyExpression);
        }
        self.columns.push(SelectColumn::Raw {
            expr: expr.to_string(),
            args: args.into_iter().map(Arg::into_value).collect(),
        });
        self
    }

    /// Selects a subquery as column `alias`.
    ///
    /// A missing function or blank alias is reported when the query is
    /// compiled.
    #[must_use]
    pub fn select_subquery<F>(mut self, alias: &str, configure: Option<F>) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.action = Some(Action::Select);
        let query = self.subquery(configure);
        self.columns.push(SelectColumn::Subquery {
            alias: alias.trim().to_string(),
            query,
        });
        self
    }

    /// Selects a subquery as column `alias`.
    #[must_use]
    pub fn select_sub<F>(self, alias: &str, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.select_subquery(alias, Some(configure))
    }

    /// Selects columns through a whitelist of `input -> trusted column`.
    ///
    /// Inputs absent from `allowed` are silently dropped.
    #[must_use]
    pub fn select_whitelisted(self, inputs: &[&str], allowed: &HashMap<&str, &str>) -> Self {
        let mut columns = Vec::with_capacity(inputs.len());
        for input in inputs {
            match allowed.get(input) {
                Some(column) => columns.push(*column),
                None => debug!(input = %input, "dropping column not in whitelist"),
            }
        }
        self.select(&columns)
    }

    // FROM

    /// Sets the table, e.g. `users`, `public.users` or `users u`.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        let table = table.trim();
        if table.is_empty() {
            return self.fail(BuildError::EmptyTable);
        }
        self.table = Some(TableRef::Literal(table.to_string()));
        self
    }

    /// Sets the table to a raw expression with `?` argument markers.
    #[must_use]
    pub fn from_raw(mut self, expr: &str, args: Vec<Arg>) -> Self {
        if expr.trim().is_empty() {
            return self.fail(BuildError::EmptyExpression);
        }
        self.table = Some(TableRef::Raw {
            expr: expr.to_string(),
            args: args.into_iter().map(Arg::into_value).collect(),
        });
        self
    }

    /// Sets the table to a subquery aliased as `alias`.
    ///
    /// A missing function or blank alias is reported when the query is
    /// compiled.
    #[must_use]
    pub fn from_subquery<F>(mut self, alias: &str, configure: Option<F>) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let query = self.subquery(configure);
        self.table = Some(TableRef::Subquery {
            alias: alias.trim().to_string(),
            query,
        });
        self
    }

    /// Sets the table to a subquery aliased as `alias`.
    #[must_use]
    pub fn from_sub<F>(self, alias: &str, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.from_subquery(alias, Some(configure))
    }

    /// Sets the table through a whitelist of `input -> trusted table`.
    ///
    /// Latches [`BuildError::InvalidTableInput`] for unmapped input.
    #[must_use]
    pub fn from_whitelisted(self, input: &str, allowed: &HashMap<&str, &str>) -> Self {
        match allowed.get(input) {
            Some(table) => self.from(table),
            None => self.fail(BuildError::InvalidTableInput(input.to_string())),
        }
    }

    // JOIN

    /// Adds a join `<kind> <table> ON <left> <op> <right>`.
    #[must_use]
    pub fn join(mut self, kind: JoinKind, table: &str, left: &str, op: &str, right: &str) -> Self {
        let (table, left, op, right) = (table.trim(), left.trim(), op.trim(), right.trim());
        if table.is_empty() {
            return self.fail(BuildError::EmptyTable);
        }
        if left.is_empty() || right.is_empty() || !JOIN_OPERATORS.contains(&op) {
            return self.fail(BuildError::InvalidJoinCondition(format!(
                "{left} {op} {right}"
            )));
        }
        self.joins.push(Join {
            kind,
            table: table.to_string(),
            left: left.to_string(),
            op: op.to_string(),
            right: right.to_string(),
        });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn inner_join(self, table: &str, left: &str, op: &str, right: &str) -> Self {
        self.join(JoinKind::Inner, table, left, op, right)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: &str, left: &str, op: &str, right: &str) -> Self {
        self.join(JoinKind::Left, table, left, op, right)
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(self, table: &str, left: &str, op: &str, right: &str) -> Self {
        self.join(JoinKind::Right, table, left, op, right)
    }

    /// Adds a FULL JOIN. Fails at compile time on dialects without it.
    #[must_use]
    pub fn full_join(self, table: &str, left: &str, op: &str, right: &str) -> Self {
        self.join(JoinKind::Full, table, left, op, right)
    }

    // ORDER BY

    /// Adds an ORDER BY term. `direction` is case-insensitive and anything
    /// other than `desc` sorts ascending.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        let column = column.trim();
        if column.is_empty() {
            return self.fail(BuildError::EmptyColumn);
        }
        self.order_by.push(OrderTerm::Column {
            column: column.to_string(),
            direction: OrderDirection::parse(direction),
        });
        self
    }

    /// Adds an ascending ORDER BY term.
    #[must_use]
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, "ASC")
    }

    /// Adds a descending ORDER BY term.
    #[must_use]
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, "DESC")
    }

    /// Adds a raw ORDER BY expression with `?` argument markers.
    #[must_use]
    pub fn order_by_raw(mut self, expr: &str, args: Vec<Arg>) -> Self {
        if expr.trim().is_empty() {
            return self.fail(BuildError::EmptyExpression);
        }
        self.order_by.push(OrderTerm::Raw {
            expr: expr.to_string(),
            args: args.into_iter().map(Arg::into_value).collect(),
        });
        self
    }

    // Pagination

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // Compilation

    /// Checks the latched error and the action.
    pub(crate) fn ensure_compilable(&self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.action {
            Some(Action::Select) => Ok(()),
            None => Err(BuildError::UnsupportedAction(String::from("none"))),
        }
    }

    /// Compiles the query into SQL text and its ordered parameters.
    ///
    /// The `k`th placeholder in the text always binds `params[k - 1]`.
    ///
    /// # Errors
    ///
    /// Returns the first latched construction error, then
    /// [`BuildError::NoDialect`] or [`BuildError::UnsupportedAction`], then
    /// any compile-time failure. No partial SQL is ever returned.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let dialect = self.dialect.as_deref().ok_or(BuildError::NoDialect)?;
        self.ensure_compilable()?;

        let (sql, params) = dialect.compile_select(self)?;
        debug!(
            dialect = dialect.name(),
            sql = %sql,
            params = params.len(),
            "compiled query"
        );
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::dialect::PostgresDialect;

    fn pg() -> Query {
        Query::with_dialect(PostgresDialect::new())
    }

    #[test]
    fn test_new_query_is_empty() {
        let q = Query::new();
        assert!(q.columns().is_empty());
        assert!(q.predicates().is_empty());
        assert!(q.table().is_none());
        assert!(q.error().is_none());
        assert_eq!(q.limit, None);
        assert_eq!(q.offset, None);
    }

    #[test]
    fn test_select_blank_column_latches() {
        let q = pg().select(&["id", " ", "name"]);
        assert_eq!(q.error(), Some(&BuildError::EmptyColumn));
        assert_eq!(q.columns().len(), 2);
    }

    #[test]
    fn test_from_blank_latches_empty_table() {
        let q = pg().select(&[]).from("  ");
        assert_eq!(q.error(), Some(&BuildError::EmptyTable));
        assert!(q.table().is_none());
    }

    #[test]
    fn test_first_error_wins() {
        let q = pg()
            .select(&[""])
            .where_in("id", args![None::<i32>])
            .from("");
        assert_eq!(q.error(), Some(&BuildError::EmptyColumn));
    }

    #[test]
    fn test_order_direction_parse() {
        assert_eq!(OrderDirection::parse("desc"), OrderDirection::Desc);
        assert_eq!(OrderDirection::parse(" DESC "), OrderDirection::Desc);
        assert_eq!(OrderDirection::parse("asc"), OrderDirection::Asc);
        assert_eq!(OrderDirection::parse("sideways"), OrderDirection::Asc);
    }

    #[test]
    fn test_join_validation() {
        let q = pg().inner_join("", "a.id", "=", "b.id");
        assert_eq!(q.error(), Some(&BuildError::EmptyTable));

        let q = pg().inner_join("orders o", "u.id", "LIKE", "o.user_id");
        assert!(matches!(q.error(), Some(BuildError::InvalidJoinCondition(_))));

        let q = pg().left_join("orders o", "u.id", "=", "");
        assert!(matches!(q.error(), Some(BuildError::InvalidJoinCondition(_))));

        let q = pg().left_join("orders o", "u.id", "=", "o.user_id");
        assert!(q.error().is_none());
        assert_eq!(q.joins()[0].kind, JoinKind::Left);
    }

    #[test]
    fn test_whitelisted_columns_drop_unknown_input() {
        let allowed = HashMap::from([("name", "u.full_name"), ("mail", "u.email")]);
        let q = pg().select_whitelisted(&["name", "password", "mail"], &allowed);
        assert!(q.error().is_none());
        let names: Vec<&str> = q
            .columns()
            .iter()
            .filter_map(|c| match c {
                SelectColumn::Literal(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["u.full_name", "u.email"]);
    }

    #[test]
    fn test_whitelisted_table_rejects_unknown_input() {
        let allowed = HashMap::from([("people", "public.users")]);
        let q = pg().from_whitelisted("people", &allowed);
        assert!(matches!(q.table(), Some(TableRef::Literal(t)) if t == "public.users"));

        let q = pg().from_whitelisted("users; DROP TABLE x", &allowed);
        assert_eq!(
            q.error(),
            Some(&BuildError::InvalidTableInput(String::from(
                "users; DROP TABLE x"
            )))
        );
    }

    #[test]
    fn test_subquery_inherits_dialect() {
        let q = pg().select_sub("n", |s| s.select(&["count"]).from("stats"));
        match &q.columns()[0] {
            SelectColumn::Subquery { query: Some(child), .. } => {
                assert_eq!(child.dialect.as_ref().map(|d| d.name()), Some("postgresql"));
                assert_eq!(child.action, Some(Action::Select));
            }
            other => panic!("expected subquery column, got {other:?}"),
        }
    }
}
