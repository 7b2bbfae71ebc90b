//! SELECT compilation.
//!
//! [`SelectCompiler`] walks a [`Query`] once, left to right, appending every
//! bound value to a single parameter list at the moment its placeholder is
//! written. Placeholder `k` therefore always binds `params[k - 1]`.
//!
//! Groups share that list directly. Subqueries are compiled on their own,
//! starting again at placeholder 1, and are then shifted by the number of
//! parameters the enclosing query already holds through
//! [`Dialect::renumber_placeholders`] before being spliced in.

use tracing::trace;

use crate::dialect::Dialect;
use crate::error::{BuildError, Result};
use crate::query::{
    Join, JoinKind, OrderTerm, Predicate, PredicateKind, Query, SelectColumn, TableRef,
};
use crate::value::SqlValue;

/// Compiles one SELECT against one dialect.
///
/// Dialects call this from [`Dialect::compile_select`].
pub struct SelectCompiler<'d> {
    dialect: &'d dyn Dialect,
    params: Vec<SqlValue>,
}

impl<'d> SelectCompiler<'d> {
    /// Creates a compiler with an empty parameter list.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            params: vec![],
        }
    }

    /// Compiles `query` into SQL text and its ordered parameters.
    ///
    /// # Errors
    ///
    /// Fails on a missing table, an incomplete subquery column or table, a
    /// raw template whose `?` count disagrees with its arguments, an
    /// unsupported join, or any error from a nested subquery.
    pub fn compile(mut self, query: &Query) -> Result<(String, Vec<SqlValue>)> {
        let columns = self.compile_columns(&query.columns)?;
        let table = self.compile_table(query.table.as_ref())?;

        let mut sql = format!("SELECT {columns} FROM {table}");

        for join in &query.joins {
            sql.push(' ');
            sql.push_str(&self.compile_join(join)?);
        }

        if !query.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.compile_predicates(&query.predicates)?);
        }

        if !query.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.compile_order(&query.order_by)?);
        }

        if let Some(n) = query.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        if let Some(n) = query.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }

        Ok((sql, self.params))
    }

    /// Records `value` and returns the placeholder that binds it.
    fn bind(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    /// Replaces each `?` in `template` with the next placeholder.
    fn substitute(&mut self, template: &str, args: &[SqlValue]) -> Result<String> {
        let placeholders = template.matches('?').count();
        if placeholders != args.len() {
            return Err(BuildError::ArgumentCount {
                placeholders,
                args: args.len(),
            });
        }

        let mut args = args.iter();
        let mut out = String::with_capacity(template.len());
        for ch in template.chars() {
            if ch != '?' {
                out.push(ch);
                continue;
            }
            if let Some(value) = args.next() {
                let placeholder = self.bind(value.clone());
                out.push_str(&placeholder);
            }
        }
        Ok(out)
    }

    /// Compiles `child` on its own and splices its parameters after the
    /// ones already collected, returning the renumbered SQL.
    fn splice(&mut self, child: &Query) -> Result<String> {
        child.ensure_compilable()?;
        let (sql, params) = self.dialect.compile_select(child)?;
        let offset = self.params.len();
        trace!(offset, child_params = params.len(), "splicing subquery");
        let sql = self.dialect.renumber_placeholders(&sql, offset);
        self.params.extend(params);
        Ok(sql)
    }

    fn compile_columns(&mut self, columns: &[SelectColumn]) -> Result<String> {
        if columns.is_empty() {
            return Ok(String::from("*"));
        }
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            let part = match column {
                SelectColumn::Literal(name) => self.dialect.quote_column(name),
                SelectColumn::Raw { expr, args } => {
                    self.params.extend(args.iter().cloned());
                    expr.clone()
                }
                SelectColumn::Subquery { alias, query } => {
                    let query = query.as_deref().ok_or(BuildError::NilFunc)?;
                    if alias.is_empty() {
                        return Err(BuildError::EmptyAlias);
                    }
                    let sub = self.splice(query)?;
                    format!("({sub}) AS {}", self.dialect.quote_identifier(alias))
                }
            };
            parts.push(part);
        }
        Ok(parts.join(", "))
    }

    fn compile_table(&mut self, table: Option<&TableRef>) -> Result<String> {
        match table {
            None => Err(BuildError::EmptyTable),
            Some(TableRef::Literal(name)) => {
                if name.trim().is_empty() {
                    return Err(BuildError::EmptyTable);
                }
                Ok(self.dialect.quote_table(name))
            }
            Some(TableRef::Raw { expr, args }) => {
                if expr.trim().is_empty() {
                    return Err(BuildError::EmptyExpression);
                }
                self.substitute(expr, args)
            }
            Some(TableRef::Subquery { alias, query }) => {
                let query = query.as_deref().ok_or(BuildError::NilFunc)?;
                if alias.is_empty() {
                    return Err(BuildError::EmptyAlias);
                }
                let sub = self.splice(query)?;
                Ok(format!("({sub}) AS {}", self.dialect.quote_identifier(alias)))
            }
        }
    }

    fn compile_join(&self, join: &Join) -> Result<String> {
        if join.kind == JoinKind::Full && !self.dialect.supports_full_join() {
            return Err(BuildError::UnsupportedFeature("FULL JOIN"));
        }
        Ok(format!(
            "{} {} ON {} {} {}",
            join.kind.keyword(),
            self.dialect.quote_table(&join.table),
            self.dialect.quote_identifier(&join.left),
            join.op,
            self.dialect.quote_identifier(&join.right),
        ))
    }

    fn compile_predicates(&mut self, predicates: &[Predicate]) -> Result<String> {
        let mut sql = String::new();
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                sql.push(' ');
                sql.push_str(predicate.conjunction.keyword());
                sql.push(' ');
            }
            sql.push_str(&self.compile_predicate(&predicate.kind)?);
        }
        Ok(sql)
    }

    fn compile_predicate(&mut self, kind: &PredicateKind) -> Result<String> {
        match kind {
            PredicateKind::Comparison { column, op, value } => {
                let column = self.dialect.quote_identifier(column);
                let placeholder = self.bind(value.clone());
                Ok(format!("{column} {op} {placeholder}"))
            }
            PredicateKind::Between {
                column,
                negated,
                low,
                high,
            } => {
                let column = self.dialect.quote_identifier(column);
                let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                let low = self.bind(low.clone());
                let high = self.bind(high.clone());
                Ok(format!("{column} {keyword} {low} AND {high}"))
            }
            PredicateKind::In {
                column,
                negated,
                values,
            } => {
                if values.is_empty() {
                    // Nothing is IN the empty set; everything is NOT IN it.
                    return Ok(String::from(if *negated { "1 = 1" } else { "1 = 0" }));
                }
                let column = self.dialect.quote_identifier(column);
                let keyword = if *negated { "NOT IN" } else { "IN" };
                let placeholders: Vec<String> =
                    values.iter().map(|v| self.bind(v.clone())).collect();
                Ok(format!("{column} {keyword} ({})", placeholders.join(", ")))
            }
            PredicateKind::Null { column, negated } => {
                let column = self.dialect.quote_identifier(column);
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                Ok(format!("{column} {keyword}"))
            }
            PredicateKind::Raw { expr, args } => self.substitute(expr, args),
            PredicateKind::Group(children) => {
                let inner = self.compile_predicates(children)?;
                Ok(format!("({inner})"))
            }
            PredicateKind::Subquery { column, op, query } => {
                let sub = self.splice(query)?;
                if column.is_empty() {
                    Ok(format!("{op} ({sub})"))
                } else {
                    let column = self.dialect.quote_identifier(column);
                    Ok(format!("{column} {op} ({sub})"))
                }
            }
        }
    }

    fn compile_order(&mut self, terms: &[OrderTerm]) -> Result<String> {
        let mut parts = Vec::with_capacity(terms.len());
        for term in terms {
            let part = match term {
                OrderTerm::Column { column, direction } => format!(
                    "{} {}",
                    self.dialect.quote_identifier(column),
                    direction.keyword()
                ),
                OrderTerm::Raw { expr, args } => self.substitute(expr, args)?,
            };
            parts.push(part);
        }
        Ok(parts.join(", "))
    }
}
