//! SQL Dialect support.
//!
//! Databases disagree on identifier quoting, placeholder syntax, and which
//! clauses they accept. The compiler asks a [`Dialect`] for each of these
//! decisions, so adding an engine means implementing this trait.

mod generic;
mod postgres;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::{Captures, Regex};
use serde::Deserialize;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;

use crate::error::Result;
use crate::query::Query;
use crate::value::SqlValue;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the placeholder token for the `n`th parameter (1-indexed).
    fn placeholder(&self, n: usize) -> String;

    /// Returns whether the dialect supports a RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports FULL OUTER JOIN.
    fn supports_full_join(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports INTERSECT.
    fn supports_intersect(&self) -> bool {
        true
    }

    /// Returns whether the dialect supports EXCEPT.
    fn supports_except(&self) -> bool {
        true
    }

    /// Quotes an identifier, quoting each `.`-separated segment on its own.
    ///
    /// A `*` segment is left bare so `u.*` stays a wildcard.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        name.split('.')
            .map(|segment| quote_segment(segment, quote))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a SELECT-list column, keeping a trailing `AS alias`.
    ///
    /// `u.email AS user_email` becomes `"u"."email" AS "user_email"`.
    /// Anything containing a parenthesis is quoted as a single identifier;
    /// use a raw column for function calls.
    fn quote_column(&self, expr: &str) -> String {
        let tokens: Vec<&str> = expr.split_whitespace().collect();
        if let [name, keyword, alias] = tokens.as_slice() {
            if keyword.eq_ignore_ascii_case("AS") {
                let quote = self.identifier_quote();
                let name = if name.contains('(') {
                    quote_segment(name, quote)
                } else {
                    self.quote_identifier(name)
                };
                return format!("{name} AS {}", quote_segment(alias, quote));
            }
        }
        let expr = expr.trim();
        if expr.contains('(') {
            return quote_segment(expr, self.identifier_quote());
        }
        self.quote_identifier(expr)
    }

    /// Quotes a table reference, keeping a trailing bare alias.
    ///
    /// `users u` becomes `"users" AS "u"`; `public.users` becomes
    /// `"public"."users"`.
    fn quote_table(&self, expr: &str) -> String {
        let tokens: Vec<&str> = expr.split_whitespace().collect();
        match tokens.as_slice() {
            [name, alias] => format!(
                "{} AS {}",
                self.quote_identifier(name),
                quote_segment(alias, self.identifier_quote())
            ),
            [name, keyword, alias] if keyword.eq_ignore_ascii_case("AS") => format!(
                "{} AS {}",
                self.quote_identifier(name),
                quote_segment(alias, self.identifier_quote())
            ),
            _ => self.quote_identifier(expr.trim()),
        }
    }

    /// Shifts every placeholder in already-compiled SQL by `offset`.
    ///
    /// Used when splicing a subquery compiled on its own into an enclosing
    /// query that already holds `offset` parameters. Positional dialects
    /// (plain `?`) need no rewrite, which is the default.
    fn renumber_placeholders(&self, sql: &str, _offset: usize) -> String {
        sql.to_string()
    }

    /// Compiles a SELECT query into SQL text and its ordered parameters.
    ///
    /// # Errors
    ///
    /// Returns an error when the query cannot be compiled, including any
    /// error from a nested subquery.
    fn compile_select(&self, query: &Query) -> Result<(String, Vec<SqlValue>)>;
}

/// Adds `offset` to every number captured by `pattern`, re-emitting it after
/// `prefix`.
///
/// `pattern` must capture the placeholder number in group 1. Tokens whose
/// number, before or after shifting, does not fit in `usize` are left
/// untouched.
#[must_use]
pub fn shift_numbered_placeholders(
    pattern: &Regex,
    prefix: &str,
    sql: &str,
    offset: usize,
) -> String {
    if offset == 0 {
        return sql.to_string();
    }
    pattern
        .replace_all(sql, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_add(offset))
                .map_or_else(|| caps[0].to_string(), |n| format!("{prefix}{n}"))
        })
        .into_owned()
}

fn quote_segment(segment: &str, quote: char) -> String {
    if segment == "*" {
        return String::from("*");
    }
    let doubled: String = [quote, quote].iter().collect();
    let escaped = segment.replace(quote, &doubled);
    format!("{quote}{escaped}{quote}")
}

/// Dialects selectable from configuration.
///
/// ```rust
/// use oxide_query_core::dialect::DialectKind;
///
/// let kind: DialectKind = "postgres".parse().unwrap();
/// assert_eq!(kind.dialect().name(), "postgresql");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// [`PostgresDialect`].
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
    /// [`GenericDialect`].
    Generic,
}

impl DialectKind {
    /// Returns a shared instance of the selected dialect.
    #[must_use]
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Postgres => Arc::new(PostgresDialect::new()),
            Self::Generic => Arc::new(GenericDialect::new()),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_splits_on_dots() {
        let d = PostgresDialect::new();
        assert_eq!(d.quote_identifier("users"), "\"users\"");
        assert_eq!(d.quote_identifier("public.users"), "\"public\".\"users\"");
        assert_eq!(d.quote_identifier("u.*"), "\"u\".*");
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        let d = PostgresDialect::new();
        assert_eq!(d.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_column_alias() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.quote_column("u.email AS user_email"),
            "\"u\".\"email\" AS \"user_email\""
        );
        assert_eq!(d.quote_column("id as key"), "\"id\" AS \"key\"");
        assert_eq!(d.quote_column("id"), "\"id\"");
    }

    #[test]
    fn test_quote_column_function_call_is_single_identifier() {
        let d = PostgresDialect::new();
        assert_eq!(d.quote_column("COUNT(o.id)"), "\"COUNT(o.id)\"");
        assert_eq!(
            d.quote_column("COUNT(o.id) AS n"),
            "\"COUNT(o.id)\" AS \"n\""
        );
    }

    #[test]
    fn test_quote_table_alias() {
        let d = PostgresDialect::new();
        assert_eq!(d.quote_table("users u"), "\"users\" AS \"u\"");
        assert_eq!(d.quote_table("users AS u"), "\"users\" AS \"u\"");
        assert_eq!(d.quote_table("public.users"), "\"public\".\"users\"");
    }

    #[test]
    fn test_dialect_kind_from_str() {
        assert_eq!("Postgres".parse::<DialectKind>(), Ok(DialectKind::Postgres));
        assert_eq!("generic".parse::<DialectKind>(), Ok(DialectKind::Generic));
        assert!("oracle".parse::<DialectKind>().is_err());
        assert_eq!(DialectKind::Postgres.to_string(), "postgres");
    }

    #[test]
    fn test_dialect_kind_deserialize() {
        #[derive(Deserialize)]
        struct Config {
            dialect: DialectKind,
        }

        let config: Config = serde_json::from_str(r#"{"dialect": "postgresql"}"#).unwrap();
        assert_eq!(config.dialect, DialectKind::Postgres);
        let config: Config = serde_json::from_str(r#"{"dialect": "generic"}"#).unwrap();
        assert_eq!(config.dialect.dialect().name(), "generic");
    }
}
