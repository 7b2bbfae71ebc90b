//! SQLite dialect implementation.

use std::sync::LazyLock;

use oxide_query_core::dialect::{shift_numbered_placeholders, Dialect};
use oxide_query_core::{Query, Result, SelectCompiler, SqlValue};
use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?(\d+)").expect("Invalid placeholder regex"));

/// SQLite dialect with numbered `?N` placeholders.
///
/// Numbered rather than bare `?` so a parameter's position is visible in
/// the text and spliced subqueries can be shifted like PostgreSQL's `$N`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn placeholder(&self, n: usize) -> String {
        format!("?{n}")
    }

    fn supports_returning(&self) -> bool {
        true // SQLite 3.35.0+
    }

    fn supports_full_join(&self) -> bool {
        true // SQLite 3.39.0+
    }

    fn renumber_placeholders(&self, sql: &str, offset: usize) -> String {
        shift_numbered_placeholders(&PLACEHOLDER, "?", sql, offset)
    }

    fn compile_select(&self, query: &Query) -> Result<(String, Vec<SqlValue>)> {
        SelectCompiler::new(self).compile(query)
    }
}
