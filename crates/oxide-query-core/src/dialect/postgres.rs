//! PostgreSQL dialect.

use std::sync::LazyLock;

use regex::Regex;

use super::{shift_numbered_placeholders, Dialect};
use crate::compiler::SelectCompiler;
use crate::error::Result;
use crate::query::Query;
use crate::value::SqlValue;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("Invalid placeholder regex"));

/// PostgreSQL dialect with 1-indexed `$N` placeholders.
///
/// Renumbering is textual: every `$N` in spliced subquery SQL is shifted.
/// A literal `$N` inside a string constant of a raw expression would be
/// shifted too, so keep such text in bound parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, n: usize) -> String {
        format!("${n}")
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_full_join(&self) -> bool {
        true
    }

    fn renumber_placeholders(&self, sql: &str, offset: usize) -> String {
        shift_numbered_placeholders(&PLACEHOLDER, "$", sql, offset)
    }

    fn compile_select(&self, query: &Query) -> Result<(String, Vec<SqlValue>)> {
        SelectCompiler::new(self).compile(query)
    }
}
