//! Generic SQL dialect.

use super::Dialect;
use crate::compiler::SelectCompiler;
use crate::error::Result;
use crate::query::Query;
use crate::value::SqlValue;

/// A generic SQL dialect using ANSI quoting and positional `?` placeholders.
///
/// Placeholders carry no number, so spliced subqueries are never rewritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn placeholder(&self, _n: usize) -> String {
        String::from("?")
    }

    fn compile_select(&self, query: &Query) -> Result<(String, Vec<SqlValue>)> {
        SelectCompiler::new(self).compile(query)
    }
}
