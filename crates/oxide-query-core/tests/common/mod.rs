#![allow(dead_code)]

use oxide_query_core::{PostgresDialect, Query, SqlValue};
use regex::Regex;

pub fn pg() -> Query {
    Query::with_dialect(PostgresDialect::new())
}

pub fn build(query: &Query) -> (String, Vec<SqlValue>) {
    query
        .build()
        .unwrap_or_else(|e| panic!("Failed to build query: {e:?}"))
}

/// Returns the `$N` numbers in the order they appear in `sql`.
pub fn placeholder_numbers(sql: &str) -> Vec<usize> {
    let re = Regex::new(r"\$(\d+)").unwrap();
    re.captures_iter(sql)
        .map(|caps| caps[1].parse().unwrap())
        .collect()
}

/// Asserts that placeholders read `$1, $2, ... $n` left to right with no
/// gaps or repeats, and that `n` equals the parameter count.
pub fn assert_aligned(sql: &str, params: &[SqlValue]) {
    let expected: Vec<usize> = (1..=params.len()).collect();
    assert_eq!(
        placeholder_numbers(sql),
        expected,
        "Placeholders out of step with {} params in: {sql}",
        params.len()
    );
}

/// Integer parameters `1..=n`, for queries whose kth predicate binds `k`.
pub fn ints(n: i64) -> Vec<SqlValue> {
    (1..=n).map(SqlValue::Int).collect()
}
