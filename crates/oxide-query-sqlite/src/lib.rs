//! # oxide-query-sqlite
//!
//! SQLite dialect for `oxide-query-core`.
//!
//! # How SQLite differs from other dialects
//!
//! - **[Parameters]**: SQLite accepts bare `?`, `?NNN`, `:name`, `@name`
//!   and `$name`. This crate emits `?NNN`, so the position of every
//!   parameter is explicit and subqueries can be renumbered when spliced.
//! - **[RETURNING]**: supported since SQLite 3.35.0.
//! - **FULL JOIN**: `RIGHT` and `FULL OUTER JOIN` are supported since
//!   SQLite 3.39.0. See [SELECT].
//! - **Identifier quoting**: SQLite uses double quotes (`"`) as the
//!   standard quoting style, though it also accepts backticks and square
//!   brackets. See [SQLite keywords].
//!
//! [Parameters]: https://www.sqlite.org/lang_expr.html#varparam
//! [RETURNING]: https://www.sqlite.org/lang_returning.html
//! [SELECT]: https://www.sqlite.org/lang_select.html
//! [SQLite keywords]: https://www.sqlite.org/lang_keywords.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_query_core::Query;
//! use oxide_query_sqlite::SqliteDialect;
//!
//! let (sql, params) = Query::with_dialect(SqliteDialect::new())
//!     .select(&["id"])
//!     .from("users")
//!     .where_("status", "=", "active")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "status" = ?1"#);
//! assert_eq!(params.len(), 1);
//! ```

mod dialect;

pub use dialect::SqliteDialect;
