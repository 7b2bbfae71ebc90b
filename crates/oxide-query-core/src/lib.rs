//! # oxide-query-core
//!
//! A fluent SELECT assembler that compiles to dialect-specific SQL text and
//! an ordered parameter list.
//!
//! This crate provides:
//! - A [`Query`] accumulator with chaining mutators for columns, tables,
//!   joins, nested WHERE groups, correlated subqueries, ordering and
//!   pagination
//! - A [`Dialect`] trait for quoting, placeholder syntax and capabilities,
//!   with [`PostgresDialect`] (`$N`) and [`GenericDialect`] (`?`)
//! - A compiler that keeps the `k`th placeholder bound to the `k`th
//!   parameter, however deeply subqueries are nested
//!
//! ## Building a query
//!
//! ```rust
//! use oxide_query_core::{args, PostgresDialect, Query, SqlValue};
//!
//! let (sql, params) = Query::with_dialect(PostgresDialect::new())
//!     .select(&["u.id", "u.email AS contact"])
//!     .from("users u")
//!     .where_("u.active", "=", true)
//!     .where_group(|g| g.where_in("u.role", args!["admin", "owner"]).or_where_null("u.role"))
//!     .where_exists(|s| {
//!         s.select(&[])
//!             .from("orders o")
//!             .where_raw("o.user_id = u.id", args![])
//!             .where_("o.total", ">", 100)
//!     })
//!     .order_by_desc("u.id")
//!     .limit(20)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"SELECT "u"."id", "u"."email" AS "contact" FROM "users" AS "u" WHERE "u"."active" = $1 AND ("u"."role" IN ($2, $3) OR "u"."role" IS NULL) AND EXISTS (SELECT * FROM "orders" AS "o" WHERE o.user_id = u.id AND "o"."total" > $4) ORDER BY "u"."id" DESC LIMIT 20"#
//! );
//! assert_eq!(params.len(), 4);
//! assert_eq!(params[3], SqlValue::Int(100));
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values are always bound as parameters. Identifiers are quoted but not
//! parameterized, so identifiers coming from user input should go through
//! [`Query::select_whitelisted`] and [`Query::from_whitelisted`].
//!
//! ## Errors
//!
//! Mutators latch the first error on the query instead of failing, and
//! [`Query::build`] returns it:
//!
//! ```rust
//! use oxide_query_core::{args, BuildError, PostgresDialect, Query};
//!
//! let err = Query::with_dialect(PostgresDialect::new())
//!     .select(&[""])
//!     .where_in("id", args![None::<i64>])
//!     .from("users")
//!     .build()
//!     .unwrap_err();
//!
//! assert_eq!(err, BuildError::EmptyColumn);
//! ```

pub mod args;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod query;
pub mod value;

pub use args::normalize_args;
pub use compiler::SelectCompiler;
pub use dialect::{Dialect, DialectKind, GenericDialect, PostgresDialect};
pub use error::{BuildError, Result};
pub use query::{
    Action, Conjunction, Join, JoinKind, OrderDirection, OrderTerm, Predicate, PredicateKind,
    Query, SelectColumn, TableRef,
};
pub use value::{Arg, IntoArg, SqlValue, ToSqlValue};
