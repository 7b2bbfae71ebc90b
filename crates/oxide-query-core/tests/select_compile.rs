//! Tests for SELECT lists, table references, joins, ordering and
//! pagination.

mod common;
use common::*;

use std::collections::HashMap;

use oxide_query_core::{args, DialectKind, Query, SqlValue};

#[test]
fn where_equality_round_trip() {
    let (sql, params) = build(
        &pg()
            .select(&["id"])
            .from("users")
            .where_("status", "=", "active"),
    );
    assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "status" = $1"#);
    assert_eq!(params, vec![SqlValue::Text(String::from("active"))]);
}

#[test]
fn column_alias_is_split_and_quoted() {
    let (sql, _) = build(&pg().select(&["u.email AS user_email"]).from("users u"));
    assert_eq!(
        sql,
        r#"SELECT "u"."email" AS "user_email" FROM "users" AS "u""#
    );
}

#[test]
fn schema_qualified_table() {
    let (sql, _) = build(&pg().select(&["id"]).from("public.users"));
    assert_eq!(sql, r#"SELECT "id" FROM "public"."users""#);
}

#[test]
fn no_columns_selects_star() {
    let (sql, params) = build(&pg().select(&[]).from("users"));
    assert_eq!(sql, r#"SELECT * FROM "users""#);
    assert!(params.is_empty());
}

#[test]
fn raw_table_binds_arguments() {
    let (sql, params) = build(
        &pg()
            .select(&["n"])
            .from_raw("generate_series(?, ?) AS n", args![1, 5]),
    );
    assert_eq!(sql, r#"SELECT "n" FROM generate_series($1, $2) AS n"#);
    assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(5)]);
}

#[test]
fn derived_table_subquery() {
    let (sql, params) = build(
        &pg()
            .select(&["t.id"])
            .from_sub("t", |s| {
                s.select(&["id"]).from("users").where_("age", ">=", 18)
            })
            .where_("t.id", "<", 100),
    );
    assert_eq!(
        sql,
        r#"SELECT "t"."id" FROM (SELECT "id" FROM "users" WHERE "age" >= $1) AS "t" WHERE "t"."id" < $2"#
    );
    assert_eq!(params, vec![SqlValue::Int(18), SqlValue::Int(100)]);
}

#[test]
fn column_subquery_is_parenthesized_and_aliased() {
    let (sql, params) = build(
        &pg()
            .select(&["u.id"])
            .select_sub("orders", |s| {
                s.select_raw("count(*)", args![])
                    .from("orders o")
                    .where_raw("o.user_id = u.id", args![])
                    .where_("o.status", "=", "paid")
            })
            .from("users u")
            .where_("u.active", "=", true),
    );
    assert_eq!(
        sql,
        r#"SELECT "u"."id", (SELECT count(*) FROM "orders" AS "o" WHERE o.user_id = u.id AND "o"."status" = $1) AS "orders" FROM "users" AS "u" WHERE "u"."active" = $2"#
    );
    assert_eq!(
        params,
        vec![SqlValue::Text(String::from("paid")), SqlValue::Bool(true)]
    );
}

#[test]
fn joins_follow_from() {
    let (sql, _) = build(
        &pg()
            .select(&["u.id", "p.title"])
            .from("users u")
            .left_join("posts p", "p.author_id", "=", "u.id")
            .right_join("teams t", "t.id", "=", "u.team_id")
            .full_join("audits a", "a.user_id", "=", "u.id"),
    );
    assert_eq!(
        sql,
        r#"SELECT "u"."id", "p"."title" FROM "users" AS "u" LEFT JOIN "posts" AS "p" ON "p"."author_id" = "u"."id" RIGHT JOIN "teams" AS "t" ON "t"."id" = "u"."team_id" FULL JOIN "audits" AS "a" ON "a"."user_id" = "u"."id""#
    );
}

#[test]
fn ordering_and_pagination() {
    let (sql, _) = build(
        &pg()
            .select(&["id"])
            .from("users")
            .order_by_asc("name")
            .order_by("created_at", "DeSc")
            .limit(25)
            .offset(50),
    );
    assert_eq!(
        sql,
        r#"SELECT "id" FROM "users" ORDER BY "name" ASC, "created_at" DESC LIMIT 25 OFFSET 50"#
    );
}

#[test]
fn limit_without_offset() {
    let (sql, _) = build(&pg().select(&["id"]).from("users").limit(0));
    assert_eq!(sql, r#"SELECT "id" FROM "users" LIMIT 0"#);
}

#[test]
fn whitelisted_identifiers() {
    let columns = HashMap::from([("name", "full_name"), ("email", "email")]);
    let tables = HashMap::from([("people", "users")]);
    let (sql, _) = build(
        &pg()
            .select_whitelisted(&["name", "ssn", "email"], &columns)
            .from_whitelisted("people", &tables),
    );
    assert_eq!(sql, r#"SELECT "full_name", "email" FROM "users""#);
}

#[test]
fn dialect_from_configuration() {
    let (sql, _) = build(
        &Query::new()
            .dialect(DialectKind::Generic.dialect())
            .select(&["id"])
            .from("users")
            .where_("id", "=", 1),
    );
    assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "id" = ?"#);
}
