//! SQLite compilation with numbered `?N` placeholders.

use oxide_query_core::{args, Query, SqlValue};
use oxide_query_sqlite::SqliteDialect;

fn sqlite() -> Query {
    Query::with_dialect(SqliteDialect::new())
}

#[test]
fn subqueries_are_renumbered() {
    let (sql, params) = sqlite()
        .select(&["id"])
        .from("users")
        .where_("active", "=", true)
        .where_sub("id", "IN", |s| {
            s.select(&["user_id"])
                .from("orders")
                .where_between("total", 10, 20)
        })
        .or_where_exists(|s| {
            s.select(&[])
                .from("admins a")
                .where_raw("a.user_id = users.id AND a.level > ?", args![3])
        })
        .build()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT "id" FROM "users" WHERE "active" = ?1 AND "id" IN (SELECT "user_id" FROM "orders" WHERE "total" BETWEEN ?2 AND ?3) OR EXISTS (SELECT * FROM "admins" AS "a" WHERE a.user_id = users.id AND a.level > ?4)"#
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Bool(true),
            SqlValue::Int(10),
            SqlValue::Int(20),
            SqlValue::Int(3)
        ]
    );
}

#[test]
fn full_join_is_supported() {
    let (sql, _) = sqlite()
        .select(&[])
        .from("a")
        .full_join("b", "a.id", "=", "b.a_id")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT * FROM "a" FULL JOIN "b" ON "a"."id" = "b"."a_id""#
    );
}

#[test]
fn membership_and_pagination() {
    let (sql, params) = sqlite()
        .select(&["id"])
        .from("users")
        .where_in("id", args![1, 2, 3])
        .order_by_desc("id")
        .limit(2)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT "id" FROM "users" WHERE "id" IN (?1, ?2, ?3) ORDER BY "id" DESC LIMIT 2"#
    );
    assert_eq!(params.len(), 3);
}
