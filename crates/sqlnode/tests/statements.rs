//! Public-API rendering checks; no database needed.

use sqlnode::qb::{self, SqlQb};
use sqlnode::schema::{Column, Expr, Field, Table};
use sqlnode::sql::{self, FragmentList, Literal, RenderContext, RenderOptions, enclosed, literal, param};
use sqlnode::{OrmError, Statement, Value, to_postgres};

fn orders() -> Table {
    Table::builder("orders")
        .field(Field::new("id", "BIGINT").primary_key())
        .field(Field::new("user_id", "BIGINT").not_null())
        .field(Field::new("total", "NUMERIC"))
        .build()
        .unwrap()
}

#[test]
fn hand_built_statement_matches_builder() {
    let mut hand = FragmentList::with_glue(" ");
    hand.append(literal("DELETE FROM `orders` WHERE"))
        .append(Column::new("orders", "id").eq(3));

    let built = orders()
        .delete()
        .filter(Column::new("orders", "id").eq(3))
        .statement()
        .unwrap();

    assert_eq!(sql::render(&hand), built);
}

#[test]
fn statement_translates_for_postgres() {
    let orders = orders();
    let stmt = orders
        .select()
        .filter(orders.field("total").unwrap().between(10, 20))
        .statement()
        .unwrap();

    let (text, n) = to_postgres(stmt.text());
    assert_eq!(
        text,
        r#"SELECT "t1"."id", "t1"."user_id", "t1"."total" FROM "orders" AS "t1" WHERE "t1"."total" BETWEEN $1 AND $2 ;"#
    );
    assert_eq!(n, stmt.params().len());
}

#[test]
fn converter_applies_inside_its_scope_only() {
    let mut ctx = RenderContext::new();
    {
        let mut scope = ctx.enter(
            RenderOptions::new()
                .params(true)
                .converter(|v| match v {
                    Value::Text(s) => Value::Text(s.to_uppercase()),
                    other => other,
                }),
        );
        scope.bind("a");
    }
    ctx.literal(" ").bind("b");

    assert_eq!(ctx.text(), "%s ");
    assert_eq!(ctx.values(), &[Value::from("A"), Value::from("b")]);
}

#[test]
fn subquery_context_is_spliced() {
    let users = qb::select("users").columns([Column::new("users", "id")]);
    let inner = sql::render_ctx(&users);

    let mut outer = FragmentList::with_glue(" ");
    outer
        .append(literal("SELECT * FROM `orders` WHERE `user_id` IN"))
        .append(enclosed([inner]));

    assert_eq!(
        sql::render(&outer).text(),
        "SELECT * FROM `orders` WHERE `user_id` IN (SELECT `t1`.`id` FROM `users` AS `t1`) ;"
    );
}

#[test]
fn dynamic_constructors_reject_bad_shapes() {
    assert!(matches!(
        Statement::try_new(Value::from("SELECT 1"), Value::from("x")),
        Err(OrmError::InvalidParams(_))
    ));
    assert!(matches!(
        Literal::try_new(Value::list([1]), None),
        Err(OrmError::TypeMismatch(_))
    ));
}

#[test]
fn raw_expressions_compose_with_columns() {
    let expr = Expr::or(vec![
        Expr::raw("`total` > %s * 2", [50]),
        Column::new("orders", "user_id").is_null(),
    ]);
    let stmt = sql::render(&expr);
    assert_eq!(stmt.text(), "`total` > %s * 2 OR `user_id` IS NULL ;");
    assert_eq!(stmt.params(), &[Value::Int(50)]);
}

#[test]
fn params_are_in_text_order() {
    let mut q = FragmentList::with_glue(" ");
    q.append(literal("SELECT"))
        .append(sql::comma([param(1), param(2)]))
        .append(literal("FROM t WHERE a ="))
        .append(param(3));
    let stmt = sql::render(&q);
    assert_eq!(stmt.text(), "SELECT %s, %s FROM t WHERE a = %s ;");
    assert_eq!(stmt.params(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
}
