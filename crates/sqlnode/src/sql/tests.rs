use super::*;
use crate::error::OrmError;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[test]
fn literal_without_params_binds_nothing() {
    let ctx = render_ctx(&literal("SELECT 1"));
    assert_eq!(ctx.text(), "SELECT 1");
    assert!(ctx.values().is_empty());
}

#[test]
fn literal_params_are_bound_after_text() {
    let stmt = render(&Literal::with_params("a = %s OR b = %s", [1, 2]));
    assert_eq!(stmt.text(), "a = %s OR b = %s ;");
    assert_eq!(stmt.params(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn single_param_finalizes_with_terminator() {
    let stmt = render(&param(5));
    assert_eq!(stmt.text(), "%s ;");
    assert_eq!(stmt.params(), &[Value::Int(5)]);
}

#[test]
fn comma_list_of_params() {
    let stmt = render(&comma([param(1), param(2), param(3)]));
    assert!(stmt.text().contains("%s, %s, %s"));
    assert_eq!(stmt.params(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn select_with_bound_id() {
    let mut q = FragmentList::with_glue(" ");
    q.append(literal("SELECT * FROM t WHERE id =")).append(param(5));

    let stmt = render(&q);
    assert_eq!(stmt.text(), "SELECT * FROM t WHERE id = %s ;");
    assert_eq!(stmt.params(), &[Value::Int(5)]);
    assert!(stmt.is_read());
}

#[test]
fn single_child_parens_are_not_doubled() {
    let inner = enclosed([literal("a")]);
    assert!(inner.parens());

    let outer = enclosed([inner]);
    assert_eq!(render_ctx(&outer).text(), "(a)");
}

#[test]
fn multi_child_parens_are_kept() {
    let outer = enclosed([Piece::from(enclosed([literal("a")])), Piece::from("b")]);
    assert_eq!(render_ctx(&outer).text(), "((a), b)");
}

#[test]
fn empty_list_renders_parens_only_when_enclosed() {
    assert_eq!(render_ctx(&comma(Vec::<Piece>::new())).text(), "");
    assert_eq!(render_ctx(&enclosed(Vec::<Piece>::new())).text(), "()");
}

#[test]
fn append_extends_in_place() {
    let mut list = comma([literal("a")]);
    list.append("b").extend([literal("c"), literal("d")]);
    assert_eq!(list.len(), 4);
    assert_eq!(render_ctx(&list).text(), "a, b, c, d");
}

#[test]
fn alias_follows_first_seen_order() {
    let mut ctx = RenderContext::new();
    assert_eq!(ctx.alias_for("orders"), "`t1`");
    assert_eq!(ctx.alias_for("customers"), "`t2`");
    assert_eq!(ctx.alias_for("items"), "`t3`");
    assert_eq!(ctx.alias_for("orders"), "`t1`");
    assert_eq!(ctx.sources(), &["orders", "customers", "items"]);
}

#[test]
fn lists_flatten_unless_nesting() {
    let mut ctx = RenderContext::new();
    ctx.bind(vec![1, 2, 3]);
    assert_eq!(ctx.values().len(), 3);

    let mut ctx = RenderContext::new();
    {
        let mut scope = ctx.enter(RenderOptions::new().nesting(true));
        scope.bind(vec![1, 2, 3]);
    }
    assert_eq!(ctx.values(), &[Value::list([1, 2, 3])]);
}

#[test]
fn params_option_emits_placeholder_per_bind() {
    let mut ctx = RenderContext::new();
    {
        let mut scope = ctx.enter(RenderOptions::new().params(true));
        scope.bind("x").literal(" AND ").bind("y");
    }
    assert_eq!(ctx.text(), "%s AND %s");
    assert_eq!(ctx.values().len(), 2);
}

#[test]
fn converter_maps_scalars_and_list_elements() {
    let double = |v: Value| match v {
        Value::Int(n) => Value::Int(n * 2),
        other => other,
    };
    let mut ctx = RenderContext::with_options(RenderOptions::new().converter(double));
    ctx.bind(3).bind(vec![1, 2]).bind(Value::Null);
    assert_eq!(
        ctx.values(),
        &[Value::Int(6), Value::Int(2), Value::Int(4), Value::Null]
    );
}

#[test]
fn converter_is_not_inherited_by_nested_scopes() {
    let mut ctx =
        RenderContext::with_options(RenderOptions::new().converter(|_| Value::from("converted")));
    comma([param(1)]).render(&mut ctx);
    ctx.bind(1);
    assert_eq!(ctx.values(), &[Value::Int(1), Value::from("converted")]);
}

#[test]
fn scope_restores_parent_options() {
    let mut ctx = RenderContext::with_options(RenderOptions::new().nesting(true));
    {
        let scope = ctx.enter(RenderOptions::new().parens(true));
        assert!(!scope.options().nesting);
    }
    assert!(ctx.options().nesting);
    assert!(!ctx.options().parens);
    assert_eq!(ctx.text(), "()");
}

#[test]
fn scope_closes_on_early_return() {
    fn check(fail: bool) -> Result<(), OrmError> {
        if fail {
            Err(OrmError::Other("stop".into()))
        } else {
            Ok(())
        }
    }

    fn body(ctx: &mut RenderContext, fail: bool) -> Result<(), OrmError> {
        let mut scope = ctx.enter(RenderOptions::new().parens(true));
        scope.literal("x");
        check(fail)?;
        scope.literal("y");
        Ok(())
    }

    let mut ctx = RenderContext::new();
    assert!(body(&mut ctx, true).is_err());
    assert_eq!(ctx.text(), "(x)");

    let mut ctx = RenderContext::new();
    assert!(body(&mut ctx, false).is_ok());
    assert_eq!(ctx.text(), "(xy)");
}

#[test]
fn scope_closes_on_panic() {
    let mut ctx = RenderContext::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut scope = ctx.enter(RenderOptions::new().parens(true).nesting(true));
        scope.literal("x");
        panic!("render failed");
    }));
    assert!(result.is_err());
    assert_eq!(ctx.text(), "(x)");
    assert!(!ctx.options().nesting);
}

#[test]
fn render_any_dispatches_nodes_and_values() {
    let mut ctx = RenderContext::new();
    ctx.render_any(&literal("a = ")).render_any(Value::from(7));
    assert_eq!(ctx.text(), "a = ");
    assert_eq!(ctx.values(), &[Value::Int(7)]);
}

#[test]
fn context_splices_into_context() {
    let mut sub = FragmentList::with_glue(" ");
    sub.extend([literal("SELECT id FROM users WHERE age >"), literal("%s")]);
    let mut sub_ctx = render_ctx(&sub);
    sub_ctx.bind(18);

    let mut outer = FragmentList::with_glue(" ");
    outer
        .append(literal("SELECT * FROM orders WHERE user_id IN"))
        .append(enclosed([sub_ctx]))
        .append(literal("AND total >"))
        .append(param(100));

    let stmt = render(&outer);
    assert_eq!(
        stmt.text(),
        "SELECT * FROM orders WHERE user_id IN (SELECT id FROM users WHERE age > %s) AND total > %s ;"
    );
    assert_eq!(stmt.params(), &[Value::Int(18), Value::Int(100)]);
}

#[test]
fn terminator_is_not_doubled() {
    let mut list = FragmentList::with_glue("");
    list.extend([literal("DELETE FROM t"), literal(TERMINATOR)]);
    assert_eq!(render(&list).text(), "DELETE FROM t;");
}

#[test]
fn literal_try_new_rejects_non_strings() {
    let err = Literal::try_new(Value::Int(1), None).unwrap_err();
    assert!(err.is_type_mismatch());

    let err = Literal::try_new(Value::from("a = %s"), Some(Value::Int(1))).unwrap_err();
    assert!(err.is_type_mismatch());

    let ok = Literal::try_new(Value::from("a = %s"), Some(Value::list([1]))).unwrap();
    assert_eq!(ok.params(), Some(&[Value::Int(1)][..]));
}

#[test]
fn statement_read_classification() {
    assert!(Statement::new("SELECT * FROM t", vec![]).is_read());
    assert!(Statement::new("show tables", vec![]).is_read());
    assert!(!Statement::new("UPDATE t SET x=%s", vec![Value::Int(1)]).is_read());
    // Permissive: the keyword anywhere counts.
    assert!(Statement::new("INSERT INTO t SELECT * FROM s", vec![]).is_read());

    let forced = Statement::new("SELECT * FROM t", vec![]).force_read(false);
    assert!(!forced.is_read());
    let forced = Statement::new("UPDATE t SET x = 1", vec![]).force_read(true);
    assert!(forced.is_read());
}

#[test]
fn statement_equality_uses_trimmed_text_and_params() {
    let a = Statement::new("  SELECT 1 ; ", vec![Value::Int(1)]);
    let b = Statement::new("SELECT 1 ;", vec![Value::Int(1)]).force_read(false);
    let c = Statement::new("SELECT 1 ;", vec![Value::Int(2)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn statement_truthiness_and_display() {
    assert!(Statement::new("", vec![]).is_empty());
    let stmt = Statement::new("SELECT %s ;", vec![Value::from("a")]);
    assert!(!stmt.is_empty());
    assert_eq!(stmt.to_string(), "SELECT %s ; % ('a')");
}

#[test]
fn statement_try_new_checks_param_container() {
    let err = Statement::try_new(Value::from("SELECT 1"), Value::Int(1)).unwrap_err();
    assert!(matches!(err, OrmError::InvalidParams(_)));

    let err = Statement::try_new(Value::Int(1), Value::Null).unwrap_err();
    assert!(err.is_type_mismatch());

    let stmt = Statement::try_new(Value::from("SELECT %s"), Value::list([1])).unwrap();
    assert_eq!(stmt.params(), &[Value::Int(1)]);
}
