//! Column references and boolean predicate trees.
//!
//! [`Expr`] renders straight into a [`RenderContext`], so every comparison
//! value lands in the statement's parameter list in text order.

use super::{QUALIFY_COLUMNS, quote_ident};
use crate::sql::{Fragment, Literal, PLACEHOLDER, RenderContext, RenderOptions};
use crate::value::Value;

/// A reference to a declared column.
///
/// Renders as `` `name` ``, or as `` `t<N>`.`name` `` while the
/// [`QUALIFY_COLUMNS`] scratch flag is set (multi-source selects).
///
/// Every value behind a single placeholder is bound as exactly one
/// parameter: a `Value::List` given to `eq`, `between` or as an `in_list`
/// element stays one (array) parameter instead of being flattened.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    table: String,
    name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn compare(&self, op: &'static str, value: Value) -> Expr {
        Expr::Compare {
            column: self.clone(),
            op,
            value,
        }
    }

    /// `column = value`; a null value becomes `IS NULL`.
    pub fn eq(&self, value: impl Into<Value>) -> Expr {
        let value = value.into();
        if value.is_null() {
            return self.is_null();
        }
        self.compare("=", value)
    }

    /// `column != value`; a null value becomes `IS NOT NULL`.
    pub fn ne(&self, value: impl Into<Value>) -> Expr {
        let value = value.into();
        if value.is_null() {
            return self.is_not_null();
        }
        self.compare("!=", value)
    }

    pub fn gt(&self, value: impl Into<Value>) -> Expr {
        self.compare(">", value.into())
    }

    pub fn gte(&self, value: impl Into<Value>) -> Expr {
        self.compare(">=", value.into())
    }

    pub fn lt(&self, value: impl Into<Value>) -> Expr {
        self.compare("<", value.into())
    }

    pub fn lte(&self, value: impl Into<Value>) -> Expr {
        self.compare("<=", value.into())
    }

    pub fn like(&self, pattern: impl Into<Value>) -> Expr {
        self.compare("LIKE", pattern.into())
    }

    pub fn not_like(&self, pattern: impl Into<Value>) -> Expr {
        self.compare("NOT LIKE", pattern.into())
    }

    pub fn is_null(&self) -> Expr {
        Expr::NullCheck {
            column: self.clone(),
            is_null: true,
        }
    }

    pub fn is_not_null(&self) -> Expr {
        Expr::NullCheck {
            column: self.clone(),
            is_null: false,
        }
    }

    /// `column IN (%s, %s, ...)`, one parameter per element.
    ///
    /// An empty list is always false.
    pub fn in_list<T: Into<Value>>(&self, values: impl IntoIterator<Item = T>) -> Expr {
        Expr::InList {
            column: self.clone(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// `column NOT IN (...)`; an empty list is always true.
    pub fn not_in<T: Into<Value>>(&self, values: impl IntoIterator<Item = T>) -> Expr {
        Expr::InList {
            column: self.clone(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    /// `column = ANY(%s)` with the whole list bound as a single array parameter.
    pub fn in_nested<T: Into<Value>>(&self, values: impl IntoIterator<Item = T>) -> Expr {
        Expr::AnyOf {
            column: self.clone(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between(&self, low: impl Into<Value>, high: impl Into<Value>) -> Expr {
        Expr::Between {
            column: self.clone(),
            low: low.into(),
            high: high.into(),
            negated: false,
        }
    }

    pub fn not_between(&self, low: impl Into<Value>, high: impl Into<Value>) -> Expr {
        Expr::Between {
            column: self.clone(),
            low: low.into(),
            high: high.into(),
            negated: true,
        }
    }

    /// `column ASC` for ORDER BY.
    pub fn asc(&self) -> Ordering {
        Ordering {
            column: self.clone(),
            descending: false,
        }
    }

    /// `column DESC` for ORDER BY.
    pub fn desc(&self) -> Ordering {
        Ordering {
            column: self.clone(),
            descending: true,
        }
    }
}

impl Fragment for Column {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        if ctx.scratch(QUALIFY_COLUMNS) == Some(&Value::Bool(true)) {
            let alias = ctx.alias_for(&self.table);
            ctx.literal(format!("{alias}.{}", quote_ident(&self.name)))
        } else {
            ctx.literal(quote_ident(&self.name))
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    column: Column,
    descending: bool,
}

impl Ordering {
    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl From<Column> for Ordering {
    fn from(column: Column) -> Self {
        column.asc()
    }
}

impl Fragment for Ordering {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        self.column.render(ctx);
        ctx.literal(if self.descending { " DESC" } else { " ASC" })
    }
}

/// Boolean expression node for WHERE/HAVING/ON clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All conditions must hold.
    And(Vec<Expr>),

    /// At least one condition must hold.
    Or(Vec<Expr>),

    Not(Box<Expr>),

    /// `column op %s`
    Compare {
        column: Column,
        op: &'static str,
        value: Value,
    },

    /// `column = other` between two columns, e.g. a join condition.
    ColumnsEqual { left: Column, right: Column },

    NullCheck { column: Column, is_null: bool },

    InList {
        column: Column,
        values: Vec<Value>,
        negated: bool,
    },

    /// `column = ANY(%s)`, list bound as one parameter.
    AnyOf { column: Column, values: Vec<Value> },

    Between {
        column: Column,
        low: Value,
        high: Value,
        negated: bool,
    },

    /// Raw SQL with `%s` placeholders and its values.
    Raw(Literal),

    True,

    False,
}

impl Expr {
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Raw SQL condition, e.g. `Expr::raw("age > %s", [18])`.
    pub fn raw<T: Into<Value>>(sql: impl Into<String>, params: impl IntoIterator<Item = T>) -> Self {
        Expr::Raw(Literal::with_params(sql, params))
    }

    pub fn columns_equal(left: Column, right: Column) -> Self {
        Expr::ColumnsEqual { left, right }
    }

    /// Whether the expression renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(Expr::is_empty),
            Expr::Not(inner) => inner.is_empty(),
            Expr::Raw(literal) => literal.text().trim().is_empty(),
            _ => false,
        }
    }

    /// Combine with another condition under AND, flattening nested ANDs.
    pub fn and_also(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut exprs) => {
                exprs.push(other);
                Expr::And(exprs)
            }
            expr => Expr::And(vec![expr, other]),
        }
    }

    fn render_group<'c>(
        ctx: &'c mut RenderContext,
        exprs: &[Expr],
        glue: &str,
        wrap: fn(&Expr) -> bool,
    ) -> &'c mut RenderContext {
        let members = exprs.iter().filter(|e| !e.is_empty());
        for (i, expr) in members.enumerate() {
            if i > 0 {
                ctx.literal(glue);
            }
            if wrap(expr) && expr.group_len() > 1 {
                let mut scope = ctx.enter(RenderOptions::new().parens(true));
                expr.render(&mut scope);
            } else {
                expr.render(ctx);
            }
        }
        ctx
    }

    fn group_len(&self) -> usize {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().filter(|e| !e.is_empty()).count(),
            _ => 1,
        }
    }
}

impl Fragment for Expr {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        match self {
            Expr::And(exprs) => {
                Self::render_group(ctx, exprs, " AND ", |e| matches!(e, Expr::Or(_)))
            }
            Expr::Or(exprs) => {
                Self::render_group(ctx, exprs, " OR ", |e| matches!(e, Expr::And(_)))
            }
            Expr::Not(inner) => {
                if inner.is_empty() {
                    return ctx;
                }
                ctx.literal("NOT ");
                {
                    let mut scope = ctx.enter(RenderOptions::new().parens(true));
                    inner.render(&mut scope);
                }
                ctx
            }
            Expr::Compare { column, op, value } => {
                column.render(ctx);
                ctx.literal(format!(" {op} {PLACEHOLDER}"));
                bind_one(ctx, value)
            }
            Expr::ColumnsEqual { left, right } => {
                left.render(ctx);
                ctx.literal(" = ");
                right.render(ctx)
            }
            Expr::NullCheck { column, is_null } => {
                column.render(ctx);
                ctx.literal(if *is_null { " IS NULL" } else { " IS NOT NULL" })
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return ctx.literal(if *negated { "1=1" } else { "1=0" });
                }
                column.render(ctx);
                ctx.literal(if *negated { " NOT IN " } else { " IN " });
                {
                    let mut scope = ctx.enter(
                        RenderOptions::new()
                            .parens(true)
                            .params(true)
                            .nesting(true),
                    );
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            scope.literal(", ");
                        }
                        scope.bind(value.clone());
                    }
                }
                ctx
            }
            Expr::AnyOf { column, values } => {
                column.render(ctx);
                ctx.literal(" = ANY");
                {
                    let mut scope = ctx.enter(RenderOptions::new().parens(true).nesting(true));
                    scope
                        .literal(PLACEHOLDER)
                        .bind(Value::List(values.clone()));
                }
                ctx
            }
            Expr::Between {
                column,
                low,
                high,
                negated,
            } => {
                column.render(ctx);
                let op = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                ctx.literal(format!(" {op} {PLACEHOLDER}"));
                bind_one(ctx, low);
                ctx.literal(format!(" AND {PLACEHOLDER}"));
                bind_one(ctx, high)
            }
            Expr::Raw(literal) => literal.render(ctx),
            Expr::True => ctx.literal("1=1"),
            Expr::False => ctx.literal("1=0"),
        }
    }
}

/// Bind `value` as one parameter, lists included.
fn bind_one<'c>(ctx: &'c mut RenderContext, value: &Value) -> &'c mut RenderContext {
    {
        let mut scope = ctx.enter(RenderOptions::new().nesting(true));
        scope.bind(value.clone());
    }
    ctx
}
