//! SELECT statement builder.

use crate::qb::traits::SqlQb;
use crate::schema::{Column, Expr, Ordering, QUALIFY_COLUMNS, quote_ident};
use crate::sql::{Fragment, RenderContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    on: Expr,
}

/// SELECT statement builder.
///
/// Every source gets an alias (`` `t1` ``, `` `t2` ``, ... in order of
/// appearance) and columns render qualified with it:
///
/// ```
/// use sqlnode::qb::{Select, SqlQb};
/// use sqlnode::schema::Column;
///
/// let id = Column::new("users", "id");
/// let stmt = Select::new("users", [id.clone()]).filter(id.eq(1)).statement()?;
/// assert_eq!(stmt.text(), "SELECT `t1`.`id` FROM `users` AS `t1` WHERE `t1`.`id` = %s ;");
/// # Ok::<(), sqlnode::OrmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<Column>,
    distinct: bool,
    joins: Vec<Join>,
    filter: Option<Expr>,
    group_by: Vec<Column>,
    having: Option<Expr>,
    order_by: Vec<Ordering>,
    limit: Option<u64>,
    offset: Option<u64>,
    read: Option<bool>,
}

impl Select {
    /// Select `columns` from `table`; no columns means `*`.
    pub fn new(table: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into_iter().collect(),
            distinct: false,
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            read: None,
        }
    }

    /// Replace the column list.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// `JOIN table ON condition`
    pub fn join(mut self, table: impl Into<String>, on: Expr) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Inner,
            table: table.into(),
            on,
        });
        self
    }

    /// `LEFT JOIN table ON condition`
    pub fn left_join(mut self, table: impl Into<String>, on: Expr) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Left,
            table: table.into(),
            on,
        });
        self
    }

    /// Add a WHERE condition; repeated calls are combined with AND.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(expr),
            None => expr,
        });
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.group_by.extend(columns);
        self
    }

    /// Add a HAVING condition; repeated calls are combined with AND.
    pub fn having(mut self, expr: Expr) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and_also(expr),
            None => expr,
        });
        self
    }

    pub fn order_by(mut self, ordering: impl Into<Ordering>) -> Self {
        self.order_by.push(ordering.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Force the read/write classification of the rendered statement.
    pub fn force_read(mut self, is_read: bool) -> Self {
        self.read = Some(is_read);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn render_body(&self, ctx: &mut RenderContext) {
        // Claim aliases in source order before any column asks for one.
        let alias = ctx.alias_for(&self.table);
        let join_aliases: Vec<String> = self
            .joins
            .iter()
            .map(|join| ctx.alias_for(&join.table))
            .collect();

        ctx.literal(if self.distinct {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        });
        if self.columns.is_empty() {
            ctx.literal("*");
        } else {
            join_list(ctx, &self.columns, ", ");
        }

        ctx.literal(format!(" FROM {} AS {alias}", quote_ident(&self.table)));
        for (join, alias) in self.joins.iter().zip(join_aliases) {
            ctx.literal(format!(
                " {} {} AS {alias} ON ",
                join.kind.keyword(),
                quote_ident(&join.table)
            ));
            join.on.render(ctx);
        }

        if let Some(filter) = self.filter.as_ref().filter(|e| !e.is_empty()) {
            ctx.literal(" WHERE ");
            filter.render(ctx);
        }
        if !self.group_by.is_empty() {
            ctx.literal(" GROUP BY ");
            join_list(ctx, &self.group_by, ", ");
        }
        if let Some(having) = self.having.as_ref().filter(|e| !e.is_empty()) {
            ctx.literal(" HAVING ");
            having.render(ctx);
        }
        if !self.order_by.is_empty() {
            ctx.literal(" ORDER BY ");
            join_list(ctx, &self.order_by, ", ");
        }
        if let Some(limit) = self.limit {
            ctx.literal(format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            ctx.literal(format!(" OFFSET {offset}"));
        }
    }
}

pub(crate) fn join_list<F: Fragment>(ctx: &mut RenderContext, items: &[F], glue: &str) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ctx.literal(glue);
        }
        item.render(ctx);
    }
}

impl Fragment for Select {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        // Restore the caller's qualification flag so a subquery does not
        // leak it into the enclosing statement.
        let previous = ctx.scratch(QUALIFY_COLUMNS).cloned();
        ctx.set_scratch(QUALIFY_COLUMNS, true);
        self.render_body(ctx);
        match previous {
            Some(value) => ctx.set_scratch(QUALIFY_COLUMNS, value),
            None => {
                ctx.remove_scratch(QUALIFY_COLUMNS);
                ctx
            }
        }
    }
}

impl SqlQb for Select {
    fn forced_read(&self) -> Option<bool> {
        self.read.or(Some(true))
    }
}
