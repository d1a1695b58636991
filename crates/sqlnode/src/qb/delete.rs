//! DELETE statement builder.

use crate::qb::traits::SqlQb;
use crate::schema::{Expr, quote_ident};
use crate::sql::{Fragment, RenderContext};

/// DELETE statement builder.
///
/// Without a WHERE condition it renders the no-op guard `WHERE 1=0`
/// unless [`allow_all`](Self::allow_all) was called.
#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    filter: Option<Expr>,
    allow_all: bool,
    read: Option<bool>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            allow_all: false,
            read: None,
        }
    }

    /// Add a WHERE condition; repeated calls are combined with AND.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(expr),
            None => expr,
        });
        self
    }

    /// Allow DELETE without WHERE, removing every row.
    pub fn allow_all(mut self) -> Self {
        self.allow_all = true;
        self
    }

    pub fn force_read(mut self, is_read: bool) -> Self {
        self.read = Some(is_read);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Fragment for Delete {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal(format!("DELETE FROM {}", quote_ident(&self.table)));
        match self.filter.as_ref().filter(|e| !e.is_empty()) {
            Some(filter) => {
                ctx.literal(" WHERE ");
                filter.render(ctx)
            }
            None if self.allow_all => ctx,
            None => ctx.literal(" WHERE 1=0"),
        }
    }
}

impl SqlQb for Delete {
    fn forced_read(&self) -> Option<bool> {
        self.read.or(Some(false))
    }
}
