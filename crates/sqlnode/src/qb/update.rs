//! UPDATE statement builder.

use crate::error::{OrmError, OrmResult};
use crate::qb::traits::SqlQb;
use crate::schema::{Expr, quote_ident};
use crate::sql::{Fragment, Literal, PLACEHOLDER, RenderContext, RenderOptions};
use crate::value::Value;

/// SET field value type.
#[derive(Debug, Clone)]
enum SetField {
    /// Bound value
    Value(Value),
    /// Raw SQL expression, e.g. `count + %s`
    Raw(Literal),
}

/// UPDATE statement builder.
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    set_fields: Vec<(String, SetField)>,
    filter: Option<Expr>,
    read: Option<bool>,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set_fields: Vec::new(),
            filter: None,
            read: None,
        }
    }

    /// `column = %s`
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_fields
            .push((column.into(), SetField::Value(value.into())));
        self
    }

    /// `column = <raw SQL>`, e.g. `.set_raw("hits", Literal::with_params("hits + %s", [1]))`.
    pub fn set_raw(mut self, column: impl Into<String>, expr: Literal) -> Self {
        self.set_fields.push((column.into(), SetField::Raw(expr)));
        self
    }

    /// Set several columns at once.
    pub fn values<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .fold(self, |update, (column, value)| update.set(column, value))
    }

    /// Add a WHERE condition; repeated calls are combined with AND.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(expr),
            None => expr,
        });
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

impl Fragment for Update {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal(format!("UPDATE {} SET ", quote_ident(&self.table)));
        for (i, (column, field)) in self.set_fields.iter().enumerate() {
            if i > 0 {
                ctx.literal(", ");
            }
            ctx.literal(format!("{} = ", quote_ident(column)));
            match field {
                SetField::Value(value) => {
                    let mut scope = ctx.enter(RenderOptions::new().nesting(true));
                    scope.literal(PLACEHOLDER).bind(value.clone());
                }
                SetField::Raw(expr) => {
                    expr.render(ctx);
                }
            }
        }

        if let Some(filter) = self.filter.as_ref().filter(|e| !e.is_empty()) {
            ctx.literal(" WHERE ");
            filter.render(ctx);
        }
        ctx
    }
}

impl SqlQb for Update {
    fn validate(&self) -> OrmResult<()> {
        if self.set_fields.is_empty() {
            return Err(OrmError::Other(format!(
                "UPDATE `{}` has no SET clause",
                self.table
            )));
        }
        Ok(())
    }

    fn forced_read(&self) -> Option<bool> {
        self.read.or(Some(false))
    }
}
