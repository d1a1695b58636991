//! Table DDL rendered from a [`Table`] declaration.

use super::field::Field;
use super::quote_ident;
use super::table::Table;
use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::executor;
use crate::qb::SqlQb;
use crate::sql::{self, Fragment, FragmentList, RenderContext, Statement, enclosed};

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn column_definition(field: &Field) -> String {
    let mut def = format!("{} {}", quote_ident(field.name()), field.sql_type());
    if !field.is_nullable() {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = field.default_expr() {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

/// `CREATE TABLE` from the declared fields.
///
/// Columns render in declaration order followed by the primary key
/// constraint. Comments are separate statements, see [`Table::comments`].
#[derive(Debug, Clone)]
pub struct CreateTable {
    table: Table,
    if_not_exists: bool,
}

impl CreateTable {
    pub fn new(table: Table, if_not_exists: bool) -> Self {
        Self {
            table,
            if_not_exists,
        }
    }
}

impl Fragment for CreateTable {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal("CREATE TABLE ");
        if self.if_not_exists {
            ctx.literal("IF NOT EXISTS ");
        }
        ctx.literal(quote_ident(self.table.name())).literal(" ");

        let pk = quote_ident(self.table.primary_key().name());
        let mut defs: Vec<String> = self.table.fields().iter().map(column_definition).collect();
        defs.push(format!("PRIMARY KEY ({pk})"));
        enclosed(defs).render(ctx)
    }
}

impl SqlQb for CreateTable {
    fn forced_read(&self) -> Option<bool> {
        Some(false)
    }
}

/// `DROP TABLE`.
#[derive(Debug, Clone)]
pub struct DropTable {
    table: String,
    if_exists: bool,
}

impl DropTable {
    pub fn new(table: impl Into<String>, if_exists: bool) -> Self {
        Self {
            table: table.into(),
            if_exists,
        }
    }
}

impl Fragment for DropTable {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal("DROP TABLE ");
        if self.if_exists {
            ctx.literal("IF EXISTS ");
        }
        ctx.literal(quote_ident(&self.table))
    }
}

impl SqlQb for DropTable {
    fn forced_read(&self) -> Option<bool> {
        Some(false)
    }
}

/// `COMMENT ON` statements for the table and every commented field.
pub(super) fn comment_statements(table: &Table) -> Vec<Statement> {
    let name = quote_ident(table.name());
    let on_table = table
        .comment()
        .map(|comment| format!("COMMENT ON TABLE {name} IS {}", quote_literal(comment)));
    let on_columns = table.fields().iter().filter_map(|field| {
        field.comment_text().map(|comment| {
            format!(
                "COMMENT ON COLUMN {name}.{} IS {}",
                quote_ident(field.name()),
                quote_literal(comment)
            )
        })
    });

    on_table
        .into_iter()
        .chain(on_columns)
        .map(|text| {
            let mut stmt = FragmentList::with_glue("");
            stmt.append(text);
            sql::render(&stmt).force_read(false)
        })
        .collect()
}

/// Create every table (if missing) together with its comments, in order.
pub async fn create_tables(tables: &[&Table], conn: &impl GenericClient) -> OrmResult<()> {
    for table in tables {
        table.create(true).execute(conn).await?;
        for stmt in table.comments() {
            executor::execute(&stmt, conn).await?;
        }
    }
    Ok(())
}

/// Drop every table (if present), in reverse order.
pub async fn drop_tables(tables: &[&Table], conn: &impl GenericClient) -> OrmResult<()> {
    for table in tables.iter().rev() {
        table.drop(true).execute(conn).await?;
    }
    Ok(())
}
