//! INSERT (and upsert) statement builder.

use crate::error::{OrmError, OrmResult};
use crate::qb::traits::SqlQb;
use crate::schema::quote_ident;
use crate::sql::{Fragment, RenderContext, RenderOptions};
use crate::value::Value;

/// Conflict resolution for `ON CONFLICT (target)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// `DO NOTHING`
    DoNothing,
    /// `DO UPDATE SET col = EXCLUDED.col` for every inserted non-target column.
    DoUpdate,
}

#[derive(Debug, Clone)]
struct OnConflict {
    target: Vec<String>,
    action: ConflictAction,
}

type Row = Vec<(String, Value)>;

/// INSERT statement builder for one or many rows.
///
/// The column list is the union of all row keys in first-seen order; a row
/// missing one of them renders `DEFAULT` in that position.
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    rows: Vec<Row>,
    on_conflict: Option<OnConflict>,
    returning: Vec<String>,
    read: Option<bool>,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: Vec::new(),
            on_conflict: None,
            returning: Vec::new(),
            read: None,
        }
    }

    /// Append a row of `(column, value)` pairs. A repeated column keeps the last value.
    pub fn row<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row: Row = Vec::new();
        for (column, value) in pairs {
            set_in(&mut row, column.into(), value.into());
        }
        self.rows.push(row);
        self
    }

    /// Append several rows.
    pub fn rows<R, K, V>(self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        rows.into_iter().fold(self, Insert::row)
    }

    /// Set a column on the last row, starting one if there is none.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.last_mut() {
            set_in(row, column.into(), value.into());
        }
        self
    }

    /// `ON CONFLICT (target) DO UPDATE SET col = EXCLUDED.col, ...`
    ///
    /// Falls back to `DO NOTHING` when every inserted column is part of the target.
    pub fn on_conflict_update<S: Into<String>>(mut self, target: impl IntoIterator<Item = S>) -> Self {
        self.on_conflict = Some(OnConflict {
            target: target.into_iter().map(Into::into).collect(),
            action: ConflictAction::DoUpdate,
        });
        self
    }

    /// `ON CONFLICT (target) DO NOTHING`
    pub fn on_conflict_do_nothing<S: Into<String>>(
        mut self,
        target: impl IntoIterator<Item = S>,
    ) -> Self {
        self.on_conflict = Some(OnConflict {
            target: target.into_iter().map(Into::into).collect(),
            action: ConflictAction::DoNothing,
        });
        self
    }

    /// Add a `RETURNING` column.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(column.into());
        self
    }

    pub fn force_read(mut self, is_read: bool) -> Self {
        self.read = Some(is_read);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of rows collected so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Union of row keys in first-seen order.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (column, _) in self.rows.iter().flatten() {
            if !names.contains(&column.as_str()) {
                names.push(column);
            }
        }
        names
    }
}

fn set_in(row: &mut Row, column: String, value: Value) {
    match row.iter_mut().find(|(name, _)| *name == column) {
        Some(slot) => slot.1 = value,
        None => row.push((column, value)),
    }
}

fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Fragment for Insert {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        let columns = self.column_names();
        ctx.literal(format!(
            "INSERT INTO {} ({}) VALUES ",
            quote_ident(&self.table),
            quoted_list(columns.iter().copied())
        ));

        for (i, row) in self.rows.iter().filter(|r| !r.is_empty()).enumerate() {
            if i > 0 {
                ctx.literal(", ");
            }
            let mut scope = ctx.enter(RenderOptions::new().parens(true).params(true).nesting(true));
            for (j, column) in columns.iter().enumerate() {
                if j > 0 {
                    scope.literal(", ");
                }
                match row.iter().find(|(name, _)| name == column) {
                    Some((_, value)) => scope.bind(value.clone()),
                    None => scope.literal("DEFAULT"),
                };
            }
        }

        if let Some(conflict) = &self.on_conflict {
            ctx.literal(format!(
                " ON CONFLICT ({})",
                quoted_list(conflict.target.iter().map(String::as_str))
            ));
            let updates: Vec<String> = columns
                .iter()
                .filter(|c| !conflict.target.iter().any(|t| t.as_str() == **c))
                .map(|c| {
                    let quoted = quote_ident(c);
                    format!("{quoted} = EXCLUDED.{quoted}")
                })
                .collect();
            if conflict.action == ConflictAction::DoNothing || updates.is_empty() {
                ctx.literal(" DO NOTHING");
            } else {
                ctx.literal(format!(" DO UPDATE SET {}", updates.join(", ")));
            }
        }

        if !self.returning.is_empty() {
            ctx.literal(format!(
                " RETURNING {}",
                quoted_list(self.returning.iter().map(String::as_str))
            ));
        }
        ctx
    }
}

impl SqlQb for Insert {
    fn validate(&self) -> OrmResult<()> {
        if self.is_empty() {
            return Err(OrmError::type_mismatch(format!(
                "INSERT INTO `{}` needs at least one row with values",
                self.table
            )));
        }
        Ok(())
    }

    fn forced_read(&self) -> Option<bool> {
        self.read.or(Some(false))
    }
}
