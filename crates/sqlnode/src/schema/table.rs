//! Validated table descriptors.

use super::ddl::{self, CreateTable, DropTable};
use super::expr::Column;
use super::field::Field;
use crate::error::{OrmError, OrmResult};
use crate::qb::{Delete, Insert, Select, Update};
use crate::sql::Statement;
use std::collections::HashMap;

/// An immutable table declaration.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    primary_key: usize,
    comment: Option<String>,
}

impl Table {
    /// Start declaring a table.
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            fields: Vec::new(),
            comment: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_def(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column reference for a declared field.
    pub fn field(&self, name: &str) -> OrmResult<Column> {
        match self.field_def(name) {
            Some(field) => Ok(Column::new(&self.name, field.name())),
            None => Err(OrmError::UnknownField {
                table: self.name.clone(),
                field: name.to_string(),
            }),
        }
    }

    /// Column references for all fields, in declaration order.
    pub fn columns(&self) -> Vec<Column> {
        self.fields
            .iter()
            .map(|f| Column::new(&self.name, f.name()))
            .collect()
    }

    pub fn primary_key(&self) -> &Field {
        &self.fields[self.primary_key]
    }

    /// Column reference for the primary key.
    pub fn pk(&self) -> Column {
        Column::new(&self.name, self.primary_key().name())
    }

    pub fn is_auto_increment(&self) -> bool {
        self.primary_key().is_auto_increment()
    }

    /// `SELECT` of all fields.
    pub fn select(&self) -> Select {
        Select::new(&self.name, self.columns())
    }

    /// `INSERT`; returns the generated key when the primary key is auto-increment.
    pub fn insert(&self) -> Insert {
        let insert = Insert::new(&self.name);
        if self.is_auto_increment() {
            insert.returning(self.primary_key().name())
        } else {
            insert
        }
    }

    /// `INSERT` that overwrites the row sharing the same primary key.
    pub fn replace(&self) -> Insert {
        self.insert().on_conflict_update([self.primary_key().name()])
    }

    pub fn update(&self) -> Update {
        Update::new(&self.name)
    }

    pub fn delete(&self) -> Delete {
        Delete::new(&self.name)
    }

    /// `CREATE TABLE` from the declared fields.
    pub fn create(&self, if_not_exists: bool) -> CreateTable {
        CreateTable::new(self.clone(), if_not_exists)
    }

    /// `DROP TABLE`.
    pub fn drop(&self, if_exists: bool) -> DropTable {
        DropTable::new(&self.name, if_exists)
    }

    /// `COMMENT ON` statements for the table and its commented fields.
    pub fn comments(&self) -> Vec<Statement> {
        ddl::comment_statements(self)
    }
}

/// Collects field declarations for [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    fields: Vec<Field>,
    comment: Option<String>,
}

impl TableBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Validate the declaration and freeze it.
    ///
    /// Fails on a duplicate field name, on more than one primary key, and
    /// when no primary key is declared.
    pub fn build(self) -> OrmResult<Table> {
        let mut index = HashMap::with_capacity(self.fields.len());
        let mut primary_key = None;

        for (i, field) in self.fields.iter().enumerate() {
            if index.insert(field.name().to_string(), i).is_some() {
                return Err(OrmError::DuplicateField {
                    table: self.name,
                    field: field.name().to_string(),
                });
            }
            if field.is_primary_key() {
                if primary_key.is_some() {
                    return Err(OrmError::DuplicatePrimaryKey {
                        table: self.name,
                        field: field.name().to_string(),
                    });
                }
                primary_key = Some(i);
            }
        }

        let Some(primary_key) = primary_key else {
            return Err(OrmError::MissingPrimaryKey(self.name));
        };

        Ok(Table {
            name: self.name,
            fields: self.fields,
            index,
            primary_key,
            comment: self.comment,
        })
    }
}
