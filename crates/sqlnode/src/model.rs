//! Table-backed record types.
//!
//! A [`Model`] ties a Rust struct to a [`Table`] declaration and gets the
//! common CRUD statements for free.
//!
//! ```
//! use std::sync::LazyLock;
//! use sqlnode::{FromRow, Model, OrmResult, RowExt, Value};
//! use sqlnode::qb::SqlQb;
//! use sqlnode::schema::{Field, Table};
//!
//! static USERS: LazyLock<Table> = LazyLock::new(|| {
//!     Table::builder("users")
//!         .field(Field::new("id", "BIGSERIAL").auto_increment())
//!         .field(Field::new("name", "TEXT"))
//!         .build()
//!         .expect("valid table")
//! });
//!
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//! }
//!
//! impl FromRow for User {
//!     fn from_row(row: &tokio_postgres::Row) -> OrmResult<Self> {
//!         Ok(Self { id: row.try_get_column("id")?, name: row.try_get_column("name")? })
//!     }
//! }
//!
//! impl Model for User {
//!     fn table() -> &'static Table {
//!         &USERS
//!     }
//!
//!     fn values(&self) -> Vec<(&'static str, Value)> {
//!         vec![("id", self.id.into()), ("name", self.name.clone().into())]
//!     }
//! }
//!
//! let user = User { id: None, name: "alice".into() };
//! let stmt = user.insert().statement()?;
//! assert_eq!(stmt.text(), "INSERT INTO `users` (`name`) VALUES (%s) RETURNING `id` ;");
//! assert!(user.remove().is_err());
//! # Ok::<(), sqlnode::OrmError>(())
//! ```

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::qb::{Delete, Insert, Select, SqlQb, Update};
use crate::row::FromRow;
use crate::schema::Table;
use crate::value::Value;

/// A record type stored in one table.
pub trait Model: FromRow {
    /// The table this model is stored in.
    fn table() -> &'static Table;

    /// Current field values, keyed by column name.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Value of the primary key, `Value::Null` when unset.
    fn pk_value(&self) -> Value {
        let pk = Self::table().primary_key().name();
        self.values()
            .into_iter()
            .find(|(name, _)| *name == pk)
            .map_or(Value::Null, |(_, value)| value)
    }

    /// `SELECT` of every declared field.
    fn select() -> Select {
        Self::table().select()
    }

    /// Select the row with primary key `pk`.
    fn get(pk: impl Into<Value>) -> Select {
        let table = Self::table();
        table.select().filter(table.pk().eq(pk)).limit(1)
    }

    /// Select all rows whose primary key is in `pks`.
    fn get_many<T: Into<Value>>(pks: impl IntoIterator<Item = T>) -> Select {
        let table = Self::table();
        table.select().filter(table.pk().in_nested(pks))
    }

    /// Insert this record. Null fields are left to the column default.
    fn insert(&self) -> Insert {
        Self::table().insert().row(present(self.values()))
    }

    /// Insert several records in one statement.
    fn insert_many<'a>(records: impl IntoIterator<Item = &'a Self>) -> Insert
    where
        Self: 'a,
    {
        records
            .into_iter()
            .fold(Self::table().insert(), |insert, record| {
                insert.row(present(record.values()))
            })
    }

    /// Insert this record, overwriting the row with the same primary key.
    fn save(&self) -> Insert {
        Self::table().replace().row(present(self.values()))
    }

    /// Update every non-key field of the row with this record's primary key.
    fn update_by_pk(&self) -> OrmResult<Update> {
        let table = Self::table();
        let pk_name = table.primary_key().name();
        let pk = required_pk(table, self.pk_value())?;
        let fields = self.values().into_iter().filter(|(name, _)| *name != pk_name);
        Ok(table.update().values(fields).filter(table.pk().eq(pk)))
    }

    /// Delete the row with this record's primary key.
    fn remove(&self) -> OrmResult<Delete> {
        let table = Self::table();
        let pk = required_pk(table, self.pk_value())?;
        Ok(table.delete().filter(table.pk().eq(pk)))
    }

    /// Load the record with primary key `pk`, if any.
    fn find(
        pk: impl Into<Value>,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Option<Self>>> + Send {
        let query = Self::get(pk);
        async move {
            let found: Vec<Self> = query.fetch_all(conn).await?;
            Ok(found.into_iter().next())
        }
    }
}

fn present(values: Vec<(&'static str, Value)>) -> Vec<(&'static str, Value)> {
    values.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

fn required_pk(table: &Table, value: Value) -> OrmResult<Value> {
    if value.is_null() {
        return Err(OrmError::MissingPrimaryKeyValue(format!(
            "{}.{}",
            table.name(),
            table.primary_key().name()
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowExt;
    use crate::schema::Field;
    use std::sync::LazyLock;

    static POSTS: LazyLock<Table> = LazyLock::new(|| {
        Table::builder("posts")
            .field(Field::new("id", "BIGSERIAL").auto_increment())
            .field(Field::new("title", "TEXT").not_null())
            .field(Field::new("body", "TEXT"))
            .build()
            .unwrap()
    });

    struct Post {
        id: Option<i64>,
        title: String,
        body: Option<String>,
    }

    impl FromRow for Post {
        fn from_row(row: &tokio_postgres::Row) -> OrmResult<Self> {
            Ok(Self {
                id: row.try_get_column("id")?,
                title: row.try_get_column("title")?,
                body: row.try_get_column("body")?,
            })
        }
    }

    impl Model for Post {
        fn table() -> &'static Table {
            &POSTS
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.into()),
                ("title", self.title.clone().into()),
                ("body", self.body.clone().into()),
            ]
        }
    }

    fn post(id: Option<i64>, title: &str, body: Option<&str>) -> Post {
        Post {
            id,
            title: title.into(),
            body: body.map(Into::into),
        }
    }

    #[test]
    fn get_and_get_many() {
        let stmt = Post::get(3).statement().unwrap();
        assert_eq!(
            stmt.text(),
            "SELECT `t1`.`id`, `t1`.`title`, `t1`.`body` FROM `posts` AS `t1` \
             WHERE `t1`.`id` = %s LIMIT 1 ;"
        );

        let stmt = Post::get_many([1, 2]).statement().unwrap();
        assert!(stmt.text().ends_with("WHERE `t1`.`id` = ANY(%s) ;"));
        assert_eq!(stmt.params(), &[Value::list([1, 2])]);
    }

    #[test]
    fn insert_skips_nulls() {
        let stmt = post(None, "hi", None).insert().statement().unwrap();
        assert_eq!(
            stmt.text(),
            "INSERT INTO `posts` (`title`) VALUES (%s) RETURNING `id` ;"
        );
    }

    #[test]
    fn insert_many_fills_defaults() {
        let posts = [post(None, "a", Some("x")), post(None, "b", None)];
        let stmt = Post::insert_many(&posts).statement().unwrap();
        assert_eq!(
            stmt.text(),
            "INSERT INTO `posts` (`title`, `body`) VALUES (%s, %s), (%s, DEFAULT) RETURNING `id` ;"
        );
        assert_eq!(stmt.params().len(), 3);
    }

    #[test]
    fn update_and_remove_need_a_key() {
        let unsaved = post(None, "a", None);
        assert!(matches!(
            unsaved.update_by_pk(),
            Err(OrmError::MissingPrimaryKeyValue(_))
        ));
        assert!(matches!(
            unsaved.remove(),
            Err(OrmError::MissingPrimaryKeyValue(_))
        ));

        let saved = post(Some(9), "a", None);
        let stmt = saved.update_by_pk().unwrap().statement().unwrap();
        assert_eq!(
            stmt.text(),
            "UPDATE `posts` SET `title` = %s, `body` = %s WHERE `id` = %s ;"
        );
        assert_eq!(
            stmt.params(),
            &[Value::from("a"), Value::Null, Value::Int(9)]
        );

        let stmt = saved.remove().unwrap().statement().unwrap();
        assert_eq!(stmt.text(), "DELETE FROM `posts` WHERE `id` = %s ;");
    }

    #[test]
    fn save_is_an_upsert() {
        let stmt = post(Some(1), "a", None).save().statement().unwrap();
        assert_eq!(
            stmt.text(),
            "INSERT INTO `posts` (`id`, `title`) VALUES (%s, %s) \
             ON CONFLICT (`id`) DO UPDATE SET `title` = EXCLUDED.`title` RETURNING `id` ;"
        );
    }
}
