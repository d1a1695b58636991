//! CRUD statement builders.
//!
//! Each builder is a [`Fragment`](crate::sql::Fragment) tree root: it renders
//! through the same context as any hand-built fragment, and
//! [`SqlQb::statement`] validates, renders and finalizes it.
//!
//! ```
//! use sqlnode::qb::{self, SqlQb};
//! use sqlnode::schema::Column;
//!
//! let stmt = qb::update("users")
//!     .set("status", "inactive")
//!     .filter(Column::new("users", "id").eq(7))
//!     .statement()?;
//! assert_eq!(stmt.text(), "UPDATE `users` SET `status` = %s WHERE `id` = %s ;");
//! assert!(!stmt.is_read());
//! # Ok::<(), sqlnode::OrmError>(())
//! ```

mod delete;
mod insert;
mod select;
mod traits;
mod update;


pub use delete::Delete;
pub use insert::{ConflictAction, Insert};
pub use select::{JoinKind, Select};
pub use traits::SqlQb;
pub use update::Update;

use crate::schema::Column;

/// SELECT of all columns from `table`.
pub fn select(table: &str) -> Select {
    Select::new(table, Vec::<Column>::new())
}

pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

pub fn update(table: &str) -> Update {
    Update::new(table)
}

pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}
