//! Table declarations and column expressions.
//!
//! Tables are declared once through [`Table::builder`], which validates the
//! field list and produces an immutable [`Table`]. Field lookups afterwards
//! are plain map access.
//!
//! ```
//! use sqlnode::schema::{Field, Table};
//!
//! let users = Table::builder("users")
//!     .field(Field::new("id", "BIGSERIAL").auto_increment())
//!     .field(Field::new("name", "TEXT"))
//!     .build()?;
//!
//! let name = users.field("name")?;
//! assert_eq!(name.name(), "name");
//! # Ok::<(), sqlnode::OrmError>(())
//! ```

mod ddl;
mod expr;
mod field;
mod table;


pub use ddl::{CreateTable, DropTable, create_tables, drop_tables, quote_literal};
pub use expr::{Column, Expr, Ordering};
pub use field::Field;
pub use table::{Table, TableBuilder};

/// Scratch key that switches column rendering to `` `t<N>`.`column` ``.
pub const QUALIFY_COLUMNS: &str = "qualify_columns";

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
