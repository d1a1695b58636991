//! # sqlnode
//!
//! Composable SQL fragments with parameter bookkeeping, and a thin Postgres
//! layer to run them.
//!
//! ## Features
//!
//! - **Fragment trees**: statements are built from [`sql::Literal`]s,
//!   [`sql::Param`]s and glued [`sql::FragmentList`]s, then rendered in one
//!   pass into `%s`-placeholder text plus ordered values
//! - **Scoped options**: parenthesization, placeholder emission, list
//!   nesting and value conversion apply per scope and never leak outward
//! - **Schema and builders**: validated [`schema::Table`] declarations and
//!   CRUD builders in [`qb`] that render through the same engine
//! - **Safe defaults**: DELETE without WHERE is a no-op, UPDATE requires SET
//! - **Postgres execution**: any [`GenericClient`] (client, transaction,
//!   pooled connection) runs a [`Statement`]; a process-wide database with an
//!   optional read replica is available behind the `pool` feature
//!
//! ## Example
//!
//! ```
//! use sqlnode::qb::SqlQb;
//! use sqlnode::schema::{Field, Table};
//!
//! let users = Table::builder("users")
//!     .field(Field::new("id", "BIGSERIAL").auto_increment())
//!     .field(Field::new("name", "TEXT"))
//!     .build()?;
//!
//! let stmt = users
//!     .select()
//!     .filter(users.field("name")?.like("a%"))
//!     .limit(10)
//!     .statement()?;
//!
//! assert_eq!(
//!     stmt.text(),
//!     "SELECT `t1`.`id`, `t1`.`name` FROM `users` AS `t1` WHERE `t1`.`name` LIKE %s LIMIT 10 ;"
//! );
//! assert_eq!(stmt.params(), &[sqlnode::Value::from("a%")]);
//! # Ok::<(), sqlnode::OrmError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod qb;
pub mod row;
pub mod schema;
pub mod sql;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

pub use client::GenericClient;
pub use config::{DbConfig, Recycling};
pub use error::{OrmError, OrmResult};
pub use executor::{execute, fetch, fetch_as, fetch_records, to_postgres};
pub use model::Model;
pub use row::{ExecResult, FromRow, Record, RowExt};
pub use sql::{Fragment, RenderContext, Statement};
pub use value::Value;

#[cfg(feature = "pool")]
pub use executor::{Output, run, run_as};

#[cfg(feature = "pool")]
pub use pool::{Database, DbState, PoolState, bind, create_pool, database, is_bound, state, unbind};
