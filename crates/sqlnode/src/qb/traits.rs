//! Trait definitions for statement builders.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::executor;
use crate::row::{ExecResult, FromRow, Record};
use crate::sql::{self, Fragment, Statement};

/// Base trait for all statement builders.
///
/// A builder is a fragment node; `statement()` validates it, renders it
/// and finalizes the result.
pub trait SqlQb: Fragment + Sized {
    /// Validate builder state before rendering.
    fn validate(&self) -> OrmResult<()> {
        Ok(())
    }

    /// Read/write classification of the built statement.
    ///
    /// Builders report their own kind (`Select` reads, the others write)
    /// unless overridden with `force_read`; `None` leaves it to the text.
    fn forced_read(&self) -> Option<bool> {
        None
    }

    /// Render and finalize into a [`Statement`].
    fn statement(&self) -> OrmResult<Statement> {
        self.validate()?;
        Ok(sql::render(self).with_read(self.forced_read()))
    }

    /// Debug helper: the rendered SQL text, without validation.
    fn to_sql(&self) -> String {
        sql::render(self).text().to_string()
    }

    /// Execute and map all rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<T>>> + Send {
        let stmt = self.statement();
        async move { executor::fetch_as(&stmt?, conn).await }
    }

    /// Execute and load all rows as [`Record`]s.
    fn fetch_records(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send {
        let stmt = self.statement();
        async move { executor::fetch_records(&stmt?, conn).await }
    }

    /// Execute and return the affected row count and generated key.
    fn execute(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        let stmt = self.statement();
        async move { executor::execute(&stmt?, conn).await }
    }

    /// Execute on the process-wide database, routed by read/write kind.
    #[cfg(feature = "pool")]
    fn run(&self) -> impl std::future::Future<Output = OrmResult<executor::Output>> + Send {
        let stmt = self.statement();
        async move { executor::run(&stmt?).await }
    }

    /// Fetch `T`s from the process-wide database.
    #[cfg(feature = "pool")]
    fn run_as<T: FromRow>(&self) -> impl std::future::Future<Output = OrmResult<Vec<T>>> + Send {
        let stmt = self.statement();
        async move { executor::run_as(&stmt?).await }
    }
}
