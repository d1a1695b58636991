//! Error types for sqlnode

use thiserror::Error;

/// Result type alias for sqlnode operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement construction and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// A fragment, statement or builder was given an argument of the wrong shape
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A statement's parameter container is not an ordered sequence
    #[error("Invalid query params: {0}")]
    InvalidParams(String),

    /// The process-wide database was used before `bind()` or after `unbind()`
    #[error("Database is not bound, maybe you should call `sqlnode::bind()` before")]
    Unbound,

    /// `bind()` was called while a database is already bound
    #[error("Database already bound to {0}")]
    AlreadyBound(String),

    /// Two fields with the same name in one table declaration
    #[error("Duplicate field name `{field}` in table `{table}`")]
    DuplicateField { table: String, field: String },

    /// More than one primary key in one table declaration
    #[error("Duplicate primary key `{field}` in table `{table}`")]
    DuplicatePrimaryKey { table: String, field: String },

    /// No primary key in a table declaration
    #[error("Primary key not found for table `{0}`")]
    MissingPrimaryKey(String),

    /// Lookup of a field that the table does not declare
    #[error("Table `{table}` has no field `{field}`")]
    UnknownField { table: String, field: String },

    /// An operation needs a primary key value but the record has none
    #[error("Primary key `{0}` has no value")]
    MissingPrimaryKeyValue(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an unbound-database error
    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
