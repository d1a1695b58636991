//! Field descriptors.

/// One declared column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    sql_type: String,
    nullable: bool,
    default: Option<String>,
    comment: Option<String>,
    primary_key: bool,
    auto_increment: bool,
}

impl Field {
    /// A nullable, non-key field of the given SQL type.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            default: None,
            comment: None,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Mark as the primary key (implies NOT NULL).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Mark as an auto-increment primary key.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.primary_key()
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Raw SQL default expression, e.g. `CURRENT_TIMESTAMP`.
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_expr(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }
}
