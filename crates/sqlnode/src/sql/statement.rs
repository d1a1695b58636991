//! Finalized statements.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::fmt;

/// Keywords whose presence marks a statement as a read.
const READ_KEYWORDS: [&str; 2] = ["SELECT", "SHOW"];

/// The immutable result of rendering: SQL text, ordered parameters and a
/// read/write classification.
///
/// Two statements are equal when their trimmed text and parameters match.
/// Comparing against anything that is not a `Statement` does not compile:
///
/// ```compile_fail
/// let stmt = sqlnode::Statement::new("SELECT 1 ;", vec![]);
/// assert!(stmt == "SELECT 1 ;");
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    text: String,
    params: Vec<Value>,
    is_read: Option<bool>,
}

impl Statement {
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
            is_read: None,
        }
    }

    /// Build a statement from dynamic values.
    ///
    /// `text` must be `Value::Text`; `params` must be a `Value::List` (or
    /// `Value::Null` for no parameters).
    pub fn try_new(text: Value, params: Value) -> OrmResult<Self> {
        let text = match text {
            Value::Text(text) => text,
            other => {
                return Err(OrmError::type_mismatch(format!(
                    "statement text must be a string, got {other}"
                )));
            }
        };
        let params = match params {
            Value::List(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(OrmError::InvalidParams(format!(
                    "expected a sequence, got {other}"
                )));
            }
        };
        Ok(Self::new(text, params))
    }

    /// Force the read/write classification, overriding inference from the text.
    pub fn force_read(mut self, is_read: bool) -> Self {
        self.is_read = Some(is_read);
        self
    }

    /// Set or clear the forced classification.
    pub fn with_read(mut self, is_read: Option<bool>) -> Self {
        self.is_read = is_read;
        self
    }

    /// The SQL text, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Whether the statement reads (`SELECT`/`SHOW`) rather than writes.
    ///
    /// A forced classification wins. Otherwise the text is scanned
    /// case-insensitively for the keywords anywhere, not only as the first
    /// token.
    pub fn is_read(&self) -> bool {
        if let Some(is_read) = self.is_read {
            return is_read;
        }
        let upper = self.text().to_ascii_uppercase();
        READ_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
    }

    /// Whether the underlying text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        let text = self.text().to_string();
        (text, self.params)
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text() && self.params == other.params
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} % {}", self.text(), Value::List(self.params.clone()))
    }
}
