//! Statement execution against Postgres.
//!
//! Rendered statements use `%s` placeholders and backtick identifiers.
//! [`to_postgres`] rewrites them into the server's dialect right before
//! they are sent, so the rendering layer stays driver-agnostic.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::row::{ExecResult, FromRow, Record};
use crate::sql::Statement;
use crate::value::Value;
#[cfg(feature = "tracing")]
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Logged SQL is cut to this many bytes; 0 means unlimited.
#[cfg(feature = "tracing")]
static LOG_SQL_MAX_LEN: AtomicUsize = AtomicUsize::new(0);

/// Set the maximum length of SQL text in debug logs.
///
/// Without the `tracing` feature nothing is logged and this does nothing.
pub fn set_log_sql_max_len(len: Option<usize>) {
    #[cfg(feature = "tracing")]
    LOG_SQL_MAX_LEN.store(len.unwrap_or(0), Ordering::Relaxed);
    #[cfg(not(feature = "tracing"))]
    let _ = len;
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Code,
    Str,
    Backtick,
    Quoted,
}

/// Translate rendered SQL into Postgres syntax.
///
/// - `%s` becomes `$1`, `$2`, ... in order; `%%` becomes `%`.
/// - `` `name` `` becomes `"name"` (embedded `"` doubled, doubled backticks
///   collapsed).
/// - Single-quoted literals and double-quoted identifiers pass through
///   untouched.
///
/// Returns the translated text and the number of placeholders.
pub fn to_postgres(sql: &str) -> (String, usize) {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut count = 0;
    let mut state = Lexeme::Code;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            Lexeme::Code => match ch {
                '%' if chars.peek() == Some(&'s') => {
                    chars.next();
                    count += 1;
                    out.push('$');
                    out.push_str(&count.to_string());
                }
                '%' if chars.peek() == Some(&'%') => {
                    chars.next();
                    out.push('%');
                }
                '\'' => {
                    state = Lexeme::Str;
                    out.push(ch);
                }
                '"' => {
                    state = Lexeme::Quoted;
                    out.push(ch);
                }
                '`' => {
                    state = Lexeme::Backtick;
                    out.push('"');
                }
                _ => out.push(ch),
            },
            Lexeme::Str => {
                out.push(ch);
                if ch == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        out.push('\'');
                    } else {
                        state = Lexeme::Code;
                    }
                }
            }
            Lexeme::Quoted => {
                out.push(ch);
                if ch == '"' {
                    state = Lexeme::Code;
                }
            }
            Lexeme::Backtick => match ch {
                '`' if chars.peek() == Some(&'`') => {
                    chars.next();
                    out.push('`');
                }
                '`' => {
                    state = Lexeme::Code;
                    out.push('"');
                }
                '"' => out.push_str("\"\""),
                _ => out.push(ch),
            },
        }
    }
    (out, count)
}

/// Translate a statement and check its placeholder count against its params.
fn prepare(stmt: &Statement) -> OrmResult<String> {
    let (sql, count) = to_postgres(stmt.text());
    if count != stmt.params().len() {
        return Err(OrmError::InvalidParams(format!(
            "statement has {count} placeholders but {} values",
            stmt.params().len()
        )));
    }
    log_sql(stmt, &sql);
    Ok(sql)
}

fn params_ref(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

#[cfg(feature = "tracing")]
fn log_sql(stmt: &Statement, sql: &str) {
    let max = LOG_SQL_MAX_LEN.load(Ordering::Relaxed);
    tracing::debug!(
        target: "sqlnode.sql",
        kind = if stmt.is_read() { "read" } else { "write" },
        params = stmt.params().len(),
        sql = %truncate(sql, max),
        "execute"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_sql(_stmt: &Statement, _sql: &str) {}

/// Cut `sql` to at most `max` bytes on a char boundary; 0 keeps it whole.
#[cfg(feature = "tracing")]
fn truncate(sql: &str, max: usize) -> std::borrow::Cow<'_, str> {
    if max == 0 || sql.len() <= max {
        return sql.into();
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end]).into()
}

/// Execute a statement and return its rows.
pub async fn fetch(stmt: &Statement, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
    let sql = prepare(stmt)?;
    conn.query(&sql, &params_ref(stmt.params())).await
}

/// Execute a statement and map every row to `T`.
pub async fn fetch_as<T: FromRow>(stmt: &Statement, conn: &impl GenericClient) -> OrmResult<Vec<T>> {
    let rows = fetch(stmt, conn).await?;
    rows.iter().map(T::from_row).collect()
}

/// Execute a statement and load every row as a [`Record`].
pub async fn fetch_records(stmt: &Statement, conn: &impl GenericClient) -> OrmResult<Vec<Record>> {
    fetch_as::<Record>(stmt, conn).await
}

/// Execute a write statement.
///
/// A statement with a `RETURNING` clause is run as a query; the first
/// returned column of the first row is reported as `last_id` when it is an
/// integer.
pub async fn execute(stmt: &Statement, conn: &impl GenericClient) -> OrmResult<ExecResult> {
    let sql = prepare(stmt)?;
    let params = params_ref(stmt.params());

    if !has_returning(stmt.text()) {
        let affected = conn.execute(&sql, &params).await?;
        return Ok(ExecResult {
            affected,
            last_id: None,
        });
    }

    let rows = conn.query(&sql, &params).await?;
    let last_id = match rows.first() {
        Some(row) if !row.is_empty() => row
            .try_get::<_, Value>(0)
            .map_err(|e| OrmError::decode(row.columns()[0].name(), e.to_string()))?
            .as_i64(),
        _ => None,
    };
    Ok(ExecResult {
        affected: rows.len() as u64,
        last_id,
    })
}

fn has_returning(text: &str) -> bool {
    text.to_ascii_uppercase().contains(" RETURNING ")
}

/// What [`run`] produced: rows for reads, a count for writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Records(Vec<Record>),
    Exec(ExecResult),
}

impl Output {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Output::Records(records) => records,
            Output::Exec(_) => Vec::new(),
        }
    }

    pub fn exec_result(&self) -> Option<ExecResult> {
        match self {
            Output::Exec(result) => Some(*result),
            Output::Records(_) => None,
        }
    }
}

/// Execute on the process-wide database.
///
/// Reads go to the replica pool when one is configured, everything else to
/// the primary.
#[cfg(feature = "pool")]
pub async fn run(stmt: &Statement) -> OrmResult<Output> {
    let client = crate::pool::database()?.client(stmt.is_read()).await?;
    if stmt.is_read() {
        Ok(Output::Records(fetch_records(stmt, &client).await?))
    } else {
        Ok(Output::Exec(execute(stmt, &client).await?))
    }
}

/// Fetch `T`s from the process-wide database, routed like [`run`].
#[cfg(feature = "pool")]
pub async fn run_as<T: FromRow>(stmt: &Statement) -> OrmResult<Vec<T>> {
    let client = crate::pool::database()?.client(stmt.is_read()).await?;
    fetch_as(stmt, &client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered() {
        let (sql, n) = to_postgres("SELECT * FROM `t` WHERE `a` = %s AND `b` IN (%s, %s) ;");
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE "a" = $1 AND "b" IN ($2, $3) ;"#);
        assert_eq!(n, 3);
    }

    #[test]
    fn literals_are_left_alone() {
        let (sql, n) = to_postgres("SELECT '%s `x` it''s', \"q`\" FROM t WHERE a LIKE %s ;");
        assert_eq!(sql, "SELECT '%s `x` it''s', \"q`\" FROM t WHERE a LIKE $1 ;");
        assert_eq!(n, 1);
    }

    #[test]
    fn escapes_in_identifiers_and_percent() {
        let (sql, n) = to_postgres("SELECT `a``b`, `c\"d` FROM t WHERE x LIKE 'a%%' OR y = 5 %% 2");
        assert_eq!(sql, r#"SELECT "a`b", "c""d" FROM t WHERE x LIKE 'a%%' OR y = 5 % 2"#);
        assert_eq!(n, 0);
    }

    #[test]
    fn placeholder_count_must_match() {
        let stmt = Statement::new("SELECT %s, %s", vec![Value::Int(1)]);
        assert!(matches!(prepare(&stmt), Err(OrmError::InvalidParams(_))));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("SELECT 1", 0), "SELECT 1");
        assert_eq!(truncate("SELECT 1", 6), "SELECT...");
        assert_eq!(truncate("héllo", 2), "h...");
    }

    #[test]
    fn returning_detection() {
        assert!(has_returning("INSERT INTO `t` (`a`) VALUES (%s) RETURNING `id` ;"));
        assert!(!has_returning("UPDATE `t` SET `a` = %s ;"));
    }
}
