//! Composable SQL fragments.
//!
//! A statement is built as a tree of [`Fragment`] nodes (raw [`Literal`]s,
//! bound [`Param`]s, nested [`FragmentList`]s) and flattened in one pass by a
//! [`RenderContext`] into SQL text with `%s` placeholders plus the ordered
//! list of bound values.
//!
//! # Example
//!
//! ```
//! use sqlnode::sql::{self, FragmentList, literal, param};
//!
//! let mut q = FragmentList::with_glue(" ");
//! q.append(literal("SELECT * FROM t WHERE id =")).append(param(5));
//!
//! let stmt = sql::render(&q);
//! assert_eq!(stmt.text(), "SELECT * FROM t WHERE id = %s ;");
//! assert_eq!(stmt.params(), &[sqlnode::Value::Int(5)]);
//! ```

mod context;
mod node;
mod statement;

#[cfg(test)]
mod tests;

pub use context::{Converter, RenderContext, RenderOptions, Renderable, Scope};
pub use node::{Fragment, FragmentList, Literal, Param, Piece};
pub use statement::Statement;

use crate::value::Value;

/// Positional placeholder token; the driver substitutes bound values for it.
pub const PLACEHOLDER: &str = "%s";

/// Statement terminator appended by [`RenderContext::finalize`].
pub const TERMINATOR: &str = ";";

/// Render a fragment tree and keep the live context for further composition.
pub fn render_ctx(node: &dyn Fragment) -> RenderContext {
    let mut ctx = RenderContext::new();
    node.render(&mut ctx);
    ctx
}

/// Render a fragment tree and finalize it into a statement.
pub fn render(node: &dyn Fragment) -> Statement {
    render_ctx(node).finalize()
}

/// A raw SQL literal without parameters.
pub fn literal(text: impl Into<String>) -> Literal {
    Literal::new(text)
}

/// A single bound value rendered as a placeholder.
pub fn param(value: impl Into<Value>) -> Param {
    Param::new(value)
}

/// A `", "`-glued list, e.g. for argument lists.
pub fn comma<P: Into<Piece>>(children: impl IntoIterator<Item = P>) -> FragmentList {
    FragmentList::new(children.into_iter().map(Into::into).collect(), ", ", false)
}

/// A `", "`-glued, parenthesized list, e.g. for value tuples or subqueries.
pub fn enclosed<P: Into<Piece>>(children: impl IntoIterator<Item = P>) -> FragmentList {
    FragmentList::new(children.into_iter().map(Into::into).collect(), ", ", true)
}
