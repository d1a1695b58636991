//! Fragment nodes: literals, bound values and glued lists.

use super::PLACEHOLDER;
use super::context::{RenderContext, RenderOptions};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::fmt;

/// A unit of SQL that knows how to render itself into a [`RenderContext`].
///
/// `render` mutates the context in place and hands the same context back so
/// calls can be chained.
pub trait Fragment: fmt::Debug + Send + Sync {
    /// Append this fragment's text and bound values to `ctx`.
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext;

    /// The parenthesization switch, for fragments that have one.
    fn parens_mut(&mut self) -> Option<&mut bool> {
        None
    }
}

/// Raw SQL text with an optional attached parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    text: String,
    params: Option<Vec<Value>>,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: None,
        }
    }

    /// Raw SQL followed by bound values, e.g. `"a = %s OR b = %s"` with two params.
    pub fn with_params<T: Into<Value>>(
        text: impl Into<String>,
        params: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            text: text.into(),
            params: Some(params.into_iter().map(Into::into).collect()),
        }
    }

    /// Build a literal from dynamic values.
    ///
    /// `text` must be `Value::Text` and `params`, when given, must be a
    /// `Value::List`; anything else is a [`OrmError::TypeMismatch`].
    pub fn try_new(text: Value, params: Option<Value>) -> OrmResult<Self> {
        let text = match text {
            Value::Text(text) => text,
            other => {
                return Err(OrmError::type_mismatch(format!(
                    "literal text must be a string, got {other}"
                )));
            }
        };
        let params = match params {
            None => None,
            Some(Value::List(items)) => Some(items),
            Some(other) => {
                return Err(OrmError::type_mismatch(format!(
                    "literal params must be a sequence, got {other}"
                )));
            }
        };
        Ok(Self { text, params })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> Option<&[Value]> {
        self.params.as_deref()
    }
}

impl Fragment for Literal {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal(self.text.as_str());
        if let Some(params) = &self.params {
            ctx.bind(Value::List(params.clone()));
        }
        ctx
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) if !params.is_empty() => {
                write!(f, "SQL({}) % {}", self.text, Value::List(params.clone()))
            }
            _ => write!(f, "SQL({})", self.text),
        }
    }
}

/// A single scalar rendered as a `%s` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    value: Value,
}

impl Param {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Fragment for Param {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.literal(PLACEHOLDER).bind(self.value.clone())
    }
}

/// A child of a [`FragmentList`]: either a fragment node or raw SQL text.
#[derive(Debug)]
pub enum Piece {
    Node(Box<dyn Fragment>),
    Raw(String),
}

impl Piece {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        match self {
            Piece::Node(node) => node.render(ctx),
            Piece::Raw(text) => ctx.literal(text.as_str()),
        }
    }
}

impl<F: Fragment + 'static> From<F> for Piece {
    fn from(node: F) -> Self {
        Piece::Node(Box::new(node))
    }
}

impl From<Box<dyn Fragment>> for Piece {
    fn from(node: Box<dyn Fragment>) -> Self {
        Piece::Node(node)
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Raw(text)
    }
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Raw(text.to_string())
    }
}

/// An ordered composition of fragments joined by a glue string.
#[derive(Debug)]
pub struct FragmentList {
    children: Vec<Piece>,
    glue: String,
    parens: bool,
}

impl FragmentList {
    /// Create a list.
    ///
    /// A parenthesized list with exactly one child switches that child's own
    /// parenthesization off, so `((x))` is never produced.
    pub fn new(mut children: Vec<Piece>, glue: impl Into<String>, parens: bool) -> Self {
        if parens && children.len() == 1 {
            if let Some(Piece::Node(node)) = children.first_mut() {
                if let Some(inner) = node.parens_mut() {
                    *inner = false;
                }
            }
        }
        Self {
            children,
            glue: glue.into(),
            parens,
        }
    }

    /// An empty, unparenthesized list with the given glue.
    pub fn with_glue(glue: impl Into<String>) -> Self {
        Self::new(Vec::new(), glue, false)
    }

    /// Append one child.
    pub fn append(&mut self, child: impl Into<Piece>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Append several children in order.
    pub fn extend<P: Into<Piece>>(&mut self, children: impl IntoIterator<Item = P>) -> &mut Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn glue(&self) -> &str {
        &self.glue
    }

    pub fn parens(&self) -> bool {
        self.parens
    }
}

impl Fragment for FragmentList {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        if self.children.is_empty() {
            return if self.parens { ctx.literal("()") } else { ctx };
        }

        {
            let mut scope = ctx.enter(RenderOptions::new().parens(self.parens));
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    scope.literal(self.glue.as_str());
                }
                child.render(&mut scope);
            }
        }
        ctx
    }

    fn parens_mut(&mut self) -> Option<&mut bool> {
        Some(&mut self.parens)
    }
}
