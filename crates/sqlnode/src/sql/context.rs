//! The rendering engine.

use super::node::Fragment;
use super::statement::Statement;
use super::{PLACEHOLDER, TERMINATOR};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Transform applied to every bound value inside a scope.
pub type Converter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Options of one rendering scope.
///
/// Options are never inherited: a nested scope starts from whatever it is
/// given and must re-specify anything it needs.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Wrap the scope in `(` `)`.
    pub parens: bool,
    /// Emit a `%s` placeholder for every bound value.
    pub params: bool,
    /// Bind lists as one parameter instead of flattening them.
    pub nesting: bool,
    /// Applied to each bound value (each element, for lists).
    pub converter: Option<Converter>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parens(mut self, on: bool) -> Self {
        self.parens = on;
        self
    }

    pub fn params(mut self, on: bool) -> Self {
        self.params = on;
        self
    }

    pub fn nesting(mut self, on: bool) -> Self {
        self.nesting = on;
        self
    }

    pub fn converter(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.converter = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("parens", &self.parens)
            .field("params", &self.params)
            .field("nesting", &self.nesting)
            .field("converter", &self.converter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Something [`RenderContext::render_any`] can consume: a fragment node or a raw value.
pub enum Renderable<'n> {
    Fragment(&'n dyn Fragment),
    Value(Value),
}

impl<'n, F: Fragment> From<&'n F> for Renderable<'n> {
    fn from(node: &'n F) -> Self {
        Renderable::Fragment(node)
    }
}

impl<'n> From<&'n dyn Fragment> for Renderable<'n> {
    fn from(node: &'n dyn Fragment) -> Self {
        Renderable::Fragment(node)
    }
}

impl From<Value> for Renderable<'_> {
    fn from(value: Value) -> Self {
        Renderable::Value(value)
    }
}

/// Walks a fragment tree and accumulates SQL text and bound values.
///
/// A context belongs to exactly one statement build. It is consumed by
/// [`finalize`](Self::finalize), so a finalized context cannot be finalized
/// (or rendered into) again.
#[derive(Debug, Default)]
pub struct RenderContext {
    text: Vec<String>,
    values: Vec<Value>,
    sources: Vec<String>,
    stack: Vec<RenderOptions>,
    options: RenderOptions,
    scratch: HashMap<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose root scope uses `options`.
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options of the current scope.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Open a nested scope.
    ///
    /// The returned guard derefs to the context; dropping it closes the
    /// scope (emitting `)` when `options.parens` is set and restoring the
    /// parent options), also when the body bails out early or panics.
    pub fn enter(&mut self, options: RenderOptions) -> Scope<'_> {
        let parens = options.parens;
        let parent = std::mem::replace(&mut self.options, options);
        self.stack.push(parent);
        if parens {
            self.literal("(");
        }
        Scope { ctx: self }
    }

    fn exit(&mut self) {
        if self.options.parens {
            self.literal(")");
        }
        if let Some(parent) = self.stack.pop() {
            self.options = parent;
        }
    }

    /// Append raw SQL text.
    pub fn literal(&mut self, text: impl Into<String>) -> &mut Self {
        self.text.push(text.into());
        self
    }

    /// Bind a value.
    ///
    /// Applies the scope's converter, emits a placeholder when the `params`
    /// option is on, and flattens lists unless `nesting` is on.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        let mut value = value.into();
        if let Some(convert) = &self.options.converter {
            if !value.is_null() {
                value = match value {
                    Value::List(items) => {
                        Value::List(items.into_iter().map(|v| (**convert)(v)).collect())
                    }
                    scalar => (**convert)(scalar),
                };
            }
        }

        if self.options.params {
            self.literal(PLACEHOLDER);
        }

        match value {
            Value::List(items) if !self.options.nesting => self.values.extend(items),
            value => self.values.push(value),
        }
        self
    }

    /// Render a fragment node.
    pub fn sql(&mut self, node: &dyn Fragment) -> &mut Self {
        node.render(self)
    }

    /// Render a fragment node, or bind a raw value.
    pub fn render_any<'n>(&mut self, item: impl Into<Renderable<'n>>) -> &mut Self {
        match item.into() {
            Renderable::Fragment(node) => node.render(self),
            Renderable::Value(value) => self.bind(value),
        }
    }

    /// Stable alias for a source (table) name: `` `t<N>` `` where `N` is the
    /// 1-based position at which the source was first seen.
    pub fn alias_for(&mut self, source: &str) -> String {
        let position = match self.sources.iter().position(|s| s == source) {
            Some(position) => position,
            None => {
                self.sources.push(source.to_string());
                self.sources.len() - 1
            }
        };
        format!("`t{}`", position + 1)
    }

    /// Source names in first-seen order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn scratch(&self, key: &str) -> Option<&Value> {
        self.scratch.get(key)
    }

    pub fn set_scratch(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.scratch.insert(key.into(), value.into());
        self
    }

    pub fn remove_scratch(&mut self, key: &str) -> Option<Value> {
        self.scratch.remove(key)
    }

    /// Text emitted so far, concatenated.
    pub fn text(&self) -> String {
        self.text.concat()
    }

    /// Values bound so far.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Terminate the statement and produce the finalized result.
    pub fn finalize(mut self) -> Statement {
        debug_assert!(self.stack.is_empty(), "unbalanced render scopes");
        let terminated = self
            .text
            .last()
            .is_some_and(|last| last.trim() == TERMINATOR);
        if !terminated {
            self.literal(format!(" {TERMINATOR}"));
        }
        Statement::new(self.text.concat(), self.values)
    }
}

/// Splices another context's text and values into this one.
impl Fragment for RenderContext {
    fn render<'c>(&self, ctx: &'c mut RenderContext) -> &'c mut RenderContext {
        ctx.text.extend(self.text.iter().cloned());
        ctx.values.extend(self.values.iter().cloned());
        ctx
    }
}

/// An open rendering scope; closes on drop.
#[derive(Debug)]
pub struct Scope<'c> {
    ctx: &'c mut RenderContext,
}

impl Deref for Scope<'_> {
    type Target = RenderContext;

    fn deref(&self) -> &RenderContext {
        self.ctx
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut RenderContext {
        self.ctx
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.ctx.exit();
    }
}
