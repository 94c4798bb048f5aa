mod core;
mod fmt;
mod scope;
mod value;

use std::io;
use std::sync::Arc;

use serde::Serialize;

use crate::portable::PortableUnit;
use crate::render::core::Evaluator;
use crate::render::fmt::{Formatter, Writer};
use crate::types::unit::Unit;
use crate::{to_value, Error, Result, Value};

/// The default maximum number of nested component invocations.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The maximum number of template bodies being rendered at once, counting
/// every block and component body on the way from the top level.
pub(crate) const MAX_NESTING: usize = 256;

/// A compiled template, ready to render.
///
/// Renderers are immutable and cheap to clone, the compiled unit is shared.
/// A renderer can be used from many threads at the same time.
///
/// # Examples
///
/// ```
/// let renderer = forma::compile(
///     "<p>{{ user.name -> \"stranger\" }}</p>",
///     forma::Dependencies::new(),
///     forma::Options::default(),
/// )?;
/// assert_eq!(renderer.render(forma::value! { user: { name: "Ann" } })?, "<p>Ann</p>");
/// assert_eq!(renderer.render(())?, "<p>stranger</p>");
/// # Ok::<(), forma::Error>(())
/// ```
#[derive(Clone)]
pub struct Renderer {
    unit: Arc<Unit>,
    max_depth: usize,
}

impl Renderer {
    pub(crate) fn new(unit: Arc<Unit>, max_depth: usize) -> Self {
        Self { unit, max_depth }
    }

    pub(crate) fn unit(&self) -> &Arc<Unit> {
        &self.unit
    }

    /// Render using any serializable value as the context.
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: Serialize,
    {
        let ctx = to_value(ctx)?;
        self.render_with_parent(&ctx, &Value::None)
    }

    /// Render using a [`Value`] as the context.
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        self.render_with_parent(ctx, &Value::None)
    }

    /// Render with both a context and a parent context.
    ///
    /// Each entry of a parent map fills the template slot with the same name.
    /// The value is HTML encoded the same way as `{{ name }}`.
    pub fn render_with_parent(&self, ctx: &Value, parent: &Value) -> Result<String> {
        let mut s = String::with_capacity(self.unit.source.len());
        let mut f = Formatter::with_string(&mut s);
        Evaluator::new(self.max_depth).render(&mut f, &self.unit, ctx, parent)?;
        Ok(s)
    }

    /// Render to the given writer.
    pub fn render_to_writer<W>(&self, writer: W, ctx: &Value, parent: &Value) -> Result<()>
    where
        W: io::Write,
    {
        let mut w = Writer::new(writer);
        let mut f = Formatter::with_writer(&mut w);
        Evaluator::new(self.max_depth)
            .render(&mut f, &self.unit, ctx, parent)
            .map_err(|err| w.take_err().map(Error::from).unwrap_or(err))
    }

    /// Returns a renderer sharing the same unit with a different limit on
    /// the number of nested component invocations.
    pub fn with_max_depth(&self, depth: usize) -> Renderer {
        Self::new(self.unit.clone(), depth)
    }

    /// Returns the limit on the number of nested component invocations.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the template source of the top level unit.
    pub fn source(&self) -> &str {
        &self.unit.source
    }

    /// Returns the portable form of the compiled unit.
    pub fn to_portable(&self) -> PortableUnit {
        PortableUnit::new(self.unit.clone())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("deps", &self.unit.deps.keys().collect::<Vec<_>>())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
