//! A compiler and renderer for HTML-like component templates.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Expressions: `{{ user.name }}`, unencoded `{{! html }}`
//! - Fallbacks: `{{ user.nickname -> user.name -> "friend" }}`
//! - Conditionals: `<if condition={{ user.admin }}> ... <else> ... </if>`
//! - Switches: `<when value-of={{ count }}><case is="1"> ... </case></when>`
//! - Lists: `<list users as="name, age"> ... <empty> ... </empty></list>`
//! - Components: `<component card title="Hi" ~user> ... </component>`
//! - Recursive components through the reserved `self` name
//! - Slots: `<slot header> ... </slot>` and `<render slot="header"> ... </render>`
//!
//! ### Renderer
//!
//! - Compiled templates are immutable, cheap to clone and thread safe
//! - Render using any [`serde`] serializable value
//! - Lazily evaluated context values with [`Value::producer`]
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//! - A portable text form for compiled templates, see [`PortableUnit`]
//!
//! # Getting started
//!
//! Templates are compiled with [`compile`] together with the components they
//! use, which returns a [`Renderer`].
//!
//! ```
//! use forma::{Dependencies, Options};
//!
//! let mut deps = Dependencies::new();
//! deps.insert("greeting", "<h1>Hello {{ name }}!</h1>");
//!
//! let renderer = forma::compile(
//!     "<component greeting ~name />",
//!     deps,
//!     Options::default(),
//! )?;
//!
//! let result = renderer.render(forma::value! { name: "John Smith" })?;
//! assert_eq!(result, "<h1>Hello John Smith!</h1>");
//! # Ok::<(), forma::Error>(())
//! ```
//!
//! Values are HTML encoded by default, which replaces `<` and `>`. Use the
//! `!` modifier to emit a value as is.
//!
//! ```
//! # use forma::{Dependencies, Options};
//! let renderer = forma::compile("{{ html }} {{! html }}", Dependencies::new(), Options::default())?;
//! let result = renderer.render(forma::value! { html: "<br>" })?;
//! assert_eq!(result, "&lt;br&gt; <br>");
//! # Ok::<(), forma::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render a tree with a recursive component
//!
//! ```
//! use forma::{Dependencies, Options};
//!
//! let template = r#"<li>{{ name }}<list children as="child"><ul><component self name={{ :child.name }} children={ :child.children } /></ul></list></li>"#;
//! let renderer = forma::compile(template, Dependencies::new(), Options { recursive: true })?;
//!
//! let result = renderer.render(forma::value! {
//!     name: "root",
//!     children: [{ name: "leaf", children: [] }],
//! })?;
//! assert_eq!(result, "<li>root<ul><li>leaf</li></ul></li>");
//! # Ok::<(), forma::Error>(())
//! ```
//!
//! ### Render a template to an `impl io::Write`
//!
//! ```
//! use std::io;
//! use forma::{Dependencies, Options, Value};
//!
//! let stdout = io::BufWriter::new(io::stdout());
//!
//! forma::compile("Hello {{ user.name }}", Dependencies::new(), Options::default())?
//!     .render_to_writer(stdout, &forma::value! { user: { name: "John Smith" } }, &Value::None)?;
//! # Ok::<(), forma::Error>(())
//! ```
//!
//! # Logging
//!
//! With the `tracing` feature enabled compiling and rendering emit
//! [`tracing`](https://docs.rs/tracing) events at the `debug` and `trace`
//! levels.

#[macro_use]
mod tracing_macros;

mod compile;
mod error;
mod loader;
mod macros;
mod portable;
mod render;
mod types;
mod value;

pub use crate::compile::{Dependencies, Dependency, Options, DEFAULT_MAX_NESTING};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::loader::{FileLoader, Loader};
pub use crate::portable::PortableUnit;
pub use crate::render::{Renderer, DEFAULT_MAX_DEPTH};
pub use crate::types::grammar::{Grammar, Rule};
pub use crate::value::{to_value, BoxError, List, Map, Producer, Value};

use std::sync::Arc;

/// Compiles templates using a shared configuration.
///
/// The free functions [`compile`] and [`compile_to_portable`] use a default
/// compiler. Construct one explicitly to change the settings that apply to
/// every renderer it produces.
///
/// # Examples
///
/// ```
/// use forma::{Compiler, Dependencies, Options};
///
/// let mut compiler = Compiler::new();
/// compiler.set_max_depth(16);
/// compiler.set_max_nesting(1);
///
/// let renderer = compiler.compile(
///     "<if condition={{ a }}><if condition={{ b }}>!",
///     Dependencies::new(),
///     Options::default(),
/// )?;
/// assert_eq!(renderer.max_depth(), 16);
/// assert_eq!(
///     renderer.render(forma::value! { a: true })?,
///     "<if condition={{ b }}>!"
/// );
/// # Ok::<(), forma::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    grammar: Grammar,
    max_depth: usize,
    max_nesting: usize,
}

impl Default for Compiler {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Construct a new compiler.
    #[inline]
    pub fn new() -> Self {
        Self {
            grammar: Grammar::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Set the maximum number of nested component invocations for renderers
    /// produced by this compiler.
    ///
    /// Defaults to 64.
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Set the maximum number of blocks that can be open at once while
    /// parsing. A tag that would open a block past the limit is kept as
    /// literal text.
    ///
    /// Defaults to 64.
    #[inline]
    pub fn set_max_nesting(&mut self, nesting: usize) {
        self.max_nesting = nesting;
    }

    /// Returns the rule table used to recognize template constructs.
    #[inline]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Compile a template and its dependencies into a renderer.
    ///
    /// Every raw dependency is compiled exactly once. Fails if a dependency
    /// is not a template or if a component tag names an unknown component.
    pub fn compile(
        &self,
        source: &str,
        deps: Dependencies,
        options: Options,
    ) -> Result<Renderer> {
        let unit = compile::unit(&self.grammar, self.max_nesting, source, deps, options)?;
        Ok(Renderer::new(Arc::new(unit), self.max_depth))
    }

    /// Compile a template and its dependencies into the portable form.
    pub fn compile_to_portable(
        &self,
        source: &str,
        deps: Dependencies,
        options: Options,
    ) -> Result<PortableUnit> {
        let unit = compile::unit(&self.grammar, self.max_nesting, source, deps, options)?;
        Ok(PortableUnit::new(Arc::new(unit)))
    }
}

/// Compile a template using a default [`Compiler`].
pub fn compile(source: &str, deps: Dependencies, options: Options) -> Result<Renderer> {
    Compiler::new().compile(source, deps, options)
}

/// Compile a template into the portable form using a default [`Compiler`].
pub fn compile_to_portable(
    source: &str,
    deps: Dependencies,
    options: Options,
) -> Result<PortableUnit> {
    Compiler::new().compile_to_portable(source, deps, options)
}
