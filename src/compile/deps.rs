use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::loader::Loader;
use crate::portable::PortableUnit;
use crate::{Renderer, Result, Value};

/// The set of components a template can invoke, keyed by component name.
///
/// # Examples
///
/// ```
/// use forma::{Dependencies, Options};
///
/// let mut deps = Dependencies::new();
/// deps.insert("badge", "<b>{{ label }}</b>");
///
/// let renderer = forma::compile(
///     r#"<component badge label="new" />"#,
///     deps,
///     Options::default(),
/// )?;
/// assert_eq!(renderer.render(())?, "<b>new</b>");
/// # Ok::<(), forma::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    map: BTreeMap<String, Dependency>,
}

/// A single component available to a compiling template.
#[derive(Debug, Clone)]
pub enum Dependency {
    /// Template source text, compiled together with the dependent template.
    ///
    /// Text in the portable format produced by
    /// [`PortableUnit::to_text`][crate::PortableUnit::to_text] is recognized
    /// and loaded instead of being parsed as a template.
    Source(String),

    /// A template that was compiled earlier, reused as is.
    Compiled(Renderer),

    /// A value that is neither a template nor a compiled unit, the name of
    /// its kind is reported when compiling.
    Invalid(&'static str),
}

/// Per compile options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Register the template as its own dependency under the name `self`.
    pub recursive: bool,
}

impl Dependencies {
    /// Construct an empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency, replacing any existing one with the same name.
    pub fn insert<N, D>(&mut self, name: N, dep: D) -> &mut Self
    where
        N: Into<String>,
        D: Into<Dependency>,
    {
        self.map.insert(name.into(), dep.into());
        self
    }

    /// Fetch each named template using the given loader and add it as a
    /// source dependency under its identifier.
    pub fn load<L>(&mut self, loader: &L, names: &[&str]) -> Result<&mut Self>
    where
        L: Loader + ?Sized,
    {
        for name in names {
            let source = loader.load(name)?;
            self.map.insert((*name).to_owned(), Dependency::Source(source));
        }
        Ok(self)
    }

    /// Returns the dependency with the given name.
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.map.get(name)
    }

    /// Returns true if a dependency with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Returns the number of dependencies.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if there are no dependencies.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the dependency names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

impl IntoIterator for Dependencies {
    type Item = (String, Dependency);
    type IntoIter = btree_map::IntoIter<String, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<N, D> FromIterator<(N, D)> for Dependencies
where
    N: Into<String>,
    D: Into<Dependency>,
{
    fn from_iter<T: IntoIterator<Item = (N, D)>>(iter: T) -> Self {
        let mut deps = Self::new();
        deps.extend(iter);
        deps
    }
}

impl<N, D> Extend<(N, D)> for Dependencies
where
    N: Into<String>,
    D: Into<Dependency>,
{
    fn extend<T: IntoIterator<Item = (N, D)>>(&mut self, iter: T) {
        for (name, dep) in iter {
            self.insert(name, dep);
        }
    }
}

impl From<&str> for Dependency {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<String> for Dependency {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<Renderer> for Dependency {
    fn from(renderer: Renderer) -> Self {
        Self::Compiled(renderer)
    }
}

impl From<&Renderer> for Dependency {
    fn from(renderer: &Renderer) -> Self {
        Self::Compiled(renderer.clone())
    }
}

impl From<PortableUnit> for Dependency {
    fn from(unit: PortableUnit) -> Self {
        Self::Compiled(unit.into_renderer())
    }
}

impl From<Value> for Dependency {
    fn from(value: Value) -> Self {
        match value {
            Value::String(source) => Self::Source(source),
            value => Self::Invalid(value.human()),
        }
    }
}
