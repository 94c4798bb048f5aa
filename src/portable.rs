//! A text form of a compiled unit that can be stored and loaded again
//! without recompiling.
//!
//! The text form is a single header line followed by the unit encoded as
//! JSON. The header lets a dependency given as plain text be recognized as
//! precompiled.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::render::DEFAULT_MAX_DEPTH;
use crate::types::unit::{Entry, Unit};
use crate::{Error, Renderer, Result};

/// The first line of the text form.
pub(crate) const HEADER: &str = "forma-unit/1\n";

/// The deepest nesting of JSON arrays and objects a decoded unit may have.
const MAX_JSON_DEPTH: usize = 512;

/// A serializable compiled unit, including all of its dependencies.
///
/// # Examples
///
/// ```
/// use forma::{Dependencies, Options, PortableUnit};
///
/// let unit = forma::compile_to_portable("<b>{{ x }}</b>", Dependencies::new(), Options::default())?;
/// let text = unit.to_text();
///
/// let renderer = PortableUnit::from_text(&text)?.into_renderer();
/// assert_eq!(renderer.render(forma::value! { x: 1 })?, "<b>1</b>");
/// # Ok::<(), forma::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortableUnit {
    unit: Arc<Unit>,
}

impl PortableUnit {
    pub(crate) fn new(unit: Arc<Unit>) -> Self {
        Self { unit }
    }

    pub(crate) fn into_unit(self) -> Arc<Unit> {
        self.unit
    }

    /// Returns true if the text starts with the portable header.
    pub fn is_portable(text: &str) -> bool {
        text.starts_with(HEADER)
    }

    /// Encode the unit as text.
    pub fn to_text(&self) -> String {
        let mut text = String::from(HEADER);
        // Serializing the AST into a string cannot fail, every map is keyed
        // by strings.
        if let Ok(json) = serde_json::to_string(&self.unit) {
            text.push_str(&json);
        }
        text
    }

    /// Decode a unit from its text form.
    pub fn from_text(text: &str) -> Result<Self> {
        let json = text.strip_prefix(HEADER).ok_or_else(|| {
            Error::dependency("invalid precompiled template: missing `forma-unit/1` header")
        })?;
        let depth = json_depth(json);
        if depth > MAX_JSON_DEPTH {
            return Err(Error::dependency(format!(
                "invalid precompiled template: nesting depth {depth} exceeds {MAX_JSON_DEPTH}"
            )));
        }
        let unit = decode(json)
            .map_err(|err| Error::dependency(format!("invalid precompiled template: {err}")))?;
        validate(&unit)?;
        Ok(Self::new(Arc::new(unit)))
    }

    /// Turn the unit into a renderer with the default depth limit.
    pub fn into_renderer(self) -> Renderer {
        Renderer::new(self.unit, DEFAULT_MAX_DEPTH)
    }
}

/// Decodes the JSON of a unit without the recursion limit of the
/// deserializer, the nesting depth is checked beforehand.
fn decode(json: &str) -> serde_json::Result<Unit> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let unit = Unit::deserialize(&mut de)?;
    de.end()?;
    Ok(unit)
}

/// Returns the deepest nesting of arrays and objects in JSON text, brackets
/// within strings are skipped.
fn json_depth(json: &str) -> usize {
    let (mut depth, mut max, mut in_str, mut escaped) = (0usize, 0, false, false);
    for b in json.bytes() {
        if in_str {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_str = true,
            b'[' | b'{' => {
                depth += 1;
                max = max.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Checks that every span in a decoded unit lies within its source.
fn validate(unit: &Unit) -> Result<()> {
    let source = &unit.source;
    let bad = unit
        .spans()
        .into_iter()
        .find(|span| span.m > span.n || source.get(span.m..span.n).is_none());
    if let Some(span) = bad {
        return Err(Error::dependency(format!(
            "invalid precompiled template: span {}..{} is out of bounds",
            span.m, span.n
        )));
    }
    for entry in unit.deps.values() {
        if let Entry::Unit(dep) = entry {
            validate(dep)?;
        }
    }
    Ok(())
}

impl fmt::Display for PortableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for PortableUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl From<PortableUnit> for Renderer {
    fn from(unit: PortableUnit) -> Self {
        unit.into_renderer()
    }
}
