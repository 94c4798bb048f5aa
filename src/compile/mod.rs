//! Compile a template and its dependencies into a unit that can be rendered.
//!
//! This process has three stages:
//! - The lexer chunks the template source into tokens using the grammar.
//! - The parser constructs an AST from the token stream.
//! - The dependency resolver compiles every raw dependency exactly once and
//!   checks that each component tag names a known component.

mod deps;
mod lex;
mod parse;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use crate::compile::deps::{Dependencies, Dependency, Options};
use crate::portable::PortableUnit;
use crate::types::grammar::Grammar;
use crate::types::unit::{Entry, Unit};
use crate::{Error, Result};

/// The name under which a recursive template is registered as its own
/// dependency.
pub const SELF: &str = "self";

/// The default maximum number of blocks that can be open at once while
/// parsing.
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Compile a template together with its dependencies.
pub fn unit(
    grammar: &Grammar,
    max_nesting: usize,
    source: &str,
    deps: Dependencies,
    options: Options,
) -> Result<Unit> {
    debug!(
        deps = ?deps.names().collect::<Vec<_>>(),
        recursive = options.recursive,
        "compiling template"
    );

    let mut entries = BTreeMap::new();
    let mut raw = Vec::new();
    for (name, dep) in deps {
        let entry = match dep {
            Dependency::Source(text) if PortableUnit::is_portable(&text) => {
                trace!(dependency = %name, "loading precompiled dependency");
                let unit = PortableUnit::from_text(&text).map_err(|err| {
                    Error::dependency(format!(
                        "invalid template for dependency `{name}`: {}",
                        err.message()
                    ))
                })?;
                Entry::Unit(unit.into_unit())
            }
            Dependency::Source(text) => {
                trace!(dependency = %name, "compiling raw dependency");
                raw.push(name.clone());
                Entry::Unit(Arc::new(parse_unit(grammar, max_nesting, text)))
            }
            Dependency::Compiled(renderer) => {
                trace!(dependency = %name, "reusing compiled dependency");
                Entry::Unit(renderer.unit().clone())
            }
            Dependency::Invalid(kind) => {
                return Err(Error::dependency(format!(
                    "invalid template type for dependency `{name}`: expected a raw or \
                     precompiled template, found {kind}"
                )));
            }
        };
        entries.insert(name, entry);
    }
    if options.recursive {
        entries.insert(SELF.to_owned(), Entry::Own);
    }

    let mut unit = parse_unit(grammar, max_nesting, source.to_owned());
    unit.deps = entries;

    // Raw dependencies have no dependencies of their own, their component
    // names resolve against the set given to this compile.
    check_names(&unit, &unit.deps)?;
    for name in &raw {
        if let Some(Entry::Unit(dep)) = unit.deps.get(name) {
            check_names(dep, &unit.deps)?;
        }
    }

    debug!(stmts = unit.scope.stmts.len(), "compiled template");
    Ok(unit)
}

/// Parse a template source into a unit without dependencies.
fn parse_unit(grammar: &Grammar, max_nesting: usize, source: String) -> Unit {
    let scope = parse::Parser::new(grammar, &source, max_nesting).parse_template();
    Unit {
        source,
        scope,
        deps: BTreeMap::new(),
    }
}

/// Checks that every component invoked in `unit` is in `visible`.
fn check_names(unit: &Unit, visible: &BTreeMap<String, Entry>) -> Result<()> {
    for ident in unit.invocations() {
        let name = &unit.source.as_str()[ident.span];
        if !visible.contains_key(name) {
            return Err(Error::dependency_at(
                format!("unknown component `{name}`"),
                &unit.source,
                ident.span,
            ));
        }
    }
    Ok(())
}
