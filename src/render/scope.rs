//! The data a template body can see while it renders.
//!
//! A body reads its own context (`self`), the local bindings introduced by
//! enclosing lists, the children passed by its caller and the slot overrides
//! registered at the invocation site. All of these live on the Rust stack
//! for the duration of a single render call.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::render::value::field;
use crate::types::ast;
use crate::types::unit::{Entry, Unit};
use crate::value::ValueCow;
use crate::Value;

/// The attributes passed to a component, which become its `self`.
pub type Attrs<'a> = BTreeMap<&'a str, ValueCow<'a>>;

/// The slot registry of a component invocation.
pub type Slots<'a> = BTreeMap<&'a str, SlotFill<'a>>;

/// Everything needed to evaluate a template body.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    /// The unit the body belongs to, used to resolve component names.
    pub env: Lexical<'a>,
    pub this: Context<'a>,
    pub locals: Option<&'a Local<'a>>,
    pub children: Option<&'a Thunk<'a>>,
    pub slots: &'a Slots<'a>,
    /// The number of component invocations between this body and the top
    /// level template.
    pub depth: usize,
}

/// The `self` context of a body.
#[derive(Clone, Copy)]
pub enum Context<'a> {
    /// The value passed to the renderer.
    Value(&'a Value),
    /// The attributes of a component invocation.
    Attrs(&'a Attrs<'a>),
}

/// A unit together with the chain of units it was reached through.
///
/// Component names are looked up in the unit's own dependencies first and
/// then in the dependencies of each enclosing unit in turn.
#[derive(Clone, Copy)]
pub struct Lexical<'a> {
    pub unit: &'a Unit,
    pub outer: Option<&'a Lexical<'a>>,
}

/// A local binding introduced by one iteration of a list.
pub struct Local<'a> {
    pub vars: &'a [ast::Ident],
    pub item: &'a Value,
    pub next: Option<&'a Local<'a>>,
}

/// Template content rendered in its caller's frame, at most once.
pub struct Thunk<'a> {
    pub scope: &'a ast::Scope,
    pub frame: Frame<'a>,
    pub memo: OnceCell<String>,
}

/// An entry in the slot registry.
pub enum SlotFill<'a> {
    /// A `render slot` block from the invocation site.
    Thunk(Thunk<'a>),
    /// A value from the parent context of the top level render, encoded
    /// like an interpolated value.
    Value(&'a Value),
}

impl<'a> Frame<'a> {
    /// The frame for the top level template.
    pub fn root(unit: &'a Unit, this: &'a Value, slots: &'a Slots<'a>) -> Self {
        Self {
            env: Lexical { unit, outer: None },
            this: Context::Value(this),
            locals: None,
            children: None,
            slots,
            depth: 0,
        }
    }

    /// The template source the body was parsed from.
    pub fn source(&self) -> &'a str {
        &self.env.unit.source
    }

    /// The same frame with an additional local binding.
    pub fn with_local<'b>(&self, local: &'b Local<'b>) -> Frame<'b>
    where
        'a: 'b,
    {
        Frame {
            env: self.env,
            this: self.this,
            locals: Some(local),
            children: self.children,
            slots: self.slots,
            depth: self.depth,
        }
    }

    /// Looks up a name in the local bindings, innermost first.
    pub fn local(&self, name: &str) -> Option<&'a Value> {
        let source = self.source();
        let mut next = self.locals;
        while let Some(local) = next {
            match local.vars {
                [var] if &source[var.span] == name => return Some(local.item),
                vars if vars.len() > 1 && vars.iter().any(|v| &source[v.span] == name) => {
                    return Some(field(local.item, name));
                }
                _ => next = local.next,
            }
        }
        None
    }
}

impl<'a> Context<'a> {
    /// Looks up a top level name.
    pub fn get(&self, name: &str) -> Option<ValueCow<'a>> {
        match *self {
            Context::Value(value) => crate::value::get(value, name).map(ValueCow::Borrowed),
            Context::Attrs(attrs) => attrs.get(name).map(|v| ValueCow::Borrowed(&**v)),
        }
    }
}

impl<'a> Lexical<'a> {
    /// Finds the unit a component name refers to.
    pub fn resolve(&'a self, name: &str) -> Option<Lexical<'a>> {
        let mut level = self;
        loop {
            match level.unit.deps.get(name) {
                Some(Entry::Unit(unit)) => {
                    return Some(Lexical {
                        unit,
                        outer: Some(level),
                    })
                }
                Some(Entry::Own) => return Some(*level),
                None => level = level.outer?,
            }
        }
    }
}

impl<'a> Thunk<'a> {
    pub fn new(scope: &'a ast::Scope, frame: Frame<'a>) -> Self {
        Self {
            scope,
            frame,
            memo: OnceCell::new(),
        }
    }
}
