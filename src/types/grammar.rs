//! The rule table that defines every construct the template language
//! recognizes.
//!
//! Each [`Rule`] pairs a literal marker, the text a construct must start with,
//! with the lexer routine that matches the rest of it. The lexer tries the
//! rules in table order at every candidate position and the first rule that
//! matches wins. Text that no rule matches is literal output.

use std::fmt;

/// The lexer routine a rule dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Children,
    InlineExpr,
    If,
    ElseIf,
    Else,
    EndIf,
    Component,
    EndComponent,
    List,
    ReverseList,
    Empty,
    EndEmpty,
    EndList,
    EndReverseList,
    Slot,
    EndSlot,
    Render,
    EndRender,
    When,
    EndWhen,
    Case,
    Default,
    EndCase,
    EndDefault,
}

/// A single named entry in the [`Grammar`].
#[derive(Clone, Copy)]
pub struct Rule {
    name: &'static str,
    marker: &'static str,
    kind: Kind,
}

/// An ordered, immutable table of [`Rule`]s.
///
/// The table is owned by a [`Compiler`][crate::Compiler] and never changes
/// after construction so it can be shared freely between threads.
#[derive(Clone)]
pub struct Grammar {
    rules: Box<[Rule]>,
}

const fn rule(name: &'static str, marker: &'static str, kind: Kind) -> Rule {
    Rule { name, marker, kind }
}

const RULES: &[Rule] = &[
    rule("children", "{{", Kind::Children),
    rule("variable", "{{", Kind::InlineExpr),
    rule("if", "<if", Kind::If),
    rule("else-if", "<else-if", Kind::ElseIf),
    rule("else", "<else>", Kind::Else),
    rule("end-if", "</if>", Kind::EndIf),
    rule("component", "<component", Kind::Component),
    rule("end-component", "</component>", Kind::EndComponent),
    rule("list", "<list", Kind::List),
    rule("reverse-list", "<reverse-list", Kind::ReverseList),
    rule("empty", "<empty>", Kind::Empty),
    rule("end-empty", "</empty>", Kind::EndEmpty),
    rule("end-list", "</list>", Kind::EndList),
    rule("end-reverse-list", "</reverse-list>", Kind::EndReverseList),
    rule("slot", "<slot", Kind::Slot),
    rule("end-slot", "</slot>", Kind::EndSlot),
    rule("render", "<render", Kind::Render),
    rule("end-render", "</render>", Kind::EndRender),
    rule("when", "<when", Kind::When),
    rule("end-when", "</when>", Kind::EndWhen),
    rule("case", "<case", Kind::Case),
    rule("default", "<default>", Kind::Default),
    rule("end-case", "</case>", Kind::EndCase),
    rule("end-default", "</default>", Kind::EndDefault),
];

impl Rule {
    /// The name of the rule, e.g. `else-if`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The literal text the construct must begin with.
    pub fn marker(&self) -> &'static str {
        self.marker
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("marker", &self.marker)
            .finish()
    }
}

impl Grammar {
    /// Returns the rules in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the rule with the given name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Returns the rules, in priority order, whose marker starts `text`.
    pub(crate) fn candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| text.starts_with(r.marker))
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            rules: RULES.into(),
        }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name))
            .finish()
    }
}
