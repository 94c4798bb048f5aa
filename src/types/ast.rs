//! AST representing a template.
//!
//! Every node refers back into the template source through [`Span`]s, so an
//! AST is only meaningful together with the source it was parsed from. The
//! whole tree is serializable which is what makes a compiled unit portable.

use serde::{Deserialize, Serialize};

use crate::types::span::Span;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Scope {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Stmt {
    /// Literal template text, emitted verbatim.
    Raw(Span),
    /// `{{ expr }}`
    InlineExpr(InlineExpr),
    /// `{{@ children }}`
    Children(Span),
    IfElse(IfElse),
    When(When),
    Component(Component),
    List(List),
    Slot(Slot),
    /// `<render slot="..">`, only kept inside the children of a component
    /// where it either sits directly or within `if` and `when` bodies.
    Fill(SlotFill),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InlineExpr {
    pub expr: Expr,
    pub span: Span,
}

/// An expression with its modifiers and fallback chain, e.g.
/// `!:user.name -> alias -> "friend"`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Expr {
    /// The `!` modifier, disables HTML encoding.
    pub raw: bool,
    /// The `&` modifier or the single brace form, passes the value through
    /// without stringifying it.
    pub by_ref: bool,
    pub var: Var,
    pub fallbacks: Vec<Fallback>,
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Fallback {
    Var(Var),
    Literal(Literal),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Var {
    /// The `:` modifier, resolves against local bindings instead of self.
    pub local: bool,
    pub path: Vec<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ident {
    pub span: Span,
}

/// A quoted literal with escapes already processed.
#[derive(Debug, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IfElse {
    pub branches: Vec<Branch>,
    pub else_branch: Option<Scope>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Branch {
    pub not: bool,
    pub cond: Expr,
    pub body: Scope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct When {
    pub expr: Expr,
    pub arms: Vec<Arm>,
}

/// A `case` arm, or the `default` arm when there is no label.
#[derive(Debug, Serialize, Deserialize)]
pub struct Arm {
    pub label: Option<Literal>,
    pub body: Scope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Component {
    pub name: Ident,
    pub attrs: Vec<Attr>,
    /// The content between the tags, `None` when self-closing.
    pub children: Option<Scope>,
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Attr {
    pub name: Ident,
    pub value: AttrValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum AttrValue {
    /// `name="text"`
    Literal(Literal),
    /// `name={{ expr }}`, `name={expr}` or `name="{expr}"`
    Expr(Expr),
    /// `~path` or a bare `name`
    PassThrough(Var),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotFill {
    pub name: Ident,
    pub body: Scope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct List {
    pub reverse: bool,
    pub source: Var,
    pub vars: Vec<Ident>,
    pub body: Scope,
    pub empty: Option<Scope>,
    pub span: Span,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Slot {
    pub name: Ident,
    pub default: Scope,
}

impl Scope {
    pub const fn new() -> Self {
        Self { stmts: Vec::new() }
    }
}
