//! The compiled form of a template.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::ast;
use crate::types::span::Span;

/// A parsed template together with the components it can invoke.
///
/// Units are immutable once built and are shared between renderers through
/// an [`Arc`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Unit {
    pub source: String,
    pub scope: ast::Scope,
    pub deps: BTreeMap<String, Entry>,
}

/// A named component visible to a unit.
#[derive(Debug, Serialize, Deserialize)]
pub enum Entry {
    /// Another compiled unit.
    Unit(Arc<Unit>),
    /// The unit that owns this entry, used for recursive components.
    Own,
}

impl Unit {
    /// Returns the name of every component invoked in this unit.
    pub fn invocations(&self) -> Vec<ast::Ident> {
        let mut visit = Visit::default();
        visit.scope(&self.scope);
        visit.components
    }

    /// Returns every span in this unit's AST.
    pub fn spans(&self) -> Vec<Span> {
        let mut visit = Visit::default();
        visit.scope(&self.scope);
        visit.spans
    }
}

#[derive(Default)]
struct Visit {
    components: Vec<ast::Ident>,
    spans: Vec<Span>,
}

impl Visit {
    fn scope(&mut self, scope: &ast::Scope) {
        for stmt in &scope.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &ast::Stmt) {
        match stmt {
            ast::Stmt::Raw(span) | ast::Stmt::Children(span) => self.spans.push(*span),

            ast::Stmt::InlineExpr(inline) => {
                self.spans.push(inline.span);
                self.expr(&inline.expr);
            }

            ast::Stmt::IfElse(if_else) => {
                for branch in &if_else.branches {
                    self.expr(&branch.cond);
                    self.scope(&branch.body);
                }
                if let Some(body) = &if_else.else_branch {
                    self.scope(body);
                }
            }

            ast::Stmt::When(when) => {
                self.expr(&when.expr);
                for arm in &when.arms {
                    if let Some(label) = &arm.label {
                        self.spans.push(label.span);
                    }
                    self.scope(&arm.body);
                }
            }

            ast::Stmt::Component(component) => {
                self.components.push(component.name);
                self.spans.push(component.name.span);
                self.spans.push(component.span);
                for attr in &component.attrs {
                    self.spans.push(attr.name.span);
                    match &attr.value {
                        ast::AttrValue::Literal(lit) => self.spans.push(lit.span),
                        ast::AttrValue::Expr(expr) => self.expr(expr),
                        ast::AttrValue::PassThrough(var) => self.var(var),
                    }
                }
                if let Some(children) = &component.children {
                    self.scope(children);
                }
            }

            ast::Stmt::Fill(fill) => {
                self.spans.push(fill.name.span);
                self.scope(&fill.body);
            }

            ast::Stmt::List(list) => {
                self.spans.push(list.span);
                self.var(&list.source);
                self.spans.extend(list.vars.iter().map(|v| v.span));
                self.scope(&list.body);
                if let Some(empty) = &list.empty {
                    self.scope(empty);
                }
            }

            ast::Stmt::Slot(slot) => {
                self.spans.push(slot.name.span);
                self.scope(&slot.default);
            }
        }
    }

    fn expr(&mut self, expr: &ast::Expr) {
        self.spans.push(expr.span);
        self.var(&expr.var);
        for fallback in &expr.fallbacks {
            match fallback {
                ast::Fallback::Var(var) => self.var(var),
                ast::Fallback::Literal(lit) => self.spans.push(lit.span),
            }
        }
    }

    fn var(&mut self, var: &ast::Var) {
        self.spans.push(var.span);
        self.spans.extend(var.path.iter().map(|i| i.span));
    }
}
