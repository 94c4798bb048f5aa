use std::cell::Cell;
use std::fmt::Write;

use crate::render::fmt::Formatter;
use crate::render::scope::{Attrs, Context, Frame, Local, SlotFill, Slots, Thunk};
use crate::render::value::{call, case_matches, follow, to_text, truthy, NONE};
use crate::render::MAX_NESTING;
use crate::types::ast;
use crate::types::unit::Unit;
use crate::value::ValueCow;
use crate::{Error, Result, Value};

/// Walks the AST of a unit and writes its output to a formatter.
///
/// Everything a body can see is passed down in a [`Frame`]. The evaluator
/// only tracks how many scopes are being rendered, across component bodies
/// and thunks alike.
pub struct Evaluator {
    max_depth: usize,
    nesting: Cell<usize>,
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            nesting: Cell::new(0),
        }
    }

    /// Render a top level unit.
    ///
    /// Every entry of a `parent` map fills the slot with the same name.
    pub fn render(
        &self,
        f: &mut Formatter<'_>,
        unit: &Unit,
        this: &Value,
        parent: &Value,
    ) -> Result<()> {
        let slots: Slots<'_> = match parent {
            Value::Map(map) => map
                .iter()
                .map(|(name, value)| (name.as_str(), SlotFill::Value(value)))
                .collect(),
            _ => Slots::new(),
        };
        let frame = Frame::root(unit, this, &slots);
        self.render_scope(f, &frame, &unit.scope)
    }

    fn render_scope<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        scope: &'a ast::Scope,
    ) -> Result<()> {
        let level = self.nesting.get();
        if level >= MAX_NESTING {
            debug!(max_nesting = MAX_NESTING, "render nesting limit reached");
            return Err(Error::max_nesting(MAX_NESTING));
        }
        self.nesting.set(level + 1);
        let result = self.render_stmts(f, frame, scope);
        self.nesting.set(level);
        result
    }

    fn render_stmts<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        scope: &'a ast::Scope,
    ) -> Result<()> {
        let source = frame.source();
        for stmt in &scope.stmts {
            match stmt {
                ast::Stmt::Raw(span) => f.write_str(&source[*span])?,

                ast::Stmt::InlineExpr(ast::InlineExpr { expr, span }) => {
                    let value = self.eval_expr(frame, expr)?;
                    f.write_str(&to_text(&value, expr.raw, source, *span)?)?;
                }

                ast::Stmt::Children(_) => {
                    if let Some(children) = frame.children {
                        f.write_str(self.force(children)?)?;
                    }
                }

                ast::Stmt::IfElse(if_else) => self.render_if_else(f, frame, if_else)?,
                ast::Stmt::When(when) => self.render_when(f, frame, when)?,
                ast::Stmt::Component(component) => self.render_component(f, frame, component)?,
                ast::Stmt::List(list) => self.render_list(f, frame, list)?,
                ast::Stmt::Slot(slot) => self.render_slot(f, frame, slot)?,

                // Registered when the component is invoked.
                ast::Stmt::Fill(_) => {}
            }
        }
        Ok(())
    }

    fn render_if_else<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        if_else: &'a ast::IfElse,
    ) -> Result<()> {
        match self.active_branch(frame, if_else)? {
            Some(body) => self.render_scope(f, frame, body),
            None => Ok(()),
        }
    }

    fn render_when<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        when: &'a ast::When,
    ) -> Result<()> {
        match self.active_arm(frame, when)? {
            Some(body) => self.render_scope(f, frame, body),
            None => Ok(()),
        }
    }

    /// Returns the body of the first branch whose condition holds, or the
    /// `else` body.
    fn active_branch<'a>(
        &self,
        frame: &Frame<'a>,
        if_else: &'a ast::IfElse,
    ) -> Result<Option<&'a ast::Scope>> {
        for branch in &if_else.branches {
            let cond = self.eval_expr(frame, &branch.cond)?;
            if truthy(&cond) != branch.not {
                return Ok(Some(&branch.body));
            }
        }
        Ok(if_else.else_branch.as_ref())
    }

    /// Returns the body of the matching `case`, or the `default` body.
    fn active_arm<'a>(
        &self,
        frame: &Frame<'a>,
        when: &'a ast::When,
    ) -> Result<Option<&'a ast::Scope>> {
        let value = self.eval_expr(frame, &when.expr)?;
        let arm = when
            .arms
            .iter()
            .find(|arm| matches!(&arm.label, Some(label) if case_matches(&value, &label.value)))
            .or_else(|| when.arms.iter().find(|arm| arm.label.is_none()));
        Ok(arm.map(|arm| &arm.body))
    }

    fn render_component<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        component: &'a ast::Component,
    ) -> Result<()> {
        let source = frame.source();
        let name = &source[component.name.span];

        // Names are checked when compiling, this only fails for a portable
        // unit that was edited by hand.
        let env = frame.env.resolve(name).ok_or_else(|| {
            Error::render(
                format!("unknown component `{name}`"),
                source,
                component.name.span,
            )
        })?;

        if frame.depth >= self.max_depth {
            debug!(
                component = name,
                max_depth = self.max_depth,
                "component depth limit reached"
            );
            return Err(Error::max_depth(self.max_depth, source, component.span));
        }

        let attrs = self.eval_attrs(frame, &component.attrs)?;
        let children = component
            .children
            .as_ref()
            .map(|scope| Thunk::new(scope, *frame));
        let mut slots = Slots::new();
        if let Some(scope) = &component.children {
            self.collect_fills(frame, scope, &mut slots)?;
        }

        let inner = Frame {
            env,
            this: Context::Attrs(&attrs),
            locals: None,
            children: children.as_ref(),
            slots: &slots,
            depth: frame.depth + 1,
        };
        trace!(component = name, depth = inner.depth, "rendering component");
        self.render_scope(f, &inner, &env.unit.scope)
    }

    /// Registers the overrides in a component's children. Overrides inside
    /// `if` and `when` bodies only count when that body is the active one,
    /// a later override replaces an earlier one with the same name.
    fn collect_fills<'a>(
        &self,
        frame: &Frame<'a>,
        scope: &'a ast::Scope,
        slots: &mut Slots<'a>,
    ) -> Result<()> {
        let source = frame.source();
        for stmt in &scope.stmts {
            let body = match stmt {
                ast::Stmt::Fill(fill) => {
                    let thunk = Thunk::new(&fill.body, *frame);
                    slots.insert(&source[fill.name.span], SlotFill::Thunk(thunk));
                    continue;
                }
                ast::Stmt::IfElse(if_else) => self.active_branch(frame, if_else)?,
                ast::Stmt::When(when) => self.active_arm(frame, when)?,
                _ => continue,
            };
            if let Some(body) = body {
                self.collect_fills(frame, body, slots)?;
            }
        }
        Ok(())
    }

    fn render_list<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        list: &'a ast::List,
    ) -> Result<()> {
        let value = self.eval_var(frame, &list.source)?;
        let items: &[Value] = match &*value {
            Value::List(items) => items,
            _ => &[],
        };

        if items.is_empty() {
            return match &list.empty {
                Some(empty) => self.render_scope(f, frame, empty),
                None => Ok(()),
            };
        }

        if list.reverse {
            for item in items.iter().rev() {
                self.render_item(f, frame, list, item)?;
            }
        } else {
            for item in items {
                self.render_item(f, frame, list, item)?;
            }
        }
        Ok(())
    }

    fn render_item<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        list: &'a ast::List,
        item: &Value,
    ) -> Result<()> {
        let item = call(ValueCow::Borrowed(item), frame.source(), list.source.span)?;
        let local = Local {
            vars: &list.vars,
            item: &item,
            next: frame.locals,
        };
        self.render_scope(f, &frame.with_local(&local), &list.body)
    }

    fn render_slot<'a>(
        &self,
        f: &mut Formatter<'_>,
        frame: &Frame<'a>,
        slot: &'a ast::Slot,
    ) -> Result<()> {
        let source = frame.source();
        match frame.slots.get(&source[slot.name.span]) {
            Some(SlotFill::Thunk(thunk)) => f.write_str(self.force(thunk)?)?,
            Some(SlotFill::Value(value)) => {
                f.write_str(&to_text(value, false, source, slot.name.span)?)?;
            }
            None => self.render_scope(f, frame, &slot.default)?,
        }
        Ok(())
    }

    /// Renders a thunk, or returns its output if it was rendered before.
    fn force<'t>(&self, thunk: &'t Thunk<'_>) -> Result<&'t str> {
        if let Some(text) = thunk.memo.get() {
            return Ok(text);
        }
        let mut buf = String::new();
        self.render_scope(
            &mut Formatter::with_string(&mut buf),
            &thunk.frame,
            thunk.scope,
        )?;
        Ok(thunk.memo.get_or_init(|| buf))
    }

    fn eval_attrs<'a>(&self, frame: &Frame<'a>, attrs: &'a [ast::Attr]) -> Result<Attrs<'a>> {
        let source = frame.source();
        let mut map = Attrs::new();
        for attr in attrs {
            let value = match &attr.value {
                ast::AttrValue::Literal(lit) => ValueCow::Owned(Value::String(lit.value.clone())),

                ast::AttrValue::Expr(expr) => {
                    let value = self.eval_expr(frame, expr)?;
                    if expr.by_ref {
                        value
                    } else {
                        let text = to_text(&value, expr.raw, source, expr.span)?;
                        ValueCow::Owned(Value::String(text))
                    }
                }

                // Locals first, then self.
                ast::AttrValue::PassThrough(var) if !var.local => self.walk(frame, var, |name| {
                    frame
                        .local(name)
                        .map(ValueCow::Borrowed)
                        .or_else(|| frame.this.get(name))
                })?,
                ast::AttrValue::PassThrough(var) => self.eval_var(frame, var)?,
            };
            map.insert(&source[attr.name.span], value);
        }
        Ok(map)
    }

    /// Evaluates an expression, trying each fallback in turn until one of
    /// them is truthy.
    fn eval_expr<'a>(&self, frame: &Frame<'a>, expr: &'a ast::Expr) -> Result<ValueCow<'a>> {
        let mut value = self.eval_var(frame, &expr.var)?;
        for fallback in &expr.fallbacks {
            if truthy(&value) {
                break;
            }
            value = match fallback {
                ast::Fallback::Var(var) => self.eval_var(frame, var)?,
                ast::Fallback::Literal(lit) => ValueCow::Owned(Value::String(lit.value.clone())),
            };
        }
        Ok(value)
    }

    /// Resolves a variable against self, or against the local bindings
    /// when it has the `:` modifier.
    fn eval_var<'a>(&self, frame: &Frame<'a>, var: &'a ast::Var) -> Result<ValueCow<'a>> {
        if var.local {
            self.walk(frame, var, |name| frame.local(name).map(ValueCow::Borrowed))
        } else {
            self.walk(frame, var, |name| frame.this.get(name))
        }
    }

    fn walk<'a, F>(&self, frame: &Frame<'a>, var: &'a ast::Var, start: F) -> Result<ValueCow<'a>>
    where
        F: FnOnce(&str) -> Option<ValueCow<'a>>,
    {
        let source = frame.source();
        let Some((first, rest)) = var.path.split_first() else {
            return Ok(ValueCow::Borrowed(&NONE));
        };
        match start(&source[first.span]) {
            Some(value) => follow(value, rest.iter().map(|i| &source[i.span]), source, var.span),
            None => Ok(ValueCow::Borrowed(&NONE)),
        }
    }
}
