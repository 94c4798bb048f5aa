use crate::compile::lex::{Lexer, Token};
use crate::types::ast;
use crate::types::grammar::Grammar;
use crate::types::span::Span;

/// A parser that constructs an AST from a token stream.
///
/// The parser never fails. Tokens that do not fit the current block structure
/// are kept as literal text, blocks that are closed out of order are closed
/// implicitly and blocks that are still open at the end of the template are
/// closed as if their end tag was at the end of the input.
pub struct Parser<'g, 'source> {
    /// A lexer that tokenizes the template source.
    tokens: Lexer<'g, 'source>,

    /// The stack of open blocks, each with the scope collecting its
    /// statements.
    blocks: Vec<(State, ast::Scope)>,

    /// The top level scope.
    root: ast::Scope,

    /// The number of blocks that can be open at once, tags that would open
    /// another block are kept as literal text.
    max_nesting: usize,
}

/// Stores the state of a block during parsing.
enum State {
    /// A partial `if` statement.
    If {
        /// The condition of the branch currently being parsed, `None` once
        /// the `else` clause has been reached.
        current: Option<(bool, ast::Expr)>,
        /// The branches that have been completed.
        branches: Vec<ast::Branch>,
    },

    /// A partial `when` statement.
    When {
        expr: ast::Expr,
        arms: Vec<ast::Arm>,
    },

    /// A partial `case` or `default` arm, always directly inside a `when`.
    Case { label: Option<ast::Literal> },

    /// A partial component invocation.
    Component {
        name: ast::Ident,
        attrs: Vec<ast::Attr>,
        span: Span,
    },

    /// A partial `render slot` block.
    Render { name: ast::Ident },

    /// A partial `list` or `reverse-list` statement.
    List {
        reverse: bool,
        source: ast::Var,
        vars: Vec<ast::Ident>,
        empty: Option<ast::Scope>,
        span: Span,
    },

    /// A partial `empty` block, always directly inside a list.
    Empty,

    /// A partial slot definition.
    Slot { name: ast::Ident },
}

impl<'g, 'source> Parser<'g, 'source> {
    /// Construct a new parser.
    pub fn new(grammar: &'g Grammar, source: &'source str, max_nesting: usize) -> Self {
        Self {
            tokens: Lexer::new(grammar, source),
            blocks: Vec::new(),
            root: ast::Scope::new(),
            max_nesting,
        }
    }

    /// Parses a template.
    pub fn parse_template(mut self) -> ast::Scope {
        while let Some((tk, span)) = self.tokens.next() {
            match tk {
                // Simply raw template, emit a single statement for it.
                Token::Raw => self.push_stmt(ast::Stmt::Raw(span)),

                // The block content insertion, e.g. `{{@ children }}`
                Token::Children => self.push_stmt(ast::Stmt::Children(span)),

                // An expression, e.g. `{{ user.name -> "anonymous" }}`
                Token::InlineExpr(expr) => {
                    self.push_stmt(ast::Stmt::InlineExpr(ast::InlineExpr { expr, span }))
                }

                // The start of an `if` statement. For example:
                //
                //   <if condition={{ cond }}>
                //
                Token::If { not, cond } => {
                    let current = Some((not, cond));
                    self.open(
                        State::If {
                            current,
                            branches: Vec::new(),
                        },
                        span,
                    );
                }

                // An `else-if` clause. For example:
                //
                //   <else-if condition={{ cond }}>
                //
                // Only valid directly inside an `if` that has not reached its
                // `else` clause. The current branch is completed and a new
                // scope is started for the next one.
                Token::ElseIf { not, cond } => match self.blocks.last_mut() {
                    Some((
                        State::If {
                            current: current @ Some(_),
                            branches,
                            ..
                        },
                        scope,
                    )) => {
                        if let Some((not, cond)) = current.replace((not, cond)) {
                            let body = std::mem::take(scope);
                            branches.push(ast::Branch { not, cond, body });
                        }
                    }
                    _ => self.push_literal(span),
                },

                // The `else` clause of an `if` statement.
                Token::Else => match self.blocks.last_mut() {
                    Some((
                        State::If {
                            current: current @ Some(_),
                            branches,
                            ..
                        },
                        scope,
                    )) => {
                        if let Some((not, cond)) = current.take() {
                            let body = std::mem::take(scope);
                            branches.push(ast::Branch { not, cond, body });
                        }
                    }
                    _ => self.push_literal(span),
                },

                // The end of an `if` statement.
                Token::EndIf => self.close_or_literal(span, |s| matches!(s, State::If { .. })),

                // A component invocation. For example:
                //
                //   <component card title="Hello" />
                //   <component layout ~user>...</component>
                //
                Token::Component {
                    name,
                    attrs,
                    closed: true,
                } => self.push_stmt(ast::Stmt::Component(ast::Component {
                    name,
                    attrs,
                    children: None,
                    span,
                })),
                Token::Component {
                    name,
                    attrs,
                    closed: false,
                } => self.open(State::Component { name, attrs, span }, span),
                Token::EndComponent => {
                    self.close_or_literal(span, |s| matches!(s, State::Component { .. }))
                }

                // A slot override at the invocation site of a component.
                Token::Render { name } => self.open(State::Render { name }, span),
                Token::EndRender => {
                    self.close_or_literal(span, |s| matches!(s, State::Render { .. }))
                }

                // The start of a list. For example:
                //
                //   <list users as="name, age">
                //
                Token::List {
                    reverse,
                    source,
                    vars,
                } => self.open(
                    State::List {
                        reverse,
                        source,
                        vars,
                        empty: None,
                        span,
                    },
                    span,
                ),

                // The `empty` block of a list, only valid directly inside a
                // list that does not have one yet.
                Token::Empty => match self.blocks.last() {
                    Some((State::List { empty: None, .. }, _)) => self.open(State::Empty, span),
                    _ => self.push_literal(span),
                },
                Token::EndEmpty => {
                    self.close_or_literal(span, |s| matches!(s, State::Empty))
                }
                Token::EndList => self.close_or_literal(span, |s| matches!(s, State::List { .. })),

                // A slot definition in a component body.
                Token::Slot { name, closed: true } => self.push_stmt(ast::Stmt::Slot(ast::Slot {
                    name,
                    default: ast::Scope::new(),
                })),
                Token::Slot {
                    name,
                    closed: false,
                } => self.open(State::Slot { name }, span),
                Token::EndSlot => self.close_or_literal(span, |s| matches!(s, State::Slot { .. })),

                // The start of a `when` statement. For example:
                //
                //   <when value-of={{ user.role }}>
                //
                Token::When { expr } => self.open(
                    State::When {
                        expr,
                        arms: Vec::new(),
                    },
                    span,
                ),
                Token::EndWhen => self.close_or_literal(span, |s| matches!(s, State::When { .. })),

                // A `case` or `default` arm, only valid directly inside a
                // `when`.
                Token::Case { label } => self.open_arm(Some(label), span),
                Token::Default => self.open_arm(None, span),
                Token::EndCase => self.close_or_literal(span, |s| {
                    matches!(s, State::Case { label: Some(_) })
                }),
                Token::EndDefault => {
                    self.close_or_literal(span, |s| matches!(s, State::Case { label: None }))
                }
            }
        }

        if !self.blocks.is_empty() {
            debug!(
                open = self.blocks.len(),
                "implicitly closing blocks at end of template"
            );
        }
        while !self.blocks.is_empty() {
            self.close();
        }

        self.root
    }

    fn open(&mut self, state: State, span: Span) {
        if self.blocks.len() >= self.max_nesting {
            debug!(
                span = ?span,
                max_nesting = self.max_nesting,
                "block nesting limit reached, keeping tag as text"
            );
            return self.push_literal(span);
        }
        self.blocks.push((state, ast::Scope::new()));
    }

    fn open_arm(&mut self, label: Option<ast::Literal>, span: Span) {
        match self.blocks.last() {
            Some((State::When { .. }, _)) => self.open(State::Case { label }, span),
            _ => self.push_literal(span),
        }
    }

    /// Closes the innermost open block matching `pred` and every block opened
    /// after it. If there is no such block the end tag is literal text.
    fn close_or_literal<F>(&mut self, span: Span, pred: F)
    where
        F: Fn(&State) -> bool,
    {
        let Some(k) = self.blocks.iter().rposition(|(s, _)| pred(s)) else {
            return self.push_literal(span);
        };
        while self.blocks.len() > k + 1 {
            debug!(span = ?span, "implicitly closing block");
            self.close();
        }
        self.close();
    }

    /// Closes the innermost open block, attaching the result to the
    /// enclosing block or scope.
    fn close(&mut self) {
        let Some((state, scope)) = self.blocks.pop() else {
            return;
        };
        match state {
            State::If {
                current,
                mut branches,
                ..
            } => {
                let else_branch = match current {
                    Some((not, cond)) => {
                        branches.push(ast::Branch {
                            not,
                            cond,
                            body: scope,
                        });
                        None
                    }
                    None => Some(scope),
                };
                self.push_stmt(ast::Stmt::IfElse(ast::IfElse {
                    branches,
                    else_branch,
                }));
            }

            State::When { expr, arms, .. } => {
                self.push_stmt(ast::Stmt::When(ast::When { expr, arms }));
            }

            State::Case { label, .. } => {
                if let Some((State::When { arms, .. }, _)) = self.blocks.last_mut() {
                    arms.push(ast::Arm { label, body: scope });
                }
            }

            State::Component { name, attrs, span } => {
                self.push_stmt(ast::Stmt::Component(ast::Component {
                    name,
                    attrs,
                    children: Some(scope),
                    span,
                }));
            }

            // Overrides count inside a component's children, either directly
            // or through any number of `if` and `when` bodies.
            State::Render { name } => {
                let in_component = matches!(
                    self.blocks.iter().rev().find(|(s, _)| !matches!(
                        s,
                        State::If { .. } | State::When { .. } | State::Case { .. }
                    )),
                    Some((State::Component { .. }, _))
                );
                if in_component {
                    self.push_stmt(ast::Stmt::Fill(ast::SlotFill { name, body: scope }));
                } else {
                    trace!("discarding slot override outside a component");
                }
            }

            State::List {
                reverse,
                source,
                vars,
                empty,
                span,
            } => {
                self.push_stmt(ast::Stmt::List(ast::List {
                    reverse,
                    source,
                    vars,
                    body: scope,
                    empty,
                    span,
                }));
            }

            State::Empty => {
                if let Some((State::List { empty, .. }, _)) = self.blocks.last_mut() {
                    *empty = Some(scope);
                }
            }

            State::Slot { name, .. } => {
                self.push_stmt(ast::Stmt::Slot(ast::Slot {
                    name,
                    default: scope,
                }));
            }
        }
    }

    /// Pushes a statement to the current scope. Statements directly inside a
    /// `when` but outside of its arms are dropped.
    fn push_stmt(&mut self, stmt: ast::Stmt) {
        match self.blocks.last_mut() {
            Some((State::When { .. }, _)) => {}
            Some((_, scope)) => scope.stmts.push(stmt),
            None => self.root.stmts.push(stmt),
        }
    }

    fn push_literal(&mut self, span: Span) {
        self.push_stmt(ast::Stmt::Raw(span));
    }
}
