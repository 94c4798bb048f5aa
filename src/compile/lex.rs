use memchr::{memchr, memchr2};

use crate::types::ast;
use crate::types::grammar::{Grammar, Kind};
use crate::types::span::Span;

/// A lexer that chunks the template source into literal text and recognized
/// constructs so that the parser only has to deal with block structure.
///
/// Lexing never fails. Every `{` or `<` in the source is a candidate position
/// where the rules of the [`Grammar`] are tried in order. If none of them
/// match the text is simply part of the surrounding raw token.
pub struct Lexer<'g, 'source> {
    /// The rule table.
    grammar: &'g Grammar,

    /// The original template source.
    source: &'source str,

    /// A cursor over the template source.
    cursor: usize,

    /// A buffer to store the next token.
    next: Option<(Token, Span)>,
}

/// The unit yielded by the lexer.
#[derive(Debug)]
pub enum Token {
    /// Raw template
    Raw,
    /// `{{@ children }}`
    Children,
    /// `{{ expr }}`
    InlineExpr(ast::Expr),
    /// `<if condition={{ expr }}>`
    If { not: bool, cond: ast::Expr },
    /// `<else-if condition={{ expr }}>`
    ElseIf { not: bool, cond: ast::Expr },
    /// `<else>`
    Else,
    /// `</if>`
    EndIf,
    /// `<component name ...>` or `<component name ... />`
    Component {
        name: ast::Ident,
        attrs: Vec<ast::Attr>,
        closed: bool,
    },
    /// `</component>`
    EndComponent,
    /// `<list source as="vars">` or `<reverse-list source as="vars">`
    List {
        reverse: bool,
        source: ast::Var,
        vars: Vec<ast::Ident>,
    },
    /// `<empty>`
    Empty,
    /// `</empty>`
    EndEmpty,
    /// `</list>` or `</reverse-list>`
    EndList,
    /// `<slot name>` or `<slot name />`
    Slot { name: ast::Ident, closed: bool },
    /// `</slot>`
    EndSlot,
    /// `<render slot="name">`
    Render { name: ast::Ident },
    /// `</render>`
    EndRender,
    /// `<when value-of={{ expr }}>`
    When { expr: ast::Expr },
    /// `</when>`
    EndWhen,
    /// `<case is="label">`
    Case { label: ast::Literal },
    /// `<default>`
    Default,
    /// `</case>`
    EndCase,
    /// `</default>`
    EndDefault,
}

impl<'g, 'source> Lexer<'g, 'source> {
    /// Construct a new lexer.
    pub fn new(grammar: &'g Grammar, source: &'source str) -> Self {
        Self {
            grammar,
            source,
            cursor: 0,
            next: None,
        }
    }

    /// Tries every rule whose marker starts at `at`, returning the first
    /// token that matches and the index just past it.
    fn lex_construct(&self, at: usize) -> Option<(Token, usize)> {
        let rest = &self.source[at..];
        self.grammar.candidates(rest).find_map(|rule| {
            let mut c = Cursor {
                source: self.source,
                i: at + rule.marker().len(),
            };
            let tk = c.lex(rule.kind())?;
            Some((tk, c.i))
        })
    }
}

impl Iterator for Lexer<'_, '_> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(next) = self.next.take() {
            return Some(next);
        }

        let start = self.cursor;
        let len = self.source.len();
        if start >= len {
            return None;
        }

        // xxxxxxx<xxxx{{xxxxx}}xxx
        //    ^   ^    ^      ^
        //  start i    at     end
        //
        // `i` is a candidate that no rule matched so the search continues
        // after it.
        let bytes = self.source.as_bytes();
        let mut i = start;
        while let Some(j) = memchr2(b'{', b'<', &bytes[i..]) {
            let at = i + j;
            if let Some((tk, end)) = self.lex_construct(at) {
                self.cursor = end;
                let span = Span::from(at..end);
                if at == start {
                    return Some((tk, span));
                }
                self.next = Some((tk, span));
                return Some((Token::Raw, Span::from(start..at)));
            }
            i = at + 1;
        }

        self.cursor = len;
        Some((Token::Raw, Span::from(start..len)))
    }
}

/// A position in the source while matching a single construct.
///
/// All the matching functions return `None` when the text does not have the
/// expected shape, the caller then discards the cursor.
struct Cursor<'source> {
    source: &'source str,
    i: usize,
}

impl Cursor<'_> {
    fn lex(&mut self, kind: Kind) -> Option<Token> {
        let tk = match kind {
            Kind::Children => {
                self.skip_ws();
                self.expect("@")?;
                self.skip_ws();
                self.expect("children")?;
                self.skip_ws();
                self.expect("}}")?;
                Token::Children
            }
            Kind::InlineExpr => Token::InlineExpr(self.expr_tag("}}")?),
            Kind::If => {
                let (not, cond) = self.condition()?;
                Token::If { not, cond }
            }
            Kind::ElseIf => {
                let (not, cond) = self.condition()?;
                Token::ElseIf { not, cond }
            }
            Kind::Else => Token::Else,
            Kind::EndIf => Token::EndIf,
            Kind::Component => self.component()?,
            Kind::EndComponent => Token::EndComponent,
            Kind::List => self.list(false)?,
            Kind::ReverseList => self.list(true)?,
            Kind::Empty => Token::Empty,
            Kind::EndEmpty => Token::EndEmpty,
            Kind::EndList | Kind::EndReverseList => Token::EndList,
            Kind::Slot => {
                self.expect_ws()?;
                let name = self.ident()?;
                self.skip_ws();
                let closed = self.eat("/>");
                if !closed {
                    self.expect(">")?;
                }
                Token::Slot { name, closed }
            }
            Kind::EndSlot => Token::EndSlot,
            Kind::Render => {
                self.expect_ws()?;
                self.expect("slot=\"")?;
                self.skip_ws();
                let name = self.ident()?;
                self.skip_ws();
                self.expect("\"")?;
                self.end_tag()?;
                Token::Render { name }
            }
            Kind::EndRender => Token::EndRender,
            Kind::When => {
                self.expect_ws()?;
                self.expect("value-of={{")?;
                let expr = self.expr_tag("}}")?;
                self.end_tag()?;
                Token::When { expr }
            }
            Kind::EndWhen => Token::EndWhen,
            Kind::Case => {
                self.expect_ws()?;
                self.expect("is=\"")?;
                let start = self.i;
                let end = start + memchr(b'"', self.rest().as_bytes())?;
                let raw = &self.source[start..end];
                let trimmed = raw.trim();
                let m = start + (raw.len() - raw.trim_start().len());
                let label = ast::Literal {
                    value: trimmed.to_owned(),
                    span: Span::from(m..m + trimmed.len()),
                };
                self.i = end + 1;
                self.end_tag()?;
                Token::Case { label }
            }
            Kind::Default => Token::Default,
            Kind::EndCase => Token::EndCase,
            Kind::EndDefault => Token::EndDefault,
        };
        Some(tk)
    }

    /// Lexes the remainder of `<if` or `<else-if`, e.g.
    ///
    ///   not condition={{ user.is_admin }}>
    fn condition(&mut self) -> Option<(bool, ast::Expr)> {
        self.expect_ws()?;
        let not = self.eat("not");
        if not {
            self.expect_ws()?;
        }
        self.expect("condition={{")?;
        let cond = self.expr_tag("}}")?;
        self.end_tag()?;
        Some((not, cond))
    }

    /// Lexes the remainder of `<component`, e.g.
    ///
    ///   card title="Hi" items={{ &items }} user={:user} ~user.name />
    fn component(&mut self) -> Option<Token> {
        self.expect_ws()?;
        let name = self.ident()?;
        let mut attrs = Vec::new();
        let closed = loop {
            let had_ws = self.skip_ws();
            if self.eat("/>") {
                break true;
            }
            if self.eat(">") {
                break false;
            }
            if !had_ws {
                return None;
            }
            attrs.push(self.attr()?);
        };
        Some(Token::Component {
            name,
            attrs,
            closed,
        })
    }

    fn attr(&mut self) -> Option<ast::Attr> {
        if self.eat("~") {
            let var = self.var(false)?;
            let name = *var.path.last()?;
            let value = ast::AttrValue::PassThrough(var);
            return Some(ast::Attr { name, value });
        }

        let name = self.ident()?;
        if !self.eat("=") {
            let var = ast::Var {
                local: false,
                path: vec![name],
                span: name.span,
            };
            let value = ast::AttrValue::PassThrough(var);
            return Some(ast::Attr { name, value });
        }

        let value = if self.eat("{{") {
            ast::AttrValue::Expr(self.expr_tag("}}")?)
        } else if self.eat("{") {
            let mut expr = self.expr_tag("}")?;
            expr.by_ref = true;
            ast::AttrValue::Expr(expr)
        } else if self.eat("\"") {
            let start = self.i;
            let end = start + memchr(b'"', self.rest().as_bytes())?;
            self.i = end + 1;
            match quoted_expr(self.source, start, end) {
                Some(expr) => ast::AttrValue::Expr(expr),
                None => ast::AttrValue::Literal(ast::Literal {
                    value: self.source[start..end].to_owned(),
                    span: Span::from(start..end),
                }),
            }
        } else {
            return None;
        };
        Some(ast::Attr { name, value })
    }

    /// Lexes the remainder of `<list` or `<reverse-list`, e.g.
    ///
    ///   :user.pets as="name, age">
    fn list(&mut self, reverse: bool) -> Option<Token> {
        self.expect_ws()?;
        let local = self.eat(":");
        self.skip_ws();
        let source = self.var(local)?;
        self.expect_ws()?;
        self.expect("as=\"")?;
        let mut vars = Vec::new();
        loop {
            self.skip_ws();
            vars.push(self.ident()?);
            self.skip_ws();
            if !self.eat(",") {
                break;
            }
        }
        self.expect("\"")?;
        self.end_tag()?;
        Some(Token::List {
            reverse,
            source,
            vars,
        })
    }

    /// Lexes an expression followed by the `close` delimiter.
    fn expr_tag(&mut self, close: &str) -> Option<ast::Expr> {
        self.skip_ws();
        let expr = self.expr()?;
        self.skip_ws();
        self.expect(close)?;
        Some(expr)
    }

    /// Lexes an expression, e.g.
    ///
    ///   !:user.name -> alias -> "friend"
    fn expr(&mut self) -> Option<ast::Expr> {
        let start = self.i;
        let (mut raw, mut local, mut by_ref) = (false, false, false);
        loop {
            match self.peek() {
                Some('!') => raw = true,
                Some(':') => local = true,
                Some('&') => by_ref = true,
                _ => break,
            }
            self.i += 1;
            self.skip_ws();
        }
        let var = self.var(local)?;

        let mut fallbacks = Vec::new();
        loop {
            let save = self.i;
            self.skip_ws();
            if !self.eat("->") {
                self.i = save;
                break;
            }
            self.skip_ws();
            let fallback = match self.peek() {
                Some(q @ ('"' | '\'')) => ast::Fallback::Literal(self.string(q)?),
                _ => {
                    let local = self.eat(":");
                    ast::Fallback::Var(self.var(local)?)
                }
            };
            fallbacks.push(fallback);
        }

        Some(ast::Expr {
            raw,
            by_ref,
            var,
            fallbacks,
            span: Span::from(start..self.i),
        })
    }

    fn var(&mut self, local: bool) -> Option<ast::Var> {
        let first = self.ident()?;
        let mut path = vec![first];
        while self.rest().starts_with('.') {
            self.i += 1;
            path.push(self.ident()?);
        }
        let span = first.span.combine(Span::from(self.i..self.i));
        Some(ast::Var { local, path, span })
    }

    fn ident(&mut self) -> Option<ast::Ident> {
        let start = self.i;
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !is_ident(*c))
            .map(|(j, _)| j)
            .unwrap_or(self.rest().len());
        if len == 0 {
            return None;
        }
        self.i += len;
        Some(ast::Ident {
            span: Span::from(start..self.i),
        })
    }

    /// Lexes a quoted literal and handles escape characters.
    fn string(&mut self, quote: char) -> Option<ast::Literal> {
        let start = self.i;
        self.i += quote.len_utf8();
        let mut value = String::new();
        let mut iter = self.rest().char_indices();
        let end = loop {
            let (j, c) = iter.next()?;
            match c {
                '\\' => {
                    let (_, esc) = iter.next()?;
                    value.push(match esc {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        c => c,
                    });
                }
                c if c == quote => break j + c.len_utf8(),
                c => value.push(c),
            }
        };
        self.i += end;
        Some(ast::Literal {
            value,
            span: Span::from(start..self.i),
        })
    }

    /// Expects optional whitespace and then `>`.
    fn end_tag(&mut self) -> Option<()> {
        self.skip_ws();
        self.expect(">")
    }

    fn rest(&self) -> &str {
        &self.source[self.i..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.i += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Option<()> {
        self.eat(s).then_some(())
    }

    fn skip_ws(&mut self) -> bool {
        let rest = self.rest();
        let n = rest.len() - rest.trim_start_matches(is_whitespace).len();
        self.i += n;
        n > 0
    }

    fn expect_ws(&mut self) -> Option<()> {
        self.skip_ws().then_some(())
    }
}

/// Recognizes an attribute value of the form `"{expr}"` or `"{{ expr }}"`
/// between `start` and `end`.
fn quoted_expr(source: &str, start: usize, end: usize) -> Option<ast::Expr> {
    let mut c = Cursor { source, i: start };
    c.skip_ws();
    let mut expr = if c.eat("{{") {
        c.expr_tag("}}")?
    } else if c.eat("{") {
        let mut expr = c.expr_tag("}")?;
        expr.by_ref = true;
        expr
    } else {
        return None;
    };
    c.skip_ws();
    if c.i != end {
        return None;
    }
    expr.span = Span::from(start..end);
    Some(expr)
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' ')
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_empty() {
        let tokens = lex("");
        assert!(tokens.is_empty());
    }

    #[test]
    fn lex_raw() {
        let tokens = lex("lorem ipsum");
        assert_eq!(tokens, [("raw", "lorem ipsum")]);
    }

    #[test]
    fn lex_inline_expr() {
        let tokens = lex("Hello {{ name }}!");
        assert_eq!(
            tokens,
            [("raw", "Hello "), ("expr", "{{ name }}"), ("raw", "!")]
        );
    }

    #[test]
    fn lex_inline_expr_modifiers_and_fallbacks() {
        let source = r#"{{!: user.name -> alias -> "fri\"end" }}"#;
        let grammar = Grammar::default();
        let mut lexer = Lexer::new(&grammar, source);
        let (tk, _) = lexer.next().unwrap();
        let expr = match tk {
            Token::InlineExpr(expr) => expr,
            tk => panic!("unexpected token {tk:?}"),
        };
        assert!(expr.raw);
        assert!(!expr.by_ref);
        assert!(expr.var.local);
        let path: Vec<_> = expr.var.path.iter().map(|p| &source[p.span]).collect();
        assert_eq!(path, ["user", "name"]);
        assert_eq!(expr.fallbacks.len(), 2);
        match &expr.fallbacks[1] {
            ast::Fallback::Literal(lit) => assert_eq!(lit.value, "fri\"end"),
            f => panic!("unexpected fallback {f:?}"),
        }
        assert!(lexer.next().is_none());
    }

    #[test]
    fn lex_inline_expr_spaced_modifiers() {
        let source = "{{! :x }}{{ & ! item }}";
        let grammar = Grammar::default();
        let exprs: Vec<_> = Lexer::new(&grammar, source)
            .map(|(tk, _)| match tk {
                Token::InlineExpr(expr) => expr,
                tk => panic!("unexpected token {tk:?}"),
            })
            .collect();
        assert_eq!(exprs.len(), 2);
        assert!(exprs[0].raw && exprs[0].var.local && !exprs[0].by_ref);
        assert_eq!(&source[exprs[0].var.span], "x");
        assert!(exprs[1].raw && exprs[1].by_ref && !exprs[1].var.local);
        assert_eq!(&source[exprs[1].var.span], "item");
    }

    #[test]
    fn lex_unmatched_markers_are_raw() {
        let source = "a < b { c } {{ }} {{ user.name -> }} <iframe> <list>";
        let tokens = lex(source);
        assert_eq!(tokens, [("raw", source)]);
    }

    #[test]
    fn lex_executable_marker_is_raw() {
        let source = "Hello ${(() => { throw new Error() })()}";
        assert_eq!(lex(source), [("raw", source)]);
    }

    #[test]
    fn lex_children() {
        let tokens = lex("<p>{{@children}}</p>{{ @ children }}");
        assert_eq!(
            tokens,
            [
                ("raw", "<p>"),
                ("children", "{{@children}}"),
                ("raw", "</p>"),
                ("children", "{{ @ children }}"),
            ]
        );
    }

    #[test]
    fn lex_conditionals() {
        let tokens =
            lex("<if not condition={{ a }}>A<else-if condition={{:b}}>B<else>C</if>");
        assert_eq!(
            tokens,
            [
                ("if", "<if not condition={{ a }}>"),
                ("raw", "A"),
                ("else-if", "<else-if condition={{:b}}>"),
                ("raw", "B"),
                ("else", "<else>"),
                ("raw", "C"),
                ("end-if", "</if>"),
            ]
        );
    }

    #[test]
    fn lex_quoted_condition_is_raw() {
        let source = r#"<if condition="test">A</if>"#;
        assert_eq!(
            lex(source),
            [("raw", r#"<if condition="test">A"#), ("end-if", "</if>")]
        );
    }

    #[test]
    fn lex_component() {
        let source = r#"<component card title="Hi there" items={{&items}} user={:user} ref="{ post }" ~user.name active />"#;
        let grammar = Grammar::default();
        let mut lexer = Lexer::new(&grammar, source);
        let (tk, span) = lexer.next().unwrap();
        assert_eq!(&source[span], source);
        let (name, attrs, closed) = match tk {
            Token::Component {
                name,
                attrs,
                closed,
            } => (name, attrs, closed),
            tk => panic!("unexpected token {tk:?}"),
        };
        assert_eq!(&source[name.span], "card");
        assert!(closed);
        let names: Vec<_> = attrs.iter().map(|a| &source[a.name.span]).collect();
        assert_eq!(names, ["title", "items", "user", "ref", "name", "active"]);
        assert!(matches!(&attrs[0].value, ast::AttrValue::Literal(l) if l.value == "Hi there"));
        assert!(matches!(&attrs[1].value, ast::AttrValue::Expr(e) if e.by_ref));
        assert!(matches!(&attrs[2].value, ast::AttrValue::Expr(e) if e.by_ref && e.var.local));
        assert!(matches!(&attrs[3].value, ast::AttrValue::Expr(e) if e.by_ref));
        assert!(matches!(&attrs[4].value, ast::AttrValue::PassThrough(v) if v.path.len() == 2));
        assert!(matches!(&attrs[5].value, ast::AttrValue::PassThrough(v) if v.path.len() == 1));
    }

    #[test]
    fn lex_component_open_and_close() {
        let tokens = lex("<component layout>x</component>");
        assert_eq!(
            tokens,
            [
                ("component", "<component layout>"),
                ("raw", "x"),
                ("end-component", "</component>"),
            ]
        );
    }

    #[test]
    fn lex_component_malformed_is_raw() {
        let source = r#"<component card title="unterminated>"#;
        assert_eq!(lex(source), [("raw", source)]);
    }

    #[test]
    fn lex_lists() {
        let tokens = lex(
            r#"<list users as="name, age">x<empty>none</empty></list><reverse-list :a.b as="x"></reverse-list>"#,
        );
        assert_eq!(
            tokens,
            [
                ("list", r#"<list users as="name, age">"#),
                ("raw", "x"),
                ("empty", "<empty>"),
                ("raw", "none"),
                ("end-empty", "</empty>"),
                ("end-list", "</list>"),
                ("list", r#"<reverse-list :a.b as="x">"#),
                ("end-list", "</reverse-list>"),
            ]
        );
    }

    #[test]
    fn lex_slots() {
        let tokens = lex(
            r#"<slot header/><slot title>x</slot><render slot="title">y</render>"#,
        );
        assert_eq!(
            tokens,
            [
                ("slot", "<slot header/>"),
                ("slot", "<slot title>"),
                ("raw", "x"),
                ("end-slot", "</slot>"),
                ("render", r#"<render slot="title">"#),
                ("raw", "y"),
                ("end-render", "</render>"),
            ]
        );
    }

    #[test]
    fn lex_switch() {
        let tokens = lex(
            r#"<when value-of={{ n }}><case is=" 1 ">one</case><default>many</default></when>"#,
        );
        assert_eq!(
            tokens,
            [
                ("when", "<when value-of={{ n }}>"),
                ("case", r#"<case is=" 1 ">"#),
                ("raw", "one"),
                ("end-case", "</case>"),
                ("default", "<default>"),
                ("raw", "many"),
                ("end-case", "</default>"),
                ("end-when", "</when>"),
            ]
        );
    }

    #[cfg(feature = "unicode")]
    #[test]
    fn lex_unicode_ident() {
        let tokens = lex("{{ привіт }}");
        assert_eq!(tokens, [("expr", "{{ привіт }}")]);
    }

    fn name(tk: &Token) -> &'static str {
        match tk {
            Token::Raw => "raw",
            Token::Children => "children",
            Token::InlineExpr(_) => "expr",
            Token::If { .. } => "if",
            Token::ElseIf { .. } => "else-if",
            Token::Else => "else",
            Token::EndIf => "end-if",
            Token::Component { .. } => "component",
            Token::EndComponent => "end-component",
            Token::List { .. } => "list",
            Token::Empty => "empty",
            Token::EndEmpty => "end-empty",
            Token::EndList => "end-list",
            Token::Slot { .. } => "slot",
            Token::EndSlot => "end-slot",
            Token::Render { .. } => "render",
            Token::EndRender => "end-render",
            Token::When { .. } => "when",
            Token::EndWhen => "end-when",
            Token::Case { .. } => "case",
            Token::Default => "default",
            Token::EndCase => "end-case",
            Token::EndDefault => "end-default",
        }
    }

    #[track_caller]
    fn lex(source: &str) -> Vec<(&'static str, &str)> {
        let grammar = Grammar::default();
        let mut lexer = Lexer::new(&grammar, source);
        let mut tokens = Vec::new();
        for (tk, sp) in lexer.by_ref() {
            tokens.push((name(&tk), &source[sp]));
        }
        for _ in 0..3 {
            assert!(lexer.next().is_none());
        }
        tokens
    }
}
