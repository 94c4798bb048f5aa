use std::cmp::max;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::types::span::Span;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// An error that can occur while compiling, loading, or rendering a template.
///
/// Use [`.kind()`][Error::kind] to distinguish between the different failure
/// modes. When the error points at a location in a template the alternate
/// display form (`{:#}`) renders the offending line with a caret underline.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
    cause: Option<Cause>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A dependency value was not a raw or precompiled template, a
    /// precompiled unit was malformed, or a component tag referenced an
    /// unknown name.
    Dependency,

    /// Rendering failed, for example because a depth limit was exceeded or
    /// a context producer failed.
    Render,

    /// A template source could not be fetched by a [`Loader`][crate::Loader].
    Load,

    /// The render context could not be converted into a
    /// [`Value`][crate::Value].
    Serialize,
}

impl Error {
    fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: None,
            cause: None,
        }
    }

    fn with_span(mut self, source: &str, span: impl Into<Span>) -> Self {
        if !source.is_empty() {
            self.span = Some((source.to_owned(), span.into()));
        }
        self
    }

    fn with_cause<E>(mut self, err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        self.cause = Some(Arc::from(err.into()));
        self
    }

    pub(crate) fn dependency(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dependency, msg)
    }

    pub(crate) fn dependency_at(msg: impl Into<String>, source: &str, span: Span) -> Self {
        Self::dependency(msg).with_span(source, span)
    }

    pub(crate) fn render(msg: impl Into<String>, source: &str, span: Span) -> Self {
        Self::new(ErrorKind::Render, msg).with_span(source, span)
    }

    /// Constructs an error for a context producer that failed.
    pub(crate) fn producer<E>(err: E, source: &str, span: Span) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let err = err.into();
        Self::new(ErrorKind::Render, format!("producer failed: {err}"))
            .with_span(source, span)
            .with_cause(err)
    }

    pub(crate) fn max_depth(max: usize, source: &str, span: Span) -> Self {
        Self::render(
            format!("reached maximum component depth ({max})"),
            source,
            span,
        )
    }

    pub(crate) fn max_nesting(max: usize) -> Self {
        Self::new(
            ErrorKind::Render,
            format!("reached maximum nesting depth ({max})"),
        )
    }

    pub(crate) fn load<E>(identifier: &str, err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let err = err.into();
        Self::new(
            ErrorKind::Load,
            format!("failed to load template `{identifier}`: {err}"),
        )
        .with_cause(err)
    }

    pub(crate) fn serialize(msg: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Serialize,
            format!("failed to serialize context: {msg}"),
        )
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any source location.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Render, format!("failed to write output: {err}")).with_cause(err)
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Self::new(ErrorKind::Render, "failed to write output").with_cause(err)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, width(&source[span]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    (lines.len(), lines.last().map(|l| width(l)).unwrap_or(0))
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
