use std::borrow::Cow;
use std::fmt::Write;

use crate::types::span::Span;
use crate::value::{get, BoxError, ValueCow};
use crate::{Error, Result, Value};

/// The value of anything missing from a context.
pub static NONE: Value = Value::None;

/// Returns false for none, `false` and missing values, true for everything
/// else including empty strings and lists.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::None | Value::Bool(false))
}

/// Invokes the value if it is a producer.
pub fn call<'a>(value: ValueCow<'a>, source: &str, span: Span) -> Result<ValueCow<'a>> {
    match &*value {
        Value::Producer(p) => match p.call() {
            Ok(v) => Ok(ValueCow::Owned(v)),
            Err(err) => {
                debug!(error = %err, "producer failed");
                Err(Error::producer(err, source, span))
            }
        },
        _ => Ok(value),
    }
}

/// Walks the rest of a path starting at `value`, invoking producers found
/// along the way. Returns [`NONE`] as soon as a segment is missing.
pub fn follow<'a, 'k>(
    mut value: ValueCow<'a>,
    keys: impl IntoIterator<Item = &'k str>,
    source: &str,
    span: Span,
) -> Result<ValueCow<'a>> {
    for key in keys {
        value = call(value, source, span)?;
        value = match value.index(key) {
            Some(v) => v,
            None => return Ok(ValueCow::Borrowed(&NONE)),
        };
    }
    call(value, source, span)
}

/// Looks up a field of a map, list items are indexed by position.
pub fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
    get(value, key).unwrap_or(&NONE)
}

/// Appends the text form of a value to the buffer.
///
/// Lists are joined with `,`, producers nested within lists are invoked and
/// maps have no text form.
pub fn display(buf: &mut String, value: &Value) -> std::result::Result<(), BoxError> {
    match value {
        Value::None | Value::Bool(false) | Value::Map(_) => {}
        Value::Bool(true) => buf.push_str("true"),
        Value::Integer(n) => write!(buf, "{n}")?,
        Value::Float(n) => write!(buf, "{n}")?,
        Value::String(s) => buf.push_str(s),
        Value::List(list) => {
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                display(buf, item)?;
            }
        }
        Value::Producer(p) => display(buf, &p.call()?)?,
    }
    Ok(())
}

/// Returns the text form of a value, HTML encoded unless `raw` is set.
pub fn to_text(value: &Value, raw: bool, source: &str, span: Span) -> Result<String> {
    let mut buf = String::new();
    display(&mut buf, value).map_err(|err| Error::producer(err, source, span))?;
    if !raw {
        if let Cow::Owned(encoded) = encode(&buf) {
            return Ok(encoded);
        }
    }
    Ok(buf)
}

/// Replaces `<` and `>` with their HTML entities.
pub fn encode(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Returns true if the value matches a `case` label.
///
/// Numbers are compared against the integer the label starts with, strings
/// must be equal to the label and nothing else ever matches.
pub fn case_matches(value: &Value, label: &str) -> bool {
    match value {
        Value::Integer(n) => parse_int(label) == Some(*n),
        Value::Float(n) => parse_int(label).map_or(false, |m| m as f64 == *n),
        Value::String(s) => s == label,
        _ => false,
    }
}

/// Parses the leading integer of a string: optional whitespace, an optional
/// sign and at least one digit. Anything after the digits is ignored.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let n: i64 = rest[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}
