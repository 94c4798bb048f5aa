//! Defines a clone-on-write [`Value`].

use std::ops::Deref;

use crate::Value;

/// A value that is either borrowed from the render context or produced
/// during rendering.
#[derive(Debug, Clone)]
pub enum ValueCow<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl Deref for ValueCow<'_> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }
}

impl<'a> ValueCow<'a> {
    /// Index into the value, only cloning the edge value when owned.
    pub fn index(self, key: &str) -> Option<ValueCow<'a>> {
        match self {
            Self::Borrowed(v) => get(v, key).map(ValueCow::Borrowed),
            Self::Owned(v) => get(&v, key).cloned().map(ValueCow::Owned),
        }
    }
}

/// Index into a map by key or into a list by a numeric key.
pub fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Map(map) => map.get(key),
        Value::List(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    }
}
