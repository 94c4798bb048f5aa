//! Defines the [`Value`] enum, representing any data a template can render.

mod cow;
mod from;
mod json;
mod producer;
mod ser;

use std::mem;

use serde::Serialize;

pub use std::collections::BTreeMap as Map;
pub use std::vec::Vec as List;

pub(crate) use crate::value::cow::{get, ValueCow};
pub use crate::value::ser::to_value;
pub use crate::value::producer::{BoxError, Producer};

/// Data to be rendered represented as a recursive enum.
///
/// Besides plain data a value can be a [`Producer`], a zero-argument function
/// that is only invoked when a template actually references it.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
    Producer(Producer),
}

impl Value {
    /// Construct a lazily evaluated value from a closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use forma::Value;
    ///
    /// let greeting = Value::producer(|| "Hello World!");
    /// ```
    pub fn producer<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::Producer(Producer::new(f))
    }

    /// Returns a human readable name for the kind of value.
    pub(crate) fn human(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Producer(_) => "producer",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            (Self::Producer(s), Self::Producer(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(string) => serializer.serialize_str(string),
            Value::List(list) => list.serialize(serializer),
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            Value::Producer(producer) => {
                serializer.serialize_newtype_struct(ser::PRODUCER, &ser::Lazy(producer))
            }
        }
    }
}
