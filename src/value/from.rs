use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::value::Producer;
use crate::{List, Value};

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )+
    };
}

impl_from! {
    () => |_unit| Value::None,
    bool => |b| Value::Bool(b),
    char => |c| Value::String(c.to_string()),
    i8 => |n| Value::Integer(n.into()),
    i16 => |n| Value::Integer(n.into()),
    i32 => |n| Value::Integer(n.into()),
    i64 => |n| Value::Integer(n),
    u8 => |n| Value::Integer(n.into()),
    u16 => |n| Value::Integer(n.into()),
    u32 => |n| Value::Integer(n.into()),
    f32 => |n| Value::Float(n.into()),
    f64 => |n| Value::Float(n),
    String => |s| Value::String(s),
    Producer => |p| Value::Producer(p),
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<'a> From<&'a String> for Value {
    fn from(s: &'a String) -> Self {
        Value::String(s.clone())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(s: Cow<'a, str>) -> Self {
        Value::String(s.into_owned())
    }
}

// Anything outside the `i64` range becomes a float.
macro_rules! impl_from_lossy {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    i64::try_from(n).map_or(Value::Float(n as f64), Value::Integer)
                }
            }
        )+
    };
}

impl_from_lossy!(u64, u128, i128, usize, isize);

impl<V> From<Option<V>> for Value
where
    V: Into<Value>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl<V> From<Vec<V>> for Value
where
    V: Into<Value>,
{
    fn from(list: Vec<V>) -> Self {
        list.into_iter().collect()
    }
}

impl<V, const N: usize> From<[V; N]> for Value
where
    V: Into<Value>,
{
    fn from(list: [V; N]) -> Self {
        list.into_iter().collect()
    }
}

impl<V> From<&[V]> for Value
where
    V: Clone + Into<Value>,
{
    fn from(list: &[V]) -> Self {
        list.iter().cloned().collect()
    }
}

impl<K, V> From<BTreeMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V> FromIterator<V> for Value
where
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Value::List(iter.into_iter().map(Into::into).collect::<List<_>>())
    }
}
