//! A serde serializer that builds a [`Value`] directly.
//!
//! A [`Value::Producer`] serializes as a newtype struct named [`PRODUCER`]
//! wrapping a [`Lazy`]. This serializer recognizes the name and keeps the
//! producer itself, every other serializer sees the produced value.

use std::cell::{Cell, RefCell};
use std::fmt::Display;

use serde::ser::{self, Serialize};

use crate::{Error, List, Map, Producer, Result, Value};

/// The newtype struct name that [`Value::Producer`] serializes under.
pub(crate) const PRODUCER: &str = "$forma::private::Producer";

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static CAPTURED: RefCell<Option<Producer>> = const { RefCell::new(None) };
}

/// Convert a `T` to a `Value`.
///
/// Any [`Producer`] inside a [`Value`] that is part of `value` is carried
/// over without being invoked.
///
/// # Examples
///
/// ```
/// #[derive(serde::Serialize)]
/// struct User {
///     name: &'static str,
///     admin: bool,
/// }
///
/// let value = forma::to_value(User { name: "Ann", admin: false })?;
/// assert_eq!(value, forma::value! { name: "Ann", admin: false });
/// # Ok::<(), forma::Error>(())
/// ```
pub fn to_value<T>(value: T) -> Result<Value>
where
    T: Serialize,
{
    value.serialize(Serializer)
}

/// The inside of a serialized [`Value::Producer`].
pub(crate) struct Lazy<'a>(pub &'a Producer);

impl Serialize for Lazy<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        if CAPTURING.with(|c| c.replace(false)) {
            CAPTURED.with(|slot| *slot.borrow_mut() = Some(self.0.clone()));
            return serializer.serialize_unit();
        }
        match self.0.call() {
            Ok(value) => value.serialize(serializer),
            Err(err) => Err(ser::Error::custom(err)),
        }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::serialize(msg)
    }
}

pub struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = Seq;
    type SerializeTuple = Seq;
    type SerializeTupleStruct = Seq;
    type SerializeTupleVariant = Seq;
    type SerializeMap = Fields;
    type SerializeStruct = Fields;
    type SerializeStructVariant = Fields;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::List(v.iter().map(|b| Value::Integer((*b).into())).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        if name != PRODUCER {
            return value.serialize(self);
        }
        CAPTURING.with(|c| c.set(true));
        let result = value.serialize(Serializer);
        CAPTURING.with(|c| c.set(false));
        let value = result?;
        Ok(CAPTURED
            .with(|slot| slot.borrow_mut().take())
            .map_or(value, Value::Producer))
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Seq> {
        Ok(Seq::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Seq> {
        Ok(Seq::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Seq> {
        Ok(Seq::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Seq> {
        Ok(Seq::new(Some(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Fields> {
        Ok(Fields::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Fields> {
        Ok(Fields::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Fields> {
        Ok(Fields::new(Some(variant)))
    }
}

/// Wraps a variant's content in a single entry map keyed by the variant.
fn tagged(variant: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_owned(), value);
    Value::Map(map)
}

/// Collects the elements of sequences and tuples.
pub struct Seq {
    variant: Option<&'static str>,
    items: List<Value>,
}

impl Seq {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            items: List::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        let list = Value::List(self.items);
        Ok(match self.variant {
            Some(variant) => tagged(variant, list),
            None => list,
        })
    }
}

macro_rules! impl_seq {
    ($($trait:ident::$method:ident),+) => {
        $(
            impl ser::$trait for Seq {
                type Ok = Value;
                type Error = Error;

                fn $method<T>(&mut self, value: &T) -> Result<()>
                where
                    T: ?Sized + Serialize,
                {
                    self.push(value)
                }

                fn end(self) -> Result<Value> {
                    self.finish()
                }
            }
        )+
    };
}

impl_seq! {
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field
}

/// Collects the entries of maps and the fields of structs.
pub struct Fields {
    variant: Option<&'static str>,
    map: Map<String, Value>,
    key: Option<String>,
}

impl Fields {
    fn new(variant: Option<&'static str>) -> Self {
        Self {
            variant,
            map: Map::new(),
            key: None,
        }
    }

    fn insert<T>(&mut self, key: String, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, value.serialize(Serializer)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        let map = Value::Map(self.map);
        Ok(match self.variant {
            Some(variant) => tagged(variant, map),
            None => map,
        })
    }
}

impl ser::SerializeMap for Fields {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key = Some(map_key(key.serialize(Serializer)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match self.key.take() {
            Some(key) => self.insert(key, value),
            None => Err(ser::Error::custom("map value without a key")),
        }
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStruct for Fields {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for Fields {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

/// Map keys become strings, scalars are written out in their text form.
fn map_key(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        key => Err(ser::Error::custom(format_args!(
            "map key must be a string, found {}",
            key.human()
        ))),
    }
}
