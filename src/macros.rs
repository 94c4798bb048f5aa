/// Construct a map [`Value`][crate::Value] from a JSON-like literal.
///
/// Keys are identifiers or string literals. A value is a nested `{...}` map,
/// a `[...]` list, `None` or any expression with a `From` conversion into a
/// [`Value`][crate::Value].
///
/// An entry written as `key => expr` is lazy: the expression becomes the body
/// of a [`Producer`][crate::Producer] and is only evaluated when a template
/// references the key. It has to be `'static` so it usually captures clones.
///
/// # Examples
///
/// ```
/// let name = String::from("John");
/// let ctx = forma::value! {
///     user: { name: name.clone(), age: 52 },
///     pets: ["Rex", "Tom"],
///     "page-title": "Profile",
///     greeting => format!("Hello {name}!"),
/// };
/// ```
#[macro_export]
macro_rules! value {
    ($($entries:tt)*) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Map::new();
        $crate::__value_entries!(map; $($entries)*);
        $crate::Value::Map(map)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_entries {
    ($map:ident;) => {};

    ($map:ident; $key:tt : None $(, $($rest:tt)*)?) => {
        let _ = $map.insert($crate::__value_key!($key), $crate::Value::None);
        $crate::__value_entries!($map; $($($rest)*)?);
    };

    ($map:ident; $key:tt : [$($items:tt)*] $(, $($rest:tt)*)?) => {
        let _ = $map.insert($crate::__value_key!($key), $crate::__value_list!($($items)*));
        $crate::__value_entries!($map; $($($rest)*)?);
    };

    ($map:ident; $key:tt : {$($entries:tt)*} $(, $($rest:tt)*)?) => {
        let _ = $map.insert($crate::__value_key!($key), $crate::value!($($entries)*));
        $crate::__value_entries!($map; $($($rest)*)?);
    };

    ($map:ident; $key:tt : $value:expr $(, $($rest:tt)*)?) => {
        let _ = $map.insert($crate::__value_key!($key), $crate::Value::from($value));
        $crate::__value_entries!($map; $($($rest)*)?);
    };

    ($map:ident; $key:tt => $value:expr $(, $($rest:tt)*)?) => {
        let _ = $map.insert(
            $crate::__value_key!($key),
            $crate::Value::producer(move || $value),
        );
        $crate::__value_entries!($map; $($($rest)*)?);
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_list {
    ($($items:tt)*) => {{
        #[allow(unused_mut)]
        let mut list = $crate::List::new();
        $crate::__value_items!(list; $($items)*);
        $crate::Value::List(list)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_items {
    ($list:ident;) => {};

    ($list:ident; None $(, $($rest:tt)*)?) => {
        $list.push($crate::Value::None);
        $crate::__value_items!($list; $($($rest)*)?);
    };

    ($list:ident; [$($items:tt)*] $(, $($rest:tt)*)?) => {
        $list.push($crate::__value_list!($($items)*));
        $crate::__value_items!($list; $($($rest)*)?);
    };

    ($list:ident; {$($entries:tt)*} $(, $($rest:tt)*)?) => {
        $list.push($crate::value!($($entries)*));
        $crate::__value_items!($list; $($($rest)*)?);
    };

    ($list:ident; $value:expr $(, $($rest:tt)*)?) => {
        $list.push($crate::Value::from($value));
        $crate::__value_items!($list; $($($rest)*)?);
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_key {
    ($key:ident) => {
        ::std::string::String::from(::std::stringify!($key))
    };
    ($key:literal) => {
        ::std::string::String::from($key)
    };
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::{List, Map, Value};

    #[test]
    fn value_empty() {
        assert_eq!(value! {}, Value::Map(Map::new()));
    }

    #[test]
    fn value_scalars() {
        let v = value! { a: None, b: true, c: 7, d: -1.5, e: "hi" };
        let mut exp = Map::new();
        exp.insert(String::from("a"), Value::None);
        exp.insert(String::from("b"), Value::Bool(true));
        exp.insert(String::from("c"), Value::Integer(7));
        exp.insert(String::from("d"), Value::Float(-1.5));
        exp.insert(String::from("e"), Value::from("hi"));
        assert_eq!(v, Value::Map(exp));
    }

    #[test]
    fn value_nested() {
        let v = value! {
            user: { name: "John", pets: ["Rex", None, {}, []] },
            "data-id": 3,
        };
        let mut user = Map::new();
        user.insert(String::from("name"), Value::from("John"));
        user.insert(
            String::from("pets"),
            Value::List(vec![
                Value::from("Rex"),
                Value::None,
                Value::Map(Map::new()),
                Value::List(List::new()),
            ]),
        );
        let mut exp = Map::new();
        exp.insert(String::from("user"), Value::Map(user));
        exp.insert(String::from("data-id"), Value::Integer(3));
        assert_eq!(v, Value::Map(exp));
    }

    #[test]
    fn value_list_expressions() {
        let xs = [1, 2, 3];
        let v = value! { n: [xs.len(), [4, 5].len()] };
        assert_eq!(v, value! { n: [3, 2] });
    }

    #[test]
    fn value_lazy_entry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let v = value! {
            eager: 1,
            lazy => {
                counter.fetch_add(1, Ordering::SeqCst);
                "x"
            },
        };
        let Value::Map(map) = &v else {
            panic!("expected a map");
        };
        assert!(matches!(map["lazy"], Value::Producer(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
