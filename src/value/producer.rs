use std::fmt;
use std::sync::Arc;

use crate::Value;

/// A boxed error returned by a failing [`Producer`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type ProducerFn = dyn Fn() -> Result<Value, BoxError> + Send + Sync + 'static;

/// A zero-argument function that supplies a [`Value`] on demand.
///
/// Producers are resolved lazily: the function only runs when a template
/// references the value and it runs once for each such reference. A producer
/// that fails surfaces as an [`ErrorKind::Render`][crate::ErrorKind::Render]
/// error with the producer's error as its source.
#[derive(Clone)]
pub struct Producer(Arc<ProducerFn>);

impl Producer {
    /// Wraps an infallible closure.
    pub fn new<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self(Arc::new(move || Ok(f().into())))
    }

    /// Wraps a closure that may fail.
    pub fn fallible<F, V, E>(f: F) -> Self
    where
        F: Fn() -> Result<V, E> + Send + Sync + 'static,
        V: Into<Value>,
        E: Into<BoxError>,
    {
        Self(Arc::new(move || f().map(Into::into).map_err(Into::into)))
    }

    pub(crate) fn call(&self) -> Result<Value, BoxError> {
        (self.0)()
    }
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer(..)")
    }
}
