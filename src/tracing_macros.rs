//! Logging macros that compile to nothing when the `tracing` feature is
//! disabled.

/// Emit a trace-level event.
#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Emit a trace-level event (no-op version).
#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Emit a debug-level event.
#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Emit a debug-level event (no-op version).
#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
