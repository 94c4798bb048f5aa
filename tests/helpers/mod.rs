#![allow(dead_code)]

mod writer;

pub use self::writer::Sink;

use forma::{Dependencies, Options, Renderer};

/// Compile a template with the given named dependencies.
pub fn compile_with(source: &str, deps: &[(&str, &str)]) -> Renderer {
    let deps: Dependencies = deps.iter().copied().collect();
    forma::compile(source, deps, Options::default()).unwrap()
}
