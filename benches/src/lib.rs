pub mod context;
#[cfg(test)]
mod tests;

use forma::{Dependencies, Options, PortableUnit, Renderer};

/// A member directory page wrapped in [`LAYOUT`].
pub const PAGE: &str = r#"<component layout>
  <render slot="title">{{ site }} members</render>
  <h1>{{ site }}</h1>
  <ul>
    <list members as="member"><component row member={{ &:member }} /><empty><li>No members</li></empty></list>
  </ul>
</component>
"#;

/// The page shell, with a `title` slot and the page body as children.
pub const LAYOUT: &str = r#"<html><head><title><slot title>Untitled</slot></title></head><body>{{@ children }}</body></html>"#;

/// A single member entry, used by [`PAGE`].
pub const ROW: &str = r#"<li class="<if condition={{ member.banned }}>banned<else>active</if>"><b>{{ member.handle }}</b> <when value-of={{ member.role }}><case is="admin">Admin</case><case is="editor">Editor</case><default>Reader</default></when> ({{ member.karma }})<list member.tags as="tag"> #{{ :tag }}</list></li>"#;

/// The dependencies of [`PAGE`] as raw templates.
pub fn dependencies() -> Dependencies {
    let mut deps = Dependencies::new();
    deps.insert("layout", LAYOUT);
    deps.insert("row", ROW);
    deps
}

/// The dependencies of [`PAGE`] in the portable text form.
pub fn portable_dependencies() -> Dependencies {
    let portable = |source: &str| {
        forma::compile_to_portable(source, Dependencies::new(), Options::default())
            .unwrap()
            .to_text()
    };
    let mut deps = Dependencies::new();
    deps.insert("layout", portable(LAYOUT));
    deps.insert("row", portable(ROW));
    deps
}

/// Compile `source` with the dependencies of [`PAGE`].
pub fn compile(source: &str, deps: Dependencies) -> Renderer {
    forma::compile(source, deps, Options::default()).unwrap()
}

/// Decode a portable unit and return it as a renderer.
pub fn load(text: &str) -> Renderer {
    PortableUnit::from_text(text).unwrap().into_renderer()
}

/// Repeat a template body `n` times.
pub fn repeat(source: &str, n: usize) -> String {
    let mut s = String::new();
    for _ in 0..n {
        s.push_str(source);
    }
    s
}
