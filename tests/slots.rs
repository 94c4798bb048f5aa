mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use forma::{value, Dependencies, Options, Value};

use crate::helpers::compile_with;

const LAYOUT: &str = "<header><slot header>Default header</slot></header><main>{{@ children }}</main><footer><slot footer>Default footer</slot></footer>";

#[test]
fn render_slot_defaults() {
    let renderer = compile_with("<component layout>Body</component>", &[("layout", LAYOUT)]);
    assert_eq!(
        renderer.render_from(&value! {}).unwrap(),
        "<header>Default header</header><main>Body</main><footer>Default footer</footer>"
    );
}

#[test]
fn render_slot_override() {
    let renderer = compile_with(
        r#"<component layout><render slot="header">My header</render>Body</component>"#,
        &[("layout", LAYOUT)],
    );
    assert_eq!(
        renderer.render_from(&value! {}).unwrap(),
        "<header>My header</header><main>Body</main><footer>Default footer</footer>"
    );
}

#[test]
fn render_slot_override_all() {
    let renderer = compile_with(
        r#"<component layout><render slot="footer">F</render><render slot="header">H</render></component>"#,
        &[("layout", LAYOUT)],
    );
    assert_eq!(
        renderer.render_from(&value! {}).unwrap(),
        "<header>H</header><main></main><footer>F</footer>"
    );
}

#[test]
fn render_slot_self_closing() {
    let renderer = compile_with(
        r#"<component card /> <component card><render slot="title">T</render></component>"#,
        &[("card", "[<slot title />]")],
    );
    assert_eq!(renderer.render_from(&value! {}).unwrap(), "[] [T]");
}

#[test]
fn render_slot_override_uses_caller_scope() {
    let renderer = compile_with(
        r#"<list users as="user"><component card name="inner"><render slot="title">{{ :user }} {{ name }}</render></component></list>"#,
        &[("card", "<h1><slot title>{{ name }}</slot></h1>")],
    );
    let ctx = value! { name: "outer", users: ["a"] };
    assert_eq!(renderer.render_from(&ctx).unwrap(), "<h1>a outer</h1>");
}

#[test]
fn render_slot_default_uses_component_scope() {
    let renderer = compile_with(
        r#"<component card name="inner" />"#,
        &[("card", "<h1><slot title>{{ name }}</slot></h1>")],
    );
    let ctx = value! { name: "outer" };
    assert_eq!(renderer.render_from(&ctx).unwrap(), "<h1>inner</h1>");
}

#[test]
fn render_slot_override_is_lazy_and_rendered_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let ctx = value! {
        n: Value::producer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "N"
        }),
    };
    let renderer = compile_with(
        r#"<component twice><render slot="a">{{ n }}</render><render slot="b">{{ n }}</render></component>"#,
        &[("twice", "<slot a /><slot a />")],
    );
    assert_eq!(renderer.render_from(&ctx).unwrap(), "NN");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn render_slot_unused_default_is_not_evaluated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let ctx = value! {
        n: Value::producer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "N"
        }),
    };
    let renderer = compile_with(
        r#"<component card>{{ n }}<render slot="x">O</render></component>"#,
        &[("card", "<slot x>{{@ children }}</slot>")],
    );
    assert_eq!(renderer.render_from(&ctx).unwrap(), "O");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn render_slot_override_outside_component_is_discarded() {
    let renderer = forma::compile(
        r#"a<render slot="x">hidden</render>b"#,
        Dependencies::new(),
        Options::default(),
    )
    .unwrap();
    assert_eq!(renderer.render_from(&value! {}).unwrap(), "ab");
}

#[test]
fn render_slot_override_in_active_branch() {
    let renderer = compile_with(
        r#"<component card><if condition={{ show }}><render slot="title">T</render>shown</if></component>"#,
        &[("card", "<h1><slot title>default</slot></h1>|{{@ children }}")],
    );
    assert_eq!(
        renderer.render_from(&value! { show: true }).unwrap(),
        "<h1>T</h1>|shown"
    );
    assert_eq!(
        renderer.render_from(&value! { show: false }).unwrap(),
        "<h1>default</h1>|"
    );
}

#[test]
fn render_slot_override_in_else_and_nested_branches() {
    let renderer = compile_with(
        r#"<component card><if condition={{ a }}>A<else><if not condition={{ b }}><render slot="title">not b</render></if></if></component>"#,
        &[("card", "<h1><slot title>default</slot></h1>")],
    );
    assert_eq!(renderer.render_from(&value! { a: true }).unwrap(), "<h1>default</h1>");
    assert_eq!(renderer.render_from(&value! {}).unwrap(), "<h1>not b</h1>");
    assert_eq!(renderer.render_from(&value! { b: true }).unwrap(), "<h1>default</h1>");
}

#[test]
fn render_slot_override_in_when_arm() {
    let renderer = compile_with(
        r#"<component page><when value-of={{ kind }}><case is="post"><render slot="title">Post</render></case><default><render slot="title">Page</render></default></when></component>"#,
        &[("page", "<h1><slot title>default</slot></h1>")],
    );
    assert_eq!(
        renderer.render_from(&value! { kind: "post" }).unwrap(),
        "<h1>Post</h1>"
    );
    assert_eq!(
        renderer.render_from(&value! { kind: "about" }).unwrap(),
        "<h1>Page</h1>"
    );
}

#[test]
fn render_slot_override_later_one_wins() {
    let renderer = compile_with(
        r#"<component card><render slot="title">first</render><if condition={{ t }}><render slot="title">second</render></if></component>"#,
        &[("card", "<slot title />")],
    );
    assert_eq!(renderer.render_from(&value! { t: true }).unwrap(), "second");
    assert_eq!(renderer.render_from(&value! { t: false }).unwrap(), "first");
}

#[test]
fn render_slot_override_inside_list_is_discarded() {
    let renderer = compile_with(
        r#"<component card><list xs as="x"><render slot="title">{{ :x }}</render>{{ :x }}</list></component>"#,
        &[("card", "<slot title>default</slot>|{{@ children }}")],
    );
    assert_eq!(
        renderer.render_from(&value! { xs: [1, 2] }).unwrap(),
        "default|12"
    );
}

#[test]
fn render_slot_overrides_do_not_leak_into_nested_components() {
    let renderer = compile_with(
        r#"<component outer><render slot="title">Outer title</render></component>"#,
        &[
            ("outer", "<slot title /> <component inner />"),
            ("inner", "<slot title>Inner default</slot>"),
        ],
    );
    assert_eq!(
        renderer.render_from(&value! {}).unwrap(),
        "Outer title Inner default"
    );
}

#[test]
fn render_slot_forwarded_to_nested_component() {
    let renderer = compile_with(
        r#"<component outer><render slot="title">T</render></component>"#,
        &[
            ("outer", r#"<component inner><render slot="title">[<slot title />]</render></component>"#),
            ("inner", "<h1><slot title /></h1>"),
        ],
    );
    assert_eq!(renderer.render_from(&value! {}).unwrap(), "<h1>[T]</h1>");
}

#[test]
fn render_slot_inside_list_and_conditional() {
    let renderer = compile_with(
        r#"<component card ~xs><render slot="item">*</render></component>"#,
        &[(
            "card",
            r#"<list xs as="x"><if condition={{ :x }}><slot item>-</slot></if>{{ :x }}</list>"#,
        )],
    );
    let ctx = value! { xs: [true, false, true] };
    assert_eq!(renderer.render_from(&ctx).unwrap(), "*true*true");
}

#[test]
fn render_slot_from_parent_context() {
    let renderer = forma::compile(
        "<title><slot title>Untitled</slot></title><slot body />",
        Dependencies::new(),
        Options::default(),
    )
    .unwrap();
    assert_eq!(
        renderer.render_from(&value! {}).unwrap(),
        "<title>Untitled</title>"
    );
    let parent = value! { title: "Home", body: "<p>Welcome</p>" };
    assert_eq!(
        renderer.render_with_parent(&value! {}, &parent).unwrap(),
        "<title>Home</title>&lt;p&gt;Welcome&lt;/p&gt;"
    );
}

#[test]
fn render_slot_from_parent_context_producer() {
    let renderer = forma::compile("<slot body />", Dependencies::new(), Options::default()).unwrap();
    let parent = value! { body => "<b>lazy</b>" };
    assert_eq!(
        renderer.render_with_parent(&value! {}, &parent).unwrap(),
        "&lt;b&gt;lazy&lt;/b&gt;"
    );
}
