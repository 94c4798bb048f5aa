use forma::{value, Dependencies, ErrorKind, Options, PortableUnit, Renderer};

#[test]
fn portable_text_round_trip() {
    let mut deps = Dependencies::new();
    deps.insert("card", "<b>{{ title }}</b><slot extra>!</slot>");
    let unit = forma::compile_to_portable(
        r#"<list items as="item"><component card title={{ :item }} /></list>"#,
        deps,
        Options::default(),
    )
    .unwrap();

    let text = unit.to_text();
    assert!(text.starts_with("forma-unit/1\n"));
    assert!(PortableUnit::is_portable(&text));

    let renderer = PortableUnit::from_text(&text).unwrap().into_renderer();
    let result = renderer.render_from(&value! { items: ["a", "b"] }).unwrap();
    assert_eq!(result, "<b>a</b>!<b>b</b>!");
}

#[test]
fn portable_display_and_from_str() {
    let unit =
        forma::compile_to_portable("{{ x }}", Dependencies::new(), Options::default()).unwrap();
    let text = unit.to_string();
    assert_eq!(text, unit.to_text());

    let parsed: PortableUnit = text.parse().unwrap();
    let renderer = Renderer::from(parsed);
    assert_eq!(renderer.render_from(&value! { x: 1 }).unwrap(), "1");
}

#[test]
fn portable_serde_round_trip() {
    let unit =
        forma::compile_to_portable("<i>{{ x }}</i>", Dependencies::new(), Options::default())
            .unwrap();
    let json = serde_json::to_string(&unit).unwrap();
    let unit: PortableUnit = serde_json::from_str(&json).unwrap();
    assert_eq!(
        unit.into_renderer().render_from(&value! { x: "y" }).unwrap(),
        "<i>y</i>"
    );
}

#[test]
fn portable_from_renderer() {
    let renderer = forma::compile("[{{ x }}]", Dependencies::new(), Options::default()).unwrap();
    let text = renderer.to_portable().to_text();

    let mut deps = Dependencies::new();
    deps.insert("wrapped", text);
    let outer = forma::compile("<component wrapped ~x />", deps, Options::default()).unwrap();
    assert_eq!(outer.render_from(&value! { x: 1 }).unwrap(), "[1]");
}

#[test]
fn portable_recursive() {
    let template = r#"{{ n }}<list next as="n"><component self n={{ :n.n }} next={ :n.next } /></list>"#;
    let unit =
        forma::compile_to_portable(template, Dependencies::new(), Options { recursive: true })
            .unwrap();
    let renderer = PortableUnit::from_text(&unit.to_text())
        .unwrap()
        .into_renderer();
    let ctx = value! { n: 1, next: [{ n: 2, next: [{ n: 3, next: [] }] }] };
    assert_eq!(renderer.render_from(&ctx).unwrap(), "123");
}

#[test]
fn portable_missing_header() {
    let err = PortableUnit::from_text("{}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dependency);
    assert_eq!(
        err.message(),
        "invalid precompiled template: missing `forma-unit/1` header"
    );
}

#[test]
fn portable_malformed_json() {
    let err = PortableUnit::from_text("forma-unit/1\n{\"source\":").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dependency);
    assert!(err.message().starts_with("invalid precompiled template: "));
}

#[test]
fn portable_out_of_bounds_span() {
    let unit = forma::compile_to_portable("abc", Dependencies::new(), Options::default()).unwrap();
    let text = unit.to_text().replace("\"n\":3", "\"n\":99");
    let err = PortableUnit::from_text(&text).unwrap_err();
    assert_eq!(
        err.message(),
        "invalid precompiled template: span 0..99 is out of bounds"
    );
}

#[test]
fn portable_malformed_dependency() {
    let mut deps = Dependencies::new();
    deps.insert("card", "forma-unit/1\nnot json");
    let err = forma::compile("<component card />", deps, Options::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dependency);
    assert!(err
        .message()
        .starts_with("invalid template for dependency `card`: invalid precompiled template"));
}

#[test]
fn portable_deeply_nested_template_round_trip() {
    let source = format!("{}x", "<if condition={{ a }}>".repeat(64));
    let text = forma::compile_to_portable(&source, Dependencies::new(), Options::default())
        .unwrap()
        .to_text();
    let renderer = PortableUnit::from_text(&text).unwrap().into_renderer();
    assert_eq!(renderer.render_from(&value! { a: true }).unwrap(), "x");
    assert_eq!(renderer.render_from(&value! {}).unwrap(), "");
}
