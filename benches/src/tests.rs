use crate::context::{Context, Member, Role};

#[test]
fn page() {
    let renderer = crate::compile(crate::PAGE, crate::dependencies());
    let result = renderer.render(context()).unwrap();
    assert!(result.contains("<title>Hawkins members</title>"));
    assert!(result.contains("<h1>Hawkins</h1>"));
    assert!(result.contains(
        r#"<li class="active"><b>nancy</b> Admin (17) #news #av</li><li class="active"><b>steve</b> Editor (-2)</li><li class="banned"><b>billy</b> Reader (0) #&lt;pool&gt;</li>"#
    ));
}

#[test]
fn page_without_members() {
    let renderer = crate::compile(crate::PAGE, crate::dependencies());
    let ctx = Context {
        site: String::new(),
        members: Vec::new(),
    };
    let result = renderer.render(ctx).unwrap();
    assert!(result.contains("<title> members</title>"));
    assert!(result.contains("<li>No members</li>"));
}

#[test]
fn page_with_portable_dependencies() {
    let raw = crate::compile(crate::PAGE, crate::dependencies());
    let portable = crate::compile(crate::PAGE, crate::portable_dependencies());
    assert_eq!(
        raw.render(context()).unwrap(),
        portable.render(context()).unwrap()
    );

    let loaded = crate::load(&raw.to_portable().to_text());
    assert_eq!(
        raw.render(context()).unwrap(),
        loaded.render(context()).unwrap()
    );
}

#[test]
fn random_context_renders() {
    let renderer = crate::compile(crate::PAGE, crate::dependencies());
    let result = renderer.render(crate::context::random(25)).unwrap();
    assert_eq!(result.matches("<li class=").count(), 25);
}

fn member(handle: &str, role: Role, karma: i64, tags: &[&str], banned: bool) -> Member {
    Member {
        handle: handle.to_owned(),
        role,
        karma,
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        banned,
    }
}

fn context() -> Context {
    Context {
        site: "Hawkins".to_owned(),
        members: vec![
            member("nancy", Role::Admin, 17, &["news", "av"], false),
            member("steve", Role::Editor, -2, &[], false),
            member("billy", Role::Reader, 0, &["<pool>"], true),
        ],
    }
}
