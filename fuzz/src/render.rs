#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
#[serde(untagged)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Vec<(&str, &str)>, Value, Value, bool)| {
    let (root, deps, ctx, parent, recursive) = data;
    let deps: forma::Dependencies = deps.into_iter().collect();
    let Ok(renderer) = forma::compile(root, deps, forma::Options { recursive }) else {
        return;
    };
    let (Ok(ctx), Ok(parent)) = (forma::to_value(ctx), forma::to_value(parent)) else {
        return;
    };
    let _ = renderer.with_max_depth(16).render_with_parent(&ctx, &parent);
});
