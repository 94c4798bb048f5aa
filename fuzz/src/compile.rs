#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, bool)| {
    let (source, recursive) = data;
    let _ = forma::compile(source, forma::Dependencies::new(), forma::Options { recursive });
});
