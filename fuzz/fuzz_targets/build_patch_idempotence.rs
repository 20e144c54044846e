#![no_main]

//! Derives a well-formed rich-text value from fuzzer bytes, builds it twice,
//! and checks that patching a built tree with a fresh copy of itself is a
//! structural no-op.

use libfuzzer_sys::fuzz_target;
use richdom::{
    BuildOptions, FormatDescriptor, LINE_SEPARATOR, ReplacementDescriptor, RichTextValue,
    apply_value, build_tree,
};

const TAGS: [&str; 4] = ["em", "strong", "a", "span"];

fn derive_value(data: &[u8]) -> RichTextValue {
    let mut text = String::new();
    for &byte in data.iter().take(512) {
        match byte % 8 {
            0 => text.push(' '),
            1 => text.push(LINE_SEPARATOR),
            _ => text.push((b'a' + byte % 26) as char),
        }
    }
    let mut value = RichTextValue::from_plain(text);
    let len = value.len();
    if len == 0 {
        return value;
    }

    for window in data.chunks(4).take(32) {
        let &[a, b, c, ..] = window else { break };
        let start = a as usize % len;
        let end = start + (b as usize % (len - start + 1));
        let tag = TAGS[c as usize % TAGS.len()];
        value.apply_format(start..end, FormatDescriptor::new(tag));
    }
    if let Some(&byte) = data.first() {
        let at = byte as usize % (value.len() + 1);
        value.insert_replacement(
            at,
            ReplacementDescriptor::new("img").with_attribute("src", "f.png"),
        );
    }

    let start = data.len() % (value.len() + 1);
    value.with_selection(start, value.len())
}

fuzz_target!(|data: &[u8]| {
    let value = derive_value(data);
    assert!(value.is_well_formed());

    let options = BuildOptions {
        multiline_tag: if data.len() % 2 == 0 { Some("p") } else { None },
        ..BuildOptions::default()
    };

    let first = build_tree(&value, &options);
    let second = build_tree(&value, &options);
    assert!(first.root.structurally_eq(&second.root));
    assert_eq!(first.start_path, second.start_path);
    assert_eq!(first.end_path, second.end_path);

    let mut current = first.root;
    let stats = apply_value(second.root, &mut current);
    assert!(stats.is_noop(), "self-patch must be a no-op: {stats:?}");
});
