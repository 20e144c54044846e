use criterion::{Criterion, black_box, criterion_group, criterion_main};
use richdom::{
    BuildOptions, FormatDescriptor, LINE_SEPARATOR, ReplacementDescriptor, RichTextValue,
    apply_value, build_tree,
};

const SMALL_WORDS: usize = 64;
const LARGE_WORDS: usize = 20_000;

fn make_value(words: usize) -> RichTextValue {
    let mut text = String::with_capacity(words * 6);
    for i in 0..words {
        if i != 0 {
            if i % 32 == 0 {
                text.push(LINE_SEPARATOR);
            } else {
                text.push(' ');
            }
        }
        text.push_str("word");
    }
    let mut value = RichTextValue::from_plain(text);

    // Alternate emphasis runs so the builder opens and closes elements at a
    // realistic rate, and drop a replacement in every 16th word.
    let len = value.len();
    let mut offset = 0;
    let mut word = 0;
    while offset + 4 <= len {
        if word % 2 == 0 {
            value.apply_format(offset..offset + 4, FormatDescriptor::new("em"));
        }
        if word % 16 == 7 {
            value.insert_replacement(
                offset,
                ReplacementDescriptor::new("img").with_attribute("src", "x.png"),
            );
            offset += 1;
        }
        offset += 5;
        word += 1;
    }
    value
}

fn edited_copy(value: &RichTextValue) -> RichTextValue {
    let mut edited = value.clone();
    edited.apply_format(0..4, FormatDescriptor::new("strong"));
    edited.text.push_str(" tail");
    for _ in 0..5 {
        edited.formats.push(Vec::new());
    }
    edited
}

fn bench_build_small(c: &mut Criterion) {
    let value = make_value(SMALL_WORDS);
    let options = BuildOptions {
        multiline_tag: Some("p"),
        ..BuildOptions::default()
    };
    c.bench_function("bench_build_small", |b| {
        b.iter(|| {
            let built = build_tree(black_box(&value), &options);
            black_box(built.root.children().map(|children| children.len()));
        });
    });
}

fn bench_build_large(c: &mut Criterion) {
    let value = make_value(LARGE_WORDS);
    let options = BuildOptions {
        multiline_tag: Some("p"),
        ..BuildOptions::default()
    };
    c.bench_function("bench_build_large", |b| {
        b.iter(|| {
            let built = build_tree(black_box(&value), &options);
            black_box(built.root.children().map(|children| children.len()));
        });
    });
}

fn bench_patch_noop_large(c: &mut Criterion) {
    let value = make_value(LARGE_WORDS);
    let options = BuildOptions {
        multiline_tag: Some("p"),
        ..BuildOptions::default()
    };
    let mut current = build_tree(&value, &options).root;
    c.bench_function("bench_patch_noop_large", |b| {
        b.iter(|| {
            let future = build_tree(black_box(&value), &options).root;
            let stats = apply_value(future, &mut current);
            assert!(stats.is_noop());
            black_box(&current);
        });
    });
}

fn bench_patch_edit_large(c: &mut Criterion) {
    let value = make_value(LARGE_WORDS);
    let edited = edited_copy(&value);
    let options = BuildOptions {
        multiline_tag: Some("p"),
        ..BuildOptions::default()
    };
    c.bench_function("bench_patch_edit_large", |b| {
        b.iter(|| {
            let mut current = build_tree(&value, &options).root;
            let future = build_tree(black_box(&edited), &options).root;
            let stats = apply_value(future, &mut current);
            black_box(stats);
        });
    });
}

criterion_group!(
    benches,
    bench_build_small,
    bench_build_large,
    bench_patch_noop_large,
    bench_patch_edit_large
);
criterion_main!(benches);
