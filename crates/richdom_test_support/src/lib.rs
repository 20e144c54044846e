//! Golden fixture corpus for the tree builder.
//!
//! Each fixture pairs a rich-text value (plus build options) with the exact
//! tree and selection paths the builder must produce. Expected trees are
//! constructed by hand; the corpus is the behavioral contract, not a record
//! of past output.

use richdom::{
    Attribute, FormatDescriptor, LINE_SEPARATOR, Node, ReplacementContent, ReplacementDescriptor,
    RichTextValue, TreePath,
};

pub struct BuildFixture {
    pub name: &'static str,
    pub value: RichTextValue,
    pub multiline_tag: Option<&'static str>,
    pub expected: Node,
    pub expected_start_path: Option<TreePath>,
    pub expected_end_path: Option<TreePath>,
}

pub fn element(name: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
    let mut node = Node::element(name);
    match &mut node {
        Node::Element {
            attributes: attrs,
            children: kids,
            ..
        } => {
            *attrs = attributes
                .iter()
                .map(|(name, value)| Attribute::new(*name, *value))
                .collect();
            *kids = children;
        }
        Node::Text { .. } => unreachable!(),
    }
    node
}

pub fn text(content: &str) -> Node {
    Node::text(content)
}

pub fn body(children: Vec<Node>) -> Node {
    element("body", &[], children)
}

pub fn fixtures() -> Vec<BuildFixture> {
    let mut fixtures = Vec::new();

    fixtures.push(BuildFixture {
        name: "empty value with requested selection",
        value: RichTextValue::from_plain("").with_selection(0, 0),
        multiline_tag: None,
        expected: body(Vec::new()),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "plain text with full selection",
        value: RichTextValue::from_plain("test").with_selection(0, 4),
        multiline_tag: None,
        expected: body(vec![text("test")]),
        expected_start_path: Some(vec![0, 0]),
        expected_end_path: Some(vec![0, 4]),
    });

    fixtures.push(BuildFixture {
        name: "format run splits surrounding text",
        value: {
            let mut value = RichTextValue::from_plain("one two three");
            value.apply_format(4..7, FormatDescriptor::new("strong"));
            value
        },
        multiline_tag: None,
        expected: body(vec![
            text("one "),
            element("strong", &[], vec![text("two")]),
            text(" three"),
        ]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "nested formats follow stack order",
        value: {
            let mut value = RichTextValue::from_plain("abcd");
            value.apply_format(1..4, FormatDescriptor::new("em"));
            value.apply_format(2..3, FormatDescriptor::new("strong"));
            value
        },
        multiline_tag: None,
        expected: body(vec![
            text("a"),
            element(
                "em",
                &[],
                vec![
                    text("b"),
                    element("strong", &[], vec![text("c")]),
                    text("d"),
                ],
            ),
        ]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "unequal attributes split equal tags",
        value: {
            let mut value = RichTextValue::from_plain("ab");
            value.apply_format(0..1, FormatDescriptor::new("a").with_attribute("href", "#1"));
            value.apply_format(1..2, FormatDescriptor::new("a").with_attribute("href", "#2"));
            value
        },
        multiline_tag: None,
        expected: body(vec![
            element("a", &[("href", "#1")], vec![text("a")]),
            element("a", &[("href", "#2")], vec![text("b")]),
        ]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "replacement sits between text runs",
        value: {
            let mut value = RichTextValue::from_plain("ab");
            value.insert_replacement(
                1,
                ReplacementDescriptor::new("img").with_attribute("src", "x.png"),
            );
            value
        },
        multiline_tag: None,
        expected: body(vec![
            text("a"),
            element("img", &[("src", "x.png")], Vec::new()),
            text("b"),
        ]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "replacement inside an unbroken format run",
        value: {
            let mut value = RichTextValue::from_plain("ab");
            value.apply_format(0..2, FormatDescriptor::new("em"));
            value.insert_replacement(1, ReplacementDescriptor::new("img"));
            value.formats[1] = value.formats[0].clone();
            value
        },
        multiline_tag: None,
        expected: body(vec![element(
            "em",
            &[],
            vec![text("a"), element("img", &[], Vec::new()), text("b")],
        )]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "replacement with nested inner content",
        value: {
            let mut value = RichTextValue::from_plain("");
            value.insert_replacement(
                0,
                ReplacementDescriptor::new("figure")
                    .with_child(ReplacementContent::Element(
                        ReplacementDescriptor::new("img").with_attribute("src", "a.png"),
                    ))
                    .with_child(ReplacementContent::Text("caption".to_string())),
            );
            value
        },
        multiline_tag: None,
        expected: body(vec![element(
            "figure",
            &[],
            vec![
                element("img", &[("src", "a.png")], Vec::new()),
                text("caption"),
            ],
        )]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures.push(BuildFixture {
        name: "multiline paragraphs prefix selection paths",
        value: RichTextValue::from_plain(format!("one{LINE_SEPARATOR}two")).with_selection(0, 7),
        multiline_tag: Some("p"),
        expected: body(vec![
            element("p", &[], vec![text("one")]),
            element("p", &[], vec![text("two")]),
        ]),
        expected_start_path: Some(vec![0, 0, 0]),
        expected_end_path: Some(vec![1, 0, 3]),
    });

    fixtures.push(BuildFixture {
        name: "caret before a leading replacement anchors to an empty text node",
        value: {
            let mut value = RichTextValue::from_plain("");
            value.insert_replacement(
                0,
                ReplacementDescriptor::new("img").with_attribute("src", "x.png"),
            );
            value.with_selection(0, 0)
        },
        multiline_tag: None,
        expected: body(vec![
            text(""),
            element("img", &[("src", "x.png")], Vec::new()),
        ]),
        expected_start_path: Some(vec![0, 0]),
        expected_end_path: Some(vec![0, 0]),
    });

    fixtures.push(BuildFixture {
        name: "caret inside a format run",
        value: {
            let mut value = RichTextValue::from_plain("ab");
            value.apply_format(1..2, FormatDescriptor::new("em"));
            value.with_selection(1, 1)
        },
        multiline_tag: None,
        expected: body(vec![
            text("a"),
            element("em", &[], vec![text("b")]),
        ]),
        expected_start_path: Some(vec![1, 0, 0]),
        expected_end_path: Some(vec![1, 0, 0]),
    });

    fixtures.push(BuildFixture {
        name: "svg namespace with xlink attribute",
        value: {
            let mut value = RichTextValue::from_plain("a");
            value.apply_format(0..1, FormatDescriptor::new("svg"));
            value.insert_replacement(
                1,
                ReplacementDescriptor::new("use").with_attribute("xlink:href", "#icon"),
            );
            value.formats[1] = vec![FormatDescriptor::new("svg")];
            value
        },
        multiline_tag: None,
        expected: body(vec![element(
            "svg",
            &[],
            vec![
                text("a"),
                element("use", &[("xlink:href", "#icon")], Vec::new()),
            ],
        )]),
        expected_start_path: None,
        expected_end_path: None,
    });

    fixtures
}

/// Verify every fixture value satisfies the model invariants. Test binaries
/// call this up front so corpus regressions fail with a clear name.
pub fn assert_corpus_well_formed() {
    for fixture in fixtures() {
        assert!(
            fixture.value.is_well_formed(),
            "fixture {:?} violates value invariants",
            fixture.name
        );
    }
}
