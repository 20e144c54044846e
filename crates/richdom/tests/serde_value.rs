#![cfg(feature = "serde")]

//! Values arrive from the editing client as JSON; the decoded value must be
//! well formed and build the same tree as its hand-constructed twin.

use richdom::{
    BuildOptions, ReplacementDescriptor, RichTextValue, build_tree, inner_html,
};

#[test]
fn value_decodes_from_client_json() {
    let json = r#"{
        "text": "a￼b",
        "formats": [[{"tag": "em"}], [{"tag": "em"}], [{"tag": "em"}]],
        "replacements": {"1": {"tag": "img", "attributes": [["src", "x.png"]]}}
    }"#;
    let decoded: RichTextValue = serde_json::from_str(json).expect("value should decode");
    assert!(decoded.is_well_formed());

    let mut expected = RichTextValue::from_plain("ab");
    expected.apply_format(0..2, richdom::FormatDescriptor::new("em"));
    expected.insert_replacement(
        1,
        ReplacementDescriptor::new("img").with_attribute("src", "x.png"),
    );
    expected.formats[1] = expected.formats[0].clone();
    assert_eq!(decoded, expected);

    let built = build_tree(&decoded, &BuildOptions::default());
    assert_eq!(inner_html(&built.root), r#"<em>a<img src="x.png">b</em>"#);
}

#[test]
fn selection_round_trips() {
    let value = RichTextValue::from_plain("test").with_selection(1, 3);
    let json = serde_json::to_string(&value).expect("value should encode");
    let decoded: RichTextValue = serde_json::from_str(&json).expect("value should decode");
    assert_eq!(decoded.start, Some(1));
    assert_eq!(decoded.end, Some(3));
    assert_eq!(decoded, value);
}
