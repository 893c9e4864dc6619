mod common;

use common::{mark, rich_article};
use doc_translate::{
    config::Schema,
    document::{same_shape, Fragment, ShowcaseText, SourceDocument},
    merge::merge,
};
use serde_json::{json, Value};

fn translated_full(doc: &SourceDocument) -> Fragment {
    let payload = mark(&doc.full_fragment().to_payload(), "[fr] ");
    Fragment::from_payload(payload).unwrap()
}

#[test]
fn full_translation_keeps_shape_and_opaque_fields() {
    let src = rich_article(3);
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let out = merge(&doc, &translated_full(&doc), &Schema::default());

    assert!(same_shape(&out, &src));
    assert_eq!(out["title"], "[fr] Moraira Property Guide");
    assert_eq!(out["metaTitle"], "[fr] Moraira Property Guide");
    assert_eq!(out["tags"], json!(["[fr] moraira", "[fr] property"]));
    assert_eq!(out["content"]["sections"][1]["body"], "[fr] Body 2");
    assert_eq!(out["content"]["faqs"][0]["answer"], "[fr] Because.");

    for key in ["slug", "readTime", "publishedAt", "heroImage"] {
        assert_eq!(out[key], src[key], "{key} changed");
    }
    // The fake translator also rewrote these inside sections; merge must not.
    assert_eq!(out["content"]["sections"][1]["image"], "/img/section-2.jpg");
    assert_eq!(out["content"]["sections"][1]["order"], 2);

    let prop = &out["content"]["propertyShowcases"][0]["properties"][1];
    assert_eq!(prop["title"], "[fr] Villa B");
    assert_eq!(prop["features"], json!(["[fr] views"]));
    assert_eq!(prop["ref"], "MOR-002");
    assert_eq!(prop["price"], 520000);
    assert_eq!(prop["image"], "/img/b.jpg");
    assert_eq!(out["content"]["propertyShowcases"][0]["ctaUrl"], "/villas");
}

#[test]
fn empty_fragment_reproduces_source() {
    let src = rich_article(2);
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let out = merge(&doc, &Fragment::default(), &Schema::default());
    assert_eq!(out, src);
    assert_eq!(
        serde_json::to_string(&out).unwrap(),
        serde_json::to_string(&src).unwrap(),
        "key order must survive"
    );
}

#[test]
fn mismatched_lengths_never_change_shape() {
    let src = rich_article(3);
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let fragment = Fragment {
        tags: Some(vec!["a".into(), "b".into(), "c".into()]),
        sections: Some(vec![json!({"heading": "Only one", "extra": "x"})]),
        faqs: Some(vec![]),
        showcase_text: Some(vec![
            ShowcaseText::default(),
            ShowcaseText::default(),
            ShowcaseText {
                title: Some("Ghost".into()),
                ..Default::default()
            },
        ]),
        ..Default::default()
    };
    let out = merge(&doc, &fragment, &Schema::default());

    assert!(same_shape(&out, &src));
    assert_eq!(out["tags"], json!(["a", "b"]));
    assert_eq!(out["content"]["sections"][0]["heading"], "Only one");
    assert_eq!(out["content"]["sections"][1], src["content"]["sections"][1]);
    assert!(out["content"]["sections"][0].get("extra").is_none());
    assert_eq!(out["content"]["faqs"], src["content"]["faqs"]);
}

#[test]
fn showcases_merge_by_position() {
    let src = rich_article(1);
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let mut translated = doc.tail_fragment();
    let mut showcases = translated.showcase_text.take().unwrap();
    showcases.truncate(1);
    let one: Value = mark(&serde_json::to_value(&showcases).unwrap(), "[de] ");
    translated.showcase_text = Some(serde_json::from_value(one).unwrap());

    let out = merge(&doc, &translated, &Schema::default());
    let showcases = &out["content"]["propertyShowcases"];
    assert_eq!(showcases[0]["title"], "[de] Villas");
    assert_eq!(showcases[0]["properties"][0]["location"], "[de] Moraira");
    assert_eq!(showcases[1], src["content"]["propertyShowcases"][1]);
}

#[test]
fn wrong_leaf_types_in_translation_are_ignored() {
    let src = json!({"title": "T", "content": {"sections": [{"h": "S", "n": 1}]}});
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let fragment = Fragment {
        sections: Some(vec![json!({"h": ["not", "a", "string"], "n": "one"})]),
        ..Default::default()
    };
    let out = merge(&doc, &fragment, &Schema::default());
    assert_eq!(out, src);
}

#[test]
fn links_in_section_records_survive_translation() {
    let src = json!({
        "title": "T",
        "content": {
            "sections": [{
                "heading": "H",
                "imageUrl": "/img/a.jpg",
                "link": "https://x.com/a",
                "gallery": [{"thumbnailUrl": "/img/t.jpg", "caption": "C", "credit": "https://cc.org"}]
            }],
            "faqs": [{"question": "Q", "answer": "A", "sourceHref": "/faq#1"}]
        }
    });
    let doc = SourceDocument::from_value(src.clone()).unwrap();
    let fragment = Fragment::from_payload(mark(&doc.full_fragment().to_payload(), "X")).unwrap();
    let out = merge(&doc, &fragment, &Schema::default());

    let section = &out["content"]["sections"][0];
    assert_eq!(section["heading"], "XH");
    assert_eq!(section["imageUrl"], "/img/a.jpg");
    assert_eq!(section["link"], "https://x.com/a");
    assert_eq!(section["gallery"][0]["thumbnailUrl"], "/img/t.jpg");
    assert_eq!(section["gallery"][0]["caption"], "XC");
    assert_eq!(section["gallery"][0]["credit"], "https://cc.org");
    assert_eq!(out["content"]["faqs"][0]["sourceHref"], "/faq#1");
    assert_eq!(out["content"]["faqs"][0]["answer"], "XA");
}
