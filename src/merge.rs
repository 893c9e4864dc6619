use crate::{
    config::Schema,
    document::{Fragment, PropertyText, ShowcaseText, SourceDocument},
};
use serde_json::{Map, Value};

/// Builds the translated document from the source plus whatever the fragment
/// carries. Never adds or removes keys, never changes array lengths, and never
/// touches a non-string leaf.
pub fn merge(original: &SourceDocument, fragment: &Fragment, schema: &Schema) -> Value {
    let mut root = original.root().clone();

    if let Some(title) = &fragment.title {
        replace_str(&mut root, "title", title);
        replace_str(&mut root, "metaTitle", title);
    }
    if let Some(excerpt) = &fragment.excerpt {
        replace_str(&mut root, "excerpt", excerpt);
        replace_str(&mut root, "metaDescription", excerpt);
    }
    if let (Some(slot), Some(tags)) = (root.get_mut("tags"), &fragment.tags) {
        overlay_strings(slot, tags);
    }

    match root.get_mut("content") {
        Some(Value::Object(content)) => merge_content(content, fragment, schema),
        Some(slot @ Value::String(_)) => {
            if let Some(body) = &fragment.content_string {
                *slot = Value::String(body.clone());
            }
        }
        _ => {}
    }

    Value::Object(root)
}

fn merge_content(content: &mut Map<String, Value>, fragment: &Fragment, schema: &Schema) {
    for (key, text) in [
        ("quickAnswer", &fragment.quick_answer),
        ("intro", &fragment.intro),
        ("conclusion", &fragment.conclusion),
    ] {
        if let Some(text) = text {
            replace_str(content, key, text);
        }
    }

    for (key, records) in [("sections", &fragment.sections), ("faqs", &fragment.faqs)] {
        if let (Some(slot), Some(records)) = (content.get_mut(key), records) {
            overlay(slot, &Value::Array(records.clone()), schema);
        }
    }

    if let (Some(Value::Array(showcases)), Some(texts)) = (
        content.get_mut("propertyShowcases"),
        &fragment.showcase_text,
    ) {
        for (showcase, text) in showcases.iter_mut().zip(texts) {
            if let Value::Object(showcase) = showcase {
                merge_showcase(showcase, text);
            }
        }
    }
}

fn merge_showcase(showcase: &mut Map<String, Value>, text: &ShowcaseText) {
    for (key, value) in [
        ("title", &text.title),
        ("subtitle", &text.subtitle),
        ("ctaText", &text.cta_text),
    ] {
        if let Some(value) = value {
            replace_str(showcase, key, value);
        }
    }

    if let Some(Value::Array(properties)) = showcase.get_mut("properties") {
        for (property, text) in properties.iter_mut().zip(&text.properties) {
            if let Value::Object(property) = property {
                merge_property(property, text);
            }
        }
    }
}

fn merge_property(property: &mut Map<String, Value>, text: &PropertyText) {
    for (key, value) in [
        ("title", &text.title),
        ("location", &text.location),
        ("badge", &text.badge),
    ] {
        if let Some(value) = value {
            replace_str(property, key, value);
        }
    }
    if let (Some(slot), Some(features)) = (property.get_mut("features"), &text.features) {
        overlay_strings(slot, features);
    }
}

/// Replaces `map[key]` only when the source already holds a string there.
fn replace_str(map: &mut Map<String, Value>, key: &str, text: &str) {
    if let Some(slot @ Value::String(_)) = map.get_mut(key) {
        *slot = Value::String(text.to_string());
    }
}

fn overlay_strings(slot: &mut Value, texts: &[String]) {
    if let Value::Array(items) = slot {
        for (item, text) in items.iter_mut().zip(texts) {
            if item.is_string() {
                *item = Value::String(text.clone());
            }
        }
    }
}

/// Positional, shape-preserving overlay of `translated` onto `source`.
pub fn overlay(source: &mut Value, translated: &Value, schema: &Schema) {
    match (source, translated) {
        (Value::String(s), Value::String(t)) if !is_locator(s.as_str()) => *s = t.clone(),
        (Value::Array(items), Value::Array(t_items)) => {
            for (item, t) in items.iter_mut().zip(t_items) {
                overlay(item, t, schema);
            }
        }
        (Value::Object(fields), Value::Object(t_fields)) => {
            for (key, value) in fields.iter_mut() {
                if schema.is_opaque(key) {
                    continue;
                }
                if let Some(t) = t_fields.get(key) {
                    overlay(value, t, schema);
                }
            }
        }
        _ => {}
    }
}

/// URLs and absolute paths stay as written whatever key holds them.
fn is_locator(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with('/')
        || ["http://", "https://", "mailto:", "tel:"]
            .iter()
            .any(|scheme| s.get(..scheme.len()).is_some_and(|p| p.eq_ignore_ascii_case(scheme)))
}
