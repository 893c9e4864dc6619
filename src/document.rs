//! Article model: which fields travel to the translator and which stay opaque.
//!
//! A document is kept as its parsed JSON tree so that every field outside the
//! translatable set (slugs, reference codes, URLs, image paths, prices) is
//! written back exactly as it was read, in the original key order.

use crate::error::{Failure, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    root: Map<String, Value>,
}

impl SourceDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(Failure::Parse("document root is not a JSON object".into())),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Failure::Parse(format!("document is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Character count of the compact JSON serialization.
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(&self.root)
            .map(|s| s.chars().count())
            .unwrap_or(0)
    }

    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.root().get("content").and_then(Value::as_object)
    }

    /// Legacy articles carry their body as one markdown string.
    pub fn content_string(&self) -> Option<&str> {
        self.root().get("content").and_then(Value::as_str)
    }

    pub fn has_structured_content(&self) -> bool {
        self.content().is_some()
    }

    pub fn sections(&self) -> &[Value] {
        self.content()
            .and_then(|c| c.get("sections"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn root_str(&self, key: &str) -> Option<String> {
        self.root().get(key).and_then(Value::as_str).map(String::from)
    }

    fn content_str(&self, key: &str) -> Option<String> {
        self.content()
            .and_then(|c| c.get(key))
            .and_then(Value::as_str)
            .map(String::from)
    }

    fn content_array(&self, key: &str) -> Option<Vec<Value>> {
        self.content()
            .and_then(|c| c.get(key))
            .and_then(Value::as_array)
            .cloned()
    }

    fn tags(&self) -> Option<Vec<String>> {
        self.root().get("tags").and_then(Value::as_array).map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
    }

    /// Flattened text of every property showcase, in source order.
    pub fn showcase_text(&self) -> Option<Vec<ShowcaseText>> {
        let showcases = self
            .content()
            .and_then(|c| c.get("propertyShowcases"))
            .and_then(Value::as_array)?;
        Some(showcases.iter().map(ShowcaseText::extract).collect())
    }

    /// Title, excerpt, tags, quick answer and intro.
    pub fn head_fragment(&self) -> Fragment {
        Fragment {
            title: self.root_str("title"),
            excerpt: self.root_str("excerpt"),
            tags: self.tags(),
            quick_answer: self.content_str("quickAnswer"),
            intro: self.content_str("intro"),
            ..Default::default()
        }
    }

    /// Conclusion, FAQs and showcase text.
    pub fn tail_fragment(&self) -> Fragment {
        Fragment {
            conclusion: self.content_str("conclusion"),
            faqs: self.content_array("faqs"),
            showcase_text: self.showcase_text(),
            ..Default::default()
        }
    }

    /// Every translatable field at once.
    pub fn full_fragment(&self) -> Fragment {
        let mut f = self.head_fragment();
        f.absorb(Fragment {
            sections: self.content_array("sections"),
            ..Default::default()
        });
        f.absorb(self.tail_fragment());
        f.content_string = self.content_string().map(String::from);
        f
    }
}

/// Translatable text bundle: either what is sent to the translator, or what
/// came back. Absent fields mean "keep the source".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        rename = "quickAnswer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub quick_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faqs: Option<Vec<Value>>,
    #[serde(
        rename = "showcaseText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub showcase_text: Option<Vec<ShowcaseText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_string: Option<String>,
}

impl Fragment {
    /// Fields set in `other` replace ours; unset ones leave ours alone.
    pub fn absorb(&mut self, other: Fragment) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            title,
            excerpt,
            tags,
            quick_answer,
            intro,
            sections,
            conclusion,
            faqs,
            showcase_text,
            content_string
        );
    }

    pub fn is_empty(&self) -> bool {
        *self == Fragment::default()
    }

    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_payload(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Failure::Parse("expected a JSON object".into()));
        }
        serde_json::from_value(value)
            .map_err(|e| Failure::Parse(format!("response does not match fields: {e}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "ctaText", default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyText>,
}

impl ShowcaseText {
    fn extract(showcase: &Value) -> Self {
        let s = |k: &str| showcase.get(k).and_then(Value::as_str).map(String::from);
        Self {
            title: s("title"),
            subtitle: s("subtitle"),
            cta_text: s("ctaText"),
            properties: showcase
                .get("properties")
                .and_then(Value::as_array)
                .map(|ps| ps.iter().map(PropertyText::extract).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl PropertyText {
    fn extract(property: &Value) -> Self {
        let s = |k: &str| property.get(k).and_then(Value::as_str).map(String::from);
        Self {
            title: s("title"),
            location: s("location"),
            features: property.get("features").and_then(Value::as_array).map(|fs| {
                fs.iter().filter_map(Value::as_str).map(String::from).collect()
            }),
            badge: s("badge"),
        }
    }
}

/// True when both trees have the same value kinds, the same object keys and
/// the same array lengths at every level.
pub fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| same_shape(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| same_shape(v, w))
        }
        (Value::String(_), Value::String(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Null, Value::Null) => true,
        _ => false,
    }
}
