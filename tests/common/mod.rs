#![allow(dead_code)]

use doc_translate::{
    adapter::{TranslateRequest, Translator},
    chunk_plan::ChunkKind,
    config::Config,
    error::{Failure, Result},
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

type FailWhen = Box<dyn Fn(ChunkKind) -> Option<Failure> + Send + Sync>;

/// Translator that prefixes every string with `[<language name>] ` and
/// records which chunks it was asked for.
pub struct ScriptedTranslator {
    calls: Mutex<Vec<ChunkKind>>,
    fail_when: FailWhen,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::failing_when(|_| None)
    }

    pub fn failing_when(
        f: impl Fn(ChunkKind) -> Option<Failure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Box::new(f),
        }
    }

    pub fn calls(&self) -> Vec<ChunkKind> {
        self.calls.lock().unwrap().clone()
    }
}

impl Translator for ScriptedTranslator {
    fn translate(&self, req: &TranslateRequest<'_>) -> Result<Value> {
        self.calls.lock().unwrap().push(req.kind);
        if let Some(err) = (self.fail_when)(req.kind) {
            return Err(err);
        }
        Ok(mark(req.payload, &format!("[{}] ", req.language.name)))
    }
}

type Reply = Box<dyn Fn(&TranslateRequest<'_>) -> Result<Value> + Send + Sync>;

/// Translator whose answer for each chunk is chosen by the test. Records
/// when each call arrived.
pub struct ReplyTranslator {
    calls: Mutex<Vec<(ChunkKind, Instant)>>,
    reply: Reply,
}

impl ReplyTranslator {
    pub fn new(
        reply: impl Fn(&TranslateRequest<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        }
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl Translator for ReplyTranslator {
    fn translate(&self, req: &TranslateRequest<'_>) -> Result<Value> {
        self.calls.lock().unwrap().push((req.kind, Instant::now()));
        (self.reply)(req)
    }
}

pub fn mark(v: &Value, prefix: &str) -> Value {
    match v {
        Value::String(s) => Value::String(format!("{prefix}{s}")),
        Value::Array(items) => Value::Array(items.iter().map(|i| mark(i, prefix)).collect()),
        Value::Object(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (k.clone(), mark(v, prefix)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn test_config(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.paths.source_dir = root.join("articles").display().to_string();
    cfg.paths.output_dir = root.join("articles").display().to_string();
    cfg.pacing.chunk_delay_ms = 0;
    cfg.pacing.job_delay_ms = 0;
    cfg
}

pub fn write_source(root: &Path, name: &str, doc: &Value) {
    let dir = root.join("articles");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(doc).unwrap()).unwrap();
}

pub fn read_output(root: &Path, lang: &str, name: &str) -> Value {
    let raw = std::fs::read(root.join("articles").join(lang).join(name)).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

/// Small article exercising every translatable field plus opaque ones.
pub fn rich_article(sections: usize) -> Value {
    let sections: Vec<Value> = (1..=sections)
        .map(|i| {
            json!({
                "heading": format!("Section {i}"),
                "body": format!("Body {i}"),
                "image": format!("/img/section-{i}.jpg"),
                "order": i
            })
        })
        .collect();
    json!({
        "slug": "moraira-property-guide",
        "title": "Moraira Property Guide",
        "metaTitle": "Moraira Property Guide | Site",
        "excerpt": "Everything about Moraira",
        "tags": ["moraira", "property"],
        "readTime": 8,
        "publishedAt": "2025-01-10",
        "heroImage": "https://example.com/hero.jpg",
        "content": {
            "quickAnswer": "Yes",
            "intro": "Intro text",
            "sections": sections,
            "conclusion": "Conclusion text",
            "faqs": [{"question": "Why?", "answer": "Because."}],
            "propertyShowcases": [
                {
                    "title": "Villas",
                    "subtitle": "Sea views",
                    "ctaText": "See all",
                    "ctaUrl": "/villas",
                    "properties": [
                        {"ref": "MOR-001", "title": "Villa A", "location": "Moraira",
                         "price": 450000, "features": ["pool", "garden"], "badge": "New",
                         "image": "/img/a.jpg"},
                        {"ref": "MOR-002", "title": "Villa B", "location": "Teulada",
                         "price": 520000, "features": ["views"], "badge": "Hot",
                         "image": "/img/b.jpg"}
                    ]
                },
                {
                    "title": "Apartments",
                    "subtitle": "Near the beach",
                    "ctaText": "Browse",
                    "ctaUrl": "/apartments",
                    "properties": [
                        {"ref": "MOR-101", "title": "Flat C", "location": "Moraira",
                         "price": 210000, "features": ["lift"], "badge": "Sale",
                         "image": "/img/c.jpg"}
                    ]
                }
            ]
        }
    })
}
