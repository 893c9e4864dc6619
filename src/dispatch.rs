use crate::{
    adapter::{TranslateRequest, Translator},
    chunk_plan::{ChunkKind, ChunkPlan, PlannedChunk},
    document::Fragment,
    error::{Failure, Result},
    languages::LanguageProfile,
    pacing::Pacer,
    report::ChunkReport,
    strategy::Strategy,
};
use serde_json::Value;
use tracing::{info, warn};

pub struct DispatchOutput {
    pub fragment: Fragment,
    pub chunk_reports: Vec<ChunkReport>,
}

pub struct Dispatcher<'a, T: Translator + ?Sized> {
    translator: &'a T,
    pacer: &'a Pacer,
}

impl<'a, T: Translator + ?Sized> Dispatcher<'a, T> {
    pub fn new(translator: &'a T, pacer: &'a Pacer) -> Self {
        Self { translator, pacer }
    }

    /// Sends every chunk of the plan, in order, one call at a time.
    ///
    /// A failed section batch keeps its source records; any other failed
    /// chunk aborts the whole dispatch.
    pub fn execute(&self, plan: &ChunkPlan, language: &LanguageProfile) -> Result<DispatchOutput> {
        let mut fragment = Fragment::default();
        let mut sections: Vec<Value> = Vec::new();
        let mut chunk_reports = Vec::with_capacity(plan.chunks.len());
        let total_sections = plan.section_count();

        for chunk in &plan.chunks {
            self.pacer.wait();
            let req = TranslateRequest {
                kind: chunk.kind,
                language,
                payload: &chunk.payload,
            };
            let result = self.translator.translate(&req);

            match chunk.kind {
                ChunkKind::Sections { batch, start, end } => {
                    let source = chunk.payload.as_array().map(Vec::as_slice).unwrap_or(&[]);
                    match result.and_then(expect_array) {
                        Ok(translated) => {
                            if translated.len() != source.len() {
                                warn!(
                                    "sections {}-{}: got {} records for {}; aligning by position",
                                    start + 1,
                                    end,
                                    translated.len(),
                                    source.len()
                                );
                            }
                            sections.extend(align(translated, source));
                            info!("sections {}-{}/{} done", start + 1, end, total_sections);
                            chunk_reports.push(ok_report(chunk));
                        }
                        Err(err) => {
                            let partial = Failure::PartialChunk {
                                batch,
                                reason: err.to_string(),
                            };
                            warn!("{partial}");
                            sections.extend(source.iter().cloned());
                            chunk_reports.push(ChunkReport {
                                index: chunk.index,
                                kind: chunk.kind,
                                ok: false,
                                warning: Some(partial.to_string()),
                            });
                        }
                    }
                }
                kind => {
                    let value = result.map_err(|e| in_chunk(e, &kind))?;
                    let translated = Fragment::from_payload(value).map_err(|e| in_chunk(e, &kind))?;
                    let translated = restrict(translated, kind);
                    if translated.is_empty() {
                        warn!("{} chunk returned none of the requested fields", kind.label());
                    }
                    fragment.absorb(translated);
                    chunk_reports.push(ok_report(chunk));
                }
            }
        }

        if plan.strategy == Strategy::Chunked {
            fragment.sections = Some(sections);
        }

        Ok(DispatchOutput {
            fragment,
            chunk_reports,
        })
    }
}

fn ok_report(chunk: &PlannedChunk) -> ChunkReport {
    ChunkReport {
        index: chunk.index,
        kind: chunk.kind,
        ok: true,
        warning: None,
    }
}

fn expect_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Failure::Parse(format!(
            "expected a JSON array of sections, got {}",
            kind_name(&other)
        ))),
    }
}

/// Keeps batch boundaries stable: extra records are dropped, missing ones
/// are filled from the source.
fn align(mut translated: Vec<Value>, source: &[Value]) -> Vec<Value> {
    translated.truncate(source.len());
    let have = translated.len();
    translated.extend(source[have..].iter().cloned());
    translated
}

/// Drops fields a chunk was never asked to translate.
fn restrict(f: Fragment, kind: ChunkKind) -> Fragment {
    match kind {
        ChunkKind::Head => Fragment {
            title: f.title,
            excerpt: f.excerpt,
            tags: f.tags,
            quick_answer: f.quick_answer,
            intro: f.intro,
            ..Default::default()
        },
        ChunkKind::Tail => Fragment {
            conclusion: f.conclusion,
            faqs: f.faqs,
            showcase_text: f.showcase_text,
            ..Default::default()
        },
        ChunkKind::Full | ChunkKind::Sections { .. } => f,
    }
}

fn in_chunk(err: Failure, kind: &ChunkKind) -> Failure {
    match err {
        Failure::Transport(msg) => Failure::Transport(format!("{} chunk: {msg}", kind.label())),
        Failure::Parse(msg) => Failure::Parse(format!("{} chunk: {msg}", kind.label())),
        other => other,
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
