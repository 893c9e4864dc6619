use super::{
    types::{Message, MessagesRequest, MessagesResponse},
    TranslateRequest, Translator,
};
use crate::{
    chunk_plan::ChunkKind,
    config::{self, Config},
    envelope,
    error::{Failure, Result},
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpTranslator {
    client: Client,
    adapter: config::Adapter,
    envelope: config::Envelope,
    api_key: String,
}

impl HttpTranslator {
    pub fn new(cfg: &Config, api_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.adapter.timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            adapter: cfg.adapter.clone(),
            envelope: cfg.envelope.clone(),
            api_key,
        })
    }

    fn max_tokens(&self, kind: ChunkKind) -> u32 {
        let m = &self.adapter.max_tokens;
        match kind {
            ChunkKind::Full => m.full,
            ChunkKind::Head => m.head,
            ChunkKind::Sections { .. } => m.sections,
            ChunkKind::Tail => m.tail,
        }
    }

    fn send(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse> {
        let resp = self
            .client
            .post(&self.adapter.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.adapter.api_version)
            .json(body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Failure::Transport(format!(
                        "request timed out after {}s",
                        self.adapter.timeout_seconds
                    ))
                } else {
                    Failure::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        // Read as text first so error bodies are not lost to a JSON failure.
        let text = resp
            .text()
            .map_err(|e| Failure::Transport(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(Failure::Transport(extract_error_message(status, &text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| Failure::Parse(format!("invalid API response envelope: {e}")))
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, req: &TranslateRequest<'_>) -> Result<Value> {
        let prompt = build_prompt(req)?;
        let body = MessagesRequest {
            model: &self.adapter.model,
            max_tokens: self.max_tokens(req.kind),
            messages: vec![Message {
                role: "user".into(),
                content: prompt,
            }],
        };

        debug!(
            "POST {} kind={} lang={} max_tokens={}",
            self.adapter.endpoint,
            req.kind.label(),
            req.language.name,
            body.max_tokens
        );
        let resp = self.send(&body)?;

        if resp.stop_reason.as_deref() == Some("max_tokens") {
            warn!("response for {} hit max_tokens; JSON may be truncated", req.kind.label());
        }

        let text = resp
            .first_text()
            .ok_or_else(|| Failure::Parse("response has no text content".into()))?;
        envelope::unwrap(&self.envelope, text)
    }
}

pub fn build_prompt(req: &TranslateRequest<'_>) -> Result<String> {
    let lang = &req.language.name;
    let payload = serde_json::to_string(req.payload)
        .map_err(|e| Failure::Parse(format!("serializing payload: {e}")))?;

    let (what, returns) = match req.kind {
        ChunkKind::Sections { .. } => ("these article sections", "a valid JSON array"),
        _ => ("the following real estate article content", "a valid JSON object with the same keys"),
    };

    Ok(format!(
        "Translate {what} from English to {lang}.\n\
         \n\
         Rules:\n\
         - Write natural, fluent {lang}, as a native speaker would.\n\
         - Keep proper nouns and place names (Javea, Moraira, Costa Blanca) unchanged.\n\
         - Keep technical terms such as NIE, IBI and Box 3 unchanged.\n\
         - Keep numbers, prices, percentages and markdown formatting unchanged.\n\
         - Do not translate slugs, reference codes, URLs or image paths.\n\
         - Render reading-time phrases like \"5 min read\" as \"5 {label}\".\n\
         - Keep the same JSON structure.\n\
         \n\
         Return ONLY {returns}:\n\
         \n\
         {payload}",
        label = req.language.reading_time_label,
    ))
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {}...", status.as_u16(), snippet)
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    }
}
