pub mod http;
pub mod types;

use crate::{chunk_plan::ChunkKind, error::Result, languages::LanguageProfile};
use serde_json::Value;

pub use http::HttpTranslator;

#[derive(Debug, Clone, Copy)]
pub struct TranslateRequest<'a> {
    pub kind: ChunkKind,
    pub language: &'a LanguageProfile,
    pub payload: &'a Value,
}

/// Text-translation capability. Takes a JSON text bundle and returns one of
/// the same shape; callers still validate the shape before trusting it.
pub trait Translator: Sync {
    fn translate(&self, req: &TranslateRequest<'_>) -> Result<Value>;
}
