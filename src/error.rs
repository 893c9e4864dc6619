use thiserror::Error;

/// Failure taxonomy for a translation run.
///
/// `PartialChunk` is absorbed by the dispatcher (the batch keeps its source
/// text); `CredentialMissing` stops the run before any job starts. Every other
/// kind aborts only the job that raised it.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("source document not found: {document} (tried {tried})")]
    SourceMissing { document: String, tried: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("section batch {batch} fell back to source: {reason}")]
    PartialChunk { batch: usize, reason: String },

    #[error("credential {key} not found in environment or {file}")]
    CredentialMissing { key: String, file: String },

    #[error("unknown target language: {0}")]
    UnknownLanguage(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Failure {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Failure::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Short, stable label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::SourceMissing { .. } => "source_missing",
            Failure::Transport(_) => "transport",
            Failure::Parse(_) => "parse",
            Failure::PartialChunk { .. } => "partial_chunk",
            Failure::CredentialMissing { .. } => "credential_missing",
            Failure::UnknownLanguage(_) => "unknown_language",
            Failure::Io { .. } => "io",
        }
    }
}

pub type Result<T, E = Failure> = std::result::Result<T, E>;
