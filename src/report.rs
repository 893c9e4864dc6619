use crate::{chunk_plan::ChunkKind, strategy::StrategyDecision};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkReport {
    pub index: usize,
    pub kind: ChunkKind,
    pub ok: bool,
    #[serde(default)]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    OutputExists,
    /// A native version exists in a sibling dialect; listed as an exclusion.
    NativeVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    /// Only produced by dry runs.
    Pending,
    Skipped { reason: SkipReason },
    Completed,
    Failed { kind: String, error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub document: String,
    pub language: String,
    #[serde(flatten)]
    pub state: JobState,
    #[serde(default)]
    pub strategy: Option<StrategyDecision>,
    #[serde(default)]
    pub source_sha256: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub chunk_reports: Vec<ChunkReport>,
    pub elapsed_ms: u64,
}

impl JobReport {
    pub fn new(document: &str, language: &str, state: JobState) -> Self {
        Self {
            document: document.to_string(),
            language: language.to_string(),
            state,
            strategy: None,
            source_sha256: None,
            output_path: None,
            chunk_reports: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Completed, but with at least one section batch left untranslated.
    pub fn is_degraded(&self) -> bool {
        self.state == JobState::Completed && self.chunk_reports.iter().any(|c| !c.ok)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_name: String,
    pub started: String,
    pub finished: String,
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub degraded: usize,
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    pub fn from_jobs(run_name: &str, started: String, finished: String, jobs: Vec<JobReport>) -> Self {
        let count = |f: fn(&JobState) -> bool| jobs.iter().filter(|j| f(&j.state)).count();
        Self {
            run_name: run_name.to_string(),
            started,
            finished,
            total: jobs.len(),
            completed: count(|s| matches!(s, JobState::Completed)),
            skipped: count(|s| matches!(s, JobState::Skipped { .. })),
            errors: count(|s| matches!(s, JobState::Failed { .. })),
            degraded: jobs.iter().filter(|j| j.is_degraded()).count(),
            jobs,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "DONE: {} translated ({} with untranslated sections), {} skipped, {} errors, {} total",
            self.completed, self.degraded, self.skipped, self.errors, self.total
        )
    }
}
