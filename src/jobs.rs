use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// The injected list of work for a run, usually `jobs.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobList {
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobEntry>,
    /// Historical renames: requested document name -> name in the source store.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Documents that already have a native version in a sibling dialect.
    #[serde(default, rename = "exclusion")]
    pub exclusions: Vec<JobEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub document: String,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationJob {
    pub document: String,
    pub language: String,
}

impl JobList {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading job list: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing job list: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Flattens the list into jobs, in file order, without duplicates.
    pub fn enumerate(&self) -> Vec<TranslationJob> {
        let mut seen = HashSet::new();
        self.jobs
            .iter()
            .flat_map(|entry| {
                entry.languages.iter().map(move |lang| TranslationJob {
                    document: entry.document.clone(),
                    language: lang.clone(),
                })
            })
            .filter(|job| seen.insert(job.clone()))
            .collect()
    }

    pub fn is_excluded(&self, job: &TranslationJob) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.document == job.document && e.languages.contains(&job.language))
    }
}
