//! Source and output directories.
//!
//! The output tree is the only state shared between runs and between workers:
//! a file at `<output_dir>/<lang>/<document>` means the job is done. Outputs
//! are written to a staging file first and published with a no-clobber link,
//! so the final path only ever holds a complete, validated document.

use crate::{
    document::SourceDocument,
    error::{Failure, Result},
};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct SourceStore {
    dir: PathBuf,
    aliases: BTreeMap<String, String>,
}

impl SourceStore {
    pub fn new(dir: impl Into<PathBuf>, aliases: BTreeMap<String, String>) -> Self {
        Self {
            dir: dir.into(),
            aliases,
        }
    }

    /// Primary name first, then the historical alias if one is listed.
    pub fn resolve(&self, document: &str) -> Result<PathBuf> {
        let primary = self.dir.join(document);
        if primary.is_file() {
            return Ok(primary);
        }
        let mut tried = vec![primary.display().to_string()];
        if let Some(alt) = self.aliases.get(document) {
            let alt = self.dir.join(alt);
            if alt.is_file() {
                debug!("{document}: using alternate source {}", alt.display());
                return Ok(alt);
            }
            tried.push(alt.display().to_string());
        }
        Err(Failure::SourceMissing {
            document: document.to_string(),
            tried: tried.join(", "),
        })
    }

    /// Returns the parsed document and its raw bytes.
    pub fn load(&self, document: &str) -> Result<(SourceDocument, Vec<u8>)> {
        let path = self.resolve(document)?;
        let raw = std::fs::read(&path).map_err(|e| Failure::io(&path, e))?;
        let doc = SourceDocument::from_slice(&raw)?;
        Ok((doc, raw))
    }
}

pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, language: &str, document: &str) -> PathBuf {
        self.dir.join(language).join(document)
    }

    fn staging_path_for(&self, language: &str, document: &str) -> PathBuf {
        self.dir.join(language).join(format!(".{document}.partial"))
    }

    pub fn exists(&self, language: &str, document: &str) -> bool {
        self.path_for(language, document).exists()
    }

    /// Takes exclusive ownership of one output path. `None` when the output
    /// already exists or another worker holds the claim.
    pub fn claim(&self, language: &str, document: &str) -> Result<Option<Claim>> {
        let target = self.path_for(language, document);
        if target.exists() {
            return Ok(None);
        }
        let lang_dir = self.dir.join(language);
        std::fs::create_dir_all(&lang_dir).map_err(|e| Failure::io(&lang_dir, e))?;

        let staging = self.staging_path_for(language, document);
        match OpenOptions::new().write(true).create_new(true).open(&staging) {
            Ok(file) => Ok(Some(Claim {
                staging,
                target,
                file: Some(file),
                published: false,
            })),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(Failure::io(&staging, e)),
        }
    }

    /// Removes staging files left behind by an interrupted run.
    pub fn sweep_staging(&self, language: &str, document: &str) {
        let staging = self.staging_path_for(language, document);
        if staging.exists() {
            warn!("removing stale staging file {}", staging.display());
            let _ = std::fs::remove_file(&staging);
        }
    }
}

/// Exclusive right to write one output. Dropping an unpublished claim
/// removes its staging file.
pub struct Claim {
    staging: PathBuf,
    target: PathBuf,
    file: Option<File>,
    published: bool,
}

impl Claim {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writes `bytes`, reads them back through `validate`, and only then makes
    /// them visible at the target path.
    pub fn publish(
        mut self,
        bytes: &[u8],
        validate: impl FnOnce(&[u8]) -> Result<()>,
    ) -> Result<PathBuf> {
        let mut file = match self.file.take() {
            Some(f) => f,
            None => File::create(&self.staging).map_err(|e| Failure::io(&self.staging, e))?,
        };
        file.write_all(bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| Failure::io(&self.staging, e))?;
        drop(file);

        let written = std::fs::read(&self.staging).map_err(|e| Failure::io(&self.staging, e))?;
        validate(&written)?;

        match std::fs::hard_link(&self.staging, &self.target) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Failure::io(&self.target, e));
            }
            Err(_) if !self.target.exists() => {
                // Filesystems without hard links. `rename` replaces an existing
                // target, so here no-clobber rests on the claim alone: a file
                // created at the target by another process after the check above
                // is overwritten.
                std::fs::rename(&self.staging, &self.target)
                    .map_err(|e| Failure::io(&self.target, e))?;
            }
            Err(e) => return Err(Failure::io(&self.target, e)),
        }
        self.published = true;
        let _ = std::fs::remove_file(&self.staging);
        Ok(self.target.clone())
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.file.take();
        if !self.published {
            let _ = std::fs::remove_file(&self.staging);
        }
    }
}
