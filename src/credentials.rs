use crate::error::{Failure, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Looks the secret up in the process environment, then in a local
/// `KEY=value` file.
pub fn resolve(key: &str, file: &Path) -> Result<String> {
    resolve_with(key, file, |k| std::env::var(k).ok())
}

pub fn resolve_with(
    key: &str,
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(v) = env(key).filter(|v| !v.trim().is_empty()) {
        return Ok(v.trim().to_string());
    }
    if let Some(v) = from_env_file(file, key) {
        return Ok(v);
    }
    Err(Failure::CredentialMissing {
        key: key.to_string(),
        file: file.display().to_string(),
    })
}

/// Reads `key` from a dotenv file without touching the process environment.
fn from_env_file(file: &Path, key: &str) -> Option<String> {
    let entries = match dotenvy::from_path_iter(file) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("no credentials file {}: {e}", file.display());
            return None;
        }
    };
    for entry in entries {
        match entry {
            Ok((k, v)) if k == key && !v.trim().is_empty() => return Some(v.trim().to_string()),
            Ok(_) => {}
            Err(e) => {
                warn!("stopped reading {}: {e}", file.display());
                break;
            }
        }
    }
    None
}
