use crate::languages::Languages;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub adapter: Adapter,
    #[serde(default)]
    pub envelope: Envelope,
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub languages: Languages,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let mut cfg: Config = toml::from_str(raw).with_context(|| "parsing TOML")?;
        cfg.languages.fill_defaults();
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub run_name: String,
    pub max_parallel_jobs: usize,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            run_name: "default".into(),
            max_parallel_jobs: 1,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub source_dir: String,
    pub output_dir: String,
    pub jobs_file: String,
    pub credentials_file: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            source_dir: "content/articles".into(),
            output_dir: "content/articles".into(),
            jobs_file: "jobs.toml".into(),
            credentials_file: ".env.local".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    /// Documents whose compact JSON is shorter than this go out in one call.
    pub single_pass_max_chars: usize,
    pub sections_per_batch: usize,
}
impl Default for Strategy {
    fn default() -> Self {
        Self {
            single_pass_max_chars: 15_000,
            sections_per_batch: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pacing {
    pub chunk_delay_ms: u64,
    pub job_delay_ms: u64,
}
impl Default for Pacing {
    fn default() -> Self {
        Self {
            chunk_delay_ms: 500,
            job_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adapter {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub api_version: String,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub max_tokens: MaxTokens,
}
impl Default for Adapter {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-haiku-4-5-20251001".into(),
            api_key_env: "ANTHROPIC_API_KEY".into(),
            api_version: "2023-06-01".into(),
            timeout_seconds: 120,
            max_tokens: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxTokens {
    pub full: u32,
    pub head: u32,
    pub sections: u32,
    pub tail: u32,
}
impl Default for MaxTokens {
    fn default() -> Self {
        Self {
            full: 8000,
            head: 4000,
            sections: 6000,
            tail: 6000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub normalize_unicode: bool,
    /// ASCII control codes dropped from responses before parsing.
    pub control_chars_to_sanitize: Vec<u8>,
}
impl Default for Envelope {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            control_chars_to_sanitize: (0u8..32)
                .filter(|c| !matches!(c, b'\t' | b'\n' | b'\r'))
                .chain(std::iter::once(127))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Keys inside sections/faqs whose values are never taken from a translation.
    /// Also matches compound keys ending in one of these words, such as
    /// `imageUrl` or `hero_image`.
    pub opaque_keys: Vec<String>,
}
impl Default for Schema {
    fn default() -> Self {
        Self {
            opaque_keys: [
                "slug", "id", "url", "href", "link", "path", "image", "src", "ref", "reference",
            ]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
impl Schema {
    pub fn is_opaque(&self, key: &str) -> bool {
        self.opaque_keys
            .iter()
            .any(|word| key.eq_ignore_ascii_case(word) || ends_with_word(key, word))
    }
}

/// `imageUrl`, `image_url` and `image-url` end with the word `url`; `curl` does not.
fn ends_with_word(key: &str, word: &str) -> bool {
    let Some(split) = key.len().checked_sub(word.len()).filter(|&i| i > 0) else {
        return false;
    };
    let (Some(head), Some(tail)) = (key.get(..split), key.get(split..)) else {
        return false;
    };
    if !tail.eq_ignore_ascii_case(word) {
        return false;
    }
    tail.starts_with(|c: char| c.is_ascii_uppercase()) || head.ends_with(['_', '-'])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub pretty: bool,
    pub write_report_json: bool,
    pub report_path: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            pretty: true,
            write_report_json: true,
            report_path: "translation-report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
