use crate::error::{Failure, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Human-readable name used when prompting, e.g. "Belgian Dutch (Flemish)".
    pub name: String,
    /// Locale suffix for reading time, e.g. "min leestijd".
    pub reading_time_label: String,
}

impl LanguageProfile {
    pub fn new(name: &str, reading_time_label: &str) -> Self {
        Self {
            name: name.to_string(),
            reading_time_label: reading_time_label.to_string(),
        }
    }
}

/// Language id -> profile. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Languages(BTreeMap<String, LanguageProfile>);

impl Languages {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, id: &str, profile: LanguageProfile) {
        self.0.insert(id.to_string(), profile);
    }

    pub fn get(&self, id: &str) -> Result<&LanguageProfile> {
        self.0
            .get(id)
            .ok_or_else(|| Failure::UnknownLanguage(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LanguageProfile)> {
        self.0.iter()
    }

    /// Adds the built-in profiles for any id the config file did not define.
    pub fn fill_defaults(&mut self) {
        for (id, profile) in Languages::default().0 {
            self.0.entry(id).or_insert(profile);
        }
    }
}

impl Default for Languages {
    fn default() -> Self {
        let mut m = Self::empty();
        m.insert("sv", LanguageProfile::new("Swedish", "min läsning"));
        m.insert("de", LanguageProfile::new("German", "Min. Lesezeit"));
        m.insert("nl", LanguageProfile::new("Dutch", "min leestijd"));
        m.insert(
            "nl-be",
            LanguageProfile::new("Belgian Dutch (Flemish)", "min leestijd"),
        );
        m.insert("fr", LanguageProfile::new("French", "min de lecture"));
        m.insert("no", LanguageProfile::new("Norwegian", "min lesning"));
        m.insert("pl", LanguageProfile::new("Polish", "min czytania"));
        m.insert("ru", LanguageProfile::new("Russian", "мин чтения"));
        m
    }
}
