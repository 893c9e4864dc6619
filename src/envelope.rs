use crate::{
    config::Envelope,
    error::{Failure, Result},
};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn opening_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[ \t]*(?i:json)?[ \t]*\r?\n?").expect("static regex"))
}

fn closing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?```[ \t]*$").expect("static regex"))
}

/// Strips the markdown code fence a model may wrap its answer in.
pub fn strip_fences(raw: &str) -> &str {
    let s = raw.trim();
    let s = match opening_fence().find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    };
    let s = match closing_fence().find(s) {
        Some(m) => &s[..m.start()],
        None => s,
    };
    s.trim()
}

/// Turns a raw model response into JSON, or a `Parse` failure.
pub fn unwrap(cfg: &Envelope, raw: &str) -> Result<Value> {
    let mut text = sanitize_control_chars(strip_fences(raw), &cfg.control_chars_to_sanitize);
    if cfg.normalize_unicode {
        text = text.nfc().collect::<String>();
    }
    if text.is_empty() {
        return Err(Failure::Parse("empty response".into()));
    }
    serde_json::from_str(&text).map_err(|e| {
        Failure::Parse(format!("response is not valid JSON ({e}): {}", snippet(&text)))
    })
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            // Structural whitespace is legal between JSON tokens.
            if ch == '\n' || ch == '\r' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            if cp < 128 { !mask[cp as usize] } else { true }
        })
        .collect()
}

fn snippet(s: &str) -> String {
    let mut out: String = s.chars().take(200).collect();
    if s.chars().nth(200).is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_tagged_and_bare_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_fences("```JSON{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn unwrap_parses_after_sanitizing() {
        let cfg = Envelope::default();
        let v = unwrap(&cfg, "```json\n{\"title\":\"Caf\u{0007}e\u{0301}\"}\n```").unwrap();
        assert_eq!(v, json!({"title": "Caf\u{e9}"}));
    }

    #[test]
    fn unwrap_reports_parse_failure() {
        let cfg = Envelope::default();
        assert!(matches!(unwrap(&cfg, "Sure! Here it is"), Err(Failure::Parse(_))));
        assert!(matches!(unwrap(&cfg, "```json\n```"), Err(Failure::Parse(_))));
    }
}
