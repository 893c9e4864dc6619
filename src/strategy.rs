use crate::{config::Config, document::SourceDocument};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    SinglePass,
    Chunked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub strategy: Strategy,
    pub serialized_len: usize,
    pub threshold: usize,
    pub reason: String,
}

pub fn select(serialized_len: usize, threshold: usize) -> Strategy {
    if serialized_len < threshold {
        Strategy::SinglePass
    } else {
        Strategy::Chunked
    }
}

pub fn decide(cfg: &Config, doc: &SourceDocument) -> StrategyDecision {
    let serialized_len = doc.serialized_len();
    let threshold = cfg.strategy.single_pass_max_chars;

    if !doc.has_structured_content() {
        return StrategyDecision {
            strategy: Strategy::SinglePass,
            serialized_len,
            threshold,
            reason: "no structured content to partition".into(),
        };
    }

    let strategy = select(serialized_len, threshold);
    let reason = match strategy {
        Strategy::SinglePass => format!("{serialized_len} < {threshold} chars"),
        Strategy::Chunked => format!("{serialized_len} >= {threshold} chars"),
    };
    StrategyDecision {
        strategy,
        serialized_len,
        threshold,
        reason,
    }
}
