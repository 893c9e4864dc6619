use crate::{
    config::Config,
    document::SourceDocument,
    strategy::{Strategy, StrategyDecision},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub strategy: Strategy,
    pub chunks: Vec<PlannedChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedChunk {
    pub index: usize,
    pub kind: ChunkKind,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Every translatable field in one call.
    Full,
    Head,
    Sections {
        batch: usize,
        start: usize, // 0-based inclusive
        end: usize,   // 0-based exclusive
    },
    Tail,
}

impl ChunkKind {
    /// Losing a head, tail or full chunk leaves the document incomplete.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ChunkKind::Sections { .. })
    }

    pub fn label(&self) -> String {
        match self {
            ChunkKind::Full => "full".into(),
            ChunkKind::Head => "head".into(),
            ChunkKind::Sections { start, end, .. } => format!("sections {}-{}", start + 1, end),
            ChunkKind::Tail => "tail".into(),
        }
    }
}

impl ChunkPlan {
    pub fn for_document(cfg: &Config, doc: &SourceDocument, decision: &StrategyDecision) -> Self {
        match decision.strategy {
            Strategy::SinglePass => Self::single(doc),
            Strategy::Chunked => Self::chunked(doc, cfg.strategy.sections_per_batch),
        }
    }

    pub fn single(doc: &SourceDocument) -> Self {
        ChunkPlan {
            strategy: Strategy::SinglePass,
            chunks: vec![PlannedChunk {
                index: 0,
                kind: ChunkKind::Full,
                payload: doc.full_fragment().to_payload(),
            }],
        }
    }

    /// Head, then the sections in fixed-size batches, then tail.
    pub fn chunked(doc: &SourceDocument, sections_per_batch: usize) -> Self {
        let per_batch = sections_per_batch.max(1);
        let mut kinds = vec![(ChunkKind::Head, doc.head_fragment().to_payload())];

        let sections = doc.sections();
        for (batch, records) in sections.chunks(per_batch).enumerate() {
            let start = batch * per_batch;
            kinds.push((
                ChunkKind::Sections {
                    batch,
                    start,
                    end: start + records.len(),
                },
                Value::Array(records.to_vec()),
            ));
        }

        kinds.push((ChunkKind::Tail, doc.tail_fragment().to_payload()));

        ChunkPlan {
            strategy: Strategy::Chunked,
            chunks: kinds
                .into_iter()
                .enumerate()
                .map(|(index, (kind, payload))| PlannedChunk {
                    index,
                    kind,
                    payload,
                })
                .collect(),
        }
    }

    pub fn section_batches(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c.kind, ChunkKind::Sections { .. }))
            .count()
    }

    pub fn section_count(&self) -> usize {
        self.chunks
            .iter()
            .filter_map(|c| match c.kind {
                ChunkKind::Sections { end, .. } => Some(end),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}
