mod common;

use doc_translate::{
    chunk_plan::{ChunkKind, ChunkPlan},
    document::SourceDocument,
    strategy::Strategy,
};

#[test]
fn chunked_plan_is_head_batches_tail() {
    let doc = SourceDocument::from_value(common::rich_article(5)).unwrap();
    let plan = ChunkPlan::chunked(&doc, 2);

    assert_eq!(plan.strategy, Strategy::Chunked);
    let kinds: Vec<ChunkKind> = plan.chunks.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChunkKind::Head,
            ChunkKind::Sections { batch: 0, start: 0, end: 2 },
            ChunkKind::Sections { batch: 1, start: 2, end: 4 },
            ChunkKind::Sections { batch: 2, start: 4, end: 5 },
            ChunkKind::Tail,
        ]
    );
    assert_eq!(plan.section_batches(), 3);
    assert_eq!(plan.section_count(), 5);
    assert!(plan.chunks[0].kind.is_fatal());
    assert!(!plan.chunks[1].kind.is_fatal());

    let head = &plan.chunks[0].payload;
    assert_eq!(head["title"], "Moraira Property Guide");
    assert_eq!(head["quickAnswer"], "Yes");
    assert!(head.get("conclusion").is_none());

    let batch = plan.chunks[2].payload.as_array().unwrap();
    assert_eq!(batch[0]["heading"], "Section 3");

    let tail = &plan.chunks.last().unwrap().payload;
    assert_eq!(tail["conclusion"], "Conclusion text");
    assert_eq!(tail["showcaseText"][1]["properties"][0]["title"], "Flat C");
    assert!(tail["showcaseText"][0]["properties"][0].get("price").is_none());
}

#[test]
fn document_without_sections_has_head_and_tail_only() {
    let doc = SourceDocument::from_value(common::rich_article(0)).unwrap();
    let plan = ChunkPlan::chunked(&doc, 2);
    assert_eq!(plan.chunks.len(), 2);
    assert_eq!(plan.section_batches(), 0);
}

#[test]
fn single_plan_carries_everything() {
    let doc = SourceDocument::from_value(common::rich_article(3)).unwrap();
    let plan = ChunkPlan::single(&doc);
    assert_eq!(plan.chunks.len(), 1);
    assert_eq!(plan.chunks[0].kind, ChunkKind::Full);
    let payload = &plan.chunks[0].payload;
    assert_eq!(payload["sections"].as_array().unwrap().len(), 3);
    assert_eq!(payload["tags"][1], "property");
    assert!(payload.get("slug").is_none());
}

#[test]
fn zero_batch_size_is_treated_as_one() {
    let doc = SourceDocument::from_value(common::rich_article(3)).unwrap();
    let plan = ChunkPlan::chunked(&doc, 0);
    assert_eq!(plan.section_batches(), 3);
}
