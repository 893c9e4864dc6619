use doc_translate::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../doc-translate.example.toml");
    let cfg = Config::parse(raw).expect("parse TOML");
    assert_eq!(cfg.strategy.single_pass_max_chars, 15_000);
    assert_eq!(cfg.strategy.sections_per_batch, 2);
    assert!(cfg.global.max_parallel_jobs >= 1);
    assert_eq!(cfg.languages.get("nl-be").unwrap().name, "Belgian Dutch (Flemish)");
}

#[test]
fn empty_config_uses_defaults() {
    let cfg = Config::parse("").unwrap();
    assert_eq!(cfg.pacing.chunk_delay_ms, 500);
    assert_eq!(cfg.pacing.job_delay_ms, 1000);
    assert_eq!(cfg.adapter.api_key_env, "ANTHROPIC_API_KEY");
    assert!(cfg.schema.is_opaque("slug"));
    assert!(!cfg.envelope.control_chars_to_sanitize.contains(&b'\n'));
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = Config::parse(
        r#"
[strategy]
single_pass_max_chars = 9000
sections_per_batch = 3

[languages.pt]
name = "Portuguese"
reading_time_label = "min de leitura"
"#,
    )
    .unwrap();
    assert_eq!(cfg.strategy.single_pass_max_chars, 9000);
    assert_eq!(cfg.adapter.timeout_seconds, 120);
    assert_eq!(cfg.languages.get("pt").unwrap().name, "Portuguese");
    assert_eq!(cfg.languages.get("sv").unwrap().name, "Swedish");
}

#[test]
fn parse_example_job_list() {
    let list = doc_translate::jobs::JobList::parse(include_str!("../jobs.example.toml")).unwrap();
    let jobs = list.enumerate();
    assert_eq!(jobs.len(), 13);
    assert_eq!(
        list.aliases.get("power-of-attorney-spain-guide.json").map(String::as_str),
        Some("power-of-attorney-spain-property.json")
    );
}
