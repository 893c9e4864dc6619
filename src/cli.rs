use crate::{
    adapter::HttpTranslator,
    chunk_plan::ChunkPlan,
    config::Config,
    credentials,
    document::SourceDocument,
    jobs::JobList,
    orchestrator::Orchestrator,
    report::RunReport,
    strategy,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(about = "Batch article translation (chunking + structural merge + idempotent jobs)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./doc-translate.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate every pending job of the job list.
    Run {
        /// Job list TOML; defaults to paths.jobs_file.
        #[arg(long)]
        jobs: Option<PathBuf>,
        #[arg(long)]
        source_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Resolve job states without calling the translator or writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the strategy and chunk plan for one source document.
    Plan {
        #[arg(long)]
        input: PathBuf,
    },
    /// List the configured language profiles.
    Languages {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::parse("")?,
    };
    let _guard = init_logging(&args, &cfg)?;
    if let Some(p) = &cfg_path {
        info!("config {}", p.display());
    }

    match &args.cmd {
        Command::Run {
            jobs,
            source_dir,
            output_dir,
            dry_run,
        } => {
            let mut cfg = cfg;
            if let Some(d) = source_dir {
                cfg.paths.source_dir = d.display().to_string();
            }
            if let Some(d) = output_dir {
                cfg.paths.output_dir = d.display().to_string();
            }
            let jobs_path = jobs
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.jobs_file));
            let list = JobList::load(&jobs_path)?;
            if *dry_run {
                preview(&cfg, &list)
            } else {
                run(&cfg, &list)
            }
        }
        Command::Plan { input } => plan(&cfg, input),
        Command::Languages {} => languages(&cfg),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    ["doc-translate.toml", "doc-translate.example.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .boxed()
    };

    let file_path = resolve_log_path(cfg);
    let (file_layer, guard) = if let Some(path) = file_path.as_deref() {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("doc-translate.log"))
}

fn run(cfg: &Config, list: &JobList) -> Result<()> {
    let api_key = credentials::resolve(
        &cfg.adapter.api_key_env,
        Path::new(&cfg.paths.credentials_file),
    )?;
    let translator = HttpTranslator::new(cfg, api_key)?;
    let orchestrator = Orchestrator::new(cfg, &translator);

    let report = orchestrator.run(list);
    finish(cfg, &report)
}

fn finish(cfg: &Config, report: &RunReport) -> Result<()> {
    if cfg.output.write_report_json {
        let path = Path::new(&cfg.output.report_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("writing run report: {}", path.display()))?;
        info!("report {}", path.display());
    }

    info!("{}", report.summary_line());
    if cfg.global.print_summary {
        println!("{}", "=".repeat(50));
        println!("{}", report.summary_line());
        println!("{}", "=".repeat(50));
    }
    Ok(())
}

fn preview(cfg: &Config, list: &JobList) -> Result<()> {
    let translator = NoTranslator;
    let jobs = Orchestrator::new(cfg, &translator).preview(list);
    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}

/// Stands in for the HTTP adapter when nothing will be sent.
struct NoTranslator;

impl crate::adapter::Translator for NoTranslator {
    fn translate(
        &self,
        _req: &crate::adapter::TranslateRequest<'_>,
    ) -> crate::error::Result<serde_json::Value> {
        Err(crate::error::Failure::Transport("dry run".into()))
    }
}

fn plan(cfg: &Config, input: &Path) -> Result<()> {
    let raw = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let doc = SourceDocument::from_slice(&raw)?;
    let decision = strategy::decide(cfg, &doc);
    let plan = ChunkPlan::for_document(cfg, &doc, &decision);

    let chunks: Vec<_> = plan
        .chunks
        .iter()
        .map(|c| {
            serde_json::json!({
                "index": c.index,
                "chunk": c.kind.label(),
                "payload_chars": c.payload.to_string().chars().count(),
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "decision": decision,
            "section_batches": plan.section_batches(),
            "chunks": chunks,
        }))?
    );
    Ok(())
}

fn languages(cfg: &Config) -> Result<()> {
    for (id, profile) in cfg.languages.iter() {
        println!("{id:<6} {:<28} {}", profile.name, profile.reading_time_label);
    }
    Ok(())
}
