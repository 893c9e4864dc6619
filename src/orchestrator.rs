use crate::{
    adapter::Translator,
    chunk_plan::ChunkPlan,
    config::Config,
    dispatch::Dispatcher,
    document::{same_shape, SourceDocument},
    error::{Failure, Result},
    jobs::{JobList, TranslationJob},
    merge::merge,
    pacing::Pacer,
    report::{JobReport, JobState, RunReport, SkipReason},
    store::{Claim, OutputStore, SourceStore},
    strategy,
    util::{now_rfc3339, sha256_hex},
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub struct Orchestrator<'a, T: Translator + ?Sized> {
    cfg: &'a Config,
    translator: &'a T,
    outputs: OutputStore,
    pacer: Pacer,
}

struct RunContext<'r> {
    list: &'r JobList,
    sources: SourceStore,
    total: usize,
    started: AtomicUsize,
}

impl<'a, T: Translator + ?Sized> Orchestrator<'a, T> {
    pub fn new(cfg: &'a Config, translator: &'a T) -> Self {
        Self {
            cfg,
            translator,
            outputs: OutputStore::new(&cfg.paths.output_dir),
            pacer: Pacer::from_millis(cfg.pacing.chunk_delay_ms),
        }
    }

    fn context<'r>(&self, list: &'r JobList, total: usize) -> RunContext<'r> {
        RunContext {
            list,
            sources: SourceStore::new(&self.cfg.paths.source_dir, list.aliases.clone()),
            total,
            started: AtomicUsize::new(0),
        }
    }

    /// Runs every job of the list. Job failures are recorded, never raised.
    pub fn run(&self, list: &JobList) -> RunReport {
        let started = now_rfc3339();
        let jobs = list.enumerate();
        let ctx = self.context(list, jobs.len());

        for job in &jobs {
            self.outputs.sweep_staging(&job.language, &job.document);
        }

        info!(
            "starting {} jobs from {} (workers={})",
            jobs.len(),
            self.cfg.paths.source_dir,
            self.cfg.global.max_parallel_jobs.max(1)
        );

        let reports = if self.cfg.global.max_parallel_jobs > 1 && jobs.len() > 1 {
            self.run_parallel(&ctx, &jobs)
        } else {
            jobs.iter()
                .enumerate()
                .map(|(i, job)| {
                    let report = self.process(&ctx, job);
                    self.pause_after(&report, i + 1 < jobs.len());
                    report
                })
                .collect()
        };

        RunReport::from_jobs(&self.cfg.global.run_name, started, now_rfc3339(), reports)
    }

    fn run_parallel(&self, ctx: &RunContext<'_>, jobs: &[TranslationJob]) -> Vec<JobReport> {
        let workers = self.cfg.global.max_parallel_jobs.min(jobs.len());
        let next = AtomicUsize::new(0);
        let done: Mutex<Vec<(usize, JobReport)>> = Mutex::new(Vec::with_capacity(jobs.len()));

        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| {
                    loop {
                        let i = next.fetch_add(1, Ordering::SeqCst);
                        let Some(job) = jobs.get(i) else { break };
                        let report = self.process(ctx, job);
                        self.pause_after(&report, next.load(Ordering::SeqCst) < jobs.len());
                        match done.lock() {
                            Ok(mut d) => d.push((i, report)),
                            Err(poisoned) => poisoned.into_inner().push((i, report)),
                        }
                    }
                });
            }
        });

        let mut done = done.into_inner().unwrap_or_else(|p| p.into_inner());
        done.sort_by_key(|(i, _)| *i);
        done.into_iter().map(|(_, r)| r).collect()
    }

    /// Resolves each job's state without translating or writing anything.
    pub fn preview(&self, list: &JobList) -> Vec<JobReport> {
        let jobs = list.enumerate();
        let ctx = self.context(list, jobs.len());
        jobs.iter()
            .map(|job| {
                let state = if let Some(state) = self.skip_state(&ctx, job) {
                    state
                } else if let Err(e) = self.cfg.languages.get(&job.language) {
                    failed(&e)
                } else if let Err(e) = ctx.sources.resolve(&job.document) {
                    failed(&e)
                } else {
                    JobState::Pending
                };
                let mut report = JobReport::new(&job.document, &job.language, state);
                report.output_path = Some(
                    self.outputs
                        .path_for(&job.language, &job.document)
                        .display()
                        .to_string(),
                );
                report
            })
            .collect()
    }

    fn skip_state(&self, ctx: &RunContext<'_>, job: &TranslationJob) -> Option<JobState> {
        if ctx.list.is_excluded(job) {
            return Some(JobState::Skipped {
                reason: SkipReason::NativeVersion,
            });
        }
        if self.outputs.exists(&job.language, &job.document) {
            return Some(JobState::Skipped {
                reason: SkipReason::OutputExists,
            });
        }
        None
    }

    fn process(&self, ctx: &RunContext<'_>, job: &TranslationJob) -> JobReport {
        let t0 = Instant::now();

        if let Some(state) = self.skip_state(ctx, job) {
            info!("SKIP: {}/{} ({:?})", job.language, job.document, state);
            return JobReport::new(&job.document, &job.language, state);
        }
        if let Err(e) = self.cfg.languages.get(&job.language) {
            error!("{}/{}: {e}", job.language, job.document);
            return JobReport::new(&job.document, &job.language, failed(&e));
        }

        let claim = match self.outputs.claim(&job.language, &job.document) {
            Ok(Some(claim)) => claim,
            Ok(None) => {
                info!("SKIP: {}/{} already exists or is in progress", job.language, job.document);
                return JobReport::new(
                    &job.document,
                    &job.language,
                    JobState::Skipped {
                        reason: SkipReason::OutputExists,
                    },
                );
            }
            Err(e) => {
                error!("{}/{}: {e}", job.language, job.document);
                return JobReport::new(&job.document, &job.language, failed(&e));
            }
        };

        let n = ctx.started.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "[{n}/{}] translating {} -> {}",
            ctx.total, job.document, job.language
        );

        let mut report = JobReport::new(&job.document, &job.language, JobState::Completed);
        match self.translate_job(ctx, job, claim, &mut report) {
            Ok(path) => {
                report.output_path = Some(path.display().to_string());
                if report.is_degraded() {
                    warn!("saved {}/{} with untranslated sections", job.language, job.document);
                } else {
                    info!("saved {}/{}", job.language, job.document);
                }
            }
            Err(e) => {
                error!("failed {}/{}: {e}", job.language, job.document);
                report.state = failed(&e);
            }
        }
        report.elapsed_ms = t0.elapsed().as_millis() as u64;
        report
    }

    /// Rests between jobs, but only after one that reached the translator and
    /// only when more jobs are waiting.
    fn pause_after(&self, report: &JobReport, more_pending: bool) {
        let called_translator = report.strategy.is_some();
        if called_translator && more_pending && self.cfg.pacing.job_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.cfg.pacing.job_delay_ms));
        }
    }

    fn translate_job(
        &self,
        ctx: &RunContext<'_>,
        job: &TranslationJob,
        claim: Claim,
        report: &mut JobReport,
    ) -> Result<PathBuf> {
        let language = self.cfg.languages.get(&job.language)?;
        let (doc, raw) = ctx.sources.load(&job.document)?;
        report.source_sha256 = Some(sha256_hex(&raw));

        let decision = strategy::decide(self.cfg, &doc);
        info!(
            "strategy {:?} ({}) for {}",
            decision.strategy, decision.reason, job.document
        );
        let plan = ChunkPlan::for_document(self.cfg, &doc, &decision);
        report.strategy = Some(decision);

        let out = Dispatcher::new(self.translator, &self.pacer).execute(&plan, language)?;
        report.chunk_reports = out.chunk_reports;

        let merged = merge(&doc, &out.fragment, &self.cfg.schema);
        let bytes = if self.cfg.output.pretty {
            serde_json::to_vec_pretty(&merged)
        } else {
            serde_json::to_vec(&merged)
        }
        .map_err(|e| Failure::Parse(format!("serializing output: {e}")))?;

        let source = doc.to_value();
        claim.publish(&bytes, |written| validate_output(written, &source))
    }
}

/// Re-parses a written output and checks it still has the source's shape.
pub fn validate_output(written: &[u8], source: &Value) -> Result<()> {
    let parsed = SourceDocument::from_slice(written)
        .map_err(|e| Failure::Parse(format!("written output failed re-parse: {e}")))?;
    if !same_shape(&parsed.to_value(), source) {
        return Err(Failure::Parse(
            "written output does not match the source structure".into(),
        ));
    }
    Ok(())
}

fn failed(e: &Failure) -> JobState {
    JobState::Failed {
        kind: e.kind().to_string(),
        error: e.to_string(),
    }
}
