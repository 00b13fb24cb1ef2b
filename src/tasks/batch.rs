use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use template_model::MockupTemplate;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::asset::AssetRef;
use crate::output::{output_path, save_mockup};
use crate::pipeline::{PipelineOptions, PipelineWarning, generate_mockup};

/// Everything shared by the screenshots of one run.
#[derive(Debug, Clone)]
pub struct Batch {
    pub template_root: AssetRef,
    pub template: Arc<MockupTemplate>,
    pub options: PipelineOptions,
    /// `-o` as given; see [`output_path`].
    pub out: Option<PathBuf>,
    /// Base RNG seed; job `i` uses `seed + i`.
    pub seed: Option<u64>,
    pub max_in_flight: usize,
}

#[derive(Debug)]
pub struct Saved {
    pub path: PathBuf,
    pub warnings: Vec<PipelineWarning>,
}

#[derive(Debug)]
pub struct JobReport {
    pub index: usize,
    pub screenshot: AssetRef,
    pub outcome: Result<Saved>,
}

impl Batch {
    /// Jobs allowed at once. An `-o` naming a file is shared by every job, so
    /// those writes go one at a time and the last screenshot wins.
    pub fn effective_in_flight(&self) -> usize {
        if self.out.as_deref().is_some_and(|p| p.extension().is_some()) {
            return 1;
        }
        self.max_in_flight.max(1)
    }

    fn rng_for(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_os_rng(),
        }
    }

    /// Generates and writes one mockup. Blocking; run off the async workers.
    pub fn process(&self, index: usize, screenshot: &AssetRef) -> Result<Saved> {
        let mut rng = self.rng_for(index);
        let mockup = generate_mockup(
            &self.template_root,
            screenshot,
            &self.template,
            &self.options,
            &mut rng,
        )
        .with_context(|| format!("failed to generate mockup for {screenshot}"))?;
        let path = output_path(self.out.as_deref(), &screenshot.file_name());
        save_mockup(&mockup.image, &path)
            .with_context(|| format!("failed to save mockup for {screenshot}"))?;
        Ok(Saved {
            path,
            warnings: mockup.warnings,
        })
    }
}

/// Processes every screenshot with at most `max_in_flight` running at once.
/// A failing screenshot is logged and reported; the rest still run. Reports
/// come back in input order.
#[instrument(skip_all, fields(template = %batch.template.slug, count = screenshots.len()))]
pub async fn run(batch: Arc<Batch>, screenshots: Vec<AssetRef>) -> Vec<JobReport> {
    let max_in_flight = batch.effective_in_flight();
    debug!(max_in_flight, "starting batch");
    let mut pending = screenshots.into_iter().enumerate();
    let mut tasks: JoinSet<JobReport> = JoinSet::new();
    let mut reports = Vec::new();

    loop {
        while tasks.len() < max_in_flight {
            let Some((index, screenshot)) = pending.next() else {
                break;
            };
            debug!(index, screenshot = %screenshot, "queueing screenshot");
            let batch = Arc::clone(&batch);
            tasks.spawn(async move {
                let shot = screenshot.clone();
                let res =
                    tokio::task::spawn_blocking(move || batch.process(index, &shot)).await;
                let outcome = res
                    .map_err(|err| anyhow!("worker for {screenshot} stopped: {err}"))
                    .and_then(|r| r);
                JobReport {
                    index,
                    screenshot,
                    outcome,
                }
            });
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };
        match joined {
            Ok(report) => {
                match &report.outcome {
                    Ok(saved) => {
                        for warning in &saved.warnings {
                            warn!(screenshot = %report.screenshot, "{warning}");
                        }
                        info!(screenshot = %report.screenshot, path = %saved.path.display(), "mockup written");
                    }
                    Err(err) => warn!(screenshot = %report.screenshot, "skipping: {err:#}"),
                }
                reports.push(report);
            }
            Err(err) => warn!("batch task failed: {err}"),
        }
    }

    reports.sort_by_key(|r| r.index);
    reports
}
