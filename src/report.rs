//! Status reporting for a run

use std::time::Duration;

use crate::pipeline::{CapturedShot, FailedShot};
use crate::resolve::JobSpec;
use crate::runner::RunReport;

/// Receives progress events from the runner and the pipeline.
///
/// Every method has a no-op default so implementations only pick what they
/// display.
pub trait Reporter {
    fn loading(&mut self, _job: &JobSpec) {}

    fn loaded(&mut self, _job: &JobSpec, _elapsed: Duration) {}

    fn capturing(&mut self, _job: &JobSpec) {}

    fn captured(&mut self, _shot: &CapturedShot) {}

    fn failed(&mut self, _failure: &FailedShot) {}

    fn finished(&mut self, _report: &RunReport, _elapsed: Duration) {}

    /// Called once during teardown, on success and on abort alike
    fn stop(&mut self) {}
}

/// Reports through the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter {
    // job currently shown as in progress
    active: Option<String>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for LogReporter {
    fn loading(&mut self, job: &JobSpec) {
        log::info!("Loading {}", job.url());
        self.active = Some(job.url().to_string());
    }

    fn loaded(&mut self, job: &JobSpec, elapsed: Duration) {
        log::info!("{} loaded in {:.3}s", job.url(), elapsed.as_secs_f64());
    }

    fn capturing(&mut self, job: &JobSpec) {
        log::info!(
            "Starting {} capture {} ({}px / {}px)",
            job.format(),
            job.path().display(),
            job.width(),
            job.height()
        );
    }

    fn captured(&mut self, shot: &CapturedShot) {
        self.active = None;
        log::info!(
            "Saved {} ({}px / {}px)",
            shot.path.display(),
            shot.width,
            shot.height
        );
    }

    fn failed(&mut self, failure: &FailedShot) {
        self.active = None;
        log::warn!("Could not load {}: {}", failure.url, failure.error);
    }

    fn finished(&mut self, report: &RunReport, elapsed: Duration) {
        log::info!(
            "Captured {} shot(s), {} failed. Total time: {:.3}s",
            report.captured.len(),
            report.failed.len(),
            elapsed.as_secs_f64()
        );
    }

    fn stop(&mut self) {
        if let Some(url) = self.active.take() {
            log::warn!("Stopped while working on {}", url);
        }
    }
}
