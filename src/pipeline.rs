//! Per-job render state machine
//!
//! `Idle -> Navigating -> Settling -> Delaying -> Capturing -> Done`, with
//! `Failed` reachable from `Navigating` only. A failed navigation is reported
//! as an outcome so the run can continue; any later error aborts the run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::driver::{CaptureRequest, PageDriver};
use crate::format::OutputFormat;
use crate::report::Reporter;
use crate::resolve::JobSpec;
use crate::settle::SettleStrategy;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Navigating,
    Settling,
    Delaying,
    Capturing,
    Done,
    Failed,
}

/// A shot that was written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedShot {
    pub url: String,
    pub path: PathBuf,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// A job whose page could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct FailedShot {
    pub url: String,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Captured(CapturedShot),
    Failed(FailedShot),
}

/// Drives one job at a time through the page driver.
#[derive(Debug)]
pub struct RenderPipeline<S> {
    settler: S,
    state: JobState,
}

impl<S: SettleStrategy> RenderPipeline<S> {
    pub fn new(settler: S) -> Self {
        Self {
            settler,
            state: JobState::Idle,
        }
    }

    /// State of the most recent job.
    pub fn state(&self) -> JobState {
        self.state
    }

    pub async fn render<D, R>(
        &mut self,
        driver: &mut D,
        job: &JobSpec,
        reporter: &mut R,
    ) -> Result<JobOutcome>
    where
        D: PageDriver,
        R: Reporter + ?Sized,
    {
        self.enter(JobState::Idle, job);

        self.enter(JobState::Navigating, job);
        reporter.loading(job);
        let started = Instant::now();
        if let Err(err) = driver.navigate(job.url()).await {
            if !err.is_navigation() {
                return Err(err);
            }
            self.enter(JobState::Failed, job);
            let failure = FailedShot {
                url: job.url().to_string(),
                path: job.path().to_path_buf(),
                error: err.to_string(),
            };
            reporter.failed(&failure);
            return Ok(JobOutcome::Failed(failure));
        }
        reporter.loaded(job, started.elapsed());

        self.enter(JobState::Settling, job);
        driver.set_viewport(job.width(), job.height()).await?;
        self.settler.settle(driver, job.height()).await?;

        if job.delay_ms() > 0 {
            self.enter(JobState::Delaying, job);
            tokio::time::sleep(Duration::from_millis(job.delay_ms())).await;
        }

        self.enter(JobState::Capturing, job);
        reporter.capturing(job);
        driver.capture(&CaptureRequest::for_job(job)).await?;

        self.enter(JobState::Done, job);
        let shot = CapturedShot {
            url: job.url().to_string(),
            path: job.path().to_path_buf(),
            format: job.format(),
            width: job.width(),
            height: job.height(),
        };
        reporter.captured(&shot);
        Ok(JobOutcome::Captured(shot))
    }

    fn enter(&mut self, state: JobState, job: &JobSpec) {
        log::debug!("{:?} -> {:?} for {}", self.state, state, job.path().display());
        self.state = state;
    }
}
