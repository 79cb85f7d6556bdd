//! Run controller: accumulates targets and captures them in order
//!
//! ```no_run
//! use pageshots::{LogReporter, ScrollSettler, Shots};
//!
//! # async fn run(page: impl pageshots::PageDriver) -> pageshots::Result<()> {
//! let mut shots = Shots::new();
//! shots.settings_mut().set_dir("shots");
//! shots.settings_mut().add_size("1300x800");
//! shots.add_url("https://example.com");
//!
//! let report = shots.run(page, ScrollSettler::default(), &mut LogReporter::new()).await?;
//! println!("{} captured", report.captured.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::Path;
use std::time::Instant;

use crate::driver::PageDriver;
use crate::fanout::{fan_out, sizes_for};
use crate::format::OutputFormat;
use crate::pipeline::{CapturedShot, FailedShot, JobOutcome, RenderPipeline};
use crate::report::Reporter;
use crate::resolve::{resolve, JobSpec};
use crate::settings::Settings;
use crate::settle::SettleStrategy;
use crate::target::TargetInput;
use crate::{Error, Result};

/// Outcome of a whole run, in job order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub captured: Vec<CapturedShot>,
    pub failed: Vec<FailedShot>,
}

/// Global defaults plus the ordered targets to capture.
#[derive(Debug, Clone, Default)]
pub struct Shots {
    settings: Settings,
    targets: Vec<TargetInput>,
    // name set before any target existed; bound to the first one added
    pending_name: Option<String>,
}

impl Shots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn targets(&self) -> &[TargetInput] {
        &self.targets
    }

    /// Add a bare address. Empty or whitespace-only addresses are ignored.
    pub fn add_url(&mut self, url: &str) -> bool {
        self.add_target(TargetInput::new(url))
    }

    /// Add a target with overrides. Returns false when its address is empty.
    pub fn add_target(&mut self, mut target: TargetInput) -> bool {
        let url = target.url.trim();
        if url.is_empty() {
            return false;
        }
        target.url = url.to_string();
        self.targets.push(target);

        if self.targets.len() == 1 {
            if let Some(name) = self.pending_name.take() {
                bind_name(&mut self.targets[0], name);
            }
        }
        true
    }

    /// Filename for the first target only. Held until a target exists.
    pub fn set_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.targets.first_mut() {
            Some(first) => bind_name(first, name.to_string()),
            None => self.pending_name = Some(name.to_string()),
        }
        true
    }

    /// Every job the run would capture, in order, without touching a browser.
    pub fn jobs(&self) -> Vec<JobSpec> {
        self.targets
            .iter()
            .flat_map(|target| self.jobs_for(target))
            .collect()
    }

    fn jobs_for(&self, target: &TargetInput) -> Vec<JobSpec> {
        let base = resolve(target, &self.settings);
        fan_out(base, sizes_for(target, &self.settings))
    }

    /// Capture every target in order through `driver`.
    ///
    /// A page that fails to load is recorded in the report and the run moves
    /// on. Any other error aborts the run. The driver is closed exactly once
    /// on every path.
    pub async fn run<D, S, R>(&self, driver: D, settler: S, reporter: &mut R) -> Result<RunReport>
    where
        D: PageDriver,
        S: SettleStrategy,
        R: Reporter + ?Sized,
    {
        self.run_until(driver, settler, reporter, std::future::pending())
            .await
    }

    /// Like [`Shots::run`], but stops with [`Error::Interrupted`] as soon as
    /// `interrupt` completes. The job in flight is abandoned and the usual
    /// teardown still runs.
    pub async fn run_until<D, S, R, I>(
        &self,
        mut driver: D,
        settler: S,
        reporter: &mut R,
        interrupt: I,
    ) -> Result<RunReport>
    where
        D: PageDriver,
        S: SettleStrategy,
        R: Reporter + ?Sized,
        I: Future<Output = ()>,
    {
        let started = Instant::now();
        let result = tokio::select! {
            res = self.capture_all(&mut driver, settler, reporter) => res,
            _ = interrupt => {
                log::warn!("Run interrupted; releasing the browser");
                Err(Error::Interrupted)
            }
        };
        let closed = teardown(driver, reporter).await;

        let report = result?;
        closed?;
        reporter.finished(&report, started.elapsed());
        Ok(report)
    }

    async fn capture_all<D, S, R>(&self, driver: &mut D, settler: S, reporter: &mut R) -> Result<RunReport>
    where
        D: PageDriver,
        S: SettleStrategy,
        R: Reporter + ?Sized,
    {
        let mut pipeline = RenderPipeline::new(settler);
        let mut report = RunReport::default();

        for target in &self.targets {
            // resolved lazily, right before the target is rendered
            for job in self.jobs_for(target) {
                create_dir(job.dir())?;
                match pipeline.render(driver, &job, reporter).await? {
                    JobOutcome::Captured(shot) => report.captured.push(shot),
                    JobOutcome::Failed(failure) => report.failed.push(failure),
                }
            }
        }
        Ok(report)
    }
}

fn bind_name(target: &mut TargetInput, name: String) {
    if let Some(format) = OutputFormat::from_filename(&name) {
        target.format = Some(format.extension().to_string());
    }
    target.name = Some(name);
}

/// Output directories are created one level deep only.
fn create_dir(dir: &str) -> Result<()> {
    if dir.is_empty() {
        return Ok(());
    }
    let path = Path::new(dir);
    if !path.exists() {
        log::debug!("Creating output directory {}", path.display());
        std::fs::create_dir(path)?;
    }
    Ok(())
}

async fn teardown<D, R>(driver: D, reporter: &mut R) -> Result<()>
where
    D: PageDriver,
    R: Reporter + ?Sized,
{
    reporter.stop();
    driver.close().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_addresses_are_not_added() {
        let mut shots = Shots::new();
        assert!(!shots.add_url(""));
        assert!(!shots.add_url("   "));
        assert!(shots.add_url(" https://x.com "));
        assert_eq!(shots.targets().len(), 1);
        assert_eq!(shots.targets()[0].url, "https://x.com");
    }

    #[test]
    fn deferred_name_binds_to_first_target_only() {
        let mut shots = Shots::new();
        assert!(shots.set_name("landing.png"));
        shots.add_url("https://x.com");
        shots.add_url("https://x.com/about");

        let jobs = shots.jobs();
        assert_eq!(jobs[0].filename(), "landing.png");
        assert_eq!(jobs[0].format(), OutputFormat::Png);
        assert_eq!(jobs[1].filename(), "x-com-about.jpg");
        assert_eq!(shots.targets()[0].format.as_deref(), Some("png"));
        assert_eq!(shots.targets()[1].name, None);
    }

    #[test]
    fn name_after_targets_applies_to_first() {
        let mut shots = Shots::new();
        shots.add_url("https://x.com");
        shots.add_url("https://y.com");
        shots.set_name("first");
        let jobs = shots.jobs();
        assert_eq!(jobs[0].filename(), "first.jpg");
        assert_eq!(jobs[1].filename(), "y-com.jpg");
    }

    #[test]
    fn jobs_fan_out_over_global_sizes() {
        let mut shots = Shots::new();
        shots.settings_mut().add_size("1000x800");
        shots.settings_mut().add_size("800x600");
        shots.add_url("https://x.com");
        let names: Vec<_> = shots.jobs().iter().map(|j| j.filename().to_string()).collect();
        assert_eq!(names, vec!["x-com-1000.jpg", "x-com-800.jpg"]);
    }
}
