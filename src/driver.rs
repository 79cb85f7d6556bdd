//! The page driver seam
//!
//! The pipeline only talks to a browser through [`PageDriver`]. The CDP
//! backend (`async_api::Page`) implements it for real captures; tests use a
//! recording implementation.

use std::path::PathBuf;

use crate::format::OutputFormat;
use crate::resolve::JobSpec;
use crate::target::Clip;
use crate::Result;

/// Launch configuration for a driver backend
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Initial window size; each job sets its own viewport afterwards
    pub viewport: Viewport,
    /// Upper bound for a navigation in milliseconds
    pub timeout_ms: u64,
    /// Custom user agent, if any
    pub user_agent: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 30000,
            user_agent: None,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::settings::DEFAULT_WIDTH,
            height: crate::settings::DEFAULT_HEIGHT,
        }
    }
}

/// Arguments for the capture primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Only set for the lossy format
    pub quality: Option<u8>,
    /// Always false when `clip` is set
    pub full_page: bool,
    pub clip: Option<Clip>,
}

impl CaptureRequest {
    pub fn for_job(job: &JobSpec) -> Self {
        let clip = job.clip();
        Self {
            path: job.path().to_path_buf(),
            format: job.format(),
            quality: (job.format() == OutputFormat::Jpg).then(|| job.quality()),
            full_page: job.full_page() && clip.is_none(),
            clip,
        }
    }
}

/// Operations the render pipeline needs from a browser page.
///
/// One driver is shared by the whole run and used by one job at a time.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Load `url` and wait for navigation to finish
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    /// Full rendered height of the current document in CSS pixels
    async fn content_height(&mut self) -> Result<u32>;

    async fn scroll_by(&mut self, delta: u32) -> Result<()>;

    async fn scroll_to_top(&mut self) -> Result<()>;

    /// Resolve once every image element has loaded or errored
    async fn wait_for_images(&mut self) -> Result<()>;

    /// Capture the page and write the result to `request.path`
    async fn capture(&mut self, request: &CaptureRequest) -> Result<()>;

    /// Release the browser
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
