//! Pageshots
//!
//! Captures screenshots (or PDFs) of a batch of pages under configurable
//! viewport and output settings.
//!
//! # Features
//!
//! - **Layered configuration**: global defaults, per-target overrides and
//!   per-size overrides merge into one immutable [`JobSpec`] per capture
//! - **Filename templates**: `{url}`, `{stub}`, `{width}`, `{height}`,
//!   `{quality}`, `{full}`/`{fit}`
//! - **Lazy content settling**: pages are scrolled through and images awaited
//!   before the capture is taken
//! - **CDP Backend** (default): headless Chrome via the `cdp` feature
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # async fn example() -> pageshots::Result<()> {
//! use pageshots::{Browser, DriverConfig, LogReporter, ScrollSettler, Shots};
//!
//! let mut shots = Shots::new();
//! shots.settings_mut().set_format("png");
//! shots.settings_mut().add_size("1300x800");
//! shots.settings_mut().add_size("375x812");
//! shots.add_url("https://example.com");
//!
//! let browser = Browser::launch(DriverConfig::default()).await?;
//! let page = browser.new_page().await?;
//! let report = shots.run(page, ScrollSettler::default(), &mut LogReporter::new()).await?;
//! for shot in &report.captured {
//!     println!("{}", shot.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config_file;
pub mod driver;
pub mod fanout;
pub mod format;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod runner;
pub mod settings;
pub mod settle;
pub mod target;
pub mod template;

// Chrome DevTools Protocol backend
#[cfg(feature = "cdp")]
pub mod cdp;

// Async page driver over the CDP backend (worker-thread facade)
#[cfg(feature = "cdp")]
pub mod async_api;

#[cfg(feature = "cdp")]
pub use async_api::{Browser, Page};

pub use config_file::ConfigFile;
pub use driver::{CaptureRequest, DriverConfig, PageDriver, Viewport};
pub use format::OutputFormat;
pub use pipeline::{CapturedShot, FailedShot, JobOutcome, JobState, RenderPipeline};
pub use report::{LogReporter, Reporter};
pub use resolve::{JobBuilder, JobSpec};
pub use runner::{RunReport, Shots};
pub use settings::Settings;
pub use settle::{NoSettle, ScrollSettler, SettleStrategy, SettleTiming};
pub use target::{Clip, ClipInput, Size, TargetInput};
