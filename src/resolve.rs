//! Resolution of a target and the global defaults into one capture job
//!
//! Fields are fixed in dependency order: the address first, then the scalar
//! overrides, and the filename and output path last because they are derived
//! from everything else. [`JobBuilder`] holds the partially resolved state and
//! only hands out an immutable [`JobSpec`] once the filename is settled.

use std::path::{Path, PathBuf};

use crate::format::OutputFormat;
use crate::settings::{self, Settings};
use crate::target::{Clip, Size, TargetInput};
use crate::template::{self, TemplateFields};

/// Scheme assumed for addresses that carry none.
pub const DEFAULT_SCHEME: &str = "https://";
/// Filename template used when nothing else is configured.
pub const DEFAULT_NAME_FORMAT: &str = "{url}";
/// Default template once a target fans out over several sizes.
pub const SIZED_NAME_FORMAT: &str = "{url}-{width}";

/// Join a relative address onto `base` and make sure a scheme is present.
///
/// Addresses that already carry a scheme, or already start with `base`, are
/// not joined.
///
/// ```
/// use pageshots::resolve::normalize_address;
/// assert_eq!(normalize_address("/p", "https://x.com/"), "https://x.com/p");
/// assert_eq!(normalize_address("example.com", ""), "https://example.com");
/// ```
pub fn normalize_address(address: &str, base: &str) -> String {
    let address = address.trim();
    let base = base.trim();

    let joined = if base.is_empty()
        || template::scheme_len(address).is_some()
        || address.starts_with(base)
    {
        address.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            address.trim_start_matches('/')
        )
    };

    if template::scheme_len(&joined).is_some() {
        joined
    } else {
        format!("{}{}", DEFAULT_SCHEME, joined)
    }
}

/// Where a job's filename comes from.
#[derive(Debug, Clone, PartialEq)]
enum NameRule {
    /// Explicit name used as written
    Literal(String),
    /// Explicit name containing placeholders
    Template(String),
    /// Global template, or the built-in default
    Configured(Option<String>),
}

/// A fully resolved capture instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    url: String,
    dir: String,
    format: OutputFormat,
    quality: u8,
    width: u32,
    height: u32,
    full_page: bool,
    clip: Option<Clip>,
    delay_ms: u64,
    filename: String,
    path: PathBuf,

    // kept so size fan-out can derive the filename again
    name: NameRule,
    requested_format: OutputFormat,
    per_size: bool,
}

impl JobSpec {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Output format after extension precedence was applied.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn full_page(&self) -> bool {
        self.full_page
    }

    pub fn clip(&self) -> Option<Clip> {
        self.clip
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reopen this job for further changes. The filename and path are derived
    /// again when the builder is finished.
    pub fn to_builder(&self) -> JobBuilder {
        JobBuilder {
            url: self.url.clone(),
            dir: self.dir.clone(),
            format: self.requested_format,
            quality: self.quality,
            width: self.width,
            height: self.height,
            full_page: self.full_page,
            clip: self.clip,
            delay_ms: self.delay_ms,
            name: self.name.clone(),
            per_size: self.per_size,
        }
    }
}

/// Partially resolved job. Consumed by [`JobBuilder::build`].
#[derive(Debug, Clone)]
pub struct JobBuilder {
    url: String,
    dir: String,
    format: OutputFormat,
    quality: u8,
    width: u32,
    height: u32,
    full_page: bool,
    clip: Option<Clip>,
    delay_ms: u64,
    name: NameRule,
    per_size: bool,
}

impl JobBuilder {
    /// Merge a target's overrides over the global defaults. Overrides that
    /// fail validation fall back to the default silently.
    pub fn new(target: &TargetInput, defaults: &Settings) -> Self {
        let base = target
            .base_url
            .as_deref()
            .map(|b| b.trim().trim_end_matches('/'))
            .filter(|b| !b.is_empty())
            .unwrap_or(defaults.base_url());

        let dir = target
            .dir
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(defaults.dir())
            .to_string();

        let name = match target.name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(n) if template::is_template(n) => NameRule::Template(n.to_string()),
            Some(n) => NameRule::Literal(n.to_string()),
            None => NameRule::Configured(defaults.name_format().map(str::to_string)),
        };

        Self {
            url: normalize_address(&target.url, base),
            dir,
            format: target
                .format
                .as_deref()
                .and_then(OutputFormat::parse)
                .unwrap_or(defaults.format()),
            quality: target
                .quality
                .and_then(settings::quality)
                .unwrap_or(defaults.quality()),
            width: target
                .width
                .and_then(settings::dimension)
                .unwrap_or(defaults.width()),
            height: target
                .height
                .and_then(settings::dimension)
                .unwrap_or(defaults.height()),
            full_page: target.full_page().unwrap_or(defaults.full_page()),
            clip: target.clip.and_then(settings::clip).or(defaults.clip()),
            delay_ms: target
                .delay
                .and_then(settings::delay)
                .unwrap_or(defaults.delay_ms()),
            name,
            per_size: false,
        }
    }

    /// Apply one fan-out size. The full-page flag only changes when the size
    /// carries its own.
    pub fn size(mut self, size: Size) -> Self {
        self.width = size.width;
        self.height = size.height;
        if let Some(full) = size.full {
            self.full_page = full;
        }
        self.per_size = true;
        self
    }

    /// Fix the filename and path and freeze the job.
    pub fn build(self) -> JobSpec {
        let fields = TemplateFields {
            url: &self.url,
            width: self.width,
            height: self.height,
            quality: self.quality,
            full_page: self.full_page,
        };

        let rendered = match &self.name {
            NameRule::Literal(name) => name.clone(),
            NameRule::Template(name) => template::render(name, &fields),
            NameRule::Configured(format) => {
                let fallback = if self.per_size {
                    SIZED_NAME_FORMAT
                } else {
                    DEFAULT_NAME_FORMAT
                };
                template::render(format.as_deref().unwrap_or(fallback), &fields)
            }
        };

        // a recognized extension in the name wins over the configured type
        let (format, filename) = match OutputFormat::from_filename(&rendered) {
            Some(format) => (format, rendered),
            None => (self.format, format!("{}.{}", rendered, self.format.extension())),
        };

        let path = if self.dir.is_empty() {
            PathBuf::from(&filename)
        } else {
            Path::new(&self.dir).join(&filename)
        };

        JobSpec {
            url: self.url,
            dir: self.dir,
            format,
            quality: self.quality,
            width: self.width,
            height: self.height,
            full_page: self.full_page,
            clip: self.clip,
            delay_ms: self.delay_ms,
            filename,
            path,
            name: self.name,
            requested_format: self.format,
            per_size: self.per_size,
        }
    }
}

/// Resolve one target into its base job.
pub fn resolve(target: &TargetInput, defaults: &Settings) -> JobSpec {
    let job = JobBuilder::new(target, defaults).build();
    log::debug!(
        "Resolved {} -> {} ({}, {}x{})",
        target.url,
        job.path().display(),
        job.format(),
        job.width(),
        job.height()
    );
    job
}
