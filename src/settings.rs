//! Process-wide shot defaults and the validators shared by every override path
//!
//! The same checks guard the setters on [`Settings`], the per-target overrides
//! applied during resolution, the config file and the command line. Invalid
//! input is never an error: the check returns `None` (or the setter `false`)
//! and the previous value stays in place.
//!
//! Loosely typed input follows one rule per field type:
//! - integers: a number, or a string that parses as a base-10 integer once trimmed
//! - flags: a bool, or one of `y`, `yes`, `true` (anything else reads as false)

use crate::format::OutputFormat;
use crate::target::{Clip, ClipInput, Size};

/// Upper bound for the post-load delay.
pub const MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_WIDTH: u32 = 1300;
pub const DEFAULT_HEIGHT: u32 = 900;
pub const DEFAULT_QUALITY: u8 = 100;

/// Image quality must be within 1..=100.
pub fn quality(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|q| (1..=100).contains(q))
}

/// Viewport width or height; at least 2 pixels.
pub fn dimension(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|d| *d >= 2)
}

/// Post-load delay in milliseconds, `0..=MAX_DELAY_MS`.
pub fn delay(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|d| *d <= MAX_DELAY_MS)
}

/// Clip origin must be non-negative and the rectangle non-empty.
pub fn clip(input: ClipInput) -> Option<Clip> {
    let x = u32::try_from(input.x).ok()?;
    let y = u32::try_from(input.y).ok()?;
    let width = u32::try_from(input.w).ok().filter(|w| *w > 0)?;
    let height = u32::try_from(input.h).ok().filter(|h| *h > 0)?;
    Some(Clip { x, y, width, height })
}

/// Integer coercion for string input.
pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Flag coercion for string input.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "true")
}

/// Global defaults every target starts from.
///
/// Set once before the run; the runner only reads it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    base_url: String,
    dir: String,
    format: OutputFormat,
    quality: u8,
    width: u32,
    height: u32,
    full_page: bool,
    clip: Option<Clip>,
    delay_ms: u64,
    name_format: Option<String>,
    sizes: Vec<Size>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            dir: String::new(),
            format: OutputFormat::Jpg,
            quality: DEFAULT_QUALITY,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            full_page: true,
            clip: None,
            delay_ms: 0,
            name_format: None,
            sizes: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

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

    /// Filename template, if one was configured.
    pub fn name_format(&self) -> Option<&str> {
        self.name_format.as_deref()
    }

    pub fn sizes(&self) -> &[Size] {
        &self.sizes
    }

    /// Prefix prepended to relative target addresses. Trailing slashes are dropped.
    pub fn set_base_url(&mut self, url: &str) -> bool {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return false;
        }
        self.base_url = url.to_string();
        true
    }

    pub fn set_dir(&mut self, dir: &str) -> bool {
        let dir = dir.trim();
        if dir.is_empty() {
            return false;
        }
        self.dir = dir.to_string();
        true
    }

    pub fn set_format(&mut self, format: &str) -> bool {
        match OutputFormat::parse(format) {
            Some(f) => {
                self.format = f;
                true
            }
            None => false,
        }
    }

    pub fn set_quality(&mut self, value: i64) -> bool {
        apply(&mut self.quality, quality(value))
    }

    pub fn set_width(&mut self, value: i64) -> bool {
        apply(&mut self.width, dimension(value))
    }

    pub fn set_height(&mut self, value: i64) -> bool {
        apply(&mut self.height, dimension(value))
    }

    pub fn set_full_page(&mut self, full: bool) {
        self.full_page = full;
    }

    pub fn set_clip(&mut self, input: ClipInput) -> bool {
        match clip(input) {
            Some(c) => {
                self.clip = Some(c);
                true
            }
            None => false,
        }
    }

    pub fn set_delay(&mut self, value: i64) -> bool {
        apply(&mut self.delay_ms, delay(value))
    }

    pub fn set_name_format(&mut self, template: &str) -> bool {
        if template.trim().is_empty() {
            return false;
        }
        self.name_format = Some(template.to_string());
        true
    }

    /// Append a `WIDTHxHEIGHT` size. Malformed entries are dropped.
    pub fn add_size(&mut self, value: &str) -> bool {
        match Size::parse(value.trim()) {
            Some(size) => {
                self.sizes.push(size);
                true
            }
            None => {
                log::warn!("Ignoring malformed size '{}'", value);
                false
            }
        }
    }

    /// Append an already structured size, subject to the dimension check.
    pub fn push_size(&mut self, size: Size) -> bool {
        if dimension(size.width as i64).is_none() || dimension(size.height as i64).is_none() {
            return false;
        }
        self.sizes.push(size);
        true
    }
}

fn apply<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.format(), OutputFormat::Jpg);
        assert_eq!(s.width(), 1300);
        assert_eq!(s.height(), 900);
        assert_eq!(s.quality(), 100);
        assert!(s.full_page());
        assert!(s.sizes().is_empty());
        assert_eq!(s.name_format(), None);
    }

    #[test]
    fn quality_bounds() {
        let mut s = Settings::default();
        assert!(s.set_quality(40));
        for bad in [0, 101, -5] {
            assert!(!s.set_quality(bad));
            assert_eq!(s.quality(), 40);
        }
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(" 80 "), Some(80));
        assert!(s.set_quality(1));
        assert!(s.set_quality(100));
        assert_eq!(s.quality(), 100);
    }

    #[test]
    fn dimension_and_delay_bounds() {
        let mut s = Settings::default();
        assert!(!s.set_width(1));
        assert!(!s.set_height(-10));
        assert!(s.set_width(2));
        assert_eq!(s.width(), 2);
        assert!(s.set_delay(0));
        assert!(s.set_delay(MAX_DELAY_MS as i64));
        assert!(!s.set_delay(MAX_DELAY_MS as i64 + 1));
        assert!(!s.set_delay(-1));
        assert_eq!(s.delay_ms(), MAX_DELAY_MS);
    }

    #[test]
    fn base_url_is_trimmed() {
        let mut s = Settings::default();
        assert!(s.set_base_url("  https://x.com/ "));
        assert_eq!(s.base_url(), "https://x.com");
        assert!(!s.set_base_url("   "));
        assert_eq!(s.base_url(), "https://x.com");
    }

    #[test]
    fn clip_requires_non_negative_origin_and_area() {
        let mut s = Settings::default();
        assert!(!s.set_clip(ClipInput { x: -1, y: 0, w: 10, h: 10 }));
        assert!(!s.set_clip(ClipInput { x: 0, y: 0, w: 0, h: 10 }));
        assert!(s.set_clip(ClipInput { x: 0, y: 5, w: 10, h: 10 }));
        assert_eq!(s.clip(), Some(Clip { x: 0, y: 5, width: 10, height: 10 }));
    }

    #[test]
    fn sizes_drop_malformed_entries() {
        let mut s = Settings::default();
        assert!(s.add_size("1000x800"));
        assert!(!s.add_size("200 x 100"));
        assert!(s.add_size("800x600"));
        assert_eq!(s.sizes(), &[Size::new(1000, 800), Size::new(800, 600)]);
    }

    #[test]
    fn flags() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag("y"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("1"));
    }
}
