//! Per-target overrides and the small value types they carry

use std::fmt;

/// Rectangle of the page to capture instead of the whole viewport or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Unvalidated clip rectangle as supplied by a caller or config file.
///
/// It only becomes a [`Clip`] once every coordinate passes the bounds check,
/// see [`crate::settings::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipInput {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

/// One viewport size a target is captured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    /// Full-page flag for this size only; `None` inherits the target's value
    pub full: Option<bool>,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, full: None }
    }

    /// Parse `WIDTHxHEIGHT`. Anything other than two runs of digits around a
    /// single `x` is rejected, as are dimensions below the viewport minimum.
    ///
    /// ```
    /// use pageshots::Size;
    /// assert_eq!(Size::parse("200x100"), Some(Size::new(200, 100)));
    /// assert_eq!(Size::parse("200 x 100"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let (w, h) = value.split_once('x')?;
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(w) || !digits(h) {
            return None;
        }
        let width = crate::settings::dimension(w.parse().ok()?)?;
        let height = crate::settings::dimension(h.parse().ok()?)?;
        Some(Self::new(width, height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A target address plus its optional overrides.
///
/// Values are kept as supplied; they are validated during resolution and an
/// invalid override simply falls back to the global default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetInput {
    pub url: String,
    /// Literal filename or one-off name template
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub dir: Option<String>,
    /// Output type name (`jpg`, `png`, `pdf`)
    pub format: Option<String>,
    pub quality: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub full: Option<bool>,
    pub fit: Option<bool>,
    pub clip: Option<ClipInput>,
    pub delay: Option<i64>,
    /// Sizes for this target only; when empty the global sizes apply
    pub sizes: Vec<Size>,
}

impl TargetInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Full-page override carried by this target. `full` wins over `fit`.
    pub fn full_page(&self) -> Option<bool> {
        match (self.full, self.fit) {
            (Some(full), _) => Some(full),
            (None, Some(fit)) => Some(!fit),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parse_accepts_plain_pairs() {
        assert_eq!(Size::parse("1300x900"), Some(Size::new(1300, 900)));
        assert_eq!(Size::parse("1000x800").map(|s| s.to_string()), Some("1000x800".to_string()));
    }

    #[test]
    fn size_parse_rejects_noise() {
        for bad in ["200 x 100", "200X100", "x100", "200x", "-200x100", "200x100x3", "abc", "1x100"] {
            assert_eq!(Size::parse(bad), None, "{bad} should be rejected");
        }
    }

    #[test]
    fn full_wins_over_fit() {
        let mut t = TargetInput::new("a");
        assert_eq!(t.full_page(), None);
        t.fit = Some(true);
        assert_eq!(t.full_page(), Some(false));
        t.full = Some(true);
        assert_eq!(t.full_page(), Some(true));
    }
}
