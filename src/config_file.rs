//! JSON config file (`shots.json`)
//!
//! All fields are optional. Numbers may be given as JSON numbers or numeric
//! strings, flags as booleans or `y`/`yes`/`true`; values that don't coerce
//! are ignored like any other invalid override.
//!
//! ```json
//! {
//!     "baseUrl": "https://example.com",
//!     "dir": "shots",
//!     "type": "jpg",
//!     "nameFormat": "{stub}-{width}",
//!     "sizes": ["1300x800", { "width": 375, "height": 812, "fit": true }],
//!     "urls": ["/", { "url": "/pricing", "clip": { "x": 0, "y": 0, "w": 800, "h": 600 } }]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::runner::Shots;
use crate::settings::{parse_flag, parse_int};
use crate::target::{ClipInput, Size, TargetInput};
use crate::{Error, Result};

/// Name used when no config file is given.
pub const DEFAULT_CONFIG_FILE: &str = "shots.json";

/// Integer accepted loosely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseInt {
    pub fn value(&self) -> Option<i64> {
        match self {
            LooseInt::Int(v) => Some(*v),
            LooseInt::Text(s) => parse_int(s),
            LooseInt::Other(_) => None,
        }
    }
}

/// Flag accepted loosely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseFlag {
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl LooseFlag {
    pub fn value(&self) -> Option<bool> {
        match self {
            LooseFlag::Flag(b) => Some(*b),
            LooseFlag::Text(s) => Some(parse_flag(s)),
            LooseFlag::Other(_) => None,
        }
    }
}

/// Any value of the expected shape, or something else that is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose<T> {
    Value(T),
    Other(serde_json::Value),
}

impl<T> Loose<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Loose::Value(v) => Some(v),
            Loose::Other(_) => None,
        }
    }
}

/// Value of an optional field, logging and dropping one of the wrong type.
fn accepted<'a, T>(field: &str, value: &'a Option<Loose<T>>) -> Option<&'a T> {
    match value.as_ref()? {
        Loose::Value(v) => Some(v),
        Loose::Other(other) => {
            log::warn!("Ignoring invalid {} {}", field, other);
            None
        }
    }
}

fn accepted_str<'a>(field: &str, value: &'a Option<Loose<String>>) -> Option<&'a str> {
    accepted(field, value).map(String::as_str)
}

fn accepted_list<'a, T>(field: &str, value: &'a Option<Loose<Vec<T>>>) -> &'a [T] {
    accepted(field, value).map(Vec::as_slice).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClipEntry {
    x: Option<LooseInt>,
    y: Option<LooseInt>,
    #[serde(alias = "width")]
    w: Option<LooseInt>,
    #[serde(alias = "height")]
    h: Option<LooseInt>,
}

impl ClipEntry {
    fn to_input(&self) -> Option<ClipInput> {
        let get = |v: &Option<LooseInt>| v.as_ref().and_then(LooseInt::value);
        Some(ClipInput {
            x: get(&self.x)?,
            y: get(&self.y)?,
            w: get(&self.w)?,
            h: get(&self.h)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeEntry {
    Text(String),
    Dims {
        width: LooseInt,
        height: LooseInt,
        #[serde(default)]
        full: Option<LooseFlag>,
        #[serde(default)]
        fit: Option<LooseFlag>,
    },
    Other(serde_json::Value),
}

impl SizeEntry {
    /// Malformed sizes are dropped.
    pub fn to_size(&self) -> Option<Size> {
        match self {
            SizeEntry::Text(s) => Size::parse(s.trim()),
            SizeEntry::Dims { width, height, full, fit } => {
                let width = crate::settings::dimension(width.value()?)?;
                let height = crate::settings::dimension(height.value()?)?;
                let full = full
                    .as_ref()
                    .and_then(LooseFlag::value)
                    .or_else(|| fit.as_ref().and_then(LooseFlag::value).map(|f| !f));
                Some(Size { width, height, full })
            }
            SizeEntry::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetEntry {
    url: Option<Loose<String>>,
    name: Option<Loose<String>>,
    base_url: Option<Loose<String>>,
    dir: Option<Loose<String>>,
    #[serde(rename = "type")]
    format: Option<Loose<String>>,
    quality: Option<LooseInt>,
    width: Option<LooseInt>,
    height: Option<LooseInt>,
    full: Option<LooseFlag>,
    fit: Option<LooseFlag>,
    clip: Option<Loose<ClipEntry>>,
    delay: Option<LooseInt>,
    sizes: Option<Loose<Vec<SizeEntry>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UrlEntry {
    Address(String),
    Target(TargetEntry),
    Other(serde_json::Value),
}

impl UrlEntry {
    /// `None` when the entry carries no usable address.
    pub fn to_target(&self) -> Option<TargetInput> {
        let t = match self {
            UrlEntry::Address(url) => return Some(TargetInput::new(url.as_str())),
            UrlEntry::Target(t) => t,
            UrlEntry::Other(other) => {
                log::warn!("Ignoring invalid url entry {}", other);
                return None;
            }
        };
        let url = accepted_str("url", &t.url)?;
        let owned = |v: Option<&str>| v.map(str::to_string);
        Some(TargetInput {
            url: url.to_string(),
            name: owned(accepted_str("name", &t.name)),
            base_url: owned(accepted_str("baseUrl", &t.base_url)),
            dir: owned(accepted_str("dir", &t.dir)),
            format: owned(accepted_str("type", &t.format)),
            quality: t.quality.as_ref().and_then(LooseInt::value),
            width: t.width.as_ref().and_then(LooseInt::value),
            height: t.height.as_ref().and_then(LooseInt::value),
            full: t.full.as_ref().and_then(LooseFlag::value),
            fit: t.fit.as_ref().and_then(LooseFlag::value),
            clip: accepted("clip", &t.clip).and_then(ClipEntry::to_input),
            delay: t.delay.as_ref().and_then(LooseInt::value),
            sizes: accepted_list("sizes", &t.sizes)
                .iter()
                .filter_map(SizeEntry::to_size)
                .collect(),
        })
    }
}

/// Parsed config file.
///
/// A field of the wrong JSON type is ignored like an out-of-range value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFile {
    pub base_url: Option<Loose<String>>,
    pub dir: Option<Loose<String>>,
    #[serde(rename = "type")]
    pub format: Option<Loose<String>>,
    pub name: Option<Loose<String>>,
    pub name_format: Option<Loose<String>>,
    pub quality: Option<LooseInt>,
    pub width: Option<LooseInt>,
    pub height: Option<LooseInt>,
    pub delay: Option<LooseInt>,
    pub fit: Option<LooseFlag>,
    pub full_screen: Option<LooseFlag>,
    pub clip: Option<Loose<ClipEntry>>,
    pub sizes: Option<Loose<Vec<SizeEntry>>>,
    pub urls: Option<Loose<Vec<UrlEntry>>>,
}

impl ConfigFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ConfigError(format!("Malformed config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("{} could not be read: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn sizes(&self) -> &[SizeEntry] {
        accepted_list("sizes", &self.sizes)
    }

    pub fn urls(&self) -> &[UrlEntry] {
        accepted_list("urls", &self.urls)
    }

    /// Apply onto `shots`: global fields through the validating setters, then
    /// the targets in file order.
    pub fn apply(&self, shots: &mut Shots) {
        let settings = shots.settings_mut();
        if let Some(base) = accepted_str("baseUrl", &self.base_url) {
            settings.set_base_url(base);
        }
        if let Some(dir) = accepted_str("dir", &self.dir) {
            settings.set_dir(dir);
        }
        if let Some(format) = accepted_str("type", &self.format) {
            settings.set_format(format);
        }
        if let Some(template) = accepted_str("nameFormat", &self.name_format) {
            settings.set_name_format(template);
        }
        if let Some(q) = self.quality.as_ref().and_then(LooseInt::value) {
            settings.set_quality(q);
        }
        if let Some(w) = self.width.as_ref().and_then(LooseInt::value) {
            settings.set_width(w);
        }
        if let Some(h) = self.height.as_ref().and_then(LooseInt::value) {
            settings.set_height(h);
        }
        if let Some(d) = self.delay.as_ref().and_then(LooseInt::value) {
            settings.set_delay(d);
        }
        if let Some(fit) = self.fit.as_ref().and_then(LooseFlag::value) {
            settings.set_full_page(!fit);
        }
        if let Some(full) = self.full_screen.as_ref().and_then(LooseFlag::value) {
            settings.set_full_page(full);
        }
        if let Some(clip) = accepted("clip", &self.clip).and_then(ClipEntry::to_input) {
            settings.set_clip(clip);
        }
        for size in self.sizes() {
            match size.to_size() {
                Some(size) => {
                    settings.push_size(size);
                }
                None => log::warn!("Ignoring malformed size {:?}", size),
            }
        }

        if let Some(name) = accepted_str("name", &self.name) {
            shots.set_name(name);
        }
        for target in self.urls().iter().filter_map(UrlEntry::to_target) {
            shots.add_target(target);
        }
    }
}

impl Shots {
    /// Read a config file and apply it.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let config = ConfigFile::load(path.as_ref())?;
        config.apply(self);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StarterConfig {
    base_url: &'static str,
    name_format: &'static str,
    #[serde(rename = "type")]
    format: &'static str,
    urls: Vec<String>,
    sizes: Vec<&'static str>,
}

/// Write a starter config file into `dir`, overwriting any existing one.
///
/// `.json` is appended to `file_name` when missing.
pub fn init(dir: &Path, file_name: Option<&str>) -> Result<PathBuf> {
    let mut name = safe_file_name(file_name.unwrap_or(DEFAULT_CONFIG_FILE).trim());
    let is_json = Path::new(&name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        name.push_str(".json");
    }

    let starter = StarterConfig {
        base_url: "",
        name_format: crate::resolve::SIZED_NAME_FORMAT,
        format: "jpg",
        urls: Vec::new(),
        sizes: vec!["1300x800"],
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    starter.serialize(&mut ser)?;

    let path = dir.join(&name);
    fs::write(&path, buf)?;
    log::info!("{} created", name);
    Ok(path)
}

fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_CONFIG_FILE.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn loose_values() {
        let cfg = ConfigFile::from_json(
            r#"{"quality": "80", "width": 1024, "height": "abc", "delay": true, "fit": "yes"}"#,
        )
        .unwrap();
        assert_eq!(cfg.quality.as_ref().and_then(LooseInt::value), Some(80));
        assert_eq!(cfg.width.as_ref().and_then(LooseInt::value), Some(1024));
        assert_eq!(cfg.height.as_ref().and_then(LooseInt::value), None);
        assert_eq!(cfg.delay.as_ref().and_then(LooseInt::value), None);
        assert_eq!(cfg.fit.as_ref().and_then(LooseFlag::value), Some(true));
    }

    #[test]
    fn size_entries() {
        let cfg = ConfigFile::from_json(
            r#"{"sizes": ["200x100", "200 x 100", {"width": 375, "height": "812", "fit": true}, 7]}"#,
        )
        .unwrap();
        let sizes: Vec<_> = cfg.sizes().iter().filter_map(SizeEntry::to_size).collect();
        assert_eq!(
            sizes,
            vec![
                Size::new(200, 100),
                Size { width: 375, height: 812, full: Some(false) },
            ]
        );
    }

    #[test]
    fn wrongly_typed_fields_are_ignored() {
        let cfg = ConfigFile::from_json(
            r#"{"clip": "nope", "dir": 5, "type": ["png"], "sizes": "1300x800", "urls": ["https://x.com"]}"#,
        )
        .unwrap();
        let mut shots = Shots::new();
        cfg.apply(&mut shots);

        let defaults = Settings::default();
        assert_eq!(shots.settings().clip(), None);
        assert_eq!(shots.settings().dir(), defaults.dir());
        assert_eq!(shots.settings().format(), defaults.format());
        assert!(shots.settings().sizes().is_empty());
        assert_eq!(shots.targets().len(), 1);
    }

    #[test]
    fn bad_url_entries_keep_the_rest() {
        let cfg = ConfigFile::from_json(
            r#"{"urls": [
                {"url": "https://x.com", "clip": 5, "dir": false, "sizes": {"w": 1}},
                {"url": 7},
                42,
                "https://y.com"
            ]}"#,
        )
        .unwrap();
        let mut shots = Shots::new();
        cfg.apply(&mut shots);

        let urls: Vec<_> = shots.targets().iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x.com", "https://y.com"]);
        let first = &shots.targets()[0];
        assert_eq!(first.clip, None);
        assert_eq!(first.dir, None);
        assert!(first.sizes.is_empty());
    }

    #[test]
    fn urls_that_are_not_a_list_are_ignored() {
        let cfg = ConfigFile::from_json(r#"{"urls": "https://x.com", "width": 800}"#).unwrap();
        let mut shots = Shots::new();
        cfg.apply(&mut shots);
        assert!(shots.targets().is_empty());
        assert_eq!(shots.settings().width(), 800);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ConfigFile::from_json("{ nope").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn safe_names() {
        assert_eq!(safe_file_name("a/b:c.json"), "a-b-c.json");
        assert_eq!(safe_file_name(""), "shots.json");
    }
}
