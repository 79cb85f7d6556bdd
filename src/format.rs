//! Output formats a shot can be written as

use std::fmt;
use std::path::Path;

/// File type of a captured shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Lossy image; the only format that honors `quality`
    #[default]
    Jpg,
    Png,
    /// Printed document instead of an image
    Pdf,
}

impl OutputFormat {
    /// Parse a user supplied type name. `jpeg` is accepted as an alias of `jpg`.
    ///
    /// ```
    /// use pageshots::OutputFormat;
    /// assert_eq!(OutputFormat::parse("JPEG"), Some(OutputFormat::Jpg));
    /// assert_eq!(OutputFormat::parse("gif"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpg),
            "png" => Some(OutputFormat::Png),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }

    /// Format implied by a filename's extension, if it is a recognized one.
    pub fn from_filename(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, OutputFormat::Pdf)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
