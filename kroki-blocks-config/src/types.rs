//! Enumerated configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image format requested from the rendering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    /// Path segment used by the remote service for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => Err(format!("unknown output format '{other}' (expected svg or png)")),
        }
    }
}

/// How a rendered diagram is inserted into the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Fetch the SVG markup and embed it directly.
    #[default]
    EmbedInline,
    /// Emit an image element pointing at the rendering URL; nothing is fetched.
    ReferenceByUrl,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::EmbedInline => f.write_str("embed_inline"),
            RenderMode::ReferenceByUrl => f.write_str("reference_by_url"),
        }
    }
}

/// What a block looks like in the output when its render fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPresentation {
    /// Leave the original fenced block in place.
    #[default]
    KeepSource,
    /// Replace the block with an empty error placeholder element.
    Placeholder,
}
