//! Block processors: turn the text of one fenced diagram block into markup.
//!
//! There is a single parameterised implementation, [`KrokiProcessor`]; the
//! [`ProcessorRegistry`] instantiates one per enabled diagram type, keyed by
//! the user's block tag and targeting the type's Kroki identifier.
//!
//! # Sub-modules
//!
//! - [`kroki`]: `KrokiProcessor` and the markup it produces
//! - [`registry`]: block tag → processor map built from the config

mod kroki;
mod registry;

pub use kroki::KrokiProcessor;
pub use registry::ProcessorRegistry;

use std::sync::Arc;

use kroki_blocks_config::{Config, OutputFormat, RenderMode};

use crate::encoder::{EncodeOptions, EncodedToken};
use crate::error::RenderError;

/// Markup produced for one diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// HTML fragment replacing the fenced block.
    pub html: String,
    /// Token the URLs were built from.
    pub token: EncodedToken,
}

/// A processor for one diagram type.
///
/// Implementations must be `Send + Sync`; blocks of a document are
/// processed in parallel.
pub trait BlockProcessor: Send + Sync {
    /// Kroki identifier this processor renders with.
    fn diagram_type(&self) -> &str;

    /// Render the raw text of a block.
    fn process(&self, source: &str) -> Result<RenderedBlock, RenderError>;
}

/// Type alias for a shared block processor.
pub type BoxedProcessor = Arc<dyn BlockProcessor>;

/// The slice of [`Config`] a processor needs, shared by all processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub server_url: String,
    pub output_format: OutputFormat,
    pub render_mode: RenderMode,
    pub header: Option<String>,
    pub strip_padding: bool,
    pub editor_url: String,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_url: config.server_url.clone(),
            output_format: config.output_format,
            render_mode: config.render_mode,
            header: config.effective_header().map(str::to_string),
            strip_padding: config.strip_padding,
            editor_url: config.editor_url.clone(),
        }
    }

    pub fn encode_options(&self) -> EncodeOptions<'_> {
        EncodeOptions {
            header: self.header.as_deref(),
            strip_padding: self.strip_padding,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("hello"), "hello");
        assert_eq!(html_escape("<svg>"), "&lt;svg&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_settings_header_only_when_applied() {
        let mut config = Config::default();
        config.header = "!theme plain".to_string();
        assert_eq!(RenderSettings::from_config(&config).header, None);
        config.apply_header = true;
        assert_eq!(
            RenderSettings::from_config(&config).header.as_deref(),
            Some("!theme plain")
        );
    }
}
