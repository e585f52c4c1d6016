//! Core `Config` struct definition.
//!
//! # Sub-modules
//!
//! - [`methods`]: lookups and the settings mutators used by the CLI
//! - [`persistence`]: path resolution, YAML load/save, [`ConfigStore`]

mod methods;
mod persistence;

pub use persistence::{CONFIG_PATH_ENV, ConfigStore, FileStore};

use crate::diagram_types::DiagramType;
use crate::types::{ErrorPresentation, OutputFormat, RenderMode};
use serde::{Deserialize, Serialize};

/// Persisted settings for diagram rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Server
    // ========================================================================
    /// Base URL of the Kroki server. Always stored with a trailing slash.
    #[serde(default = "crate::defaults::server_url")]
    pub server_url: String,

    /// Global timeout for one rendering request, in seconds.
    #[serde(default = "crate::defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Prefix for "edit this diagram" links; empty disables the link.
    #[serde(default = "crate::defaults::editor_url")]
    pub editor_url: String,

    // ========================================================================
    // Source preprocessing
    // ========================================================================
    /// Text included at the head of every diagram (e.g. a PlantUML
    /// `!include` for a shared theme).
    #[serde(default)]
    pub header: String,

    /// Prepend `header` to diagram sources before encoding.
    #[serde(default = "crate::defaults::bool_false")]
    pub apply_header: bool,

    /// Drop trailing `=` padding from encoded tokens.
    #[serde(default = "crate::defaults::bool_false")]
    pub strip_padding: bool,

    // ========================================================================
    // Output
    // ========================================================================
    /// Image format used for the diagram reference.
    #[serde(default = "crate::defaults::output_format")]
    pub output_format: OutputFormat,

    /// Embed fetched SVG markup or reference the rendering URL.
    #[serde(default = "crate::defaults::render_mode")]
    pub render_mode: RenderMode,

    /// Presentation of blocks whose render failed.
    #[serde(default = "crate::defaults::on_error")]
    pub on_error: ErrorPresentation,

    // ========================================================================
    // Diagram types
    // ========================================================================
    #[serde(default = "crate::defaults::diagram_types")]
    pub diagram_types: Vec<DiagramType>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: crate::defaults::server_url(),
            timeout_secs: crate::defaults::timeout_secs(),
            editor_url: crate::defaults::editor_url(),
            header: String::new(),
            apply_header: false,
            strip_padding: false,
            output_format: crate::defaults::output_format(),
            render_mode: crate::defaults::render_mode(),
            on_error: crate::defaults::on_error(),
            diagram_types: crate::defaults::diagram_types(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style server override.
    pub fn with_server_url(mut self, url: &str) -> Self {
        self.set_server_url(url);
        self
    }

    /// Builder-style render mode override.
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }
}

/// Append a `/` to `url` unless it already ends with one.
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
