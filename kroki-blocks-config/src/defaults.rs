//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! `Config` fields so partially written config files still load.

use crate::types::{ErrorPresentation, OutputFormat, RenderMode};

/// Public Kroki instance.
pub const SERVER_URL: &str = "https://kroki.io/";

/// Accepted range for `timeout_secs`.
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Online diagram editor that accepts a rendering URL after the `#`.
pub const EDITOR_URL: &str = "https://niolesk.top/#";

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}

// ── Server ─────────────────────────────────────────────────────────────────

pub fn server_url() -> String {
    SERVER_URL.to_string()
}

pub fn editor_url() -> String {
    EDITOR_URL.to_string()
}

pub fn timeout_secs() -> u64 {
    30
}

// ── Rendering ──────────────────────────────────────────────────────────────

pub fn output_format() -> OutputFormat {
    OutputFormat::Svg
}

pub fn render_mode() -> RenderMode {
    RenderMode::EmbedInline
}

pub fn on_error() -> ErrorPresentation {
    ErrorPresentation::KeepSource
}

pub fn diagram_types() -> Vec<crate::DiagramType> {
    crate::default_diagram_types()
}
