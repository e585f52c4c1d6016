//! Configuration system for kroki-blocks.
//!
//! This crate provides configuration loading, saving, and default values
//! for the diagram renderer. It includes:
//!
//! - The persisted settings object ([`Config`])
//! - The table of supported diagram types ([`DiagramType`])
//! - Output format, render mode and failure presentation enums
//! - A small persistence interface ([`ConfigStore`]) with a YAML file backend

pub mod config;
pub mod defaults;
pub mod diagram_types;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{Config, ConfigStore, FileStore, ensure_trailing_slash};
pub use diagram_types::{DiagramType, default_diagram_types};
pub use error::ConfigError;
pub use types::{ErrorPresentation, OutputFormat, RenderMode};
