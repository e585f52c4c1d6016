//! Typed error variants for the kroki-blocks-config crate.
//!
//! `Config::load` and `Config::save` return `anyhow::Result` for the binary's
//! convenience; the underlying failures are these variants and can be
//! recovered with `downcast_ref::<ConfigError>()`.

use std::path::PathBuf;

/// Errors that can occur when loading, saving or editing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error on config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid YAML.
    #[error("YAML parse error in config: {0}")]
    Parse(#[source] serde_yaml_ng::Error),

    /// The config could not be serialised back to YAML.
    #[error("failed to serialise config: {0}")]
    Serialize(#[source] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    #[error("config validation error: {0}")]
    Validation(String),

    /// A settings command named a diagram type that is not in the table.
    #[error("unknown diagram type '{0}'")]
    UnknownDiagramType(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
