//! Lookups and settings mutators for `Config`.

use super::{Config, ensure_trailing_slash};
use crate::defaults::{MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use crate::diagram_types::DiagramType;
use crate::error::ConfigError;
use std::collections::HashSet;

impl Config {
    /// Normalise fields that are stored in canonical form.
    ///
    /// The server URL gets its trailing slash; an unusable URL is only
    /// reported, the fetch step fails on it later. An out-of-range timeout
    /// is clamped.
    pub fn normalize(&mut self) {
        let trimmed = self.server_url.trim();
        self.server_url = ensure_trailing_slash(trimmed);
        if let Err(e) = self.validate_server_url() {
            log::warn!("{e}");
        }
        if let Err(e) = self.validate_timeout() {
            log::warn!("{e}");
            self.timeout_secs = self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        }
    }

    /// Check that `timeout_secs` is within the accepted range.
    pub fn validate_timeout(&self) -> Result<(), ConfigError> {
        if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            Ok(())
        } else {
            Err(ConfigError::Validation(format!(
                "timeout_secs {} is outside {MIN_TIMEOUT_SECS}..={MAX_TIMEOUT_SECS}",
                self.timeout_secs
            )))
        }
    }

    /// Check that `server_url` is an absolute http(s) URL with a host.
    pub fn validate_server_url(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.server_url).map_err(|e| {
            ConfigError::Validation(format!("server_url '{}' is not a URL: {e}", self.server_url))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::Validation(format!(
                    "server_url '{}' uses unsupported scheme '{scheme}'",
                    self.server_url
                )));
            }
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Validation(format!(
                "server_url '{}' has no host",
                self.server_url
            )));
        }
        Ok(())
    }

    /// Store a new server URL in canonical form.
    pub fn set_server_url(&mut self, url: &str) {
        self.server_url = url.trim().to_string();
        self.normalize();
    }

    /// Header text to prepend to diagram sources, if prepending is active.
    pub fn effective_header(&self) -> Option<&str> {
        if self.apply_header && !self.header.is_empty() {
            Some(&self.header)
        } else {
            None
        }
    }

    /// Find a diagram type by its Kroki name, falling back to its block tag.
    pub fn diagram_type(&self, name: &str) -> Option<&DiagramType> {
        self.diagram_types
            .iter()
            .find(|t| t.kroki_name == name)
            .or_else(|| self.diagram_types.iter().find(|t| t.block_name == name))
    }

    fn diagram_type_mut(&mut self, name: &str) -> Result<&mut DiagramType, ConfigError> {
        let idx = self
            .diagram_types
            .iter()
            .position(|t| t.kroki_name == name)
            .or_else(|| self.diagram_types.iter().position(|t| t.block_name == name))
            .ok_or_else(|| ConfigError::UnknownDiagramType(name.to_string()))?;
        Ok(&mut self.diagram_types[idx])
    }

    /// Diagram types that should get a block processor.
    pub fn enabled_types(&self) -> impl Iterator<Item = &DiagramType> {
        self.diagram_types.iter().filter(|t| t.enabled)
    }

    /// Enable or disable a diagram type.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let diagram = self.diagram_type_mut(name)?;
        diagram.enabled = enabled;
        log::info!(
            "{} diagram type {}",
            if enabled { "Enabled" } else { "Disabled" },
            diagram.display_name
        );
        Ok(())
    }

    /// Change the fenced block tag of a diagram type.
    ///
    /// The Kroki name is untouched, so the same remote endpoint is used.
    pub fn rename_block(&mut self, name: &str, block_name: &str) -> Result<(), ConfigError> {
        let block_name = block_name.trim();
        if block_name.is_empty() || block_name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "block name '{block_name}' must be a single non-empty word"
            )));
        }
        let kroki_name = self.diagram_type_mut(name)?.kroki_name.clone();
        if let Some(other) = self
            .diagram_types
            .iter()
            .find(|t| t.block_name == block_name && t.kroki_name != kroki_name)
        {
            return Err(ConfigError::Validation(format!(
                "block name '{block_name}' is already used by {}",
                other.display_name
            )));
        }
        let diagram = self.diagram_type_mut(&kroki_name)?;
        diagram.block_name = block_name.to_string();
        Ok(())
    }

    /// Merge default diagram types into the user's config.
    /// Only adds types whose Kroki name is not already present, so types
    /// added in newer releases show up for existing users.
    pub(crate) fn merge_default_diagram_types(&mut self) {
        let existing: HashSet<String> = self
            .diagram_types
            .iter()
            .map(|t| t.kroki_name.clone())
            .collect();

        let mut added_count = 0;
        for default_type in crate::default_diagram_types() {
            if !existing.contains(&default_type.kroki_name) {
                log::info!("Adding new default diagram type: {}", default_type.kroki_name);
                self.diagram_types.push(default_type);
                added_count += 1;
            }
        }

        if added_count > 0 {
            log::info!(
                "Merged {} new default diagram type(s) into user config",
                added_count
            );
        }
    }
}
