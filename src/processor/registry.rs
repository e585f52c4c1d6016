//! Block tag → processor registry.

use std::collections::HashMap;
use std::sync::Arc;

use kroki_blocks_config::Config;

use super::{BlockProcessor, BoxedProcessor, KrokiProcessor, RenderSettings};
use crate::http::Fetcher;

/// Processors keyed by the fenced block tag they handle.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, BoxedProcessor>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one processor per enabled diagram type.
    ///
    /// Each processor is keyed by the type's `block_name` but renders with its
    /// `kroki_name`, so renamed tags keep hitting the right endpoint.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let settings = Arc::new(RenderSettings::from_config(config));
        let mut registry = Self::new();

        for diagram in &config.diagram_types {
            if !diagram.enabled {
                log::debug!("Not enabling diagram type: {}", diagram.display_name);
                continue;
            }
            log::debug!(
                "Enabling diagram type: {} (block '{}' -> {})",
                diagram.display_name,
                diagram.block_name,
                diagram.kroki_name
            );
            registry.register(
                &diagram.block_name,
                KrokiProcessor::new(
                    diagram.kroki_name.as_str(),
                    Arc::clone(&settings),
                    Arc::clone(&fetcher),
                ),
            );
        }

        log::info!("Registered {} diagram block processor(s)", registry.len());
        registry
    }

    /// Register a processor for a block tag, replacing any previous one.
    pub fn register<P: BlockProcessor + 'static>(&mut self, block_name: &str, processor: P) {
        if self
            .processors
            .insert(block_name.to_string(), Arc::new(processor))
            .is_some()
        {
            log::warn!("Replacing existing processor for block '{block_name}'");
        }
    }

    pub fn get(&self, block_name: &str) -> Option<&BoxedProcessor> {
        self.processors.get(block_name)
    }

    pub fn is_registered(&self, block_name: &str) -> bool {
        self.processors.contains_key(block_name)
    }

    /// Registered block tags, sorted.
    pub fn block_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn get_text(&self, url: &str) -> Result<String, RenderError> {
            Err(RenderError::Fetch {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_from_config_skips_disabled() {
        let registry = ProcessorRegistry::from_config(&Config::default(), Arc::new(NoNetwork));
        assert_eq!(registry.len(), 21);
        assert!(registry.is_registered("graphviz"));
        assert!(!registry.is_registered("mermaid"));
        assert!(!registry.is_registered("plantuml"));
    }

    #[test]
    fn test_renamed_block_targets_kroki_name() {
        let mut config = Config::default();
        config.rename_block("graphviz", "dot").unwrap();
        let registry = ProcessorRegistry::from_config(&config, Arc::new(NoNetwork));

        assert!(!registry.is_registered("graphviz"));
        let processor = registry.get("dot").unwrap();
        assert_eq!(processor.diagram_type(), "graphviz");
    }

    #[test]
    fn test_block_names_sorted() {
        let mut config = Config::default();
        for t in &mut config.diagram_types {
            t.enabled = matches!(t.kroki_name.as_str(), "vega" | "erd" | "bpmn");
        }
        let registry = ProcessorRegistry::from_config(&config, Arc::new(NoNetwork));
        assert_eq!(registry.block_names(), vec!["bpmn", "erd", "vega"]);
    }
}
