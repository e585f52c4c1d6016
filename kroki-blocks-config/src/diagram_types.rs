//! Diagram type registry: supported Kroki diagram languages and their metadata.

use serde::{Deserialize, Serialize};

/// A supported diagram type.
///
/// `kroki_name` is the path segment the remote service expects and is fixed.
/// `block_name` is the fenced code block tag users write in their notes; it
/// may be renamed (e.g. to avoid a clash with another renderer) without
/// affecting which endpoint is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramType {
    /// Display name (e.g., "GraphViz", "C4 with PlantUML").
    pub display_name: String,
    /// Kroki API type identifier (e.g., "graphviz").
    pub kroki_name: String,
    /// Fenced code block tag that triggers this type.
    pub block_name: String,
    /// Project page of the diagram language.
    #[serde(default)]
    pub info_url: String,
    /// Whether a processor is registered for this type.
    #[serde(default = "crate::defaults::bool_true")]
    pub enabled: bool,
}

impl DiagramType {
    fn builtin(display_name: &str, kroki_name: &str, info_url: &str, enabled: bool) -> Self {
        Self {
            display_name: display_name.to_string(),
            kroki_name: kroki_name.to_string(),
            block_name: kroki_name.to_string(),
            info_url: info_url.to_string(),
            enabled,
        }
    }
}

/// (display name, kroki name, project url, enabled by default)
///
/// Mermaid and PlantUML are off by default since most note applications ship
/// their own renderer for those tags.
const BUILTIN_TYPES: &[(&str, &str, &str, bool)] = &[
    ("BlockDiag", "blockdiag", "https://github.com/blockdiag/blockdiag", true),
    ("BPMN", "bpmn", "https://github.com/bpmn-io/bpmn-js", true),
    ("Bytefield", "bytefield", "https://github.com/Deep-Symmetry/bytefield-svg/", true),
    ("SeqDiag", "seqdiag", "https://github.com/blockdiag/seqdiag", true),
    ("ActDiag", "actdiag", "https://github.com/blockdiag/actdiag", true),
    ("NwDiag", "nwdiag", "https://github.com/blockdiag/nwdiag", true),
    ("PacketDiag", "packetdiag", "https://github.com/blockdiag/nwdiag", true),
    ("RackDiag", "rackdiag", "https://github.com/blockdiag/nwdiag", true),
    ("C4 with PlantUML", "c4plantuml", "https://github.com/RicardoNiepel/C4-PlantUML", true),
    ("Ditaa", "ditaa", "http://ditaa.sourceforge.net/", true),
    ("Diagrams.net", "diagramsnet", "https://github.com/jgraph/drawio", false),
    ("Erd", "erd", "https://github.com/BurntSushi/erd", true),
    ("Excalidraw", "excalidraw", "https://github.com/excalidraw/excalidraw", true),
    ("GraphViz", "graphviz", "https://www.graphviz.org/", true),
    ("Mermaid", "mermaid", "https://github.com/knsv/mermaid", false),
    ("Nomnoml", "nomnoml", "https://github.com/skanaar/nomnoml", true),
    ("Pikchr", "pikchr", "https://github.com/drhsqlite/pikchr", true),
    ("PlantUML", "plantuml", "https://github.com/plantuml/plantuml", false),
    ("Structurizr", "structurizr", "https://structurizr.com/", true),
    ("Svgbob", "svgbob", "https://github.com/ivanceras/svgbob", true),
    ("UMlet", "umlet", "https://github.com/umlet/umlet", true),
    ("Vega", "vega", "https://github.com/vega/vega", true),
    ("Vega-Lite", "vegalite", "https://github.com/vega/vega-lite", true),
    ("WaveDrom", "wavedrom", "https://github.com/wavedrom/wavedrom", true),
];

/// Return the default set of diagram types.
pub fn default_diagram_types() -> Vec<DiagramType> {
    BUILTIN_TYPES
        .iter()
        .map(|&(display, kroki, url, enabled)| DiagramType::builtin(display, kroki, url, enabled))
        .collect()
}
