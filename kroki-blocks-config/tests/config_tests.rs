use kroki_blocks_config::{Config, ConfigStore, ErrorPresentation, FileStore, OutputFormat, RenderMode};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_yaml_serialization() {
    let config = Config::default();
    let yaml = serde_yaml_ng::to_string(&config).unwrap();
    assert!(yaml.contains("https://kroki.io/"));
    assert!(yaml.contains("render_mode: embed_inline"));
    assert!(yaml.contains("kroki_name: graphviz"));
}

#[test]
fn test_config_partial_yaml_fills_defaults() {
    let yaml = r#"
server_url: "http://localhost:8000"
header: "!include https://example.com/theme.puml"
apply_header: true
render_mode: reference_by_url
"#;
    let mut config: Config = serde_yaml_ng::from_str(yaml).unwrap();
    config.normalize();
    assert_eq!(config.server_url, "http://localhost:8000/");
    assert_eq!(
        config.effective_header(),
        Some("!include https://example.com/theme.puml")
    );
    assert_eq!(config.render_mode, RenderMode::ReferenceByUrl);
    assert_eq!(config.output_format, OutputFormat::Svg);
    assert_eq!(config.on_error, ErrorPresentation::KeepSource);
    assert_eq!(config.diagram_types.len(), 24);
}

#[test]
fn test_config_load_merges_missing_types() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    fs::write(
        &path,
        r#"
server_url: https://kroki.example.com
diagram_types:
  - display_name: GraphViz
    kroki_name: graphviz
    block_name: dot
    enabled: true
  - display_name: Mermaid
    kroki_name: mermaid
    block_name: kroki-mermaid
"#,
    )
    .unwrap();

    let config = FileStore::new(&path).load().unwrap();
    assert_eq!(config.server_url, "https://kroki.example.com/");
    assert_eq!(config.diagram_types.len(), 24);
    assert_eq!(config.diagram_type("graphviz").unwrap().block_name, "dot");
    // `enabled` omitted in the file defaults to true.
    assert!(config.diagram_type("mermaid").unwrap().enabled);
    // Merged-in defaults keep their default state.
    assert!(!config.diagram_type("plantuml").unwrap().enabled);
}

#[test]
fn test_config_unknown_fields_are_ignored() {
    let yaml = "server_url: https://kroki.io/\nlegacy_toggle: true\n";
    let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
    assert_eq!(config.server_url, "https://kroki.io/");
}

#[test]
fn test_config_save_reload_preserves_rename() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path().join("config.yaml"));

    let mut config = Config::default();
    config.rename_block("graphviz", "dot").unwrap();
    config.strip_padding = true;
    store.save(&config).unwrap();

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_config_load_clamps_timeout() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");

    fs::write(&path, "timeout_secs: 18446744073709551615\n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap().timeout_secs, 600);

    fs::write(&path, "timeout_secs: 0\n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap().timeout_secs, 1);

    fs::write(&path, "timeout_secs: 45\n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap().timeout_secs, 45);
}
