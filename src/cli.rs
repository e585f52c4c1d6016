//! Command-line interface for kroki-blocks.
//!
//! Renders markdown documents, encodes single diagrams, and edits the
//! persisted settings.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kroki_blocks_config::{Config, ConfigStore, FileStore, OutputFormat, RenderMode};
use log::LevelFilter;

use crate::document::DocumentRenderer;
use crate::encoder::{EncodeOptions, decode_token, encode_source};
use crate::http::HttpFetcher;
use crate::request::DiagramRequest;

/// kroki-blocks - Render diagram code blocks in markdown through a Kroki server
#[derive(Parser, Debug)]
#[command(name = "kroki-blocks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log verbosity (overrides RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace diagram blocks in a markdown document with rendered markup
    Render {
        /// Markdown file to read (stdin when omitted)
        input: Option<PathBuf>,

        /// File to write (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Embed fetched SVG or reference the image URL
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Image format for URL references (svg, png)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Kroki server to use for this run
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Exit with an error if any block failed to render
        #[arg(long)]
        strict: bool,
    },

    /// Print the token for one diagram, or its URL when --type is given
    Encode {
        /// Diagram source file (stdin when omitted); one trailing newline is dropped
        input: Option<PathBuf>,

        /// Diagram type or block tag to build a URL for
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        diagram_type: Option<String>,

        /// Image format for the URL (svg, png)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Print the diagram source contained in a token
    Decode {
        token: String,
    },

    /// List the diagram types table
    Types {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change the persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as YAML
    Show,
    /// Print the config file location
    Path,
    /// Overwrite the config file with defaults
    Reset,
    /// Set the Kroki server URL
    SetServer { url: String },
    /// Set the header text for diagram sources
    SetHeader { text: String },
    /// Turn header prepending on or off
    ApplyHeader {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Enable a diagram type
    Enable { name: String },
    /// Disable a diagram type
    Disable { name: String },
    /// Change the block tag a diagram type is recognised by
    Rename { name: String, block: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Fetch SVG and embed it
    Inline,
    /// Reference the rendering URL
    Url,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Inline => RenderMode::EmbedInline,
            ModeArg::Url => RenderMode::ReferenceByUrl,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let store = FileStore::resolve(cli.config.as_deref());

    match cli.command {
        Commands::Render {
            input,
            output,
            mode,
            format,
            server,
            strict,
        } => {
            let mut config = store.load().context("Failed to load config")?;
            if let Some(mode) = mode {
                config.render_mode = mode.into();
            }
            if let Some(format) = format {
                config.output_format = format;
            }
            if let Some(server) = server {
                config.set_server_url(&server);
            }
            render(&config, input.as_deref(), output.as_deref(), strict)
        }
        Commands::Encode {
            input,
            diagram_type,
            format,
        } => {
            let config = store.load().context("Failed to load config")?;
            let source = read_input(input.as_deref())?;
            let source = trim_final_newline(&source);
            let line = encode(&config, source, diagram_type.as_deref(), format)?;
            println!("{line}");
            Ok(())
        }
        Commands::Decode { token } => {
            let source = decode_token(token.trim()).context("Failed to decode token")?;
            println!("{source}");
            Ok(())
        }
        Commands::Types { json } => {
            let config = store.load().context("Failed to load config")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.diagram_types)?);
            } else {
                print_types(&config);
            }
            Ok(())
        }
        Commands::Config { action } => run_config_action(&store, action),
    }
}

fn render(config: &Config, input: Option<&Path>, output: Option<&Path>, strict: bool) -> Result<()> {
    let markdown = read_input(input)?;
    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs));
    let renderer = DocumentRenderer::from_config(config, Arc::new(fetcher));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let document = runtime.block_on(renderer.render(&markdown));

    match output {
        Some(path) => std::fs::write(path, &document.output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => io::stdout().lock().write_all(document.output.as_bytes())?,
    }

    for (block, err) in document.failures() {
        eprintln!("kroki-blocks: line {}: '{}' block: {err}", block.line, block.tag);
    }
    let failed = document.failures().count();
    if strict && failed > 0 {
        anyhow::bail!("{failed} diagram block(s) failed to render");
    }
    Ok(())
}

/// Token for `source`, or the full URL when a diagram type is named.
fn encode(
    config: &Config,
    source: &str,
    diagram_type: Option<&str>,
    format: Option<OutputFormat>,
) -> Result<String> {
    let options = EncodeOptions::from_config(config);
    let Some(name) = diagram_type else {
        return Ok(encode_source(source, &options)?.into_string());
    };

    let kroki_name = match config.diagram_type(name) {
        Some(t) => t.kroki_name.as_str(),
        None => {
            log::warn!("'{name}' is not in the diagram table, using it as the Kroki type");
            name
        }
    };
    let url = DiagramRequest::new(&config.server_url, kroki_name, source)
        .with_format(format.unwrap_or(config.output_format))
        .url(&options)?;
    Ok(url)
}

fn run_config_action(store: &FileStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", store.path().display());
            return Ok(());
        }
        ConfigAction::Show => {
            let config = store.load().context("Failed to load config")?;
            print!("{}", serde_yaml_ng::to_string(&config)?);
            return Ok(());
        }
        ConfigAction::Reset => {
            store
                .save(&Config::default())
                .context("Failed to write default config")?;
            println!("Reset {}", store.path().display());
            return Ok(());
        }
        _ => {}
    }

    let mut config = store.load().context("Failed to load config")?;
    apply_config_action(&mut config, action)?;
    store.save(&config).context("Failed to save config")?;
    Ok(())
}

/// Apply one mutating settings command.
fn apply_config_action(config: &mut Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::SetServer { url } => {
            config.set_server_url(&url);
            if let Err(e) = config.validate_server_url() {
                eprintln!("kroki-blocks: warning: {e}");
            }
        }
        ConfigAction::SetHeader { text } => config.header = text,
        ConfigAction::ApplyHeader { state } => config.apply_header = state == Toggle::On,
        ConfigAction::Enable { name } => config.set_enabled(&name, true)?,
        ConfigAction::Disable { name } => config.set_enabled(&name, false)?,
        ConfigAction::Rename { name, block } => config.rename_block(&name, &block)?,
        ConfigAction::Show | ConfigAction::Path | ConfigAction::Reset => {}
    }
    Ok(())
}

fn print_types(config: &Config) {
    println!("{:<16} {:<16} {:<16} ENABLED", "NAME", "BLOCK", "KROKI");
    for t in &config.diagram_types {
        println!(
            "{:<16} {:<16} {:<16} {}",
            t.display_name,
            t.block_name,
            t.kroki_name,
            if t.enabled { "yes" } else { "no" }
        );
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn trim_final_newline(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_args() {
        let cli = Cli::try_parse_from([
            "kroki-blocks",
            "--log-level",
            "debug",
            "render",
            "notes.md",
            "--mode",
            "url",
            "--format",
            "png",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevelArg::Debug));
        assert_eq!(
            cli.log_level.map(LogLevelArg::to_level_filter),
            Some(LevelFilter::Debug)
        );
        match cli.command {
            Commands::Render {
                input, mode, format, ..
            } => {
                assert_eq!(input, Some(PathBuf::from("notes.md")));
                assert_eq!(mode, Some(ModeArg::Url));
                assert_eq!(format, Some(OutputFormat::Png));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_level_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["kroki-blocks", "--log-level", "loud", "types"]).is_err());
        let cli = Cli::try_parse_from(["kroki-blocks", "types", "--log-level", "off"]).unwrap();
        assert_eq!(
            cli.log_level.map(LogLevelArg::to_level_filter),
            Some(LevelFilter::Off)
        );
    }

    #[test]
    fn test_encode_token_and_url() {
        let config = Config::default();
        assert_eq!(
            encode(&config, "A -> B", None, None).unwrap(),
            "eNpzVNC1U3ACAAQcAS8="
        );
        assert_eq!(
            encode(&config, "A -> B", Some("plantuml"), Some(OutputFormat::Png)).unwrap(),
            "https://kroki.io/plantuml/png/eNpzVNC1U3ACAAQcAS8="
        );
    }

    #[test]
    fn test_encode_resolves_renamed_block() {
        let mut config = Config::default();
        config.rename_block("graphviz", "dot").unwrap();
        let url = encode(&config, "A -> B", Some("dot"), None).unwrap();
        assert!(url.starts_with("https://kroki.io/graphviz/svg/"));
    }

    #[test]
    fn test_config_actions() {
        let mut config = Config::default();
        apply_config_action(
            &mut config,
            ConfigAction::SetServer {
                url: "http://localhost:8000".to_string(),
            },
        )
        .unwrap();
        apply_config_action(&mut config, ConfigAction::ApplyHeader { state: Toggle::On }).unwrap();
        apply_config_action(
            &mut config,
            ConfigAction::Enable {
                name: "mermaid".to_string(),
            },
        )
        .unwrap();

        assert_eq!(config.server_url, "http://localhost:8000/");
        assert!(config.apply_header);
        assert!(config.diagram_type("mermaid").unwrap().enabled);
        assert!(
            apply_config_action(
                &mut config,
                ConfigAction::Disable {
                    name: "nope".to_string()
                }
            )
            .is_err()
        );
    }

    #[test]
    fn test_config_actions_persist_through_store() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp.path().join("config.yaml"));
        run_config_action(
            &store,
            ConfigAction::Rename {
                name: "svgbob".to_string(),
                block: "bob".to_string(),
            },
        )
        .unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.diagram_type("svgbob").unwrap().block_name, "bob");
    }

    #[test]
    fn test_trim_final_newline() {
        assert_eq!(trim_final_newline("A -> B\n"), "A -> B");
        assert_eq!(trim_final_newline("A -> B\r\n"), "A -> B");
        assert_eq!(trim_final_newline("A\n\n"), "A\n");
    }
}
