//! KrokiProcessor: renders any diagram type through the Kroki GET API.

use std::sync::Arc;

use kroki_blocks_config::RenderMode;

use super::{BlockProcessor, RenderSettings, RenderedBlock, html_escape};
use crate::error::RenderError;
use crate::http::Fetcher;
use crate::request::DiagramRequest;

/// Renders fenced blocks of one diagram type.
///
/// The only per-type state is `kroki_name`; the processor does not know
/// which block tag it was registered under.
pub struct KrokiProcessor {
    kroki_name: String,
    settings: Arc<RenderSettings>,
    fetcher: Arc<dyn Fetcher>,
}

impl KrokiProcessor {
    pub fn new(
        kroki_name: impl Into<String>,
        settings: Arc<RenderSettings>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            kroki_name: kroki_name.into(),
            settings,
            fetcher,
        }
    }
}

impl BlockProcessor for KrokiProcessor {
    fn diagram_type(&self) -> &str {
        &self.kroki_name
    }

    fn process(&self, source: &str) -> Result<RenderedBlock, RenderError> {
        let settings = &self.settings;
        let request = DiagramRequest::new(&settings.server_url, &self.kroki_name, source)
            .with_format(settings.output_format);
        let urls = request.urls(&settings.encode_options())?;

        // Inline embedding needs markup, so it always fetches SVG; the PNG URL
        // is the click-through target in both modes.
        let figure = match settings.render_mode {
            RenderMode::EmbedInline => {
                let svg = self.fetcher.get_text(&urls.svg)?;
                strip_xml_prolog(&svg).trim().to_string()
            }
            RenderMode::ReferenceByUrl => format!(
                "<img src=\"{}\" alt=\"{} diagram\" loading=\"lazy\">",
                html_escape(urls.for_format(request.format)),
                html_escape(&self.kroki_name)
            ),
        };

        let mut html = format!(
            "<div class=\"kroki-block\" data-kroki-type=\"{}\">",
            html_escape(&self.kroki_name)
        );
        html.push_str(&format!(
            "<a class=\"kroki-diagram\" href=\"{}\" data-kroki-token=\"{}\">{}</a>",
            html_escape(&urls.png),
            urls.token,
            figure
        ));
        if !settings.editor_url.is_empty() {
            html.push_str(&format!(
                "<a class=\"kroki-edit\" href=\"{}{}\" title=\"Edit diagram\">edit</a>",
                html_escape(&settings.editor_url),
                html_escape(&urls.png)
            ));
        }
        html.push_str("</div>");

        Ok(RenderedBlock {
            html,
            token: urls.token,
        })
    }
}

/// Drop a leading XML declaration and doctype so the SVG can sit inside HTML.
fn strip_xml_prolog(svg: &str) -> &str {
    let mut rest = svg.trim_start();
    loop {
        let skipped = if rest.starts_with("<?xml") {
            rest.find("?>").map(|end| &rest[end + 2..])
        } else if rest.starts_with("<!DOCTYPE") {
            rest.find('>').map(|end| &rest[end + 1..])
        } else {
            None
        };
        match skipped {
            Some(next) => rest = next.trim_start(),
            None => return rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncodeOptions, encode_source};
    use kroki_blocks_config::OutputFormat;
    use parking_lot::Mutex;

    /// Records requested URLs and answers with a fixed body.
    struct StubFetcher {
        body: Result<String, ()>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Ok(body.to_string()),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: Err(()),
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    impl Fetcher for StubFetcher {
        fn get_text(&self, url: &str) -> Result<String, RenderError> {
            self.requested.lock().push(url.to_string());
            self.body.clone().map_err(|_| RenderError::Fetch {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    fn token(source: &str) -> String {
        encode_source(source, &EncodeOptions::default())
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_strip_xml_prolog() {
        assert_eq!(strip_xml_prolog("<svg/>"), "<svg/>");
        assert_eq!(
            strip_xml_prolog("<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"x\">\n<svg/>"),
            "<svg/>"
        );
        assert_eq!(strip_xml_prolog("<?xml unterminated"), "<?xml unterminated");
    }

    #[test]
    fn test_embed_inline_fetches_svg_and_links_png() {
        let fetcher = StubFetcher::ok("<?xml version=\"1.0\"?><svg>ok</svg>");
        let processor = KrokiProcessor::new(
            "graphviz",
            Arc::new(RenderSettings::default()),
            fetcher.clone(),
        );
        let rendered = processor.process("digraph G {Hello->World}").unwrap();
        let t = token("digraph G {Hello->World}");

        assert_eq!(
            *fetcher.requested.lock(),
            vec![format!("https://kroki.io/graphviz/svg/{t}")]
        );
        assert_eq!(rendered.token.as_str(), t);
        assert!(rendered.html.contains("<svg>ok</svg>"));
        assert!(!rendered.html.contains("<?xml"));
        assert!(
            rendered
                .html
                .contains(&format!("href=\"https://kroki.io/graphviz/png/{t}\""))
        );
        assert!(
            rendered
                .html
                .contains(&format!("href=\"https://niolesk.top/#https://kroki.io/graphviz/png/{t}\""))
        );
    }

    #[test]
    fn test_reference_by_url_does_not_fetch() {
        let fetcher = StubFetcher::failing();
        let settings = RenderSettings {
            render_mode: RenderMode::ReferenceByUrl,
            output_format: OutputFormat::Png,
            editor_url: String::new(),
            ..RenderSettings::default()
        };
        let processor = KrokiProcessor::new("ditaa", Arc::new(settings), fetcher.clone());
        let rendered = processor.process("+--+").unwrap();
        let t = token("+--+");

        assert!(fetcher.requested.lock().is_empty());
        assert!(
            rendered
                .html
                .contains(&format!("<img src=\"https://kroki.io/ditaa/png/{t}\""))
        );
        assert!(!rendered.html.contains("kroki-edit"));
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let processor = KrokiProcessor::new(
            "erd",
            Arc::new(RenderSettings::default()),
            StubFetcher::failing(),
        );
        assert!(matches!(
            processor.process("[Person]"),
            Err(RenderError::Fetch { .. })
        ));
    }

    #[test]
    fn test_header_is_encoded_when_set() {
        let settings = RenderSettings {
            header: Some("!theme plain".to_string()),
            render_mode: RenderMode::ReferenceByUrl,
            ..RenderSettings::default()
        };
        let processor =
            KrokiProcessor::new("plantuml", Arc::new(settings), StubFetcher::failing());
        let rendered = processor.process("A -> B").unwrap();
        assert_eq!(
            crate::encoder::decode_token(rendered.token.as_str()).unwrap(),
            "!theme plain\nA -> B"
        );
    }
}
