//! Per-block rendering request and URL assembly.
//!
//! URLs follow the Kroki GET scheme:
//! `{server_url}{diagram_type}/{format}/{token}`, where `server_url` always
//! carries exactly one trailing slash.

use kroki_blocks_config::{OutputFormat, ensure_trailing_slash};

use crate::encoder::{EncodeOptions, EncodedToken, encode_source};
use crate::error::EncodeError;

/// One diagram to render. Built fresh for every block and dropped after the
/// URLs are produced.
#[derive(Debug, Clone)]
pub struct DiagramRequest<'a> {
    /// Kroki identifier, the remote path segment (never the local block tag).
    pub diagram_type: &'a str,
    /// Literal block contents.
    pub source: &'a str,
    pub format: OutputFormat,
    server_url: String,
}

/// The encoded token together with the URLs built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramUrls {
    pub token: EncodedToken,
    pub svg: String,
    pub png: String,
}

impl DiagramUrls {
    pub fn for_format(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Svg => &self.svg,
            OutputFormat::Png => &self.png,
        }
    }
}

impl<'a> DiagramRequest<'a> {
    pub fn new(server_url: &str, diagram_type: &'a str, source: &'a str) -> Self {
        Self {
            diagram_type,
            source,
            format: OutputFormat::Svg,
            server_url: ensure_trailing_slash(server_url.trim()),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Normalised server URL (with trailing slash).
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// `{server}{type}/{format}/` without the token.
    pub fn url_prefix(&self, format: OutputFormat) -> String {
        format!("{}{}/{}/", self.server_url, self.diagram_type, format)
    }

    /// Full URL for `token` in `format`.
    pub fn url_for(&self, format: OutputFormat, token: &EncodedToken) -> String {
        let mut url = self.url_prefix(format);
        url.push_str(token.as_str());
        url
    }

    /// Encode the source.
    pub fn encode(&self, options: &EncodeOptions<'_>) -> Result<EncodedToken, EncodeError> {
        encode_source(self.source, options)
    }

    /// Encode once and build the URL in the requested format.
    pub fn url(&self, options: &EncodeOptions<'_>) -> Result<String, EncodeError> {
        let token = self.encode(options)?;
        Ok(self.url_for(self.format, &token))
    }

    /// Encode once and build both the SVG and PNG URLs.
    pub fn urls(&self, options: &EncodeOptions<'_>) -> Result<DiagramUrls, EncodeError> {
        let token = self.encode(options)?;
        Ok(DiagramUrls {
            svg: self.url_for(OutputFormat::Svg, &token),
            png: self.url_for(OutputFormat::Png, &token),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prefix_normalizes_once() {
        for server in ["https://kroki.io", "https://kroki.io/"] {
            let request = DiagramRequest::new(server, "graphviz", "digraph {}");
            assert_eq!(request.server_url(), "https://kroki.io/");
            assert_eq!(
                request.url_prefix(OutputFormat::Svg),
                "https://kroki.io/graphviz/svg/"
            );
        }
    }

    #[test]
    fn test_urls_share_token() {
        let request = DiagramRequest::new("http://localhost:8000", "erd", "[Person]");
        let urls = request.urls(&EncodeOptions::default()).unwrap();
        assert_eq!(
            urls.svg,
            format!("http://localhost:8000/erd/svg/{}", urls.token)
        );
        assert_eq!(
            urls.png,
            format!("http://localhost:8000/erd/png/{}", urls.token)
        );
        assert_eq!(urls.for_format(OutputFormat::Png), urls.png);
    }

    #[test]
    fn test_url_uses_requested_format() {
        let request =
            DiagramRequest::new("https://kroki.io", "ditaa", "+--+").with_format(OutputFormat::Png);
        let url = request.url(&EncodeOptions::default()).unwrap();
        assert!(url.starts_with("https://kroki.io/ditaa/png/"));
    }
}
