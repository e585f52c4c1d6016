//! HTTP client helper with native-tls support.
//!
//! Rendering requests are plain GETs against the Kroki server. The agent uses
//! native-tls, which works better in VM environments where ring/rustls may
//! have issues, and a global timeout so one slow diagram cannot hang a render.

use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

use crate::error::RenderError;

/// Default global timeout for one rendering request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum response body size for rendered diagrams (10 MB).
pub const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

const USER_AGENT: &str = concat!("kroki-blocks/", env!("CARGO_PKG_VERSION"));

/// Create a new HTTP agent configured with native-tls and a global timeout.
///
/// We use PlatformVerifier to use the system's built-in root certificates.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Transport used by block processors to fetch rendered markup.
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text.
    fn get_text(&self, url: &str) -> Result<String, RenderError>;
}

/// [`Fetcher`] backed by a `ureq` agent.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            timeout,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Fetcher for HttpFetcher {
    /// Errors on transport failure, non-2xx status, timeout, oversized or
    /// empty body. No retries.
    fn get_text(&self, url: &str) -> Result<String, RenderError> {
        log::debug!("GET {url}");

        let body = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| self.map_error(url, e))?
            .into_body()
            .with_config()
            .limit(MAX_RESPONSE_SIZE)
            .read_to_string()
            .map_err(|e| self.map_error(url, e))?;

        if body.trim().is_empty() {
            return Err(RenderError::EmptyResponse {
                url: url.to_string(),
            });
        }

        log::debug!("GET {url} returned {} bytes", body.len());
        Ok(body)
    }
}

impl HttpFetcher {
    fn map_error(&self, url: &str, error: ureq::Error) -> RenderError {
        match error {
            ureq::Error::Timeout(_) => RenderError::Timeout {
                secs: self.timeout.as_secs(),
            },
            other => RenderError::Fetch {
                url: url.to_string(),
                message: other.to_string(),
            },
        }
    }
}
