// Library exports for the CLI, tests and embedding.
//
// Diagram source flows: encoder (text -> token) -> request (token -> URL)
// -> processor (URL -> markup, via http) -> document (markup spliced back
// into the note). Settings live in the kroki-blocks-config crate.

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config {
    //! Configuration re-exports from the kroki-blocks-config crate.
    pub use kroki_blocks_config::*;
}
pub mod debug;
pub mod document;
pub mod encoder;
pub mod error;
pub mod http;
pub mod processor;
pub mod request;

pub use document::{DocumentRenderer, RenderedDocument};
pub use encoder::{EncodeOptions, EncodedToken, decode_token, encode_source};
pub use error::{EncodeError, RenderError};
pub use http::{Fetcher, HttpFetcher};
pub use processor::{BlockProcessor, KrokiProcessor, ProcessorRegistry};
pub use request::{DiagramRequest, DiagramUrls};
