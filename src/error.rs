//! Error types for encoding and rendering diagram blocks.
//!
//! Every error here is scoped to a single diagram block: the document
//! renderer records it against that block and moves on.

/// Failure to turn diagram source into a token, or a token back into source.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The DEFLATE writer failed.
    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),
    /// The token is not valid base64url.
    #[error("token is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not a valid zlib stream.
    #[error("token does not contain a valid deflate stream: {0}")]
    Inflate(#[source] std::io::Error),
    /// The inflated bytes are not UTF-8.
    #[error("decoded source is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur while rendering one diagram block.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The source could not be encoded.
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
    /// The request to the rendering service failed.
    #[error("request to {url} failed: {message}")]
    Fetch { url: String, message: String },
    /// The rendering service answered with an empty body.
    #[error("empty response from {url}")]
    EmptyResponse { url: String },
    /// The render did not finish in time.
    #[error("render timed out after {secs}s")]
    Timeout { secs: u64 },
    /// The render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    TaskFailed(String),
}
