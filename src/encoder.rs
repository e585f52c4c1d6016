//! Diagram source encoder.
//!
//! Produces the token the Kroki service decodes from a request path:
//!
//! ```text
//! source ─(&nbsp; → ' ')─(header)─ UTF-8 ─ zlib deflate, level 9 ─ base64url
//! ```
//!
//! The encoder is pure: same input and options, same token. It performs no
//! I/O and is safe to call from any number of threads at once.

use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};
use std::sync::LazyLock;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use regex::Regex;

use crate::error::EncodeError;

/// Rich-text editors put `&nbsp;` entities into code blocks; the remote
/// renderers want plain spaces.
static NBSP_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&nbsp;").expect("nbsp entity regex is a compile-time constant and must be valid")
});

/// Accepts tokens with or without trailing `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Knobs for [`encode_source`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions<'a> {
    /// Text prepended to the source before encoding.
    pub header: Option<&'a str>,
    /// Drop trailing `=` padding from the token.
    pub strip_padding: bool,
}

impl<'a> EncodeOptions<'a> {
    /// Options as configured by the user.
    pub fn from_config(config: &'a kroki_blocks_config::Config) -> Self {
        Self {
            header: config.effective_header(),
            strip_padding: config.strip_padding,
        }
    }
}

/// URL-safe token for one diagram source.
///
/// Only contains `A-Z a-z 0-9 - _` and possibly trailing `=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedToken(String);

impl EncodedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Apply the text-level preprocessing: optional header, then `&nbsp;`
/// replacement (case-insensitive).
pub fn preprocess<'a>(source: &'a str, header: Option<&str>) -> Cow<'a, str> {
    match header {
        Some(header) if !header.is_empty() => {
            let mut combined = String::with_capacity(header.len() + 1 + source.len());
            combined.push_str(header);
            if !header.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(source);
            Cow::Owned(NBSP_ENTITY.replace_all(&combined, " ").into_owned())
        }
        _ => NBSP_ENTITY.replace_all(source, " "),
    }
}

/// Compress bytes with zlib-wrapped DEFLATE at the highest level.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len() / 2 + 16), Compression::best());
    encoder.write_all(bytes).map_err(EncodeError::Compress)?;
    encoder.finish().map_err(EncodeError::Compress)
}

/// Encode diagram source into a token.
pub fn encode_source(source: &str, options: &EncodeOptions<'_>) -> Result<EncodedToken, EncodeError> {
    let text = preprocess(source, options.header);
    let compressed = compress(text.as_bytes())?;
    let token = if options.strip_padding {
        URL_SAFE_NO_PAD.encode(compressed)
    } else {
        URL_SAFE.encode(compressed)
    };
    log::trace!("Encoded {} source bytes into {} token chars", text.len(), token.len());
    Ok(EncodedToken(token))
}

/// Reverse of [`encode_source`], as the remote service performs it.
///
/// Returns the preprocessed text, not the original source.
pub fn decode_token(token: &str) -> Result<String, EncodeError> {
    let compressed = URL_SAFE_LENIENT.decode(token.trim())?;
    let mut bytes = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut bytes)
        .map_err(EncodeError::Inflate)?;
    Ok(String::from_utf8(bytes)?)
}
