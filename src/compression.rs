//! gzip + base64 encoding of rendered documents.
//!
//! Cloud-init accepts user data that is gzip-compressed and then base64-encoded, which also
//! keeps binary bytes out of the provisioning state. The stream is written, flushed and
//! finished in full so consumers never see a truncated frame.
//!
//! The encoder is deterministic: the gzip header carries no modification time and no file
//! name, and the compression level is fixed, so equal inputs always encode to equal outputs.
//! This is what keeps resource identities stable when compression is enabled.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

use crate::templating::RenderError;

/// Errors produced while decoding a compressed document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input is not valid standard base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Input is not a valid gzip stream.
    #[error("invalid gzip stream: {0}")]
    Gzip(#[source] std::io::Error),

    /// The decompressed bytes are not UTF-8.
    #[error("decompressed content is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Gzip `text` and encode the result as standard padded base64.
///
/// # Errors
///
/// Returns [`RenderError::Compression`] if the encoder fails. Writing into an
/// in-memory buffer does not fail in practice; the error is surfaced rather
/// than swallowed.
pub fn compress(text: &str) -> Result<String, RenderError> {
    let bytes = gzip(text.as_bytes()).map_err(|source| RenderError::Compression {
        source,
    })?;
    tracing::debug!("Compressed {} bytes into {} gzip bytes", text.len(), bytes.len());
    Ok(STANDARD.encode(bytes))
}

/// Gzip raw bytes with the fixed encoder configuration.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.flush()?;
    encoder.finish()
}

/// Decompress raw gzip bytes.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(DecodeError::Gzip)?;
    Ok(out)
}

/// Reverse [`compress`]: base64-decode, gunzip and return the original text.
///
/// # Errors
///
/// Returns a [`DecodeError`] when any layer of the encoding is malformed.
pub fn decompress(encoded: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let raw = gunzip(&bytes)?;
    Ok(String::from_utf8(raw)?)
}
