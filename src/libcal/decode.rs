//! Response body decoding.
//!
//! LibCal may compress the grid reply. Only `br`, `gzip` and `deflate` are
//! recognised; anything else (including a missing header or a list of
//! codings) is passed through untouched.

use std::fmt;
use std::io::{self, Read};

use axum::http::HeaderValue;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

/// The `Content-Encoding` of an upstream reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
}

impl ContentEncoding {
    /// Classify a `Content-Encoding` header value.
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        let Some(value) = value.and_then(|v| v.to_str().ok()) else {
            return Self::Identity;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "br" => Self::Brotli,
            "gzip" => Self::Gzip,
            "deflate" => Self::Deflate,
            _ => Self::Identity,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Brotli => "br",
        }
    }

    /// Decompress `body`.
    pub fn decode(self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Identity => Ok(body.to_vec()),
            Self::Gzip => read_all(GzDecoder::new(body)),
            Self::Brotli => read_all(brotli::Decompressor::new(body, 4096)),
            // "deflate" is meant to be zlib-wrapped, but some servers send raw DEFLATE.
            Self::Deflate => {
                read_all(ZlibDecoder::new(body)).or_else(|_| read_all(DeflateDecoder::new(body)))
            }
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn read_all(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}
