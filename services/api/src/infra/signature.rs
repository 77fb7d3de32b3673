//! Signature images embedded in rendered PDFs.
//!
//! The stored `signatureImage` is one of a URL, a base64 payload (bare or as
//! a `data:` URI) or a local path. Whatever the source, the bytes are decoded
//! and re-encoded as zlib-compressed RGB8 ready for an image XObject.

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Bounds on loading a signature image.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Whole-request deadline for URL sources, body included.
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Where the signature bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureSource {
    Url(String),
    Base64(String),
    Path(PathBuf),
}

impl SignatureSource {
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::Url(raw.to_owned());
        }
        if let Some(rest) = raw.strip_prefix("data:") {
            let payload = rest.split_once(',').map_or(rest, |(_, p)| p);
            return Self::Base64(payload.to_owned());
        }
        if looks_like_base64(raw) {
            return Self::Base64(raw.to_owned());
        }
        Self::Path(PathBuf::from(raw))
    }

    /// Fetch, decode or read the raw image bytes.
    pub async fn load(&self, http: &reqwest::Client, limits: FetchLimits) -> anyhow::Result<Vec<u8>> {
        let bytes = match self {
            Self::Url(url) => fetch(http, url, limits).await?,
            Self::Base64(payload) => STANDARD
                .decode(payload.as_bytes())
                .context("decode base64 signature")?,
            Self::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("read signature {}", path.display()))?,
        };
        ensure_within(bytes.len(), limits.max_bytes)?;
        Ok(bytes)
    }
}

fn ensure_within(len: usize, max: usize) -> anyhow::Result<()> {
    anyhow::ensure!(len <= max, "signature exceeds {max} bytes");
    Ok(())
}

async fn fetch(http: &reqwest::Client, url: &str, limits: FetchLimits) -> anyhow::Result<Vec<u8>> {
    let mut response = http
        .get(url)
        .timeout(limits.timeout)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("fetch signature {url}"))?;
    if let Some(len) = response.content_length() {
        ensure_within(len as usize, limits.max_bytes)?;
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.context("read signature body")? {
        body.extend_from_slice(&chunk);
        ensure_within(body.len(), limits.max_bytes)?;
    }
    Ok(body)
}

// Standard alphabet, padded length, no file extension.
fn looks_like_base64(raw: &str) -> bool {
    raw.len() >= 16
        && raw.len() % 4 == 0
        && !raw.contains('.')
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// A decoded signature as PDF image data.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    /// zlib-compressed RGB8 samples.
    pub data: Vec<u8>,
}

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<SignatureImage> {
    let rgb = image::load_from_memory(bytes)
        .context("decode signature image")?
        .to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .context("compress signature image")?;
    let data = encoder.finish().context("compress signature image")?;
    Ok(SignatureImage {
        width,
        height,
        data,
    })
}
