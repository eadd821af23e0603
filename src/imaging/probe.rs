//! Header-only container probe.
//!
//! Reads the declared width and height without decoding a single pixel,
//! using the same `image` decoders that later decode the pixels. Cost is
//! bounded by the header, not by the image size, which is what makes the
//! decompression-bomb guard cheap.

use image::{ImageFormat, ImageReader};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;

/// Container formats prism accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Jpeg,
    Png,
    Gif,
}

impl ContainerFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
        };
        f.write_str(name)
    }
}

/// Declared geometry of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: ContainerFormat,
    pub width: u32,
    pub height: u32,
}

impl Header {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Read the declared dimensions from a container header.
///
/// The reader runs without `image`'s allocation limits, exactly like the
/// engine decode, so the pixel limit is the only size policy applied.
/// Errors carry a short human-readable reason; callers wrap it in
/// [`PrismError::UnsupportedOrInvalidImage`](crate::PrismError::UnsupportedOrInvalidImage).
pub fn probe_header(data: &[u8]) -> Result<Header, String> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("failed to read header: {e}"))?;
    let format = match reader.format() {
        Some(f) => ContainerFormat::from_image_format(f)
            .ok_or_else(|| format!("unsupported container format: {f:?}"))?,
        None => return Err("unrecognized container format".to_string()),
    };
    reader.no_limits();
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("invalid {format} header: {e}"))?;
    Ok(Header {
        format,
        width,
        height,
    })
}
