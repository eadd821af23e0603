//! Decode/validate: raw container bytes in, [`Image`] out.
//!
//! 1. Probe the header for the declared width and height.
//! 2. Reject anything over the pixel limit before the engine sees it.
//! 3. Decode pixels and read EXIF side by side.
//!
//! The pixel limit is process-wide. Changing it affects decodes that start
//! afterwards; a decode already past the guard is not re-checked.

use super::backend::ImageEngine;
use super::metadata::read_exif;
use super::image::Image;
use super::probe::probe_header;
use super::rust_backend::RustEngine;
use crate::error::PrismError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Default maximum declared pixel count (width × height).
pub const DEFAULT_PIXEL_LIMIT: u64 = 75_000_000;

static PIXEL_LIMIT: AtomicU64 = AtomicU64::new(DEFAULT_PIXEL_LIMIT);

/// Current process-wide pixel limit.
pub fn pixel_limit() -> u64 {
    PIXEL_LIMIT.load(Ordering::Relaxed)
}

/// Replace the process-wide pixel limit for subsequent decodes.
pub fn set_pixel_limit(limit: u64) {
    PIXEL_LIMIT.store(limit, Ordering::Relaxed);
}

/// Decode with the production engine and the process-wide pixel limit.
pub fn decode(bytes: &[u8]) -> Result<Image, PrismError> {
    decode_with(Arc::new(RustEngine::new()), bytes)
}

/// Decode with a specific engine and the process-wide pixel limit.
pub fn decode_with<E: ImageEngine>(engine: Arc<E>, bytes: &[u8]) -> Result<Image<E>, PrismError> {
    decode_with_limit(engine, bytes, pixel_limit())
}

pub(crate) fn decode_with_limit<E: ImageEngine>(
    engine: Arc<E>,
    bytes: &[u8],
    limit: u64,
) -> Result<Image<E>, PrismError> {
    let header = probe_header(bytes).map_err(PrismError::UnsupportedOrInvalidImage)?;
    debug!(
        format = %header.format,
        width = header.width,
        height = header.height,
        "probed header"
    );
    if header.pixel_count() > limit {
        return Err(PrismError::DecompressionBomb {
            width: header.width,
            height: header.height,
        });
    }

    // Metadata is best-effort: a failed read is simply no metadata
    let (buffer, metadata) = rayon::join(|| engine.decode(bytes), || read_exif(bytes));
    let buffer = buffer.map_err(|e| PrismError::UnsupportedOrInvalidImage(e.to_string()))?;

    let geometry = engine.geometry(&buffer);
    debug!(
        width = geometry.width,
        height = geometry.height,
        color_model = %geometry.layout.color_model(),
        has_exif = metadata.is_some(),
        "decoded"
    );
    Ok(Image::from_parts(engine, buffer, metadata, header.format))
}
