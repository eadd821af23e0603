//! In-place geometric transforms on an [`Image`].
//!
//! | Operation | Result shape | Engine primitives |
//! |---|---|---|
//! | [`resize`](Image::resize) | `w × h` | resize |
//! | [`rotate90`](Image::rotate90) | `h × w` | transpose, flip columns |
//! | [`rotate180`](Image::rotate180) | `w × h` | flip both axes |
//! | [`rotate270`](Image::rotate270) | `h × w` | transpose, flip rows |
//! | [`flip_horizontal`](Image::flip_horizontal) | `w × h` | flip columns |
//! | [`flip_vertical`](Image::flip_vertical) | `w × h` | flip rows |
//!
//! Rotations are clockwise. Every operation runs under the image's lock and
//! goes through [`Image::replace_buffer`]; a released image turns each of
//! them into a no-op.

use super::backend::{EngineError, FlipAxis, Geometry, ImageEngine};
use super::image::Image;
use crate::error::PrismError;
use tracing::trace;

impl<E: ImageEngine> Image<E> {
    /// Compute a replacement buffer from the current one and swap it in.
    ///
    /// `op` gets the engine, the current buffer and its geometry, and returns
    /// `Ok(None)` to leave the buffer as is. The previous buffer is dropped
    /// before the lock is released.
    pub(crate) fn replace_buffer<F>(&self, operation: &'static str, op: F) -> Result<(), PrismError>
    where
        F: FnOnce(&E, &E::Buffer, Geometry) -> Result<Option<E::Buffer>, EngineError>,
    {
        let mut guard = self.lock();
        let Some(current) = guard.as_ref() else {
            trace!(operation, "image released, skipping");
            return Ok(());
        };
        let engine = self.engine();
        let before = engine.geometry(current);
        let replacement = op(engine, current, before)
            .map_err(|source| PrismError::Transform { operation, source })?;
        if let Some(replacement) = replacement {
            let after = engine.geometry(&replacement);
            trace!(
                operation,
                from_width = before.width,
                from_height = before.height,
                to_width = after.width,
                to_height = after.height,
                "buffer replaced"
            );
            let previous = guard.replace(replacement);
            drop(previous);
        }
        Ok(())
    }

    /// Resample to exactly `width × height`. Zero on either axis is a caller
    /// error.
    pub fn resize(&self, width: u32, height: u32) -> Result<(), PrismError> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidDimensions { width, height });
        }
        self.replace_buffer("resize", |engine, buf, _| {
            engine.resize(buf, width, height).map(Some)
        })
    }

    pub fn rotate90(&self) -> Result<(), PrismError> {
        self.replace_buffer("rotate90", |engine, buf, _| {
            let transposed = engine.transpose(buf)?;
            engine.flip(&transposed, FlipAxis::Horizontal).map(Some)
        })
    }

    pub fn rotate180(&self) -> Result<(), PrismError> {
        self.replace_buffer("rotate180", |engine, buf, _| {
            engine.flip(buf, FlipAxis::Both).map(Some)
        })
    }

    pub fn rotate270(&self) -> Result<(), PrismError> {
        self.replace_buffer("rotate270", |engine, buf, _| {
            let transposed = engine.transpose(buf)?;
            engine.flip(&transposed, FlipAxis::Vertical).map(Some)
        })
    }

    /// Mirror left-to-right.
    pub fn flip_horizontal(&self) -> Result<(), PrismError> {
        self.replace_buffer("flip_horizontal", |engine, buf, _| {
            engine.flip(buf, FlipAxis::Horizontal).map(Some)
        })
    }

    /// Mirror top-to-bottom.
    pub fn flip_vertical(&self) -> Result<(), PrismError> {
        self.replace_buffer("flip_vertical", |engine, buf, _| {
            engine.flip(buf, FlipAxis::Vertical).map(Some)
        })
    }
}
