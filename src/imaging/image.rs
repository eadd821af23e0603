//! The [`Image`] entity: one exclusively owned native buffer behind a lock.
//!
//! ## Ownership
//!
//! The buffer lives in a `Mutex<Option<E::Buffer>>`. `Some` while the image
//! is live, `None` permanently after [`Image::release`]. Every operation that
//! replaces the buffer computes the replacement first and swaps it in while
//! still holding the lock, dropping the previous buffer in that same critical
//! section. There is never a moment where two live buffers stand for the same
//! image, and a failed operation leaves the original untouched.
//!
//! Dropping an `Image` drops its buffer, so memory is reclaimed exactly once
//! whether or not `release` was called first.
//!
//! ## Queries
//!
//! Width, height and color model are re-derived from the buffer on every
//! call; nothing about the buffer is cached on the image.

use super::backend::{Geometry, ImageEngine};
use super::color::{Color, ColorModel, PixelSurface};
use super::metadata::ExifMetadata;
use super::probe::ContainerFormat;
use super::rust_backend::RustEngine;
use crate::error::PrismError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

pub struct Image<E: ImageEngine = RustEngine> {
    engine: Arc<E>,
    buffer: Mutex<Option<E::Buffer>>,
    metadata: Option<ExifMetadata>,
    source_format: ContainerFormat,
}

impl<E: ImageEngine> Image<E> {
    pub(crate) fn from_parts(
        engine: Arc<E>,
        buffer: E::Buffer,
        metadata: Option<ExifMetadata>,
        source_format: ContainerFormat,
    ) -> Self {
        Self {
            engine,
            buffer: Mutex::new(Some(buffer)),
            metadata,
            source_format,
        }
    }

    /// Acquire the mutation lock.
    ///
    /// A poisoned lock is still usable: buffers are only swapped after the
    /// engine call succeeds, so a panic mid-operation leaves the old one intact.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<E::Buffer>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    /// Current geometry, or `None` once released.
    pub fn geometry(&self) -> Option<Geometry> {
        self.lock().as_ref().map(|buf| self.engine.geometry(buf))
    }

    /// `(width, height)`; `(0, 0)` once released.
    pub fn dimensions(&self) -> (u32, u32) {
        self.geometry()
            .map(|g| (g.width, g.height))
            .unwrap_or((0, 0))
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn color_model(&self) -> Option<ColorModel> {
        self.geometry().map(|g| g.layout.color_model())
    }

    /// EXIF metadata captured at decode time.
    pub fn metadata(&self) -> Option<&ExifMetadata> {
        self.metadata.as_ref()
    }

    /// Container format the image was decoded from.
    pub fn source_format(&self) -> ContainerFormat {
        self.source_format
    }

    pub fn is_released(&self) -> bool {
        self.lock().is_none()
    }

    /// Free the native buffer now instead of at drop.
    ///
    /// Idempotent and safe to race: the check-and-clear happens under the
    /// mutation lock, so concurrent callers free the buffer exactly once and
    /// the rest return quietly. All later mutations become no-ops.
    pub fn release(&self) {
        let mut guard = self.lock();
        if let Some(buffer) = guard.take() {
            trace!("releasing image buffer");
            drop(buffer);
        }
    }

    /// Deep copy through the engine's clone primitive; the copy owns its own
    /// buffer and shares nothing with `self` except the engine.
    pub fn duplicate(&self) -> Result<Self, PrismError> {
        let guard = self.lock();
        let buffer = guard.as_ref().ok_or(PrismError::Released)?;
        let copy = self
            .engine
            .duplicate(buffer)
            .map_err(|source| PrismError::Transform {
                operation: "duplicate",
                source,
            })?;
        Ok(Self::from_parts(
            Arc::clone(&self.engine),
            copy,
            self.metadata.clone(),
            self.source_format,
        ))
    }

    /// Copy of the raw pixel bytes, or `None` once released.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        self.lock()
            .as_ref()
            .map(|buf| self.engine.as_bytes(buf).to_vec())
    }

    /// Lowercase hex SHA-256 of the raw pixel bytes.
    ///
    /// Two images hash equal exactly when their pixel data is byte-identical,
    /// which makes this the comparison used for determinism checks.
    pub fn content_hash(&self) -> Option<String> {
        let guard = self.lock();
        let buffer = guard.as_ref()?;
        let digest = Sha256::digest(self.engine.as_bytes(buffer));
        Some(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl<E: ImageEngine> PixelSurface for Image<E> {
    fn bounds(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn color_model(&self) -> Option<ColorModel> {
        Image::<E>::color_model(self)
    }

    fn at(&self, x: u32, y: u32) -> Color {
        let guard = self.lock();
        let Some(buffer) = guard.as_ref() else {
            return Color::default();
        };
        let model = self.engine.geometry(buffer).layout.color_model();
        self.engine
            .sample(buffer, x, y)
            .map(|raw| Color::from_sample(model, raw))
            .unwrap_or_default()
    }
}

impl<E: ImageEngine> fmt::Debug for Image<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.geometry() {
            Some(g) => f
                .debug_struct("Image")
                .field("width", &g.width)
                .field("height", &g.height)
                .field("color_model", &g.layout.color_model())
                .field("source_format", &self.source_format)
                .field("metadata", &self.metadata)
                .finish(),
            None => f
                .debug_struct("Image")
                .field("released", &true)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::imaging::backend::tests::{GRAY8, MockEngine, RGB8, RGBA16, RecordedOp};
    use crate::imaging::color::PixelLayout;
    use std::thread;

    /// Wrap a mock grid in an image, bypassing decode.
    pub fn mock_image(
        engine: &Arc<MockEngine>,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Image<MockEngine> {
        let buffer = engine.grid(width, height, layout);
        Image::from_parts(Arc::clone(engine), buffer, None, ContainerFormat::Png)
    }

    #[test]
    fn queries_follow_the_buffer() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 4, 3, RGBA16);
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.color_model(), Some(ColorModel::Nrgba64));
        assert!(!img.is_released());
    }

    #[test]
    fn release_frees_the_buffer_once() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 2, 2, GRAY8);
        assert_eq!(engine.live_buffers(), 1);

        img.release();
        assert_eq!(engine.live_buffers(), 0);
        assert!(img.is_released());

        // Redundant release is a quiet no-op
        img.release();
        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn released_image_reports_empty() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 2, 2, GRAY8);
        img.release();
        assert_eq!(img.dimensions(), (0, 0));
        assert_eq!(img.color_model(), None);
        assert_eq!(img.to_bytes(), None);
        assert_eq!(img.content_hash(), None);
        assert_eq!(img.at(0, 0), Color::default());
        assert!(matches!(img.duplicate(), Err(PrismError::Released)));
    }

    #[test]
    fn drop_frees_the_buffer() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 2, 2, GRAY8);
        drop(img);
        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn concurrent_release_is_safe() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 8, 8, RGB8);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| img.release());
            }
        });

        assert!(img.is_released());
        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn release_races_with_readers() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 8, 8, RGB8);

        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..100 {
                    let (w, h) = img.dimensions();
                    assert!((w, h) == (8, 8) || (w, h) == (0, 0));
                }
            });
            s.spawn(|| img.release());
        });

        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn duplicate_is_deep() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 3, 2, GRAY8);
        let copy = img.duplicate().unwrap();
        assert_eq!(engine.live_buffers(), 2);
        assert_eq!(copy.to_bytes(), img.to_bytes());

        img.release();
        assert_eq!(copy.dimensions(), (3, 2));
        assert_eq!(engine.live_buffers(), 1);
        assert!(engine.get_operations().contains(&RecordedOp::Duplicate));
    }

    #[test]
    fn content_hash_tracks_pixels() {
        let engine = Arc::new(MockEngine::new());
        let a = mock_image(&engine, 3, 3, GRAY8);
        let b = mock_image(&engine, 3, 3, GRAY8);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().unwrap().len(), 64);

        b.flip_horizontal().unwrap();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn at_converts_samples_to_model() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 2, 2, GRAY8);
        assert_eq!(img.at(1, 1), Color::Gray(3));
        assert_eq!(img.at(5, 5), Color::default());

        let img = mock_image(&engine, 2, 1, RGB8);
        assert_eq!(img.at(1, 0), Color::Rgba([1, 1, 1, 255]));
    }

    #[test]
    fn debug_output_names_geometry() {
        let engine = Arc::new(MockEngine::new());
        let img = mock_image(&engine, 5, 4, GRAY8);
        let text = format!("{img:?}");
        assert!(text.contains("width: 5"));
        img.release();
        assert!(format!("{img:?}").contains("released"));
    }
}
