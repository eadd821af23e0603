//! Image-processing engine trait and shared types.
//!
//! The [`ImageEngine`] trait is the seam between the image lifecycle layer
//! (ownership, locking, orchestration) and the code that actually touches
//! pixels. Every primitive either borrows a buffer and returns a brand-new
//! one, or only reads; none mutates a buffer in place. That is what lets
//! [`Image`](super::Image) swap buffers atomically: a failed primitive never
//! leaves a half-written buffer behind.
//!
//! The production implementation is
//! [`RustEngine`](super::rust_backend::RustEngine), built on the `image` crate.

use super::color::PixelLayout;
use super::params::{Compression, Quality};
use super::probe::ContainerFormat;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Allocation failed for {width}x{height} buffer")]
    Allocation { width: u32, height: u32 },
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dimensions and pixel layout of a native buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

/// Flip direction, named after the axis the pixels are mirrored across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror rows top-to-bottom (axis 0).
    Vertical,
    /// Mirror columns left-to-right (axis 1).
    Horizontal,
    /// Both at once, i.e. a 180° rotation (axis −1).
    Both,
}

/// Target format plus its tuning knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeParams {
    Jpeg { quality: Quality },
    Png { compression: Compression },
}

impl EncodeParams {
    pub fn format(self) -> ContainerFormat {
        match self {
            Self::Jpeg { .. } => ContainerFormat::Jpeg,
            Self::Png { .. } => ContainerFormat::Png,
        }
    }
}

/// Primitive pixel operations the lifecycle layer is built on.
///
/// `Buffer` is the native buffer handle: it owns its pixel memory and frees it
/// on drop, so the buffer is released exactly once however the owning
/// [`Image`](super::Image) ends.
pub trait ImageEngine: Send + Sync {
    type Buffer: Send;

    /// Decode a complete container into a buffer.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Buffer, EngineError>;

    /// Current geometry of `buffer`. Cheap; queried after every mutation.
    fn geometry(&self, buffer: &Self::Buffer) -> Geometry;

    /// Area-style resample into a new `width × height` buffer of the same layout.
    fn resize(
        &self,
        buffer: &Self::Buffer,
        width: u32,
        height: u32,
    ) -> Result<Self::Buffer, EngineError>;

    /// Swap rows and columns into a new `height × width` buffer.
    fn transpose(&self, buffer: &Self::Buffer) -> Result<Self::Buffer, EngineError>;

    /// Mirror into a new buffer of the same shape.
    fn flip(&self, buffer: &Self::Buffer, axis: FlipAxis) -> Result<Self::Buffer, EngineError>;

    /// Deep copy.
    fn duplicate(&self, buffer: &Self::Buffer) -> Result<Self::Buffer, EngineError>;

    /// Raw channel values at `(x, y)` as `[c0, c1, c2, alpha]` at native depth.
    /// Gray buffers fill only `c0`; buffers without alpha report opaque.
    fn sample(&self, buffer: &Self::Buffer, x: u32, y: u32) -> Option<[u16; 4]>;

    /// Raw pixel bytes, row-major, native endianness for 16-bit samples.
    fn as_bytes<'a>(&self, buffer: &'a Self::Buffer) -> &'a [u8];

    /// Encode straight into `sink`. Only 8-bit layouts are supported;
    /// 16-bit buffers return [`EngineError::Unsupported`].
    fn encode(
        &self,
        buffer: &Self::Buffer,
        params: EncodeParams,
        sink: &mut dyn Write,
    ) -> Result<(), EngineError>;
}
