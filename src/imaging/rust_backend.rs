//! Pure Rust engine built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Primitive | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image::ImageReader` with guessed format, limits lifted |
//! | Resize | `DynamicImage::resize_exact` with the `Triangle` filter |
//! | Transpose | `ImageBuffer::from_fn` over the swapped axes |
//! | Flip | `DynamicImage::fliph` / `flipv` / `rotate180` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//!
//! Decoded buffers are normalized to one of L8, L16, Rgb8, Rgba8, Rgb16 or
//! Rgba16, so every buffer this engine hands out maps onto a
//! [`PixelLayout`]. Gray+alpha widens to RGBA; float samples narrow to 16 bit.
//!
//! The `image` crate's own allocation limits are lifted on decode: the
//! decompression-bomb guard in [`decode`](super::decode) has already checked
//! the declared pixel count before this engine sees the bytes.

use super::backend::{EncodeParams, EngineError, FlipAxis, Geometry, ImageEngine};
use super::color::{BitDepth, Channels, PixelLayout};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, ImageReader, Pixel};
use std::io::{Cursor, Write};

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-primitive mapping.
#[derive(Debug, Clone, Copy)]
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Widen or narrow a decoded image onto one of the six supported layouts.
fn normalize(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => img,
        DynamicImage::ImageLumaA8(_) => DynamicImage::ImageRgba8(img.to_rgba8()),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageRgba16(img.to_rgba16()),
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.to_rgb16()),
        other => DynamicImage::ImageRgba16(other.to_rgba16()),
    }
}

fn layout_of(img: &DynamicImage) -> PixelLayout {
    let (channels, depth) = match img {
        DynamicImage::ImageLuma8(_) => (Channels::One, BitDepth::Eight),
        DynamicImage::ImageLuma16(_) => (Channels::One, BitDepth::Sixteen),
        DynamicImage::ImageRgb8(_) => (Channels::Three, BitDepth::Eight),
        DynamicImage::ImageRgba8(_) => (Channels::Four, BitDepth::Eight),
        DynamicImage::ImageRgb16(_) => (Channels::Three, BitDepth::Sixteen),
        DynamicImage::ImageRgba16(_) => (Channels::Four, BitDepth::Sixteen),
        other => unreachable!("buffers are normalized on decode, found {:?}", other.color()),
    };
    PixelLayout::new(channels, depth)
}

/// Reject shapes whose byte size cannot be allocated before asking the
/// `image` crate to allocate them (it aborts the process on failure).
fn check_allocation(img: &DynamicImage, width: u32, height: u32) -> Result<(), EngineError> {
    let bytes = (width as u64)
        .checked_mul(height as u64)
        .and_then(|px| px.checked_mul(img.color().bytes_per_pixel() as u64));
    match bytes {
        Some(n) if n <= isize::MAX as u64 => Ok(()),
        _ => Err(EngineError::Allocation { width, height }),
    }
}

fn transpose_buffer<P>(src: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    let (width, height) = src.dimensions();
    ImageBuffer::from_fn(height, width, |x, y| *src.get_pixel(y, x))
}

pub(crate) fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

impl ImageEngine for RustEngine {
    type Buffer = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, EngineError> {
        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        reader.no_limits();
        let img = reader
            .decode()
            .map_err(|e| EngineError::ProcessingFailed(format!("Failed to decode: {e}")))?;
        Ok(normalize(img))
    }

    fn geometry(&self, buffer: &DynamicImage) -> Geometry {
        Geometry {
            width: buffer.width(),
            height: buffer.height(),
            layout: layout_of(buffer),
        }
    }

    fn resize(
        &self,
        buffer: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, EngineError> {
        check_allocation(buffer, width, height)?;
        Ok(buffer.resize_exact(width, height, FilterType::Triangle))
    }

    fn transpose(&self, buffer: &DynamicImage) -> Result<DynamicImage, EngineError> {
        check_allocation(buffer, buffer.height(), buffer.width())?;
        Ok(match buffer {
            DynamicImage::ImageLuma8(b) => DynamicImage::ImageLuma8(transpose_buffer(b)),
            DynamicImage::ImageLuma16(b) => DynamicImage::ImageLuma16(transpose_buffer(b)),
            DynamicImage::ImageRgb8(b) => DynamicImage::ImageRgb8(transpose_buffer(b)),
            DynamicImage::ImageRgba8(b) => DynamicImage::ImageRgba8(transpose_buffer(b)),
            DynamicImage::ImageRgb16(b) => DynamicImage::ImageRgb16(transpose_buffer(b)),
            DynamicImage::ImageRgba16(b) => DynamicImage::ImageRgba16(transpose_buffer(b)),
            other => {
                return Err(EngineError::Unsupported(format!(
                    "transpose of {:?}",
                    other.color()
                )));
            }
        })
    }

    fn flip(&self, buffer: &DynamicImage, axis: FlipAxis) -> Result<DynamicImage, EngineError> {
        check_allocation(buffer, buffer.width(), buffer.height())?;
        Ok(match axis {
            FlipAxis::Horizontal => buffer.fliph(),
            FlipAxis::Vertical => buffer.flipv(),
            FlipAxis::Both => buffer.rotate180(),
        })
    }

    fn duplicate(&self, buffer: &DynamicImage) -> Result<DynamicImage, EngineError> {
        check_allocation(buffer, buffer.width(), buffer.height())?;
        Ok(buffer.clone())
    }

    fn sample(&self, buffer: &DynamicImage, x: u32, y: u32) -> Option<[u16; 4]> {
        match buffer {
            DynamicImage::ImageLuma8(b) => b.get_pixel_checked(x, y).map(|p| [p[0] as u16, 0, 0, 0]),
            DynamicImage::ImageLuma16(b) => b.get_pixel_checked(x, y).map(|p| [p[0], 0, 0, 0]),
            DynamicImage::ImageRgb8(b) => b
                .get_pixel_checked(x, y)
                .map(|p| [p[0] as u16, p[1] as u16, p[2] as u16, u8::MAX as u16]),
            DynamicImage::ImageRgba8(b) => b
                .get_pixel_checked(x, y)
                .map(|p| [p[0] as u16, p[1] as u16, p[2] as u16, p[3] as u16]),
            DynamicImage::ImageRgb16(b) => b
                .get_pixel_checked(x, y)
                .map(|p| [p[0], p[1], p[2], u16::MAX]),
            DynamicImage::ImageRgba16(b) => b.get_pixel_checked(x, y).map(|p| p.0),
            _ => None,
        }
    }

    fn as_bytes<'a>(&self, buffer: &'a DynamicImage) -> &'a [u8] {
        buffer.as_bytes()
    }

    fn encode(
        &self,
        buffer: &DynamicImage,
        params: EncodeParams,
        sink: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let (width, height) = (buffer.width(), buffer.height());
        let result = match (params, buffer) {
            (
                EncodeParams::Jpeg { quality },
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_),
            ) => JpegEncoder::new_with_quality(sink, quality.value()).write_image(
                buffer.as_bytes(),
                width,
                height,
                buffer.color().into(),
            ),
            // JPEG carries no alpha; drop it like libjpeg-turbo's BGRA input does
            (EncodeParams::Jpeg { quality }, DynamicImage::ImageRgba8(_)) => {
                let rgb = buffer.to_rgb8();
                JpegEncoder::new_with_quality(sink, quality.value()).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            (
                EncodeParams::Png { compression },
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_),
            ) => PngEncoder::new_with_quality(
                sink,
                png_compression(compression.level()),
                PngFilter::Adaptive,
            )
            .write_image(buffer.as_bytes(), width, height, buffer.color().into()),
            (_, other) => {
                return Err(EngineError::Unsupported(format!(
                    "native encode of {:?}",
                    other.color()
                )));
            }
        };
        result.map_err(encode_error)
    }
}

/// Keep sink I/O failures distinguishable from codec failures.
pub(crate) fn encode_error(e: image::ImageError) -> EngineError {
    match e {
        image::ImageError::IoError(io) => EngineError::Io(io),
        other => EngineError::ProcessingFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{Compression, Quality};
    use crate::test_helpers::{gradient_rgb, jpeg_bytes, png_bytes};
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn decode_synthetic_jpeg() {
        let engine = RustEngine::new();
        let buf = engine.decode(&jpeg_bytes(40, 30)).unwrap();
        let geometry = engine.geometry(&buf);
        assert_eq!((geometry.width, geometry.height), (40, 30));
        assert_eq!(
            geometry.layout,
            PixelLayout::new(Channels::Three, BitDepth::Eight)
        );
    }

    #[test]
    fn decode_garbage_errors() {
        let engine = RustEngine::new();
        assert!(engine.decode(b"definitely not an image").is_err());
    }

    #[test]
    fn normalize_widens_gray_alpha() {
        let la = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(2, 2));
        let img = normalize(la);
        assert!(matches!(img, DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn transpose_swaps_dimensions_and_pixels() {
        let engine = RustEngine::new();
        let mut src = RgbImage::new(3, 2);
        src.put_pixel(2, 0, Rgb([9, 9, 9]));
        let out = engine.transpose(&DynamicImage::ImageRgb8(src)).unwrap();
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(out.to_rgb8().get_pixel(0, 2), &Rgb([9, 9, 9]));
    }

    #[test]
    fn transpose_then_fliph_matches_clockwise_rotation() {
        let engine = RustEngine::new();
        let src = DynamicImage::ImageRgb8(gradient_rgb(5, 3));
        let t = engine.transpose(&src).unwrap();
        let rotated = engine.flip(&t, FlipAxis::Horizontal).unwrap();
        assert_eq!(rotated.as_bytes(), src.rotate90().as_bytes());
    }

    #[test]
    fn resize_exact_dimensions() {
        let engine = RustEngine::new();
        let src = DynamicImage::ImageRgb8(gradient_rgb(64, 48));
        let out = engine.resize(&src, 17, 9).unwrap();
        assert_eq!((out.width(), out.height()), (17, 9));
        assert_eq!(layout_of(&out), layout_of(&src));
    }

    #[test]
    fn resize_overflowing_allocation_errors() {
        let engine = RustEngine::new();
        let src = DynamicImage::ImageRgba16(ImageBuffer::new(1, 1));
        let err = engine.resize(&src, u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, EngineError::Allocation { .. }));
    }

    #[test]
    fn sample_reads_native_depth() {
        let engine = RustEngine::new();
        let mut gray = ImageBuffer::<Luma<u16>, Vec<u16>>::new(2, 1);
        gray.put_pixel(1, 0, Luma([40000]));
        let buf = DynamicImage::ImageLuma16(gray);
        assert_eq!(engine.sample(&buf, 1, 0), Some([40000, 0, 0, 0]));
        assert_eq!(engine.sample(&buf, 2, 0), None);
    }

    #[test]
    fn encode_jpeg_gray() {
        let engine = RustEngine::new();
        let buf = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128])));
        let mut out = Vec::new();
        engine
            .encode(&buf, EncodeParams::Jpeg { quality: Quality::new(90) }, &mut out)
            .unwrap();
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encode_jpeg_drops_alpha() {
        let engine = RustEngine::new();
        let buf = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
        let mut out = Vec::new();
        engine
            .encode(&buf, EncodeParams::Jpeg { quality: Quality::default() }, &mut out)
            .unwrap();
        let back = image::load_from_memory(&out).unwrap();
        assert_eq!((back.width(), back.height()), (4, 4));
    }

    #[test]
    fn encode_png_roundtrips_pixels() {
        let engine = RustEngine::new();
        let src = engine.decode(&png_bytes(12, 7)).unwrap();
        let mut out = Vec::new();
        engine
            .encode(&src, EncodeParams::Png { compression: Compression::BEST }, &mut out)
            .unwrap();
        let back = engine.decode(&out).unwrap();
        assert_eq!(back.as_bytes(), src.as_bytes());
    }

    #[test]
    fn encode_sixteen_bit_is_unsupported() {
        let engine = RustEngine::new();
        let buf = DynamicImage::ImageLuma16(ImageBuffer::new(2, 2));
        let mut out = Vec::new();
        let err = engine
            .encode(&buf, EncodeParams::Png { compression: Compression::default() }, &mut out)
            .unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn png_compression_levels_map_to_effort() {
        assert!(matches!(png_compression(0), CompressionType::Fast));
        assert!(matches!(png_compression(4), CompressionType::Default));
        assert!(matches!(png_compression(9), CompressionType::Best));
    }
}
