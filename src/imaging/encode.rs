//! Encode dispatch: [`Image`] to JPEG or PNG bytes.
//!
//! 8-bit color models go straight through the engine's native encoder,
//! which writes into the caller's sink. The engine has no bit-depth
//! conversion, so 16-bit models (Gray16, NRGBA64) take the slower surface
//! path: pixels are pulled one at a time through [`PixelSurface`] and fed
//! to a general-purpose encoder.
//!
//! | Model | JPEG | PNG |
//! |---|---|---|
//! | Gray | native | native |
//! | RGBA | native (alpha dropped) | native |
//! | Gray16 | surface → 8-bit gray | surface → 16-bit gray |
//! | NRGBA64 | surface → 8-bit RGB | surface → 16-bit RGBA |

use super::backend::{EncodeParams, EngineError, ImageEngine};
use super::color::{Color, ColorModel, PixelSurface};
use super::image::Image;
use super::params::{Compression, Quality};
use super::rust_backend::{encode_error, png_compression};
use crate::error::PrismError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageBuffer, ImageEncoder, Luma, Rgb, Rgba};
use std::io::Write;
use tracing::debug;

/// Encode as JPEG at `quality` into `sink`.
pub fn encode_jpeg<E: ImageEngine, W: Write>(
    sink: &mut W,
    image: &Image<E>,
    quality: Quality,
) -> Result<(), PrismError> {
    encode(sink, image, EncodeParams::Jpeg { quality })
}

/// Encode as PNG at `compression` into `sink`.
pub fn encode_png<E: ImageEngine, W: Write>(
    sink: &mut W,
    image: &Image<E>,
    compression: Compression,
) -> Result<(), PrismError> {
    encode(sink, image, EncodeParams::Png { compression })
}

pub fn encode_jpeg_to_vec<E: ImageEngine>(
    image: &Image<E>,
    quality: Quality,
) -> Result<Vec<u8>, PrismError> {
    let mut out = Vec::new();
    encode_jpeg(&mut out, image, quality)?;
    Ok(out)
}

pub fn encode_png_to_vec<E: ImageEngine>(
    image: &Image<E>,
    compression: Compression,
) -> Result<Vec<u8>, PrismError> {
    let mut out = Vec::new();
    encode_png(&mut out, image, compression)?;
    Ok(out)
}

/// Encode with explicit parameters, choosing the native or surface path
/// from the current color model.
pub fn encode<E: ImageEngine>(
    sink: &mut dyn Write,
    image: &Image<E>,
    params: EncodeParams,
) -> Result<(), PrismError> {
    let format = params.format();
    let guard = image.lock();
    let buffer = guard.as_ref().ok_or(PrismError::Released)?;
    let engine = image.engine();
    let model = engine.geometry(buffer).layout.color_model();

    let result = if model.is_sixteen_bit() {
        debug!(%model, %format, "no native encoder path, using surface encoder");
        encode_surface(sink, &BufferView { engine, buffer }, params)
    } else {
        engine.encode(buffer, params, sink)
    };
    result.map_err(|source| PrismError::Encode { format, source })
}

/// General-purpose encoder over any [`PixelSurface`].
///
/// PNG keeps the surface's bit depth; JPEG is always 8-bit, gray or RGB.
pub fn encode_surface<S: PixelSurface + ?Sized>(
    sink: &mut dyn Write,
    surface: &S,
    params: EncodeParams,
) -> Result<(), EngineError> {
    let (width, height) = surface.bounds();
    let model = surface
        .color_model()
        .ok_or_else(|| EngineError::Unsupported("surface has no pixels".into()))?;
    let at = |x, y| surface.at(x, y);
    let gray = matches!(model, ColorModel::Gray | ColorModel::Gray16);

    let result = match params {
        EncodeParams::Jpeg { quality } => {
            let img = if gray {
                DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([at(x, y).to_gray8()])
                }))
            } else {
                DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                    let [r, g, b, _] = at(x, y).to_rgba8();
                    Rgb([r, g, b])
                }))
            };
            JpegEncoder::new_with_quality(sink, quality.value()).write_image(
                img.as_bytes(),
                width,
                height,
                img.color().into(),
            )
        }
        EncodeParams::Png { compression } => {
            let img = match model {
                ColorModel::Gray => DynamicImage::ImageLuma8(ImageBuffer::from_fn(
                    width,
                    height,
                    |x, y| Luma([at(x, y).to_gray8()]),
                )),
                ColorModel::Gray16 => DynamicImage::ImageLuma16(ImageBuffer::from_fn(
                    width,
                    height,
                    |x, y| Luma([at(x, y).to_gray16()]),
                )),
                ColorModel::Rgba => DynamicImage::ImageRgba8(ImageBuffer::from_fn(
                    width,
                    height,
                    |x, y| Rgba(at(x, y).to_rgba8()),
                )),
                ColorModel::Nrgba64 => DynamicImage::ImageRgba16(ImageBuffer::from_fn(
                    width,
                    height,
                    |x, y| Rgba(at(x, y).to_rgba16()),
                )),
            };
            PngEncoder::new_with_quality(
                sink,
                png_compression(compression.level()),
                PngFilter::Adaptive,
            )
            .write_image(img.as_bytes(), width, height, img.color().into())
        }
    };
    result.map_err(encode_error)
}

/// Locked buffer seen as a surface, so the fallback encoder reads a
/// consistent snapshot.
struct BufferView<'a, E: ImageEngine> {
    engine: &'a E,
    buffer: &'a E::Buffer,
}

impl<E: ImageEngine> PixelSurface for BufferView<'_, E> {
    fn bounds(&self) -> (u32, u32) {
        let g = self.engine.geometry(self.buffer);
        (g.width, g.height)
    }

    fn color_model(&self) -> Option<ColorModel> {
        Some(self.engine.geometry(self.buffer).layout.color_model())
    }

    fn at(&self, x: u32, y: u32) -> Color {
        let model = self.engine.geometry(self.buffer).layout.color_model();
        self.engine
            .sample(self.buffer, x, y)
            .map(|raw| Color::from_sample(model, raw))
            .unwrap_or_default()
    }
}
