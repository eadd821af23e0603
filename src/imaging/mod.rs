//! Image lifecycle: decode, transform, encode.
//!
//! | Stage | Entry point | Notes |
//! |---|---|---|
//! | **Decode** | [`decode`] | header probe + pixel-limit guard, then engine decode and EXIF read in parallel |
//! | **Transform** | [`Image::resize`], [`Image::rotate90`], … | in place, one lock acquisition per operation |
//! | **Fit** | [`Image::fit`] | aspect-preserving downscale into a box |
//! | **Reorient** | [`Image::reorient`] | EXIF orientation code → fixed transform sequence |
//! | **Encode** | [`encode_jpeg`], [`encode_png`] | native 8-bit path, surface fallback for 16-bit |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Parameters**: clamped encoder knobs
//! - **Engine**: [`ImageEngine`] trait + [`RustEngine`]
//! - **Image**: the owning entity and everything that mutates it

pub mod backend;
mod calculations;
pub mod color;
mod decode;
mod encode;
pub mod metadata;
mod image;
mod operations;
mod orientation;
mod params;
pub mod probe;
pub mod rust_backend;
mod transform;

pub use backend::{EncodeParams, EngineError, FlipAxis, Geometry, ImageEngine};
pub use calculations::calculate_fit_dimensions;
pub use color::{BitDepth, Channels, Color, ColorModel, PixelLayout, PixelSurface};
pub use decode::{DEFAULT_PIXEL_LIMIT, decode, decode_with, pixel_limit, set_pixel_limit};
pub use encode::{
    encode, encode_jpeg, encode_jpeg_to_vec, encode_png, encode_png_to_vec, encode_surface,
};
pub use metadata::ExifMetadata;
pub use self::image::Image;
pub use orientation::{Orientation, Step};
pub use params::{Compression, Quality};
pub use probe::{ContainerFormat, Header, probe_header};
pub use rust_backend::RustEngine;
