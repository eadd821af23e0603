//! Shared test utilities: synthetic images and hand-built container bytes.
//!
//! Everything is generated in memory so tests need no fixture files.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_bytes(64, 48);
//! let rotated = splice_jpeg_exif(&jpeg, &exif_tiff(true, 3, &[0, 6, 0, 0]));
//! let img = decode(&rotated).unwrap();
//! ```

use image::{ImageEncoder, Rgb, RgbImage};

// =========================================================================
// Pixel sources
// =========================================================================

/// Deterministic RGB gradient; every pixel differs from its neighbours so
/// flips and rotations are observable.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Encode a gradient as baseline JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_rgb(width, height);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Encode a gradient as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_rgb(width, height);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

// =========================================================================
// Declared-size fixtures
// =========================================================================

/// CRC-32 (ISO-HDLC) as used by PNG chunks.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

/// A real small JPEG whose SOF0 frame header is rewritten to declare
/// `width × height`. Headers parse normally; the pixel data is 8x8.
pub fn oversized_jpeg_header(width: u16, height: u16) -> Vec<u8> {
    let mut data = jpeg_bytes(8, 8);
    let mut pos = 2;
    while data[pos + 1] != 0xC0 {
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    // FF C0, length (2), precision (1), height (2), width (2)
    data[pos + 5..pos + 7].copy_from_slice(&height.to_be_bytes());
    data[pos + 7..pos + 9].copy_from_slice(&width.to_be_bytes());
    data
}

/// A real small PNG whose IHDR is rewritten (CRC included) to declare
/// `width × height`.
pub fn oversized_png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = png_bytes(8, 8);
    data[16..20].copy_from_slice(&width.to_be_bytes());
    data[20..24].copy_from_slice(&height.to_be_bytes());
    let crc = crc32(&data[12..29]);
    data[29..33].copy_from_slice(&crc.to_be_bytes());
    data
}

// =========================================================================
// EXIF
// =========================================================================

/// TIFF structure with a single IFD0 Orientation entry of `field_type`,
/// `value` being the entry's raw 4-byte value field.
pub fn exif_tiff(big_endian: bool, field_type: u16, value: &[u8; 4]) -> Vec<u8> {
    let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut tiff = Vec::new();
    tiff.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    tiff.extend_from_slice(&u16b(42));
    tiff.extend_from_slice(&u32b(8));
    tiff.extend_from_slice(&u16b(1));
    tiff.extend_from_slice(&u16b(0x0112));
    tiff.extend_from_slice(&u16b(field_type));
    let count = if field_type == 2 { 2 } else { 1 };
    tiff.extend_from_slice(&u32b(count));
    tiff.extend_from_slice(value);
    tiff.extend_from_slice(&u32b(0));
    tiff
}

/// Big-endian TIFF with an integer SHORT orientation `code`.
pub fn orientation_tiff(code: u16) -> Vec<u8> {
    let [hi, lo] = code.to_be_bytes();
    exif_tiff(true, 3, &[hi, lo, 0, 0])
}

/// Insert an `Exif` APP1 segment right after the SOI marker of `jpeg`.
pub fn splice_jpeg_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let payload_len = 2 + b"Exif\0\0".len() + tiff.len();
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&(payload_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
