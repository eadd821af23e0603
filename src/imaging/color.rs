//! Pixel layout and the externally visible color model.
//!
//! The engine reports a buffer's layout as channel count plus bit depth. The
//! color model is derived from that layout on every query and never cached,
//! so it always reflects the buffer currently owned by the image.
//!
//! | Channels | Depth | Model |
//! |---|---|---|
//! | 1 | 8 | [`ColorModel::Gray`] |
//! | 1 | 16 | [`ColorModel::Gray16`] |
//! | 3, 4 | 8 | [`ColorModel::Rgba`] |
//! | 3, 4 | 16 | [`ColorModel::Nrgba64`] |

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    One,
    Three,
    Four,
}

impl Channels {
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(Self::One),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    pub fn count(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }
}

/// Channel count and per-channel depth of a native buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    pub channels: Channels,
    pub depth: BitDepth,
}

impl PixelLayout {
    pub const fn new(channels: Channels, depth: BitDepth) -> Self {
        Self { channels, depth }
    }

    /// Build a layout from raw engine values, rejecting anything outside
    /// channels ∈ {1,3,4} and depth ∈ {8,16}.
    pub fn from_raw(channels: u8, bits: u8) -> Option<Self> {
        Some(Self {
            channels: Channels::from_count(channels)?,
            depth: BitDepth::from_bits(bits)?,
        })
    }

    pub fn color_model(self) -> ColorModel {
        match (self.channels, self.depth) {
            (Channels::One, BitDepth::Eight) => ColorModel::Gray,
            (Channels::One, BitDepth::Sixteen) => ColorModel::Gray16,
            (Channels::Three | Channels::Four, BitDepth::Eight) => ColorModel::Rgba,
            (Channels::Three | Channels::Four, BitDepth::Sixteen) => ColorModel::Nrgba64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    Gray,
    Gray16,
    Rgba,
    Nrgba64,
}

impl ColorModel {
    pub fn is_sixteen_bit(self) -> bool {
        matches!(self, Self::Gray16 | Self::Nrgba64)
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gray => "Gray",
            Self::Gray16 => "Gray16",
            Self::Rgba => "RGBA",
            Self::Nrgba64 => "NRGBA64",
        };
        f.write_str(name)
    }
}

/// A single pixel value in its color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Gray(u8),
    Gray16(u16),
    Rgba([u8; 4]),
    Nrgba64([u16; 4]),
}

impl Default for Color {
    /// Transparent black, returned for out-of-bounds queries.
    fn default() -> Self {
        Self::Rgba([0, 0, 0, 0])
    }
}

impl Color {
    /// Interpret raw engine channel values (`[c0, c1, c2, alpha]`) in `model`.
    pub fn from_sample(model: ColorModel, raw: [u16; 4]) -> Self {
        match model {
            ColorModel::Gray => Self::Gray(raw[0] as u8),
            ColorModel::Gray16 => Self::Gray16(raw[0]),
            ColorModel::Rgba => Self::Rgba([
                raw[0] as u8,
                raw[1] as u8,
                raw[2] as u8,
                raw[3] as u8,
            ]),
            ColorModel::Nrgba64 => Self::Nrgba64(raw),
        }
    }

    /// Luma at 8 bits; 16-bit values keep their high byte.
    pub fn to_gray8(self) -> u8 {
        match self {
            Self::Gray(v) => v,
            Self::Gray16(v) => (v >> 8) as u8,
            Self::Rgba([r, g, b, _]) => luma(r as u32, g as u32, b as u32) as u8,
            Self::Nrgba64([r, g, b, _]) => (luma(r as u32, g as u32, b as u32) >> 8) as u8,
        }
    }

    pub fn to_gray16(self) -> u16 {
        match self {
            Self::Gray(v) => (v as u16) << 8 | v as u16,
            Self::Gray16(v) => v,
            Self::Rgba([r, g, b, _]) => {
                let l = luma(r as u32, g as u32, b as u32) as u16;
                l << 8 | l
            }
            Self::Nrgba64([r, g, b, _]) => luma(r as u32, g as u32, b as u32) as u16,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        match self {
            Self::Gray(v) => [v, v, v, 255],
            Self::Gray16(v) => {
                let v = (v >> 8) as u8;
                [v, v, v, 255]
            }
            Self::Rgba(px) => px,
            Self::Nrgba64(px) => px.map(|c| (c >> 8) as u8),
        }
    }

    pub fn to_rgba16(self) -> [u16; 4] {
        match self {
            Self::Gray(v) => {
                let v = (v as u16) << 8 | v as u16;
                [v, v, v, u16::MAX]
            }
            Self::Gray16(v) => [v, v, v, u16::MAX],
            Self::Rgba(px) => px.map(|c| (c as u16) << 8 | c as u16),
            Self::Nrgba64(px) => px,
        }
    }
}

/// ITU-R BT.601 luma with integer weights summing to 1000.
fn luma(r: u32, g: u32, b: u32) -> u32 {
    (299 * r + 587 * g + 114 * b + 500) / 1000
}

/// A read-only, pixel-addressable view of an image.
///
/// The fallback encoder consumes this instead of a native buffer, which lets
/// it handle color models the engine's encoder has no path for.
pub trait PixelSurface {
    /// `(width, height)`.
    fn bounds(&self) -> (u32, u32);

    /// `None` once the surface no longer has pixels.
    fn color_model(&self) -> Option<ColorModel>;

    /// Pixel at `(x, y)`; out-of-bounds yields [`Color::default`].
    fn at(&self, x: u32, y: u32) -> Color;
}
