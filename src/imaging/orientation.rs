//! EXIF orientation normalization.
//!
//! Each of the eight EXIF orientation codes maps to a fixed sequence of
//! transform steps that brings the pixel data upright (row 0 at the top,
//! column 0 on the left):
//!
//! | Code | Steps |
//! |---|---|
//! | 1 | none |
//! | 2 | flip horizontal |
//! | 3 | rotate 180 |
//! | 4 | flip vertical |
//! | 5 | rotate 90, flip horizontal |
//! | 6 | rotate 90 |
//! | 7 | rotate 270, flip horizontal |
//! | 8 | rotate 270 |
//!
//! All steps of one code run under a single lock acquisition; the image
//! either ends up fully reoriented or, when a step fails, unchanged.

use super::backend::{EngineError, FlipAxis, ImageEngine};
use super::image::Image;
use crate::error::PrismError;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// The eight EXIF orientations, named after the correction they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Rotate90FlipHorizontal,
    Rotate90,
    Rotate270FlipHorizontal,
    Rotate270,
}

/// One transform in an orientation correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
}

impl Orientation {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Normal,
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Rotate90FlipHorizontal,
            6 => Self::Rotate90,
            7 => Self::Rotate270FlipHorizontal,
            8 => Self::Rotate270,
            _ => return None,
        })
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Rotate90FlipHorizontal => 5,
            Self::Rotate90 => 6,
            Self::Rotate270FlipHorizontal => 7,
            Self::Rotate270 => 8,
        }
    }

    /// Transform sequence that makes an image with this orientation upright.
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Normal => &[],
            Self::FlipHorizontal => &[Step::FlipHorizontal],
            Self::Rotate180 => &[Step::Rotate180],
            Self::FlipVertical => &[Step::FlipVertical],
            Self::Rotate90FlipHorizontal => &[Step::Rotate90, Step::FlipHorizontal],
            Self::Rotate90 => &[Step::Rotate90],
            Self::Rotate270FlipHorizontal => &[Step::Rotate270, Step::FlipHorizontal],
            Self::Rotate270 => &[Step::Rotate270],
        }
    }

    /// Whether correcting this orientation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        self.steps()
            .iter()
            .any(|s| matches!(s, Step::Rotate90 | Step::Rotate270))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::FlipHorizontal => "flip horizontal",
            Self::Rotate180 => "rotate 180",
            Self::FlipVertical => "flip vertical",
            Self::Rotate90FlipHorizontal => "rotate 90 + flip horizontal",
            Self::Rotate90 => "rotate 90",
            Self::Rotate270FlipHorizontal => "rotate 270 + flip horizontal",
            Self::Rotate270 => "rotate 270",
        };
        write!(f, "{} ({label})", self.code())
    }
}

impl Step {
    fn apply<E: ImageEngine>(self, engine: &E, buf: &E::Buffer) -> Result<E::Buffer, EngineError> {
        match self {
            Self::Rotate90 => engine.flip(&engine.transpose(buf)?, FlipAxis::Horizontal),
            Self::Rotate180 => engine.flip(buf, FlipAxis::Both),
            Self::Rotate270 => engine.flip(&engine.transpose(buf)?, FlipAxis::Vertical),
            Self::FlipHorizontal => engine.flip(buf, FlipAxis::Horizontal),
            Self::FlipVertical => engine.flip(buf, FlipAxis::Vertical),
        }
    }
}

impl<E: ImageEngine> Image<E> {
    /// Orientation recorded in the decode-time metadata.
    ///
    /// `Ok(None)` when there is no metadata, no orientation tag, or a code
    /// outside 1–8. A tag that is present but not an integer is an error.
    pub fn orientation(&self) -> Result<Option<Orientation>, PrismError> {
        let Some(metadata) = self.metadata() else {
            return Ok(None);
        };
        let code = metadata
            .orientation()
            .map_err(|e| PrismError::MetadataRead(e.to_string()))?;
        let Some(code) = code else {
            return Ok(None);
        };
        let orientation = Orientation::from_code(code);
        if orientation.is_none() {
            warn!(code, "ignoring out-of-range EXIF orientation");
        }
        Ok(orientation)
    }

    /// Rotate and mirror the pixels upright according to the EXIF orientation.
    ///
    /// Metadata is never rewritten, so calling this twice applies the
    /// correction twice.
    pub fn reorient(&self) -> Result<(), PrismError> {
        match self.orientation()? {
            Some(orientation) => self.apply_orientation(orientation),
            None => Ok(()),
        }
    }

    /// Apply the correction for `orientation` regardless of metadata.
    pub fn apply_orientation(&self, orientation: Orientation) -> Result<(), PrismError> {
        let steps = orientation.steps();
        if steps.is_empty() {
            return Ok(());
        }
        debug!(%orientation, "reorienting");
        self.replace_buffer("reorient", |engine, buf, _| {
            let mut current: Option<E::Buffer> = None;
            for step in steps {
                let next = step.apply(engine, current.as_ref().unwrap_or(buf))?;
                current = Some(next);
            }
            Ok(current)
        })
    }
}
