//! Errors surfaced by the image lifecycle layer.
//!
//! Every variant is recoverable and returned to the immediate caller. Engine
//! panics are deliberately *not* converted: nothing in this crate wraps calls
//! in `catch_unwind`, so a bounds violation inside the engine still aborts the
//! operation instead of masquerading as a normal failure.

use crate::imaging::ContainerFormat;
use crate::imaging::backend::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrismError {
    #[error("Image is too large (possible decompression bomb): {width} x {height}")]
    DecompressionBomb { width: u32, height: u32 },
    #[error("Unsupported or invalid image: {0}")]
    UnsupportedOrInvalidImage(String),
    #[error("Invalid target dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("{operation} failed: {source}")]
    Transform {
        operation: &'static str,
        #[source]
        source: EngineError,
    },
    #[error("Unable to encode {format} image: {source}")]
    Encode {
        format: ContainerFormat,
        #[source]
        source: EngineError,
    },
    #[error("Unable to read orientation metadata: {0}")]
    MetadataRead(String),
    #[error("Image buffer has been released")]
    Released,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
