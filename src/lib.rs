//! # Prism
//!
//! Safe decode → reorient → fit → encode for JPEG and PNG images (GIF
//! decode only). Untrusted bytes go in, a typed error or a well-formed
//! image comes out.
//!
//! ```no_run
//! use prism::imaging::{Quality, decode, encode_jpeg_to_vec};
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let img = decode(&bytes)?;
//! img.reorient()?;
//! img.fit(800, 800)?;
//! let jpeg = encode_jpeg_to_vec(&img, Quality::new(90))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The image lifecycle: decode guard, [`Image`] ownership, transforms, fit, reorientation, encode |
//! | [`error`] | [`PrismError`], the single error type of the imaging API |
//! | [`config`] | `prism.toml` loading, validation and merging over stock defaults |
//! | [`process`] | The single-image pipeline run by the `prism` binary |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Check the Header Before Decoding
//!
//! Decode reads the declared width and height straight out of the container
//! header and rejects anything above the pixel limit (75 million by default)
//! before a single pixel is decompressed. A few hundred bytes claiming to be
//! 25500×25500 therefore cost a header parse, not gigabytes of memory.
//!
//! ## One Buffer, One Owner, One Lock
//!
//! An [`Image`] owns exactly one native buffer behind a mutex. Transforms
//! build the new buffer first and swap it in while holding the lock, so a
//! failed transform leaves the image as it was and there is never a second
//! live buffer for the same image. Dropping the image frees the buffer;
//! [`Image::release`] frees it early and is safe to call from any number of
//! threads at once.
//!
//! ## Engine Behind a Trait
//!
//! The pixel work (decode, resample, transpose, flip, encode) sits behind
//! [`imaging::ImageEngine`]. Production uses [`imaging::RustEngine`] on the
//! `image` crate; tests swap in a mock that records every primitive and
//! counts live buffers, which is how the ownership rules above are checked.
//!
//! ## Faults Stay Faults
//!
//! Engine failures that the engine reports become [`PrismError`] values.
//! Panics are not caught: a bounds violation inside the engine is a bug, and
//! turning it into an ordinary error would hide it.

pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod process;

pub use error::PrismError;
pub use imaging::{Image, decode};

#[cfg(test)]
pub(crate) mod test_helpers;
