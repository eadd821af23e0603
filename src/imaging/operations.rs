//! High-level image operations.
//!
//! These combine the pure calculations with the transform engine.

use super::backend::ImageEngine;
use super::calculations::calculate_fit_dimensions;
use super::image::Image;
use crate::error::PrismError;
use tracing::debug;

impl<E: ImageEngine> Image<E> {
    /// Downscale to fit inside `max_width × max_height`, keeping the aspect ratio.
    ///
    /// A zero bound leaves that axis unconstrained; zero on both is a no-op.
    /// Never upscales. The target size is computed from the geometry read
    /// under the same lock acquisition that performs the resize, so a
    /// concurrent transform can't slip in between measuring and resampling.
    pub fn fit(&self, max_width: u32, max_height: u32) -> Result<(), PrismError> {
        self.replace_buffer("fit", |engine, buf, geometry| {
            let source = (geometry.width, geometry.height);
            let Some((width, height)) =
                calculate_fit_dimensions(source, (max_width, max_height))
            else {
                debug!(
                    width = source.0,
                    height = source.1,
                    max_width,
                    max_height,
                    "already fits"
                );
                return Ok(None);
            };
            engine.resize(buf, width, height).map(Some)
        })
    }
}
