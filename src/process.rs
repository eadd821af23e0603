//! Single-image pipeline behind the `prism` binary.
//!
//! ```text
//! read file → decode (bomb guard) → reorient → fit → encode → write
//! ```
//!
//! Reorientation is best-effort here: an unreadable orientation tag is
//! logged and the image is written as stored. Every other failure aborts
//! the run and is returned to the caller.
//!
//! ## Output
//!
//! One file, `<output.stem>.<ext>` in the output directory. The extension
//! follows the source container: JPEG in, `.jpg` out; PNG in, `.png` out.
//! GIF is decode-only, so GIF sources are written as PNG.

use crate::config::{ConfigError, PrismConfig};
use crate::error::PrismError;
use crate::imaging::{
    ColorModel, ContainerFormat, Image, Orientation, decode, encode_jpeg, encode_png,
    set_pixel_limit,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prism(#[from] PrismError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

/// What to process and where to put it.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: PathBuf,
    /// Bounding box for [`Image::fit`]; `None` keeps the reoriented size.
    pub bounds: Option<(u32, u32)>,
    pub output_dir: PathBuf,
    pub config: PrismConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Summary of one pipeline run, printed by the CLI or emitted as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub source_format: ContainerFormat,
    pub color_model: ColorModel,
    pub decoded: Size,
    /// `None` when there was no usable orientation tag.
    pub orientation: Option<Orientation>,
    pub reoriented: Size,
    pub bounds: Option<Size>,
    pub fitted: Size,
    pub output_format: ContainerFormat,
    pub output: PathBuf,
    pub bytes_written: u64,
    /// SHA-256 of the final pixel data before encoding.
    pub content_hash: String,
}

/// Run the pipeline for one image.
pub fn run(options: &RunOptions) -> Result<RunReport, ProcessError> {
    let config = &options.config;
    config.validate()?;
    set_pixel_limit(config.limits.pixel_limit);

    if !options.source.is_file() {
        return Err(ProcessError::SourceNotFound(options.source.clone()));
    }
    let bytes = fs::read(&options.source)?;
    let img = decode(&bytes)?;
    drop(bytes);

    let source_format = img.source_format();
    let color_model = img.color_model().ok_or(PrismError::Released)?;
    let decoded = Size::from(img.dimensions());
    info!(
        source = %options.source.display(),
        format = %source_format,
        width = decoded.width,
        height = decoded.height,
        "decoded"
    );

    let orientation = reorient_best_effort(&img)?;
    let reoriented = Size::from(img.dimensions());

    if let Some((max_width, max_height)) = options.bounds {
        img.fit(max_width, max_height)?;
    }
    let fitted = Size::from(img.dimensions());

    let output_format = output_format_for(source_format);
    let output = output_path(&options.output_dir, &config.output.stem, output_format);
    fs::create_dir_all(&options.output_dir)?;
    let mut sink = BufWriter::new(File::create(&output)?);
    match output_format {
        ContainerFormat::Jpeg => encode_jpeg(&mut sink, &img, config.jpeg.quality())?,
        _ => encode_png(&mut sink, &img, config.png.compression())?,
    }
    sink.flush()?;
    drop(sink);

    let content_hash = img.content_hash().ok_or(PrismError::Released)?;
    img.release();

    let bytes_written = fs::metadata(&output)?.len();
    info!(output = %output.display(), bytes = bytes_written, "written");

    Ok(RunReport {
        source: options.source.clone(),
        source_format,
        color_model,
        decoded,
        orientation,
        reoriented,
        bounds: options.bounds.map(Size::from),
        fitted,
        output_format,
        output,
        bytes_written,
        content_hash,
    })
}

/// Apply the EXIF orientation, treating an unreadable tag as "leave as is".
fn reorient_best_effort(img: &Image) -> Result<Option<Orientation>, PrismError> {
    let orientation = match img.orientation() {
        Ok(orientation) => orientation,
        Err(e) => {
            warn!(error = %e, "skipping reorientation");
            return Ok(None);
        }
    };
    if let Some(orientation) = orientation {
        debug!(%orientation, "applying orientation");
        img.apply_orientation(orientation)?;
    }
    Ok(orientation)
}

/// Encoded format for a given source container.
pub fn output_format_for(source: ContainerFormat) -> ContainerFormat {
    match source {
        ContainerFormat::Jpeg => ContainerFormat::Jpeg,
        ContainerFormat::Png => ContainerFormat::Png,
        ContainerFormat::Gif => {
            warn!("GIF output is not supported, writing PNG");
            ContainerFormat::Png
        }
    }
}

pub fn output_path(dir: &Path, stem: &str, format: ContainerFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}
