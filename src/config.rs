//! Configuration module.
//!
//! Handles loading, validating, and merging `prism.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! pixel_limit = 75000000    # Max declared width × height accepted by decode
//!
//! [jpeg]
//! quality = 85              # 1-100
//!
//! [png]
//! compression = 4           # 0 (fastest) - 9 (smallest)
//!
//! [output]
//! stem = "resized"          # Output file name without extension
//!
//! [processing]
//! max_processes = 4         # Worker threads (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [jpeg]
//! quality = 95
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Compression, DEFAULT_PIXEL_LIMIT, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `prism.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrismConfig {
    /// Decode safety limits.
    pub limits: LimitsConfig,
    /// JPEG encoder settings.
    pub jpeg: JpegConfig,
    /// PNG encoder settings.
    pub png: PngConfig,
    /// Output file naming.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PrismConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.pixel_limit == 0 {
            return Err(ConfigError::Validation(
                "limits.pixel_limit must be greater than 0".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg.quality) {
            return Err(ConfigError::Validation("jpeg.quality must be 1-100".into()));
        }
        if self.png.compression > 9 {
            return Err(ConfigError::Validation(
                "png.compression must be 0-9".into(),
            ));
        }
        let stem = self.output.stem.trim();
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.stem must be a non-empty file name".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest declared `width × height` decode accepts.
    pub pixel_limit: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            pixel_limit: DEFAULT_PIXEL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub quality: u32,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value() as u32,
        }
    }
}

impl JpegConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PngConfig {
    pub compression: u32,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default().level() as u32,
        }
    }
}

impl PngConfig {
    pub fn compression(&self) -> Compression {
        Compression::new(self.compression)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File name without extension; the extension follows the encoded format.
    pub stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            stem: "resized".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrismConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrismConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrismConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, or stock defaults when `path` is `None`.
///
/// A path that was given but does not exist is an error, not a silent
/// fallback to defaults.
pub fn load_config(path: Option<&Path>) -> Result<PrismConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `prism.toml` with all keys and explanations.
///
/// Used by `prism --print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Prism Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Decode limits
# ---------------------------------------------------------------------------
[limits]
# Largest declared width x height accepted before decoding. Inputs over the
# limit are rejected as possible decompression bombs without being decoded.
pixel_limit = 75000000

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[jpeg]
# 1 = smallest file, 100 = best quality.
quality = 85

[png]
# 0 = fastest, 9 = smallest file. PNG is lossless at every level.
compression = 4

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# File name written into the output directory; the extension is added from
# the encoded format (jpg or png).
stem = "resized"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Worker threads for parallel decode work.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
