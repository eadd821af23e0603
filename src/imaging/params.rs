//! Encoder parameter types.
//!
//! Both types clamp on construction, so an out-of-range request from a
//! config file or a caller degrades to the nearest valid setting instead of
//! reaching the encoder.
//!
//! - [`Quality`]: lossy JPEG quality (1–100, default 85).
//! - [`Compression`]: zlib effort for PNG (0 = none … 9 = best, default 4).

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Self = Self(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// PNG compression level (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression(u8);

impl Compression {
    pub const NONE: Self = Self(0);
    pub const BEST: Self = Self(9);

    pub fn new(level: u32) -> Self {
        Self(level.min(9) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self(4)
    }
}
