//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! photo.jpg
//!     Decoded: 4032x3024 RGBA (JPEG)
//!     Orientation: 6 (rotate 90) → 3024x4032
//!     Fit: 800 x 800 → 600x800
//!     Output: out/resized.jpg (84213 bytes)
//!     Pixels: sha256 3f2a…
//! ```
//!
//! Each entry has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::process::{RunReport, Size};
use std::path::Path;

fn size(s: Size) -> String {
    format!("{}x{}", s.width, s.height)
}

/// Unconstrained bounds read better as `any` than as `0`.
fn bound(value: u32) -> String {
    if value == 0 {
        "any".to_string()
    } else {
        value.to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a pipeline run as display lines.
pub fn format_report(report: &RunReport) -> Vec<String> {
    let mut lines = vec![display_name(&report.source)];
    lines.push(format!(
        "    Decoded: {} {} ({})",
        size(report.decoded),
        report.color_model,
        report.source_format
    ));

    match report.orientation {
        Some(o) if report.reoriented != report.decoded => {
            lines.push(format!("    Orientation: {} → {}", o, size(report.reoriented)));
        }
        Some(o) => lines.push(format!("    Orientation: {}", o)),
        None => lines.push("    Orientation: none".to_string()),
    }

    if let Some(b) = report.bounds {
        let outcome = if report.fitted == report.reoriented {
            "unchanged".to_string()
        } else {
            size(report.fitted)
        };
        lines.push(format!(
            "    Fit: {} x {} → {}",
            bound(b.width),
            bound(b.height),
            outcome
        ));
    }

    lines.push(format!(
        "    Output: {} ({} bytes)",
        report.output.display(),
        report.bytes_written
    ));
    if report.output_format != report.source_format {
        lines.push(format!(
            "    Note: {} written as {}",
            report.source_format, report.output_format
        ));
    }
    lines.push(format!("    Pixels: sha256 {}", report.content_hash));
    lines
}

pub fn print_report(report: &RunReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}
