//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the aspect-preserving size that fits `source` inside `bounds`.
///
/// A zero bound leaves that axis unconstrained (it takes the source size);
/// both bounds zero means "no box at all". Never upscales.
///
/// # Arguments
/// * `source` - Current image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height), 0 = unconstrained
///
/// # Returns
/// * `Some((width, height))` - New size; the binding axis equals its bound,
///   the other axis is truncated from the source aspect ratio (minimum 1)
/// * `None` - Image already fits, or there is nothing to fit to
///
/// # Examples
/// ```
/// # use prism::imaging::calculate_fit_dimensions;
/// // 2:1 landscape into a square box: width binds
/// assert_eq!(calculate_fit_dimensions((1000, 500), (400, 400)), Some((400, 200)));
///
/// // Already small enough: untouched
/// assert_eq!(calculate_fit_dimensions((300, 200), (400, 400)), None);
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if max_w == 0 && max_h == 0 {
        return None;
    }
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let max_w = if max_w == 0 { src_w } else { max_w };
    let max_h = if max_h == 0 { src_h } else { max_h };

    if src_w <= max_w && src_h <= max_h {
        return None;
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = max_w as f64 / max_h as f64;

    if src_aspect > box_aspect {
        // Source is wider than the box: width binds
        let w = max_w;
        let h = (w as f64 / src_aspect) as u32;
        Some((w, h.max(1)))
    } else {
        // Source is taller (or same shape): height binds
        let h = max_h;
        let w = (h as f64 * src_aspect) as u32;
        Some((w.max(1), h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_wider_source_binds_width() {
        // 2:1 into 1:1 → width 400, height 400 / 2 = 200
        assert_eq!(
            calculate_fit_dimensions((1000, 500), (400, 400)),
            Some((400, 200))
        );
    }

    #[test]
    fn fit_taller_source_binds_height() {
        // 1:2 into 1:1 → height 400, width 400 * 0.5 = 200
        assert_eq!(
            calculate_fit_dimensions((500, 1000), (400, 400)),
            Some((200, 400))
        );
    }

    #[test]
    fn fit_truncates_non_binding_axis() {
        // 1001x1000 → h = 100 / 1.001 = 99.9 → 99
        assert_eq!(
            calculate_fit_dimensions((1001, 1000), (100, 100)),
            Some((100, 99))
        );
        // 1000x1001 → w = 100 * 0.999 = 99.9 → 99
        assert_eq!(
            calculate_fit_dimensions((1000, 1001), (100, 100)),
            Some((99, 100))
        );
    }

    #[test]
    fn fit_same_aspect_binds_height() {
        // Equal aspect is not "wider", so the height branch runs
        assert_eq!(
            calculate_fit_dimensions((800, 400), (400, 200)),
            Some((400, 200))
        );
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(calculate_fit_dimensions((300, 200), (400, 400)), None);
        assert_eq!(calculate_fit_dimensions((400, 400), (400, 400)), None);
    }

    #[test]
    fn fit_zero_box_is_noop() {
        assert_eq!(calculate_fit_dimensions((5000, 4000), (0, 0)), None);
    }

    #[test]
    fn fit_width_only() {
        // Height unconstrained → box is 250x500
        assert_eq!(
            calculate_fit_dimensions((1000, 500), (250, 0)),
            Some((250, 125))
        );
    }

    #[test]
    fn fit_height_only() {
        // Width unconstrained → box is 300x100; 1.5 < 3 so height binds
        assert_eq!(
            calculate_fit_dimensions((300, 200), (0, 100)),
            Some((150, 100))
        );
    }

    #[test]
    fn fit_width_only_already_narrow_enough() {
        assert_eq!(calculate_fit_dimensions((200, 5000), (300, 0)), None);
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        // 3:1 into 1x1 → h would truncate to 0
        assert_eq!(calculate_fit_dimensions((3, 1), (1, 1)), Some((1, 1)));
        assert_eq!(
            calculate_fit_dimensions((1, 10000), (100, 100)),
            Some((1, 100))
        );
    }

    #[test]
    fn fit_empty_source_is_noop() {
        assert_eq!(calculate_fit_dimensions((0, 10), (5, 5)), None);
    }

    #[test]
    fn fit_result_stays_inside_box_and_source() {
        let sources = [(4000, 3000), (3000, 4000), (1920, 1080), (17, 9999), (333, 331)];
        let boxes = [(800, 600), (100, 0), (0, 250), (64, 64), (1000, 10)];
        for &src in &sources {
            for &bounds in &boxes {
                let Some((w, h)) = calculate_fit_dimensions(src, bounds) else {
                    continue;
                };
                let max_w = if bounds.0 == 0 { src.0 } else { bounds.0 };
                let max_h = if bounds.1 == 0 { src.1 } else { bounds.1 };
                assert!(w <= src.0 && h <= src.1, "{src:?} in {bounds:?} → {w}x{h}");
                assert!(w <= max_w && h <= max_h, "{src:?} in {bounds:?} → {w}x{h}");
                assert!(w == max_w || h == max_h, "{src:?} in {bounds:?} → {w}x{h}");
            }
        }
    }
}
