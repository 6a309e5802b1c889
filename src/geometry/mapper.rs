use super::{DisplayBox, NativeSize, PixelPoint, ViewportPoint};

/// Map a pointer position over a scaled video element to native pixel coordinates
///
/// The offset from the box's top-left corner is scaled by `native / displayed`
/// on each axis and rounded. When the native size is not known yet (metadata
/// not loaded) the rounded display offset is returned unscaled.
///
/// Negative offsets (pointer left of / above the box) map to 0. The upper
/// bound is not clamped here, see [`PixelPoint::clamp_to`].
pub fn map_click(
    pointer: ViewportPoint,
    display: DisplayBox,
    native: Option<NativeSize>,
) -> PixelPoint {
    let dx = pointer.x - display.left;
    let dy = pointer.y - display.top;

    let (x, y) = match native {
        Some(native) if !native.is_empty() && display.width > 0.0 && display.height > 0.0 => (
            dx * native.width as f64 / display.width,
            dy * native.height as f64 / display.height,
        ),
        _ => (dx, dy),
    };

    PixelPoint::new(to_pixel(x), to_pixel(y))
}

fn to_pixel(v: f64) -> u32 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATIVE: NativeSize = NativeSize {
        width: 1920,
        height: 1080,
    };

    fn display() -> DisplayBox {
        DisplayBox::new(100.0, 50.0, 840.0, 472.0)
    }

    #[test]
    fn top_left_corner_maps_to_origin() {
        let p = map_click(ViewportPoint::new(100.0, 50.0), display(), Some(NATIVE));
        assert_eq!(p, PixelPoint::new(0, 0));
    }

    #[test]
    fn center_maps_to_native_center() {
        let p = map_click(ViewportPoint::new(520.0, 286.0), display(), Some(NATIVE));
        assert!(p.x.abs_diff(960) <= 1, "x = {}", p.x);
        assert!(p.y.abs_diff(540) <= 1, "y = {}", p.y);
    }

    #[test]
    fn unknown_native_size_falls_back_to_display_offset() {
        let p = map_click(ViewportPoint::new(120.4, 60.6), display(), None);
        assert_eq!(p, PixelPoint::new(20, 11));
    }

    #[test]
    fn pointer_outside_top_left_never_goes_negative() {
        let p = map_click(ViewportPoint::new(90.0, 10.0), display(), Some(NATIVE));
        assert_eq!(p, PixelPoint::new(0, 0));
    }

    #[test]
    fn in_bounds_clicks_stay_inside_native_grid_after_clamp() {
        let d = display();
        let steps = 37;
        for i in 0..=steps {
            for j in 0..=steps {
                let pointer = ViewportPoint::new(
                    d.left + d.width * i as f64 / steps as f64,
                    d.top + d.height * j as f64 / steps as f64,
                );
                assert!(d.contains(pointer));
                let p = map_click(pointer, d, Some(NATIVE)).clamp_to(NATIVE);
                assert!(p.x < NATIVE.width);
                assert!(p.y < NATIVE.height);
            }
        }
    }

    #[test]
    fn bottom_right_corner_clamps_to_last_pixel() {
        let p = map_click(ViewportPoint::new(940.0, 522.0), display(), Some(NATIVE));
        assert_eq!(p, PixelPoint::new(1920, 1080));
        assert_eq!(p.clamp_to(NATIVE), PixelPoint::new(1919, 1079));
    }
}
