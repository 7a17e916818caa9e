//! Pure calculation functions for image operations.
//!
//! These functions have no side effects and don't touch pixel buffers,
//! making them easy to unit test. They handle crop geometry, luma, blending,
//! and the 8-bit HSV color model used by the hue adjustment.

use super::params::{CropBox, CropRequest};

/// Clamp a crop request to the bounds of a `(width, height)` source.
///
/// `x`/`y` are clamped into `[0, width]`/`[0, height]`, then the requested
/// size into what remains to the right of and below that origin. Returns
/// `None` when the clamped box has no area.
pub fn clamp_crop_box(source: (u32, u32), request: &CropRequest) -> Option<CropBox> {
    let (src_w, src_h) = (i64::from(source.0), i64::from(source.1));

    let x = request.x.clamp(0, src_w);
    let y = request.y.clamp(0, src_h);
    let width = request.width.unwrap_or(src_w).clamp(0, src_w - x);
    let height = request.height.unwrap_or(src_h).clamp(0, src_h - y);

    if width <= 0 || height <= 0 {
        return None;
    }

    Some(CropBox {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    })
}

/// Whether the pixel at `(x, y)` lies in the ellipse inscribed in a
/// `width`×`height` box. The test is made at the pixel center.
pub fn inside_inscribed_ellipse(x: u32, y: u32, width: u32, height: u32) -> bool {
    let rx = f64::from(width) / 2.0;
    let ry = f64::from(height) / 2.0;
    let dx = (f64::from(x) + 0.5 - rx) / rx;
    let dy = (f64::from(y) + 0.5 - ry) / ry;
    dx * dx + dy * dy <= 1.0
}

/// ITU-R 601-2 luma in 16.16 fixed point.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16) as u8
}

/// Linear interpolation from `from` towards `to`, extrapolating for factors
/// outside `[0, 1]` and clipping to the 8-bit range.
#[inline]
pub fn blend(from: u8, to: u8, factor: f32) -> u8 {
    let from = f32::from(from);
    let value = from + factor * (f32::from(to) - from);
    value.round().clamp(0.0, 255.0) as u8
}

/// Rotate an 8-bit hue (0–255 spanning 0–360°) by `shift_degrees`.
pub fn shift_hue(hue: u8, shift_degrees: f64) -> u8 {
    let degrees = f64::from(hue) / 255.0 * 360.0;
    let mut shifted = (degrees + shift_degrees) % 360.0;
    if shifted < 0.0 {
        shifted += 360.0;
    }
    (shifted / 360.0 * 255.0) as u8
}

/// Precompute [`shift_hue`] for every possible hue byte.
pub fn hue_lookup_table(shift_degrees: f64) -> [u8; 256] {
    std::array::from_fn(|hue| shift_hue(hue as u8, shift_degrees))
}

/// Convert an RGB pixel into 8-bit HSV (each channel 0–255).
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return [0, 0, max];
    }

    let chroma = f32::from(max - min);
    let saturation = chroma / f32::from(max);
    let rc = f32::from(max - r) / chroma;
    let gc = f32::from(max - g) / chroma;
    let bc = f32::from(max - b) / chroma;

    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    // Hue fraction is computed wide and stored narrow before scaling.
    let hue = (f64::from(sector) / 6.0 + 1.0).rem_euclid(1.0) as f32;

    [
        (f64::from(hue) * 255.0).clamp(0.0, 255.0) as u8,
        (f64::from(saturation) * 255.0).clamp(0.0, 255.0) as u8,
        max,
    ]
}

/// Convert an 8-bit HSV pixel back to RGB.
pub fn hsv_to_rgb([h, s, v]: [u8; 3]) -> [u8; 3] {
    if s == 0 {
        return [v, v, v];
    }

    let scaled = f64::from(h) * 6.0 / 255.0;
    let sector = scaled.floor();
    let fraction = scaled - sector;
    let sat = f64::from(s) / 255.0;
    let value = f64::from(v);

    let p = (value * (1.0 - sat)).round().clamp(0.0, 255.0) as u8;
    let q = (value * (1.0 - sat * fraction)).round().clamp(0.0, 255.0) as u8;
    let t = (value * (1.0 - sat * (1.0 - fraction)))
        .round()
        .clamp(0.0, 255.0) as u8;

    match sector as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(x: i64, y: i64, width: Option<i64>, height: Option<i64>) -> CropRequest {
        CropRequest {
            x,
            y,
            width,
            height,
            circular: false,
        }
    }

    // =========================================================================
    // clamp_crop_box
    // =========================================================================

    #[test]
    fn crop_defaults_to_full_image() {
        let region = clamp_crop_box((200, 100), &request(0, 0, None, None)).unwrap();
        assert_eq!(
            region,
            CropBox {
                x: 0,
                y: 0,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn crop_inside_bounds_is_unchanged() {
        let region = clamp_crop_box((100, 100), &request(10, 10, Some(50), Some(50))).unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (10, 10, 50, 50));
    }

    #[test]
    fn crop_size_is_clamped_to_remaining_area() {
        let region = clamp_crop_box((100, 80), &request(60, 50, Some(500), Some(500))).unwrap();
        assert_eq!((region.width, region.height), (40, 30));
    }

    #[test]
    fn crop_negative_origin_clamps_to_zero() {
        let region = clamp_crop_box((100, 80), &request(-20, -5, Some(30), Some(30))).unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (0, 0, 30, 30));
    }

    #[test]
    fn crop_zero_width_is_rejected() {
        assert!(clamp_crop_box((100, 100), &request(0, 0, Some(0), Some(10))).is_none());
        assert!(clamp_crop_box((100, 100), &request(0, 0, Some(10), Some(0))).is_none());
    }

    #[test]
    fn crop_negative_size_is_rejected() {
        assert!(clamp_crop_box((100, 100), &request(0, 0, Some(-5), Some(10))).is_none());
    }

    #[test]
    fn crop_origin_at_far_edge_is_rejected() {
        assert!(clamp_crop_box((100, 100), &request(100, 0, None, None)).is_none());
        assert!(clamp_crop_box((100, 100), &request(0, 250, None, None)).is_none());
    }

    #[test]
    fn crop_never_exceeds_source() {
        for x in [-10, 0, 5, 37, 99] {
            for w in [1, 10, 63, 100, 1000] {
                if let Some(region) = clamp_crop_box((100, 64), &request(x, 3, Some(w), Some(w))) {
                    assert!(region.x + region.width <= 100);
                    assert!(region.y + region.height <= 64);
                }
            }
        }
    }

    // =========================================================================
    // inside_inscribed_ellipse
    // =========================================================================

    #[test]
    fn ellipse_contains_center_not_corners() {
        assert!(inside_inscribed_ellipse(25, 25, 50, 50));
        assert!(!inside_inscribed_ellipse(0, 0, 50, 50));
        assert!(!inside_inscribed_ellipse(49, 0, 50, 50));
        assert!(!inside_inscribed_ellipse(0, 49, 50, 50));
        assert!(!inside_inscribed_ellipse(49, 49, 50, 50));
    }

    #[test]
    fn ellipse_follows_box_aspect() {
        // 100x20 box: far left/right of the middle row are inside, top of the
        // same columns are not.
        assert!(inside_inscribed_ellipse(1, 10, 100, 20));
        assert!(inside_inscribed_ellipse(98, 10, 100, 20));
        assert!(!inside_inscribed_ellipse(5, 0, 100, 20));
    }

    #[test]
    fn ellipse_single_pixel_box_is_inside() {
        assert!(inside_inscribed_ellipse(0, 0, 1, 1));
    }

    // =========================================================================
    // luma / blend
    // =========================================================================

    #[test]
    fn luma_of_primaries() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn blend_endpoints_and_extrapolation() {
        assert_eq!(blend(100, 200, 0.0), 100);
        assert_eq!(blend(100, 200, 1.0), 200);
        assert_eq!(blend(100, 200, 0.5), 150);
        assert_eq!(blend(100, 200, 2.0), 255);
        assert_eq!(blend(100, 50, 3.0), 0);
    }

    // =========================================================================
    // Hue
    // =========================================================================

    /// Distance on the 8-bit hue circle, where 255 and 0 both mean 0°.
    fn hue_distance(a: u8, b: u8) -> u8 {
        let d = a.abs_diff(b);
        d.min(255 - d)
    }

    #[test]
    fn shift_hue_full_turn_is_near_identity() {
        for hue in 0..=255u8 {
            for turns in [-720.0, -360.0, 0.0, 360.0, 1080.0] {
                let shifted = shift_hue(hue, turns);
                assert!(
                    hue_distance(shifted, hue) <= 1,
                    "hue {hue} shifted by {turns} became {shifted}"
                );
            }
        }
    }

    #[test]
    fn shift_hue_wraps_negative_results() {
        // 0° - 90° → 270° → 191.25 → 191
        assert_eq!(shift_hue(0, -90.0), 191);
        // 0° + 180° → 127.5 → 127
        assert_eq!(shift_hue(0, 180.0), 127);
    }

    #[test]
    fn shift_hue_there_and_back() {
        for hue in 0..=255u8 {
            let back = shift_hue(shift_hue(hue, -30.0), 30.0);
            assert!(hue_distance(back, hue) <= 2, "hue {hue} came back as {back}");
        }
    }

    #[test]
    fn lookup_table_matches_direct_computation() {
        let table = hue_lookup_table(47.5);
        for hue in 0..=255u8 {
            assert_eq!(table[hue as usize], shift_hue(hue, 47.5));
        }
    }

    #[test]
    fn hsv_of_primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
        assert!(hue_distance(rgb_to_hsv([0, 255, 0])[0], 85) <= 1);
        assert!(hue_distance(rgb_to_hsv([0, 0, 255])[0], 170) <= 1);
    }

    #[test]
    fn hsv_round_trip_is_close() {
        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(51) {
                for b in (0..=255u8).step_by(85) {
                    let back = hsv_to_rgb(rgb_to_hsv([r, g, b]));
                    for (orig, got) in [r, g, b].iter().zip(back.iter()) {
                        assert!(
                            orig.abs_diff(*got) <= 8,
                            "({r},{g},{b}) came back as {back:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn hsv_gray_round_trip_is_exact() {
        for v in 0..=255u8 {
            assert_eq!(hsv_to_rgb(rgb_to_hsv([v, v, v])), [v, v, v]);
        }
    }
}
