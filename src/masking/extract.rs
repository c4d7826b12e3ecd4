use image::{Rgba, RgbaImage};

use super::hsv::ColorKey;

pub const MASK_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const MASK_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Default neighbourhood radius for [`dilate`]; radius 2 scans a 5x5 window.
pub const DEFAULT_DILATION_RADIUS: u32 = 2;

/// Classifies every pixel against `key`: marked pixels become opaque white,
/// everything else opaque black. Returns `None` when nothing is marked.
pub fn threshold_mask(image: &RgbaImage, key: &ColorKey) -> Option<RgbaImage> {
    let mut marked = false;
    let mask = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        if key.matches_rgb(r, g, b) {
            marked = true;
            MASK_WHITE
        } else {
            MASK_BLACK
        }
    });

    if !marked {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "no pixels inside the color key band"
        );
        return None;
    }
    Some(mask)
}

/// Single-pass square dilation. Neighbours are read from the input buffer
/// only, so growth never chains within one call.
///
/// Cost is O(width * height * radius^2).
pub fn dilate(mask: &RgbaImage, radius: u32) -> RgbaImage {
    let mut dilated = mask.clone();
    if radius == 0 {
        return dilated;
    }

    let (width, height) = mask.dimensions();
    for y in 0..height {
        for x in 0..width {
            if is_mask_white(mask.get_pixel(x, y)) {
                continue;
            }
            if has_white_neighbor(mask, x, y, radius) {
                dilated.put_pixel(x, y, MASK_WHITE);
            }
        }
    }
    dilated
}

/// Threshold followed by one dilation pass.
pub fn extract_mask(image: &RgbaImage, key: &ColorKey, radius: u32) -> Option<RgbaImage> {
    let raw = threshold_mask(image, key)?;
    let mask = dilate(&raw, radius);
    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        radius,
        "extracted color-keyed mask"
    );
    Some(mask)
}

pub(crate) fn is_mask_white(pixel: &Rgba<u8>) -> bool {
    pixel.0[0] == 255
}

fn has_white_neighbor(mask: &RgbaImage, x: u32, y: u32, radius: u32) -> bool {
    let top = y.saturating_sub(radius);
    let bottom = y.saturating_add(radius).min(mask.height() - 1);
    let left = x.saturating_sub(radius);
    let right = x.saturating_add(radius).min(mask.width() - 1);

    (top..=bottom).any(|ny| (left..=right).any(|nx| is_mask_white(mask.get_pixel(nx, ny))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    fn white_count(mask: &RgbaImage) -> usize {
        mask.pixels().filter(|pixel| is_mask_white(pixel)).count()
    }

    #[test]
    fn threshold_returns_none_without_marked_pixels() {
        let image = filled(8, 8, [200, 30, 30, 255]);
        assert!(threshold_mask(&image, &ColorKey::default()).is_none());
        assert!(extract_mask(&image, &ColorKey::default(), 2).is_none());
    }

    #[test]
    fn threshold_band_edges_follow_rgb_hue_and_saturation() {
        // Hues: 201.2, 198.8, 277.6, 281.2; saturations 0.61 and 0.53 at hue 240.
        let row = [
            [0, 165, 255],
            [0, 175, 255],
            [160, 0, 255],
            [175, 0, 255],
            [100, 100, 255],
            [120, 120, 255],
        ];
        let mut image = filled(row.len() as u32, 1, [0, 0, 0, 255]);
        for (x, [r, g, b]) in row.into_iter().enumerate() {
            image.put_pixel(x as u32, 0, Rgba([r, g, b, 255]));
        }

        let mask = threshold_mask(&image, &ColorKey::default()).expect("band pixels present");
        let marked: Vec<bool> = (0..row.len() as u32)
            .map(|x| is_mask_white(mask.get_pixel(x, 0)))
            .collect();
        assert_eq!(marked, [true, false, true, false, true, false]);
    }

    #[test]
    fn threshold_marks_blue_white_and_everything_else_black() {
        let mut image = filled(4, 1, [255, 255, 255, 255]);
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        image.put_pixel(2, 0, Rgba([90, 40, 230, 0]));

        let mask = threshold_mask(&image, &ColorKey::default()).expect("blue pixels present");
        assert_eq!(*mask.get_pixel(0, 0), MASK_BLACK);
        assert_eq!(*mask.get_pixel(1, 0), MASK_WHITE);
        assert_eq!(*mask.get_pixel(2, 0), MASK_WHITE);
        assert_eq!(*mask.get_pixel(3, 0), MASK_BLACK);
    }

    #[test]
    fn threshold_output_is_fully_opaque() {
        let mut image = filled(3, 3, [0, 0, 0, 0]);
        image.put_pixel(1, 1, Rgba([10, 60, 250, 128]));
        let mask = threshold_mask(&image, &ColorKey::default()).expect("blue pixel present");
        assert!(mask.pixels().all(|pixel| pixel.0[3] == 255));
    }

    #[test]
    fn dilation_grows_single_pixel_to_five_by_five() {
        let mut mask = filled(9, 9, MASK_BLACK.0);
        mask.put_pixel(4, 4, MASK_WHITE);

        let dilated = dilate(&mask, DEFAULT_DILATION_RADIUS);
        assert_eq!(white_count(&dilated), 25);
        for y in 0..9 {
            for x in 0..9 {
                let inside = (2..=6).contains(&x) && (2..=6).contains(&y);
                assert_eq!(is_mask_white(dilated.get_pixel(x, y)), inside, "({x},{y})");
            }
        }
    }

    #[test]
    fn dilation_is_single_pass_not_iterative() {
        let mut mask = filled(12, 1, MASK_BLACK.0);
        mask.put_pixel(0, 0, MASK_WHITE);
        let dilated = dilate(&mask, 2);
        assert_eq!(white_count(&dilated), 3);
    }

    #[test]
    fn dilation_clips_window_at_image_edges() {
        let mut mask = filled(3, 3, MASK_BLACK.0);
        mask.put_pixel(0, 0, MASK_WHITE);
        let dilated = dilate(&mask, 2);
        assert_eq!(white_count(&dilated), 9);
    }

    #[test]
    fn dilation_never_removes_white_and_stays_within_radius() {
        let mut mask = filled(16, 16, MASK_BLACK.0);
        for (x, y) in [(3, 3), (4, 3), (12, 9), (0, 15)] {
            mask.put_pixel(x, y, MASK_WHITE);
        }
        let radius = 2;
        let dilated = dilate(&mask, radius);

        for (x, y, pixel) in mask.enumerate_pixels() {
            let grown = is_mask_white(dilated.get_pixel(x, y));
            if is_mask_white(pixel) {
                assert!(grown, "white pixel ({x},{y}) was removed");
            }
            if grown {
                let near_original = mask.enumerate_pixels().any(|(ox, oy, source)| {
                    is_mask_white(source) && ox.abs_diff(x) <= radius && oy.abs_diff(y) <= radius
                });
                assert!(near_original, "({x},{y}) grew outside the radius");
            }
        }
    }

    #[test]
    fn annotated_blue_rectangle_extracts_superset_within_radius() {
        let mut annotated = filled(40, 30, [180, 170, 160, 255]);
        for y in 10..16 {
            for x in 8..20 {
                annotated.put_pixel(x, y, Rgba([30, 60, 220, 255]));
            }
        }

        let raw = threshold_mask(&annotated, &ColorKey::default()).expect("annotation present");
        let mask = extract_mask(&annotated, &ColorKey::default(), 2).expect("annotation present");

        assert!(white_count(&mask) > white_count(&raw));
        for (x, y, pixel) in mask.enumerate_pixels() {
            if is_mask_white(raw.get_pixel(x, y)) {
                assert!(is_mask_white(pixel));
            }
            let within_expanded = (6..22).contains(&x) && (8..18).contains(&y);
            assert_eq!(is_mask_white(pixel), within_expanded, "({x},{y})");
        }
    }
}
