use image::{imageops, Rgba, RgbaImage};
use serde::Deserialize;

use super::extract::{extract_mask, DEFAULT_DILATION_RADIUS};
use super::hsv::ColorKey;

/// Red channel above this counts as white in a binary mask.
pub const MASK_WHITE_THRESHOLD: u8 = 128;

const PLATE_HOLE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Copies `base` and forces every pixel under a white mask pixel to opaque
/// black. No blending; all other pixels are byte-identical to `base`.
///
/// A mask of different dimensions is resampled to the base size first.
pub fn clean_plate(base: &RgbaImage, mask: &RgbaImage) -> RgbaImage {
    let resampled;
    let mask = if mask.dimensions() == base.dimensions() {
        mask
    } else {
        tracing::debug!(
            base = ?base.dimensions(),
            mask = ?mask.dimensions(),
            "resampling mask to base dimensions"
        );
        resampled = imageops::resize(
            mask,
            base.width(),
            base.height(),
            imageops::FilterType::Nearest,
        );
        &resampled
    };

    let mut plate = base.clone();
    for (plate_pixel, mask_pixel) in plate.pixels_mut().zip(mask.pixels()) {
        if mask_pixel.0[0] > MASK_WHITE_THRESHOLD {
            *plate_pixel = PLATE_HOLE;
        }
    }
    plate
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaskSettings {
    pub key: ColorKey,
    pub dilation_radius: u32,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            key: ColorKey::default(),
            dilation_radius: DEFAULT_DILATION_RADIUS,
        }
    }
}

/// Inputs for a downstream edit request. In both images black marks
/// protected pixels and white marks editable ones.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMasks {
    Split {
        mask: RgbaImage,
        clean_plate: RgbaImage,
    },
    /// Nothing was annotated; the whole image is the base.
    Unsplit { base: RgbaImage },
}

/// Extracts the annotation mask from `annotated` and punches it into
/// `original` (or into `annotated` itself when no clean original exists).
pub fn prepare_edit_masks(
    annotated: &RgbaImage,
    original: Option<&RgbaImage>,
    settings: &MaskSettings,
) -> EditMasks {
    let base = original.unwrap_or(annotated);
    match extract_mask(annotated, &settings.key, settings.dilation_radius) {
        Some(mask) => {
            let clean_plate = clean_plate(base, &mask);
            tracing::info!(
                width = mask.width(),
                height = mask.height(),
                "prepared mask and clean plate"
            );
            EditMasks::Split { mask, clean_plate }
        }
        None => {
            tracing::info!("no annotation found; using unsplit base image");
            EditMasks::Unsplit { base: base.clone() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 20) as u8, (y * 30) as u8, 77, (100 + x + y) as u8])
        })
    }

    #[test]
    fn clean_plate_blackens_only_pixels_above_threshold() {
        let base = gradient(6, 4);
        let mask = RgbaImage::from_fn(6, 4, |x, _| match x {
            0 => Rgba([255, 255, 255, 255]),
            1 => Rgba([129, 0, 0, 255]),
            2 => Rgba([128, 128, 128, 255]),
            _ => Rgba([0, 0, 0, 255]),
        });

        let plate = clean_plate(&base, &mask);
        for (x, y, pixel) in plate.enumerate_pixels() {
            if mask.get_pixel(x, y).0[0] > 128 {
                assert_eq!(*pixel, Rgba([0, 0, 0, 255]), "({x},{y})");
            } else {
                assert_eq!(pixel, base.get_pixel(x, y), "({x},{y})");
            }
        }
    }

    #[test]
    fn clean_plate_resamples_mismatched_mask() {
        let base = gradient(4, 4);
        let mut mask = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        mask.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        let plate = clean_plate(&base, &mask);
        assert_eq!(plate.dimensions(), base.dimensions());
        assert_eq!(*plate.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(plate.get_pixel(0, 0), base.get_pixel(0, 0));
    }

    #[test]
    fn prepare_edit_masks_falls_back_to_unsplit_base() {
        let annotated = gradient(5, 5);
        let original = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255]));
        let result = prepare_edit_masks(&annotated, Some(&original), &MaskSettings::default());
        assert_eq!(result, EditMasks::Unsplit { base: original });
    }

    #[test]
    fn prepare_edit_masks_punches_hole_into_original() {
        let mut annotated = RgbaImage::from_pixel(12, 12, Rgba([200, 200, 200, 255]));
        annotated.put_pixel(6, 6, Rgba([0, 40, 255, 255]));
        let original = RgbaImage::from_pixel(12, 12, Rgba([50, 120, 90, 255]));

        let result = prepare_edit_masks(&annotated, Some(&original), &MaskSettings::default());
        let EditMasks::Split { mask, clean_plate } = result else {
            panic!("annotation should split the image");
        };
        assert_eq!(*mask.get_pixel(4, 4), Rgba([255, 255, 255, 255]));
        assert_eq!(*clean_plate.get_pixel(4, 4), Rgba([0, 0, 0, 255]));
        assert_eq!(*clean_plate.get_pixel(0, 0), Rgba([50, 120, 90, 255]));
        assert_eq!(*mask.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
