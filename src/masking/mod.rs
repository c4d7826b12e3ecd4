//! Color-keyed mask extraction and clean-plate compositing.
//!
//! Both outputs follow the downstream edit protocol: black pixels are
//! protected, white pixels are editable.

mod clean_plate;
mod extract;
mod hsv;

pub use clean_plate::{
    clean_plate, prepare_edit_masks, EditMasks, MaskSettings, MASK_WHITE_THRESHOLD,
};
pub use extract::{
    dilate, extract_mask, threshold_mask, DEFAULT_DILATION_RADIUS, MASK_BLACK, MASK_WHITE,
};
pub use hsv::{rgb_to_hsv, ColorKey, Hsv};
