use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Degrees in `[0, 360)`.
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Standard RGB to HSV conversion; achromatic pixels report hue 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv {
        hue: hue / 6.0 * 360.0,
        saturation,
        value: max,
    }
}

/// Hue band reserved for operator annotations. Value is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorKey {
    pub hue_min: f64,
    pub hue_max: f64,
    pub saturation_min: f64,
}

impl Default for ColorKey {
    fn default() -> Self {
        Self {
            hue_min: 200.0,
            hue_max: 280.0,
            saturation_min: 0.58,
        }
    }
}

impl ColorKey {
    pub fn matches(&self, hsv: Hsv) -> bool {
        hsv.hue >= self.hue_min
            && hsv.hue <= self.hue_max
            && hsv.saturation >= self.saturation_min
            && hsv.saturation <= 1.0
    }

    pub fn matches_rgb(&self, r: u8, g: u8, b: u8) -> bool {
        self.matches(rgb_to_hsv(r, g, b))
    }
}
