//! HSV conversion
//!
//! Hue is in degrees `[0, 360)`, saturation and value in `[0, 1]`. Channels
//! are bytes and round to nearest on the way back.

/// A color in HSV space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteColor {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl PaletteColor {
    /// Fully saturated, full-value color at hue `h` (degrees)
    pub fn new(h: f64) -> Self {
        Self { h, s: 1.0, v: 1.0 }
    }

    pub fn with_saturation(mut self, s: f64) -> Self {
        self.s = s;
        self
    }

    pub fn with_value(mut self, v: f64) -> Self {
        self.v = v;
        self
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let (h, s, v) = rgb_to_hsv(rgb);
        Self { h, s, v }
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        hsv_to_rgb(self.h, self.s, self.v)
    }
}

pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, max);
    }

    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (sector * 60.0, delta / max, max)
}

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let h = (h / 60.0).rem_euclid(6.0);
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [to_channel(r), to_channel(g), to_channel(b)]
}

fn to_channel(c: f64) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        assert_eq!(PaletteColor::new(0.0).to_rgb(), [255, 0, 0]);
        assert_eq!(PaletteColor::new(120.0).to_rgb(), [0, 255, 0]);
        assert_eq!(PaletteColor::new(240.0).to_rgb(), [0, 0, 255]);
        assert_eq!(PaletteColor::new(180.0).to_rgb(), [0, 255, 255]);
        assert_eq!(PaletteColor::new(200.0).to_rgb(), [0, 170, 255]);
        assert_eq!(PaletteColor::new(360.0).to_rgb(), [255, 0, 0]);
    }

    #[test]
    fn test_rgb_to_hsv() {
        let (h, s, v) = rgb_to_hsv([0, 170, 255]);
        assert_eq!(h.round(), 200.0);
        assert_eq!((s, v), (1.0, 1.0));

        let (h, _, _) = rgb_to_hsv([255, 0, 170]);
        assert_eq!(h.round(), 320.0);
    }

    #[test]
    fn test_gray_has_no_saturation() {
        for gray in [0u8, 128, 255] {
            let (_, s, v) = rgb_to_hsv([gray, gray, gray]);
            assert_eq!(s, 0.0);
            assert_eq!(hsv_to_rgb(0.0, s, v), [gray, gray, gray]);
        }
    }
}
