//! Palette swaps
//!
//! A [`Palette`] recolors pixels by remapping hue while keeping saturation
//! and value. Artwork is drawn in a handful of key hues ([`KeyHue`]); a
//! palette maps each key hue to a target hue.
//!
//! With a tolerance, hues near a base hue map with their offset preserved:
//! under `{240 -> 0}` and tolerance 40, hue 200 (40 below the base) maps to
//! 320 (40 below the target), so shading survives the swap.
//!
//! ```rust
//! use pact_image::Palette;
//!
//! let palette = Palette::new([(240, 0)], 0).unwrap();
//! assert_eq!(palette.convert_pixel([0, 0, 255]), [255, 0, 0]);
//! assert_eq!(palette.convert_pixel([0, 0, 0]), [0, 0, 0]);
//! ```

use std::collections::BTreeMap;

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use crate::color::{hsv_to_rgb, rgb_to_hsv};
use crate::error::{ImageError, Result};

const HUES: usize = 360;
const MAX_TOLERANCE: u16 = 180;

/// Hues the artwork is authored in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum KeyHue {
    Primary = 240,
    Secondary = 200,
    Tertiary = 160,
    Quaternary = 100,
}

impl KeyHue {
    pub const ALL: [KeyHue; 4] = [
        KeyHue::Primary,
        KeyHue::Secondary,
        KeyHue::Tertiary,
        KeyHue::Quaternary,
    ];

    pub const fn degrees(self) -> u16 {
        self as u16
    }
}

/// A hue remapping table
#[derive(Clone)]
pub struct Palette {
    mapping: BTreeMap<u16, u16>,
    tolerance: u16,
    lookup: [Option<u16>; HUES],
}

impl Palette {
    /// Build a palette from `base hue -> target hue` pairs.
    ///
    /// Every hue within `tolerance` of a base hue is mapped too, keeping its
    /// offset from the base. Where two bands overlap, the higher base hue
    /// wins. A tolerance of 180 already covers the whole circle, so larger
    /// values are clamped to it.
    pub fn new(mapping: impl IntoIterator<Item = (u16, u16)>, tolerance: u16) -> Result<Self> {
        if tolerance > MAX_TOLERANCE {
            debug!(tolerance, clamped = MAX_TOLERANCE, "Tolerance covers the whole hue circle");
        }
        let tolerance = tolerance.min(MAX_TOLERANCE);

        let mapping: BTreeMap<u16, u16> = mapping.into_iter().collect();
        for (&base, &target) in &mapping {
            for hue in [base, target] {
                if usize::from(hue) >= HUES {
                    return Err(ImageError::HueOutOfRange(hue));
                }
            }
        }

        let mut lookup = [None; HUES];
        let tolerance_i = i32::from(tolerance);
        for (&base, &target) in &mapping {
            for offset in -tolerance_i..=tolerance_i {
                let hue = wrap(i32::from(base) + offset);
                lookup[usize::from(hue)] = Some(wrap(i32::from(target) + offset));
            }
        }

        debug!(
            entries = mapping.len(),
            tolerance,
            mapped = lookup.iter().filter(|hue| hue.is_some()).count(),
            "Palette built"
        );

        Ok(Self {
            mapping,
            tolerance,
            lookup,
        })
    }

    /// A palette that changes nothing
    pub fn identity() -> Self {
        Self {
            mapping: BTreeMap::new(),
            tolerance: 0,
            lookup: [None; HUES],
        }
    }

    /// Map the key hues, in [`KeyHue::ALL`] order, to `targets`.
    ///
    /// Extra targets are ignored; missing ones leave their key hue unmapped.
    pub fn from_key_hues(targets: &[u16], tolerance: u16) -> Result<Self> {
        Self::new(
            KeyHue::ALL
                .iter()
                .zip(targets)
                .map(|(key, &target)| (key.degrees(), target)),
            tolerance,
        )
    }

    pub fn tolerance(&self) -> u16 {
        self.tolerance
    }

    /// The base mapping, ascending by base hue
    pub fn mapping(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.mapping.iter().map(|(&base, &target)| (base, target))
    }

    /// Target for an integer hue, if it is mapped
    pub fn target_hue(&self, hue: u16) -> Option<u16> {
        self.lookup.get(usize::from(hue)).copied().flatten()
    }

    /// Recolor one pixel. Unmapped hues and grays pass through unchanged.
    pub fn convert_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let (h, s, v) = rgb_to_hsv(rgb);
        if s == 0.0 {
            return rgb;
        }

        let hue = wrap(h.round() as i32);
        match self.target_hue(hue) {
            Some(target) => hsv_to_rgb(f64::from(target), s, v),
            None => rgb,
        }
    }

    /// Recolor every pixel of an RGB buffer
    pub fn convert_pixel_array(&self, pixels: &RgbImage) -> RgbImage {
        let mut converted = pixels.clone();
        for pixel in converted.pixels_mut() {
            *pixel = Rgb(self.convert_pixel(pixel.0));
        }
        converted
    }

    /// Recolor an RGBA image, leaving its alpha channel untouched
    pub fn paint_image(&self, image: &RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();

        let rgb = RgbImage::from_fn(width, height, |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            Rgb([r, g, b])
        });
        let painted = self.convert_pixel_array(&rgb);

        RgbaImage::from_fn(width, height, |x, y| {
            let [r, g, b] = painted.get_pixel(x, y).0;
            Rgba([r, g, b, image.get_pixel(x, y)[3]])
        })
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("mapping", &self.mapping)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// Reduce a hue into `[0, 360)`
fn wrap(hue: i32) -> u16 {
    hue.rem_euclid(HUES as i32) as u16
}
