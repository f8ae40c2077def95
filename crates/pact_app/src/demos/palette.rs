//! Palette swap demo

use std::path::Path;

use anyhow::Result;
use image::Rgba;
use pact_image::{KeyHue, Palette, PaletteColor};
use pact_interface::Surface;
use tracing::info;

use super::save;

const BAND_WIDTH: u32 = 40;
const CARD_HEIGHT: u32 = 64;

/// Key hue targets for the swapped card
const SWAP: [(KeyHue, u16); 4] = [
    (KeyHue::Primary, 0),
    (KeyHue::Secondary, 64),
    (KeyHue::Tertiary, 44),
    (KeyHue::Quaternary, 305),
];

/// One band per key hue, value fading top to bottom, with shading hues a
/// few degrees off the key in the right half of each band
fn test_card() -> Surface {
    Surface::from_fn(BAND_WIDTH * 4, CARD_HEIGHT, |x, y| {
        let key = KeyHue::ALL[(x / BAND_WIDTH) as usize];
        let shade = if x % BAND_WIDTH >= BAND_WIDTH / 2 { -12.0 } else { 0.0 };
        let value = 1.0 - f64::from(y) / f64::from(CARD_HEIGHT * 2);
        let [r, g, b] = PaletteColor::new(f64::from(key.degrees()) + shade)
            .with_value(value)
            .to_rgb();
        Rgba([r, g, b, 255])
    })
}

pub fn run(output: &Path) -> Result<()> {
    let card = test_card();
    save(&card, output, "test_card.png")?;

    let swap = Palette::new(SWAP.map(|(key, target)| (key.degrees(), target)), 20)?;
    save(&swap.paint_image(&card), output, "swapped.png")?;

    let all_red = Palette::new((0..360).map(|hue| (hue, 0)), 0)?;
    save(&all_red.paint_image(&card), output, "all_red.png")?;

    info!(palette = ?swap, "Palette demo written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_uses_key_hues() {
        let card = test_card();
        assert_eq!(card.dimensions(), (160, 64));
        assert_eq!(*card.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_swap_keeps_shading_offset() {
        let card = test_card();
        let swap = Palette::new(SWAP.map(|(key, target)| (key.degrees(), target)), 20).unwrap();
        let painted = swap.paint_image(&card);

        assert_eq!(*painted.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        // 228 sits 12 below the primary key, so it lands 12 below red
        let [r, g, b, _] = painted.get_pixel(BAND_WIDTH - 1, 0).0;
        let shaded = PaletteColor::from_rgb([r, g, b]);
        assert!((shaded.h - 348.0).abs() < 1.0);
    }
}
