//! Pact Image
//!
//! Pixel work on sprite artwork:
//!
//! - **Palette swaps**: hue remapping with a tolerance band, alpha untouched
//! - **Spritesheets**: cutting a sheet into frames at break lines
//! - **Sprites**: static and animated renderables for the viewport

pub mod color;
pub mod error;
pub mod palette;
pub mod sprite;
pub mod spritesheet;

pub use color::{hsv_to_rgb, rgb_to_hsv, PaletteColor};
pub use error::{ImageError, Result};
pub use palette::{KeyHue, Palette};
pub use sprite::{AnimatedSprite, Sprite};
pub use spritesheet::{fully_slice, fully_slice_file, slice_columns, slice_rows, BreakCoefficient};
