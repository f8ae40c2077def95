//! Spritesheet slicing
//!
//! Sprites on a sheet are separated by break lines: full rows (or columns)
//! whose alpha is uniformly the break coefficient. Slicing cuts the sheet at
//! those lines; runs of consecutive break lines collapse into one gap, and a
//! region that is fully transparent is skipped.

use std::ops::Range;
use std::path::Path;

use image::{imageops, RgbaImage};
use tracing::{debug, info};

use crate::error::{ImageError, Result};

/// Alpha value that marks a break line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakCoefficient {
    #[default]
    Transparent,
    Solid,
}

impl BreakCoefficient {
    pub const fn alpha(self) -> u8 {
        match self {
            BreakCoefficient::Transparent => 0,
            BreakCoefficient::Solid => 255,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Rows,
    Columns,
}

/// Cut `sheet` into horizontal strips
pub fn slice_rows(sheet: &RgbaImage, coefficient: BreakCoefficient) -> Vec<RgbaImage> {
    slice_by(sheet, coefficient, Axis::Rows)
}

/// Cut `sheet` into vertical strips
pub fn slice_columns(sheet: &RgbaImage, coefficient: BreakCoefficient) -> Vec<RgbaImage> {
    slice_by(sheet, coefficient, Axis::Columns)
}

/// Cut `sheet` into rows, then each row into columns
pub fn fully_slice(sheet: &RgbaImage, coefficient: BreakCoefficient) -> Vec<Vec<RgbaImage>> {
    slice_rows(sheet, coefficient)
        .iter()
        .map(|row| slice_columns(row, coefficient))
        .collect()
}

/// Load a sheet from disk and fully slice it
pub fn fully_slice_file(
    path: impl AsRef<Path>,
    coefficient: BreakCoefficient,
) -> Result<Vec<Vec<RgbaImage>>> {
    let path = path.as_ref();
    let sheet = image::open(path)
        .map_err(|source| ImageError::Load {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgba8();
    Ok(fully_slice(&sheet, coefficient))
}

fn slice_by(sheet: &RgbaImage, coefficient: BreakCoefficient, axis: Axis) -> Vec<RgbaImage> {
    let (width, height) = sheet.dimensions();
    let lines = match axis {
        Axis::Rows => height,
        Axis::Columns => width,
    };
    debug!(?axis, lines, "Spritesheet slice");

    let slices: Vec<RgbaImage> = regions(lines, |line| is_break_line(sheet, axis, line, coefficient))
        .into_iter()
        .filter_map(|region| {
            let (x, y, w, h) = match axis {
                Axis::Rows => (0, region.start, width, region.len() as u32),
                Axis::Columns => (region.start, 0, region.len() as u32, height),
            };
            let slice = imageops::crop_imm(sheet, x, y, w, h).to_image();
            if slice.pixels().all(|pixel| pixel[3] == 0) {
                debug!(?axis, ?region, "Region is empty, skipping");
                None
            } else {
                Some(slice)
            }
        })
        .collect();

    info!(?axis, count = slices.len(), "Spritesheet sliced");
    slices
}

/// Maximal runs of non-break lines
fn regions(lines: u32, is_break: impl Fn(u32) -> bool) -> Vec<Range<u32>> {
    let mut regions = Vec::new();
    let mut start = None;

    for line in 0..lines {
        match (is_break(line), start) {
            (true, Some(begin)) => {
                regions.push(begin..line);
                start = None;
            }
            (false, None) => start = Some(line),
            _ => {}
        }
    }
    if let Some(begin) = start {
        regions.push(begin..lines);
    }
    regions
}

fn is_break_line(sheet: &RgbaImage, axis: Axis, line: u32, coefficient: BreakCoefficient) -> bool {
    let alpha = coefficient.alpha();
    let (width, height) = sheet.dimensions();
    match axis {
        Axis::Rows => (0..width).all(|x| sheet.get_pixel(x, line)[3] == alpha),
        Axis::Columns => (0..height).all(|y| sheet.get_pixel(line, y)[3] == alpha),
    }
}
