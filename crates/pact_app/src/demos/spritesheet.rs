//! Spritesheet demo

use std::path::Path;

use anyhow::{ensure, Result};
use image::Rgba;
use pact_image::{fully_slice_file, BreakCoefficient, PaletteColor};
use pact_interface::Surface;
use tracing::info;

use super::save;

const ROWS: u32 = 3;
const COLUMNS: u32 = 4;
const CELL: u32 = 12;
const GAP: u32 = 2;

/// A `ROWS x COLUMNS` grid of cells, each a different hue, with transparent
/// gutters. The last cell of the last row is left empty.
fn generate_sheet() -> Surface {
    let stride = CELL + GAP;
    Surface::from_fn(COLUMNS * stride + GAP, ROWS * stride + GAP, |x, y| {
        let (cx, cy) = (x.saturating_sub(GAP) / stride, y.saturating_sub(GAP) / stride);
        let in_gutter = x < GAP || y < GAP || (x - GAP) % stride >= CELL || (y - GAP) % stride >= CELL;
        let empty = cx == COLUMNS - 1 && cy == ROWS - 1;
        if in_gutter || empty || cx >= COLUMNS || cy >= ROWS {
            return Rgba([0, 0, 0, 0]);
        }
        let hue = f64::from(cy * COLUMNS + cx) * 360.0 / f64::from(ROWS * COLUMNS);
        let [r, g, b] = PaletteColor::new(hue).to_rgb();
        Rgba([r, g, b, 255])
    })
}

pub fn run(output: &Path) -> Result<()> {
    let sheet_path = output.join("sheet.png");
    save(&generate_sheet(), output, "sheet.png")?;

    let grid = fully_slice_file(&sheet_path, BreakCoefficient::Transparent)?;
    let shape: Vec<usize> = grid.iter().map(Vec::len).collect();
    ensure!(!grid.is_empty(), "Sheet produced no rows");

    for (row, frames) in grid.iter().enumerate() {
        for (column, frame) in frames.iter().enumerate() {
            save(frame, output, &format!("frame_{row}_{column}.png"))?;
        }
    }

    info!(rows = grid.len(), ?shape, "Spritesheet demo finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_sheet_shape() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();

        let grid = fully_slice_file(dir.path().join("sheet.png"), BreakCoefficient::Transparent)
            .unwrap();
        assert_eq!(grid.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 3]);
        assert!(grid
            .iter()
            .flatten()
            .all(|frame| frame.dimensions() == (CELL, CELL)));
        assert!(dir.path().join("frame_2_2.png").exists());
        assert!(!dir.path().join("frame_2_3.png").exists());
    }
}
