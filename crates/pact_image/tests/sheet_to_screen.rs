//! A spritesheet on disk, recolored, animated, and painted through a viewport

use std::time::Duration;

use image::{Rgba, RgbaImage};
use pact_image::{fully_slice_file, AnimatedSprite, BreakCoefficient, Palette};
use pact_interface::{shared, Layer, Point, Surface, Viewport};

const FRAME: u32 = 4;
const FRAME_COLORS: [[u8; 3]; 3] = [[0, 0, 255], [0, 0, 128], [0, 255, 0]];

/// Three 4x4 frames in a row with one transparent column between them
fn write_sheet(path: &std::path::Path) {
    let width = FRAME * 3 + 2;
    let sheet = RgbaImage::from_fn(width, FRAME, |x, _| {
        let slot = x / (FRAME + 1);
        if x % (FRAME + 1) == FRAME {
            Rgba([0, 0, 0, 0])
        } else {
            let [r, g, b] = FRAME_COLORS[slot as usize];
            Rgba([r, g, b, 255])
        }
    });
    sheet.save(path).unwrap();
}

fn pixel_at(viewport: &Viewport, x: u32, y: u32) -> Rgba<u8> {
    let mut canvas = Surface::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
    viewport.blit(&mut canvas);
    *canvas.get_pixel(x, y)
}

#[test]
fn test_sheet_to_screen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.png");
    write_sheet(&path);

    let grid = fully_slice_file(&path, BreakCoefficient::Transparent).unwrap();
    assert_eq!(grid.len(), 1);
    assert_eq!(grid[0].len(), 3);

    let palette = Palette::new([(240, 0)], 0).unwrap();
    let frames: Vec<Surface> = grid[0].iter().map(|frame| palette.paint_image(frame)).collect();

    let sprite = shared(
        AnimatedSprite::with_frame_data(frames, vec![1])
            .unwrap()
            .at(Point::new(2.0, 2.0)),
    );

    let mut viewport = Viewport::new();
    let id = viewport.add_layer(0, Layer::new()).unwrap();
    viewport.layer_mut(id).unwrap().add_renderable(sprite.clone());

    assert_eq!(pixel_at(&viewport, 3, 3), Rgba([255, 0, 0, 255]));
    assert_eq!(pixel_at(&viewport, 0, 0), Rgba([0, 0, 0, 255]));

    sprite.lock().start_animation();
    assert_eq!(pixel_at(&viewport, 3, 3), Rgba([128, 0, 0, 255]));

    // Green is not in the palette
    sprite.lock().advance(Duration::from_secs(1));
    assert_eq!(pixel_at(&viewport, 3, 3), Rgba([0, 255, 0, 255]));
}
