//! Parallax viewport demo
//!
//! Three layers scroll at different rates under a camera steered by the
//! held keys (WASD or arrows). The front layer carries an animated sprite.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use image::Rgba;
use pact_core::{
    Event, EventId, HandlerMap, Handlers, KeyCode, KeyEvent, KeySnapshot, NamedHandler,
    Subscriber, SubscriberId,
};
use pact_image::{AnimatedSprite, Palette, PaletteColor, Sprite};
use pact_interface::{shared, Layer, MotionScale, Point, SharedViewport, Surface, Viewport};
use tracing::info;

use super::Headless;
use crate::config::AppConfig;

/// Camera speed in pixels per tick
const CAMERA_SPEED: f32 = 2.0;

/// (priority, motion scale, hue) from front to back
const LAYERS: [(i32, (f32, f32), u16); 3] = [
    (0, (1.0, 1.0), 0),
    (1, (1.5, 1.0), 120),
    (2, (0.25, 1.0), 240),
];

/// Direction the held keys point the camera in
fn heading(keys: &KeySnapshot) -> (f32, f32) {
    let axis = |negative: [KeyCode; 2], positive: [KeyCode; 2]| {
        let held = |pair: [KeyCode; 2]| pair.iter().any(|&key| keys.is_pressed(key));
        f32::from(u8::from(held(positive))) - f32::from(u8::from(held(negative)))
    };
    (
        axis([KeyCode::A, KeyCode::LEFT], [KeyCode::D, KeyCode::RIGHT]),
        axis([KeyCode::W, KeyCode::UP], [KeyCode::S, KeyCode::DOWN]),
    )
}

/// Moves the viewport on every `KEYS_PRESSED` broadcast
struct CameraController {
    id: SubscriberId,
    viewport: SharedViewport,
}

impl CameraController {
    fn new(viewport: SharedViewport) -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::next(),
            viewport,
        })
    }

    fn steer(&self, keys: &KeySnapshot) {
        let (dx, dy) = heading(keys);
        if dx != 0.0 || dy != 0.0 {
            self.viewport
                .lock()
                .shift(dx * CAMERA_SPEED, dy * CAMERA_SPEED);
        }
    }
}

impl Subscriber for CameraController {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn event_handlers(self: &Arc<Self>) -> HandlerMap {
        let controller = Arc::downgrade(self);
        let handler = NamedHandler::new("move_camera", move |event| {
            if let (Some(controller), Some(keys)) = (controller.upgrade(), event.as_keys()) {
                controller.steer(keys);
            }
            Ok(())
        });
        vec![(EventId::KEYS_PRESSED, Handlers::from(handler))]
    }
}

fn block(hue: u16, side: u32) -> Surface {
    let [r, g, b] = PaletteColor::new(f64::from(hue)).with_value(0.8).to_rgb();
    Surface::from_pixel(side, side, Rgba([r, g, b, 255]))
}

pub fn run(config: &AppConfig, output: &Path, ticks: u32) -> Result<()> {
    let mut headless = Headless::new(config)?;
    let (width, height) = (config.window.width as f32, config.window.height as f32);

    let mut viewport = Viewport::new();
    let mut sprites = Vec::new();
    for (priority, scale, hue) in LAYERS {
        let id = viewport.add_layer(priority, Layer::with_motion_scale(scale))?;
        let side = (config.window.height / 8).max(2);
        for column in 0..4 {
            let sprite = shared(Sprite::new(block(hue, side)).at(Point::new(
                width * column as f32 / 4.0,
                height * (priority + 1) as f32 / 4.0,
            )));
            if let Some(layer) = viewport.layer_mut(id) {
                layer.add_renderable(sprite.clone());
            }
            sprites.push(sprite);
        }
    }

    // Recolored copies of one frame, cycled on the front layer
    let base = block(240, (config.window.height / 6).max(2));
    let frames = [0, 60, 120, 180]
        .into_iter()
        .map(|target| Ok(Palette::new([(240, target)], 10)?.paint_image(&base)))
        .collect::<Result<Vec<_>>>()?;
    let spinner = shared(AnimatedSprite::new(frames)?.at(Point::new(width / 2.0, height / 2.0)));
    spinner.lock().start_animation();
    if let Some(front) = viewport.layer_id(0) {
        if let Some(layer) = viewport.layer_mut(front) {
            layer.add_renderable(spinner.clone());
        }
    }

    let viewport = viewport.into_shared();
    let camera = CameraController::new(viewport.clone());
    headless.context().events.subscribe_all(&camera);
    headless.window().set_viewport(viewport.clone());

    // Hold D for the first half, then S for the rest
    let half = ticks / 2;
    headless.push([Event::Key(KeyEvent::down(KeyCode::D))]);
    for tick in 0..ticks {
        if tick == half {
            headless.push([
                Event::Key(KeyEvent::up(KeyCode::D)),
                Event::Key(KeyEvent::down(KeyCode::S)),
            ]);
        }
        headless.step()?;
        spinner.lock().advance(headless.tick_period());
    }
    headless.push([Event::Quit]);
    headless.step()?;

    headless.save_frame(output, "viewport.png")?;
    info!(
        camera = ?viewport.lock().position(),
        motion_scales = ?LAYERS.map(|(_, scale, _)| MotionScale::from(scale)),
        frame = spinner.lock().current_frame(),
        frames_presented = headless.frames_presented(),
        "Viewport demo finished"
    );
    Ok(())
}
