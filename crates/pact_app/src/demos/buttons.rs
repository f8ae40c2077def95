//! Button demo
//!
//! A three-state button sliced from a spritesheet. Hovering lights it up, a
//! click presses it, and a trigger five seconds later restores the state it
//! had before the click.

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Result};
use image::Rgba;
use pact_core::{Delay, Event, PactContext, PointerEvent};
use pact_image::{slice_columns, BreakCoefficient};
use pact_interface::{
    shared, Anchor, ClickAware, HoverAware, HoverState, Layer, Point, Renderable, Surface,
    Viewport,
};
use parking_lot::Mutex;
use tracing::{info, warn};

use super::{save, Headless};
use crate::config::AppConfig;

const BUTTON_WIDTH: u32 = 24;
const BUTTON_HEIGHT: u32 = 12;
const STATE_COLORS: [[u8; 3]; 3] = [[40, 40, 160], [60, 160, 220], [220, 60, 60]];
const RESTORE_DELAY_SECS: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ButtonState {
    Idle = 0,
    Hover = 1,
    Pressed = 2,
}

/// Idle, hover and pressed states side by side, one transparent column apart
fn button_sheet() -> Surface {
    let stride = BUTTON_WIDTH + 1;
    Surface::from_fn(stride * 3 - 1, BUTTON_HEIGHT, |x, y| {
        if x % stride == BUTTON_WIDTH {
            return Rgba([0, 0, 0, 0]);
        }
        let [r, g, b] = STATE_COLORS[(x / stride) as usize];
        // Darker rim
        let column = x % stride;
        let rim = y == 0 || y == BUTTON_HEIGHT - 1 || column == 0 || column == BUTTON_WIDTH - 1;
        if rim {
            Rgba([r / 2, g / 2, b / 2, 255])
        } else {
            Rgba([r, g, b, 255])
        }
    })
}

struct Button {
    states: Vec<Surface>,
    state: Arc<Mutex<ButtonState>>,
    position: Point,
    hover: HoverState,
    context: PactContext,
}

impl Button {
    fn new(states: Vec<Surface>, position: Point, context: PactContext) -> Self {
        Self {
            states,
            state: Arc::new(Mutex::new(ButtonState::Idle)),
            position,
            hover: HoverState::default(),
            context,
        }
    }
}

impl Renderable for Button {
    fn surface(&self) -> &Surface {
        &self.states[*self.state.lock() as usize]
    }

    fn position(&self) -> Point {
        self.position
    }

    fn anchor(&self) -> Anchor {
        Anchor::Center
    }

    fn as_click_aware(&mut self) -> Option<&mut dyn ClickAware> {
        Some(self)
    }

    fn as_hover_aware(&mut self) -> Option<&mut dyn HoverAware> {
        Some(self)
    }
}

impl ClickAware for Button {
    fn on_click(&mut self, _event: &PointerEvent) {
        let restore = *self.state.lock();
        let state = Arc::clone(&self.state);
        let scheduled = self.context.chrono.add_trigger_with(
            Delay::seconds(RESTORE_DELAY_SECS),
            restore,
            move |restore| {
                *state.lock() = restore;
                info!(state = ?restore, "Button restored");
                Ok(())
            },
        );
        if let Err(err) = scheduled {
            warn!(error = %err, "Could not schedule button restore");
        }

        *self.state.lock() = ButtonState::Pressed;
        info!("Button pressed");
    }
}

impl HoverAware for Button {
    fn hover_state(&self) -> &HoverState {
        &self.hover
    }

    fn hover_state_mut(&mut self) -> &mut HoverState {
        &mut self.hover
    }

    fn on_hover_changed(&mut self, hovered: bool, _event: &PointerEvent) {
        *self.state.lock() = if hovered {
            ButtonState::Hover
        } else {
            ButtonState::Idle
        };
    }
}

pub fn run(config: &AppConfig, output: &Path, ticks: u32) -> Result<()> {
    let states = slice_columns(&button_sheet(), BreakCoefficient::Transparent);
    ensure!(states.len() == 3, "Expected 3 button states, sliced {}", states.len());

    let mut headless = Headless::new(config)?;
    let center = Point::new(
        config.window.width as f32 / 2.0,
        config.window.height as f32 / 2.0,
    );
    let button = shared(Button::new(states, center, headless.context().clone()));

    let mut viewport = Viewport::new();
    let layer = viewport.add_layer(0, Layer::new())?;
    if let Some(layer) = viewport.layer_mut(layer) {
        layer.add_renderable(button.clone());
    }
    viewport.set_active(true);
    headless.window().set_viewport(viewport.into_shared());

    headless.save_frame(output, "idle.png")?;

    headless.push([Event::Pointer(PointerEvent::motion(center.x, center.y))]);
    headless.step()?;
    headless.save_frame(output, "hover.png")?;

    headless.push([
        Event::Pointer(PointerEvent::down(center.x, center.y)),
        Event::Pointer(PointerEvent::up(center.x, center.y)),
    ]);
    headless.step()?;
    headless.save_frame(output, "pressed.png")?;

    // Long enough for the restore trigger
    let restore_ticks = RESTORE_DELAY_SECS as u32 * config.clocks.logic + 1;
    headless.run(ticks.max(restore_ticks))?;
    headless.save_frame(output, "restored.png")?;

    let state = *button.lock().state.lock();
    info!(?state, ticks = headless.ticks(), "Button demo finished");
    Ok(())
}
