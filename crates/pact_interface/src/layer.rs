//! Layers
//!
//! A layer is an ordered bucket of renderables sharing one motion scale. It
//! draws them in insertion order and routes pointer events to them.
//!
//! Layers hold weak references: dropping the last strong handle to a
//! renderable removes it from rendering and dispatch. [`Layer::prune`] drops
//! the dead entries themselves.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use image::imageops;
use indexmap::IndexMap;
use pact_core::{PointerEvent, PointerKind};
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::geometry::{MotionScale, Point};
use crate::renderable::{Capabilities, Renderable, SharedRenderable, Surface};

/// Allocation identity of a shared renderable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(usize);

impl RenderableId {
    pub fn of<R: ?Sized>(renderable: &Arc<Mutex<R>>) -> Self {
        Self(Arc::as_ptr(renderable).cast::<()>() as usize)
    }
}

struct Entry {
    renderable: Weak<Mutex<dyn Renderable>>,
    capabilities: Capabilities,
}

pub struct Layer {
    motion_scale: MotionScale,
    renderables: IndexMap<RenderableId, Entry, FxBuildHasher>,
}

impl Layer {
    pub fn new() -> Self {
        Self::with_motion_scale(MotionScale::IDENTITY)
    }

    pub fn with_motion_scale(motion_scale: impl Into<MotionScale>) -> Self {
        Self {
            motion_scale: motion_scale.into(),
            renderables: IndexMap::default(),
        }
    }

    pub fn motion_scale(&self) -> MotionScale {
        self.motion_scale
    }

    pub fn set_motion_scale(&mut self, motion_scale: impl Into<MotionScale>) {
        self.motion_scale = motion_scale.into();
    }

    /// Add a renderable at the end of the draw order.
    ///
    /// Re-adding a live renderable refreshes its capabilities and keeps its
    /// slot. An entry left behind by a dropped renderable whose allocation was
    /// reused is replaced, and the newcomer moves to the end.
    pub fn add_renderable(&mut self, renderable: SharedRenderable) -> RenderableId {
        let id = RenderableId::of(&renderable);
        let capabilities = Capabilities::of(&mut *renderable.lock());
        if self
            .renderables
            .get(&id)
            .is_some_and(|entry| entry.renderable.strong_count() == 0)
        {
            self.renderables.shift_remove(&id);
        }
        self.renderables.insert(
            id,
            Entry {
                renderable: Arc::downgrade(&renderable),
                capabilities,
            },
        );
        id
    }

    /// Returns false if the renderable was not on this layer
    pub fn remove_renderable(&mut self, id: RenderableId) -> bool {
        self.renderables.shift_remove(&id).is_some()
    }

    /// Whether a live renderable with this id is on the layer
    pub fn contains(&self, id: RenderableId) -> bool {
        self.renderables
            .get(&id)
            .is_some_and(|entry| entry.renderable.strong_count() > 0)
    }

    /// Number of entries, including ones whose renderable has been dropped
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Remove entries whose renderable has been dropped; returns how many
    pub fn prune(&mut self) -> usize {
        let before = self.renderables.len();
        self.renderables
            .retain(|_, entry| entry.renderable.strong_count() > 0);
        before - self.renderables.len()
    }

    /// Screen position of `renderable` for a camera at `viewport_position`
    pub fn render_position(&self, renderable: &dyn Renderable, viewport_position: Point) -> Point {
        renderable.anchored_position() - viewport_position.scaled(self.motion_scale)
    }

    /// Layer-space copy of a screen-space pointer event
    pub fn to_layer_space(&self, event: &PointerEvent, viewport_position: Point) -> PointerEvent {
        let camera = viewport_position.scaled(self.motion_scale);
        event.moved_to(event.x + camera.x, event.y + camera.y)
    }

    /// Draw every live renderable onto `target`, in insertion order, and
    /// return how many were drawn.
    ///
    /// A renderable is skipped when its draw origin lies beyond the right or
    /// bottom edge. Renderables hanging off the top or left are still drawn.
    pub fn blit(&self, viewport_position: Point, target: &mut Surface) -> usize {
        let (width, height) = target.dimensions();
        let mut drawn = 0;

        for renderable in self.live(Capabilities::empty()) {
            let renderable = renderable.lock();
            let origin = self.render_position(&*renderable, viewport_position);

            if origin.x > width as f32 || origin.y > height as f32 {
                continue;
            }

            imageops::overlay(
                target,
                renderable.surface(),
                origin.x.round() as i64,
                origin.y.round() as i64,
            );
            drawn += 1;
        }
        drawn
    }

    /// Deliver a click to the first click-aware renderable under the pointer.
    ///
    /// Returns whether the click was consumed.
    pub fn handle_click(&self, event: &PointerEvent) -> bool {
        let point = Point::new(event.x, event.y);

        for renderable in self.live(Capabilities::CLICK) {
            let mut renderable = renderable.lock();
            if !renderable.position_intersects(point) {
                continue;
            }
            if let Some(clickable) = renderable.as_click_aware() {
                clickable.on_click(event);
                trace!(x = event.x, y = event.y, "Click consumed");
                return true;
            }
        }
        false
    }

    /// Update hover state for a pointer move.
    ///
    /// At most one renderable starts hovering per call; every hovered
    /// renderable the pointer has left stops hovering. Returns whether a hover
    /// started.
    pub fn handle_mousemove(&self, event: &PointerEvent) -> bool {
        let point = Point::new(event.x, event.y);
        let now = Instant::now();
        let mut entered = false;

        for renderable in self.live(Capabilities::HOVER) {
            let mut renderable = renderable.lock();
            let intersects = renderable.position_intersects(point);
            let Some(hoverable) = renderable.as_hover_aware() else {
                continue;
            };

            match (hoverable.is_hovered(), intersects) {
                (false, true) if !entered => {
                    hoverable.hover_state_mut().enter(now);
                    hoverable.on_hover_changed(true, event);
                    entered = true;
                }
                (true, false) => {
                    hoverable.hover_state_mut().leave();
                    hoverable.on_hover_changed(false, event);
                }
                _ => {}
            }
        }
        entered
    }

    /// Route a layer-space pointer event by kind.
    ///
    /// Pointer-down is ignored; clicks fire on release.
    pub fn mouse_event_dispersal(&self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerKind::Up => self.handle_click(event),
            PointerKind::Motion => self.handle_mousemove(event),
            PointerKind::Down => false,
        }
    }

    /// Live renderables carrying every capability in `required`
    fn live(&self, required: Capabilities) -> impl Iterator<Item = SharedRenderable> + '_ {
        self.renderables
            .values()
            .filter(move |entry| entry.capabilities.contains(required))
            .filter_map(|entry| entry.renderable.upgrade())
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("motion_scale", &self.motion_scale)
            .field("renderables", &self.renderables.len())
            .finish()
    }
}
