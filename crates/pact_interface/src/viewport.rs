//! Viewport
//!
//! The camera over a stack of prioritized layers. Rendering paints layers from
//! the highest priority value down, so priority 0 ends up on top.
//!
//! Pointer events reach the layers only while the viewport is active. By
//! default layers see them in the order they were added, which need not match
//! the paint order; [`DispersalOrder::Priority`] routes events to the topmost
//! layer first instead.

use std::sync::Arc;

use indexmap::IndexMap;
use pact_core::{PointerEvent, PointerKind};
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::error::{InterfaceError, Result};
use crate::geometry::Point;
use crate::layer::Layer;
use crate::renderable::Surface;

new_key_type! {
    /// Handle to a layer owned by a viewport
    pub struct LayerId;
}

/// A viewport shared between the logic and render loops
pub type SharedViewport = Arc<Mutex<Viewport>>;

/// Order in which layers receive pointer events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispersalOrder {
    /// The order layers were added
    #[default]
    Insertion,
    /// Topmost (lowest priority value) first
    Priority,
}

/// Which layer to remove
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerSelector {
    Priority(i32),
    Layer(LayerId),
}

pub struct Viewport {
    position: Point,
    active: bool,
    dispersal_order: DispersalOrder,
    layers: SlotMap<LayerId, Layer>,
    /// Insertion order
    priorities: IndexMap<i32, LayerId, FxBuildHasher>,
    /// Descending priority
    draw_order: Vec<(i32, LayerId)>,
}

impl Viewport {
    /// An inactive viewport at the origin with no layers
    pub fn new() -> Self {
        Self {
            position: Point::ZERO,
            active: false,
            dispersal_order: DispersalOrder::default(),
            layers: SlotMap::with_key(),
            priorities: IndexMap::default(),
            draw_order: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedViewport {
        Arc::new(Mutex::new(self))
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Move the camera
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.position.shift(dx, dy);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn dispersal_order(&self) -> DispersalOrder {
        self.dispersal_order
    }

    pub fn set_dispersal_order(&mut self, order: DispersalOrder) {
        self.dispersal_order = order;
    }

    /// Add `layer` at `priority`. Each priority holds at most one layer.
    pub fn add_layer(&mut self, priority: i32, layer: Layer) -> Result<LayerId> {
        if self.priorities.contains_key(&priority) {
            return Err(InterfaceError::PriorityTaken(priority));
        }

        let id = self.layers.insert(layer);
        self.priorities.insert(priority, id);
        self.refresh_draw_order();
        debug!(priority, layers = self.layers.len(), "Layer added");
        Ok(id)
    }

    /// Remove a layer by priority or by handle.
    ///
    /// Returns the removed layer, or `None` if nothing matched.
    pub fn remove_layer(&mut self, selector: LayerSelector) -> Option<Layer> {
        let priority = match selector {
            LayerSelector::Priority(priority) => priority,
            LayerSelector::Layer(id) => self.priority_of(id)?,
        };

        let Some(id) = self.priorities.shift_remove(&priority) else {
            debug!(?selector, "No layer to remove");
            return None;
        };
        self.refresh_draw_order();
        self.layers.remove(id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    pub fn layer_id(&self, priority: i32) -> Option<LayerId> {
        self.priorities.get(&priority).copied()
    }

    pub fn priority_of(&self, id: LayerId) -> Option<i32> {
        self.priorities
            .iter()
            .find_map(|(priority, layer)| (*layer == id).then_some(*priority))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Priorities in paint order (painted first to painted last)
    pub fn draw_order(&self) -> impl Iterator<Item = i32> + '_ {
        self.draw_order.iter().map(|(priority, _)| *priority)
    }

    /// Paint every layer onto `target`
    pub fn blit(&self, target: &mut Surface) {
        for (_, id) in &self.draw_order {
            if let Some(layer) = self.layers.get(*id) {
                layer.blit(self.position, target);
            }
        }
    }

    /// Forward a screen-space pointer event to the layers.
    ///
    /// Ignored while inactive. A click stops at the first layer that consumes
    /// it; motion reaches every layer. Returns whether any layer handled the
    /// event.
    pub fn mouse_event_dispersal(&self, event: &PointerEvent) -> bool {
        if !self.active {
            return false;
        }

        let mut handled = false;
        for id in self.dispersal_sequence() {
            let Some(layer) = self.layers.get(id) else {
                continue;
            };
            let local = layer.to_layer_space(event, self.position);
            if layer.mouse_event_dispersal(&local) {
                handled = true;
                if event.kind == PointerKind::Up {
                    break;
                }
            }
        }
        handled
    }

    fn dispersal_sequence(&self) -> Vec<LayerId> {
        match self.dispersal_order {
            DispersalOrder::Insertion => self.priorities.values().copied().collect(),
            DispersalOrder::Priority => self.draw_order.iter().rev().map(|(_, id)| *id).collect(),
        }
    }

    fn refresh_draw_order(&mut self) {
        self.draw_order = self
            .priorities
            .iter()
            .map(|(priority, id)| (*priority, *id))
            .collect();
        self.draw_order.sort_by(|a, b| b.0.cmp(&a.0));
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("position", &self.position)
            .field("active", &self.active)
            .field("dispersal_order", &self.dispersal_order)
            .field("draw_order", &self.draw_order().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::shared;
    use crate::renderable::test_support::{Block, Tally};
    use image::Rgba;

    #[test]
    fn test_viewport_add_remove_layers() {
        let mut viewport = Viewport::new();
        viewport.shift(5.0, 5.0);

        let id = viewport.add_layer(1, Layer::with_motion_scale((2.0, -2.0))).unwrap();
        assert_eq!(viewport.len(), 1);
        assert!(matches!(
            viewport.add_layer(1, Layer::new()),
            Err(InterfaceError::PriorityTaken(1))
        ));

        assert!(viewport.remove_layer(LayerSelector::Priority(1)).is_some());
        assert!(viewport.is_empty());

        // Already gone
        assert!(viewport.remove_layer(LayerSelector::Layer(id)).is_none());
        assert!(viewport.remove_layer(LayerSelector::Priority(1)).is_none());

        let id = viewport.add_layer(5, Layer::new()).unwrap();
        assert_eq!(viewport.priority_of(id), Some(5));
        let removed = viewport.remove_layer(LayerSelector::Layer(id));
        assert!(removed.is_some());
        assert!(viewport.is_empty());
    }

    #[test]
    fn test_draw_order_is_descending_priority() {
        let mut viewport = Viewport::new();
        for priority in [10, 0, 20, 5] {
            viewport.add_layer(priority, Layer::new()).unwrap();
        }
        assert_eq!(viewport.draw_order().collect::<Vec<_>>(), vec![20, 10, 5, 0]);

        viewport.remove_layer(LayerSelector::Priority(10));
        assert_eq!(viewport.draw_order().collect::<Vec<_>>(), vec![20, 5, 0]);
    }

    #[test]
    fn test_lower_priority_paints_on_top() {
        let mut viewport = Viewport::new();
        let mut red = Block::new(4, Point::ZERO);
        red.surface = Surface::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let red = shared(red);
        let white = shared(Block::new(4, Point::ZERO));

        let front = viewport.add_layer(0, Layer::new()).unwrap();
        let back = viewport.add_layer(10, Layer::new()).unwrap();
        viewport.layer_mut(front).unwrap().add_renderable(red.clone());
        viewport.layer_mut(back).unwrap().add_renderable(white.clone());

        let mut target = Surface::new(4, 4);
        viewport.blit(&mut target);
        assert_eq!(*target.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_blit_uses_layer_motion_scale() {
        let mut viewport = Viewport::new();
        let block = shared(Block::new(2, Point::new(4.0, 0.0)));
        let id = viewport.add_layer(0, Layer::with_motion_scale((0.5, 0.0))).unwrap();
        viewport.layer_mut(id).unwrap().add_renderable(block.clone());

        viewport.shift(4.0, 100.0);
        let mut target = Surface::new(8, 8);
        viewport.blit(&mut target);

        assert_eq!(target.get_pixel(2, 0)[3], 255);
        assert_eq!(target.get_pixel(4, 0)[3], 0);
    }

    #[test]
    fn test_inactive_viewport_ignores_pointer() {
        let mut viewport = Viewport::new();
        let tally = shared(Tally::new(10, Point::ZERO));
        let id = viewport.add_layer(0, Layer::new()).unwrap();
        viewport.layer_mut(id).unwrap().add_renderable(tally.clone());

        assert!(!viewport.mouse_event_dispersal(&PointerEvent::up(1.0, 1.0)));
        assert_eq!(tally.lock().clicks, 0);

        viewport.set_active(true);
        assert!(viewport.mouse_event_dispersal(&PointerEvent::up(1.0, 1.0)));
        assert_eq!(tally.lock().clicks, 1);
    }

    fn stacked() -> (Viewport, Arc<Mutex<Tally>>, Arc<Mutex<Tally>>) {
        let mut viewport = Viewport::new();
        viewport.set_active(true);
        let back = shared(Tally::new(10, Point::ZERO));
        let front = shared(Tally::new(10, Point::ZERO));

        // Back layer added first
        let back_layer = viewport.add_layer(10, Layer::new()).unwrap();
        let front_layer = viewport.add_layer(0, Layer::new()).unwrap();
        viewport.layer_mut(back_layer).unwrap().add_renderable(back.clone());
        viewport.layer_mut(front_layer).unwrap().add_renderable(front.clone());

        (viewport, back, front)
    }

    #[test]
    fn test_click_dispersal_insertion_order() {
        let (viewport, back, front) = stacked();

        assert!(viewport.mouse_event_dispersal(&PointerEvent::up(5.0, 5.0)));
        assert_eq!(back.lock().clicks, 1);
        assert_eq!(front.lock().clicks, 0);
    }

    #[test]
    fn test_click_dispersal_priority_order() {
        let (mut viewport, back, front) = stacked();
        viewport.set_dispersal_order(DispersalOrder::Priority);

        assert!(viewport.mouse_event_dispersal(&PointerEvent::up(5.0, 5.0)));
        assert_eq!(front.lock().clicks, 1);
        assert_eq!(back.lock().clicks, 0);
    }

    #[test]
    fn test_motion_reaches_every_layer() {
        let (viewport, back, front) = stacked();

        assert!(viewport.mouse_event_dispersal(&PointerEvent::motion(5.0, 5.0)));
        assert_eq!(back.lock().enters, 1);
        assert_eq!(front.lock().enters, 1);
    }

    #[test]
    fn test_dispersal_uses_layer_space() {
        let mut viewport = Viewport::new();
        viewport.set_active(true);
        let tally = shared(Tally::new(10, Point::new(100.0, 0.0)));
        let id = viewport.add_layer(0, Layer::new()).unwrap();
        viewport.layer_mut(id).unwrap().add_renderable(tally.clone());

        assert!(!viewport.mouse_event_dispersal(&PointerEvent::up(5.0, 5.0)));

        viewport.shift(100.0, 0.0);
        assert!(viewport.mouse_event_dispersal(&PointerEvent::up(5.0, 5.0)));
        assert_eq!(tally.lock().clicks, 1);
    }
}
