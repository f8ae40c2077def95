//! Renderables and their pointer capabilities
//!
//! A [`Renderable`] is anything with a pixel surface and a position. Pointer
//! interaction is opt-in: a renderable that wants clicks implements
//! [`ClickAware`] and returns itself from [`Renderable::as_click_aware`];
//! hover works the same way through [`HoverAware`].
//!
//! ```rust
//! use pact_core::PointerEvent;
//! use pact_interface::{ClickAware, Point, Renderable, Surface};
//!
//! struct Button {
//!     surface: Surface,
//!     position: Point,
//!     clicks: u32,
//! }
//!
//! impl Renderable for Button {
//!     fn surface(&self) -> &Surface {
//!         &self.surface
//!     }
//!
//!     fn position(&self) -> Point {
//!         self.position
//!     }
//!
//!     fn as_click_aware(&mut self) -> Option<&mut dyn ClickAware> {
//!         Some(self)
//!     }
//! }
//!
//! impl ClickAware for Button {
//!     fn on_click(&mut self, _event: &PointerEvent) {
//!         self.clicks += 1;
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use bitflags::bitflags;
use image::RgbaImage;
use pact_core::PointerEvent;
use parking_lot::Mutex;

use crate::anchor::Anchor;
use crate::geometry::{Point, Rect, Size};

/// Pixel surface of a renderable, and the render target
pub type Surface = RgbaImage;

/// A renderable shared between its owner and the layers it is drawn on
pub type SharedRenderable = Arc<Mutex<dyn Renderable>>;

/// Wrap a renderable for registration with a layer
pub fn shared<R: Renderable + 'static>(renderable: R) -> Arc<Mutex<R>> {
    Arc::new(Mutex::new(renderable))
}

/// Something that can be drawn to a surface
pub trait Renderable: Send {
    fn surface(&self) -> &Surface;

    fn position(&self) -> Point;

    fn anchor(&self) -> Anchor {
        Anchor::TopLeft
    }

    fn size(&self) -> Size {
        let (width, height) = self.surface().dimensions();
        Size::of_pixels(width, height)
    }

    /// Top-left corner after applying the anchor
    fn anchored_position(&self) -> Point {
        self.anchor().top_left(self.position(), self.size())
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.anchored_position(), self.size())
    }

    /// Whether `point` falls on the surface, edges included
    fn position_intersects(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    fn as_click_aware(&mut self) -> Option<&mut dyn ClickAware> {
        None
    }

    fn as_hover_aware(&mut self) -> Option<&mut dyn HoverAware> {
        None
    }
}

/// Receives pointer-up events that land on the renderable
pub trait ClickAware {
    fn on_click(&mut self, event: &PointerEvent);
}

/// Tracks whether the pointer is over the renderable
pub trait HoverAware {
    fn hover_state(&self) -> &HoverState;

    fn hover_state_mut(&mut self) -> &mut HoverState;

    /// Called once on enter (`hovered = true`) and once on leave
    fn on_hover_changed(&mut self, hovered: bool, event: &PointerEvent) {
        let _ = (hovered, event);
    }

    fn is_hovered(&self) -> bool {
        self.hover_state().is_hovered()
    }
}

/// Hover flag plus the instant the current hover began.
///
/// Only the dispatch layer changes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    hovered: bool,
    since: Option<Instant>,
}

impl HoverState {
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// When the current hover began; `None` while not hovered
    pub fn time_hovered(&self) -> Option<Instant> {
        self.since
    }

    pub(crate) fn enter(&mut self, at: Instant) {
        self.hovered = true;
        self.since = Some(at);
    }

    pub(crate) fn leave(&mut self) {
        self.hovered = false;
        self.since = None;
    }
}

bitflags! {
    /// Pointer capabilities, captured when a renderable joins a layer
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const CLICK = 1 << 0;
        const HOVER = 1 << 1;
    }
}

impl Capabilities {
    pub fn of(renderable: &mut dyn Renderable) -> Self {
        let mut capabilities = Capabilities::empty();
        capabilities.set(Capabilities::CLICK, renderable.as_click_aware().is_some());
        capabilities.set(Capabilities::HOVER, renderable.as_hover_aware().is_some());
        capabilities
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Renderables shared by the dispatch tests

    use super::*;
    use image::Rgba;

    pub fn square(side: u32) -> Surface {
        RgbaImage::from_pixel(side, side, Rgba([255, 255, 255, 255]))
    }

    /// A plain renderable with no pointer capabilities
    pub struct Block {
        pub surface: Surface,
        pub position: Point,
        pub anchor: Anchor,
    }

    impl Block {
        pub fn new(side: u32, position: Point) -> Self {
            Self {
                surface: square(side),
                position,
                anchor: Anchor::TopLeft,
            }
        }
    }

    impl Renderable for Block {
        fn surface(&self) -> &Surface {
            &self.surface
        }

        fn position(&self) -> Point {
            self.position
        }

        fn anchor(&self) -> Anchor {
            self.anchor
        }
    }

    /// Counts every pointer callback it receives
    pub struct Tally {
        pub surface: Surface,
        pub position: Point,
        pub hover: HoverState,
        pub clicks: usize,
        pub enters: usize,
        pub leaves: usize,
    }

    impl Tally {
        pub fn new(side: u32, position: Point) -> Self {
            Self {
                surface: square(side),
                position,
                hover: HoverState::default(),
                clicks: 0,
                enters: 0,
                leaves: 0,
            }
        }
    }

    impl Renderable for Tally {
        fn surface(&self) -> &Surface {
            &self.surface
        }

        fn position(&self) -> Point {
            self.position
        }

        fn as_click_aware(&mut self) -> Option<&mut dyn ClickAware> {
            Some(self)
        }

        fn as_hover_aware(&mut self) -> Option<&mut dyn HoverAware> {
            Some(self)
        }
    }

    impl ClickAware for Tally {
        fn on_click(&mut self, _event: &PointerEvent) {
            self.clicks += 1;
        }
    }

    impl HoverAware for Tally {
        fn hover_state(&self) -> &HoverState {
            &self.hover
        }

        fn hover_state_mut(&mut self) -> &mut HoverState {
            &mut self.hover
        }

        fn on_hover_changed(&mut self, hovered: bool, _event: &PointerEvent) {
            if hovered {
                self.enters += 1;
            } else {
                self.leaves += 1;
            }
        }
    }
}
