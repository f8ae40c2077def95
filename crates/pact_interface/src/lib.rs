//! Pact Interface
//!
//! Everything between the event bus and the screen:
//!
//! - **Geometry and anchors**: points, sizes, inclusive hit rectangles
//! - **Renderables**: pixel surfaces with opt-in click and hover capabilities
//! - **Layers and viewport**: parallax layers under a camera, painted by
//!   priority, with click/hover dispatch
//! - **Window session**: the logic and render loops over pluggable input and
//!   presentation

pub mod anchor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod renderable;
pub mod router;
pub mod viewport;
pub mod window;

pub use anchor::Anchor;
pub use error::{InterfaceError, Result};
pub use geometry::{MotionScale, Point, Rect, Size};
pub use input::{FrameRecorder, InputSource, Presenter, ScriptedInput};
pub use layer::{Layer, RenderableId};
pub use renderable::{
    shared, Capabilities, ClickAware, HoverAware, HoverState, Renderable, SharedRenderable,
    Surface,
};
pub use router::ViewportRouter;
pub use viewport::{DispersalOrder, LayerId, LayerSelector, SharedViewport, Viewport};
pub use window::{TickClock, Window, WindowConfig};
