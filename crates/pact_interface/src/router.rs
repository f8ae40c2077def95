//! Pointer routing from the event bus into a viewport

use std::sync::Arc;

use pact_core::{Event, EventId, HandlerMap, Handlers, NamedHandler, Subscriber, SubscriberId};

use crate::viewport::SharedViewport;

/// Forwards `POINTER_UP` and `POINTER_MOTION` to a viewport
pub struct ViewportRouter {
    id: SubscriberId,
    viewport: SharedViewport,
}

impl ViewportRouter {
    pub fn new(viewport: SharedViewport) -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::next(),
            viewport,
        })
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    fn forward(&self, event: &Event) {
        if let Some(pointer) = event.as_pointer() {
            self.viewport.lock().mouse_event_dispersal(pointer);
        }
    }
}

impl Subscriber for ViewportRouter {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn event_handlers(self: &Arc<Self>) -> HandlerMap {
        [EventId::POINTER_UP, EventId::POINTER_MOTION]
            .into_iter()
            .map(|id| {
                let router = Arc::downgrade(self);
                let handler = NamedHandler::new("mouse_event_dispersal", move |event| {
                    if let Some(router) = router.upgrade() {
                        router.forward(event);
                    }
                    Ok(())
                });
                (id, Handlers::from(handler))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::layer::Layer;
    use crate::renderable::shared;
    use crate::renderable::test_support::Tally;
    use crate::viewport::Viewport;
    use pact_core::{EventBus, PointerEvent};

    #[test]
    fn test_router_forwards_pointer_events() {
        let bus = EventBus::new();
        let tally = shared(Tally::new(10, Point::ZERO));

        let mut viewport = Viewport::new();
        viewport.set_active(true);
        let id = viewport.add_layer(0, Layer::new()).unwrap();
        viewport.layer_mut(id).unwrap().add_renderable(tally.clone());

        let router = ViewportRouter::new(viewport.into_shared());
        bus.subscribe_all(&router);

        bus.emit_native(&Event::Pointer(PointerEvent::motion(2.0, 2.0)))
            .unwrap();
        bus.emit_native(&Event::Pointer(PointerEvent::down(2.0, 2.0)))
            .unwrap();
        bus.emit_native(&Event::Pointer(PointerEvent::up(2.0, 2.0)))
            .unwrap();

        let tally = tally.lock();
        assert_eq!(tally.enters, 1);
        assert_eq!(tally.clicks, 1);
    }
}
