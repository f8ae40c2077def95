//! The default pipeline: a printer subscribed to `TEST_MESSAGE`

use std::sync::Arc;

use anyhow::{Context, Result};
use pact_core::{
    Event, EventId, HandlerMap, Handlers, NamedHandler, PactContext, Subscriber, SubscriberId,
};
use parking_lot::Mutex;
use tracing::info;

pub const GREETING: &str = "hellothere!";

/// Prints every text message it receives
pub struct Printer {
    id: SubscriberId,
    printed: Mutex<Vec<String>>,
}

impl Printer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::next(),
            printed: Mutex::new(Vec::new()),
        })
    }

    pub fn printed(&self) -> Vec<String> {
        self.printed.lock().clone()
    }

    fn print(&self, event: &Event) {
        if let Event::Message(text) = event {
            println!("{text}");
            self.printed.lock().push(text.clone());
        }
    }
}

impl Subscriber for Printer {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn event_handlers(self: &Arc<Self>) -> HandlerMap {
        let printer = Arc::downgrade(self);
        let handler = NamedHandler::new("print_message", move |event| {
            if let Some(printer) = printer.upgrade() {
                printer.print(event);
            }
            Ok(())
        });
        vec![(EventId::TEST_MESSAGE, Handlers::from(handler))]
    }
}

/// Subscribe a printer and send it the greeting
pub fn run(context: &PactContext) -> Result<Arc<Printer>> {
    let printer = Printer::new();
    context.events.subscribe_all(&printer);

    info!("Sending test message");
    context
        .events
        .emit(
            &EventId::TEST_MESSAGE,
            &Event::Message(GREETING.to_string()),
        )
        .context("Test message was not delivered")?;

    info!(delivered = printer.printed().len(), "Test message handled");
    Ok(printer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_pipeline() {
        let context = PactContext::new();
        let printer = run(&context).unwrap();

        assert_eq!(printer.printed(), vec![GREETING.to_string()]);
        assert!(context.events.is_subscribed(
            &EventId::TEST_MESSAGE,
            printer.subscriber_id(),
            "print_message"
        ));
    }

    #[test]
    fn test_printer_ignores_other_payloads() {
        let context = PactContext::new();
        let printer = run(&context).unwrap();

        context
            .events
            .emit(&EventId::TEST_MESSAGE, &Event::Quit)
            .unwrap();
        assert_eq!(printer.printed().len(), 1);
    }
}
