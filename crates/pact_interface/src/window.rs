//! Window session
//!
//! Runs the two loops of a session: the logic loop polls input, broadcasts it
//! on the event bus and advances the trigger scheduler; the render loop
//! clears the canvas, paints the viewport and presents the frame. Each loop
//! is paced by its own [`TickClock`].
//!
//! Both loops can also be stepped by hand with [`Window::run_logic_tick`] and
//! [`Window::render_frame`], which is how headless runs drive a session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use image::Rgba;
use pact_core::{Event, EventId, KeySnapshot, PactContext, Subscriber};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{InterfaceError, Result};
use crate::input::{InputSource, Presenter};
use crate::renderable::Surface;
use crate::router::ViewportRouter;
use crate::viewport::SharedViewport;

/// Canvas cleared before every frame
const CLEAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Window session configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Logic loop rate in Hz
    pub logic_hz: u32,
    /// Render loop rate in Hz
    pub render_hz: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vengeance Pact".to_string(),
            width: 1000,
            height: 1000,
            logic_hz: 100,
            render_hz: 60,
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rates(mut self, logic_hz: u32, render_hz: u32) -> Self {
        self.logic_hz = logic_hz;
        self.render_hz = render_hz;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(InterfaceError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.logic_hz == 0 {
            return Err(InterfaceError::InvalidTickRate {
                name: "logic",
                hz: self.logic_hz,
            });
        }
        if self.render_hz == 0 {
            return Err(InterfaceError::InvalidTickRate {
                name: "render",
                hz: self.render_hz,
            });
        }
        Ok(())
    }
}

/// Fixed-rate loop pacing
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    next: Instant,
}

impl TickClock {
    /// `hz` must be non-zero
    pub fn new(hz: u32) -> Self {
        let period = Duration::from_secs(1) / hz.max(1);
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the next tick is due. A loop that overran its budget is not
    /// made to catch up.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.next = now + self.period;
        }
    }
}

/// State shared by the session's threads
struct Session {
    context: PactContext,
    exit_signal: AtomicBool,
    canvas: Mutex<Surface>,
    input: Mutex<Box<dyn InputSource>>,
    presenter: Mutex<Box<dyn Presenter>>,
    keys: Mutex<KeySnapshot>,
    router: Mutex<Option<Arc<ViewportRouter>>>,
}

impl Session {
    fn run_logic_tick(&self) -> Result<()> {
        let events = self.input.lock().poll_events();

        for event in &events {
            match event {
                Event::Quit => {
                    info!("Quit requested");
                    self.exit_signal.store(true, Ordering::SeqCst);
                }
                Event::Key(key) => self.keys.lock().apply(key),
                _ => {}
            }
            self.context.events.emit_native(event)?;
        }

        let held = Event::KeysPressed(self.keys.lock().clone());
        self.context.events.emit(&EventId::KEYS_PRESSED, &held)?;

        self.context.chrono.update();
        Ok(())
    }

    fn render_frame(&self) {
        let viewport = self
            .router
            .lock()
            .as_ref()
            .map(|router| router.viewport().clone());

        let mut canvas = self.canvas.lock();
        for pixel in canvas.pixels_mut() {
            *pixel = CLEAR_COLOR;
        }
        if let Some(viewport) = viewport {
            viewport.lock().blit(&mut canvas);
        }
        self.presenter.lock().present(&canvas);
    }

    fn exit_requested(&self) -> bool {
        self.exit_signal.load(Ordering::SeqCst)
    }

    fn run_logic(&self, hz: u32) {
        let mut clock = TickClock::new(hz);
        while !self.exit_requested() {
            if let Err(err) = self.run_logic_tick() {
                error!(error = %err, "Logic tick failed");
            }
            clock.tick();
        }
        debug!("Logic loop stopped");
    }

    fn run_rendering(&self, hz: u32) {
        let mut clock = TickClock::new(hz);
        while !self.exit_requested() {
            self.render_frame();
            clock.tick();
        }
        debug!("Render loop stopped");
    }
}

/// A window session over a canvas, an input source and a presenter
pub struct Window {
    config: WindowConfig,
    session: Arc<Session>,
    threads: Vec<JoinHandle<()>>,
}

impl Window {
    pub fn new(
        config: WindowConfig,
        context: PactContext,
        input: impl InputSource + 'static,
        presenter: impl Presenter + 'static,
    ) -> Result<Self> {
        config.validate()?;
        debug!(
            title = %config.title,
            width = config.width,
            height = config.height,
            "Creating window canvas"
        );

        let session = Session {
            context,
            exit_signal: AtomicBool::new(false),
            canvas: Mutex::new(Surface::from_pixel(config.width, config.height, CLEAR_COLOR)),
            input: Mutex::new(Box::new(input)),
            presenter: Mutex::new(Box::new(presenter)),
            keys: Mutex::new(KeySnapshot::new()),
            router: Mutex::new(None),
        };

        Ok(Self {
            config,
            session: Arc::new(session),
            threads: Vec::new(),
        })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn context(&self) -> &PactContext {
        &self.session.context
    }

    /// Show `viewport` and route pointer events to it, replacing any previous
    /// viewport.
    pub fn set_viewport(&self, viewport: SharedViewport) {
        let events = &self.session.context.events;
        let router = ViewportRouter::new(viewport);
        events.subscribe_all(&router);

        if let Some(previous) = self.session.router.lock().replace(router) {
            events.unsubscribe_all(previous.subscriber_id());
        }
    }

    pub fn viewport(&self) -> Option<SharedViewport> {
        self.session
            .router
            .lock()
            .as_ref()
            .map(|router| router.viewport().clone())
    }

    /// One pass of the logic loop.
    ///
    /// Every polled event is broadcast under its native id, then the held-keys
    /// snapshot under `KEYS_PRESSED`, then due triggers fire. A `Quit` event
    /// raises the exit signal. A failing handler aborts the rest of the pass.
    pub fn run_logic_tick(&self) -> Result<()> {
        self.session.run_logic_tick()
    }

    /// One pass of the render loop
    pub fn render_frame(&self) {
        self.session.render_frame();
    }

    /// A copy of the last rendered canvas
    pub fn snapshot(&self) -> Surface {
        self.session.canvas.lock().clone()
    }

    pub fn held_keys(&self) -> KeySnapshot {
        self.session.keys.lock().clone()
    }

    pub fn exit_requested(&self) -> bool {
        self.session.exit_requested()
    }

    pub fn request_exit(&self) {
        self.session.exit_signal.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        !self.threads.is_empty()
    }

    /// Spawn the logic and render threads
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(InterfaceError::AlreadyRunning);
        }
        self.session.exit_signal.store(false, Ordering::SeqCst);

        let logic = Arc::clone(&self.session);
        let logic_hz = self.config.logic_hz;
        let logic_thread = thread::Builder::new()
            .name("WindowLogicThread".to_string())
            .spawn(move || logic.run_logic(logic_hz))
            .map_err(|source| InterfaceError::Spawn {
                name: "logic",
                source,
            })?;
        self.threads.push(logic_thread);

        let render = Arc::clone(&self.session);
        let render_hz = self.config.render_hz;
        let render_thread = thread::Builder::new()
            .name("WindowRenderingThread".to_string())
            .spawn(move || render.run_rendering(render_hz));
        match render_thread {
            Ok(handle) => self.threads.push(handle),
            Err(source) => {
                self.close();
                return Err(InterfaceError::Spawn {
                    name: "render",
                    source,
                });
            }
        }

        info!(title = %self.config.title, "Window session started");
        Ok(())
    }

    /// Wait until a `Quit` event (or [`request_exit`](Self::request_exit))
    /// stops the loops, then join them
    pub fn wait(&mut self) {
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("window").to_string();
            if handle.join().is_err() {
                warn!(thread = %name, "Session thread panicked");
            }
        }
    }

    /// Signal both loops to stop and join them
    pub fn close(&mut self) {
        if self.is_running() {
            info!("Gracefully shutting down...");
        }
        self.request_exit();
        self.wait();
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("exit_requested", &self.exit_requested())
            .finish()
    }
}
