//! Headless dev demos
//!
//! Each demo drives a real window session with scripted input, a frame
//! recorder in place of a screen, and a manual clock that moves one logic
//! period per tick. Frames are written as PNGs to the output directory.

mod buttons;
mod palette;
mod spritesheet;
mod viewport;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use pact_core::{Event, ManualClock, PactContext};
use pact_interface::{FrameRecorder, ScriptedInput, Surface, Window};
use tracing::{debug, info};

use crate::cli::{DemoArgs, DemoName};
use crate::config::AppConfig;

/// Run the demo named in `args`
pub fn run(args: &DemoArgs, config: &AppConfig) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    info!(demo = ?args.name, output = %args.output.display(), ticks = args.ticks, "Running demo");
    match args.name {
        DemoName::Palette => palette::run(&args.output),
        DemoName::Buttons => buttons::run(config, &args.output, args.ticks),
        DemoName::Viewport => viewport::run(config, &args.output, args.ticks),
        DemoName::Spritesheet => spritesheet::run(&args.output),
    }
}

/// Write `image` to `dir/name`
fn save(image: &Surface, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    image
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "Frame written");
    Ok(())
}

/// A window session stepped by hand on simulated time
pub struct Headless {
    clock: Arc<ManualClock>,
    context: PactContext,
    input: ScriptedInput,
    recorder: FrameRecorder,
    window: Window,
    tick_period: Duration,
    logic_hz: u64,
    render_hz: u64,
    ticks: u64,
}

impl Headless {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let context = PactContext::with_clock(clock.clone());
        let input = ScriptedInput::new();
        let recorder = FrameRecorder::new();

        let window_config = config.window_config();
        let window = Window::new(
            window_config.clone(),
            context.clone(),
            input.clone(),
            recorder.clone(),
        )
        .context("Failed to create window session")?;

        Ok(Self {
            clock,
            context,
            input,
            recorder,
            window,
            tick_period: Duration::from_secs(1) / window_config.logic_hz,
            logic_hz: u64::from(window_config.logic_hz),
            render_hz: u64::from(window_config.render_hz),
            ticks: 0,
        })
    }

    pub fn context(&self) -> &PactContext {
        &self.context
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Queue events for the next tick
    pub fn push(&self, events: impl IntoIterator<Item = Event>) {
        self.input.push_batch(events);
    }

    /// Advance one logic period and run a logic tick, rendering whenever the
    /// render rate calls for a frame
    pub fn step(&mut self) -> Result<()> {
        let period = TimeDelta::from_std(self.tick_period).context("Tick period out of range")?;
        self.clock.advance(period);
        self.window.run_logic_tick().context("Logic tick failed")?;

        let frames_before = self.ticks * self.render_hz / self.logic_hz;
        self.ticks += 1;
        if self.ticks * self.render_hz / self.logic_hz > frames_before {
            self.window.render_frame();
        }
        Ok(())
    }

    /// Step up to `ticks` times, stopping early on `Quit`
    pub fn run(&mut self, ticks: u32) -> Result<()> {
        for _ in 0..ticks {
            if self.window.exit_requested() {
                debug!(tick = self.ticks, "Exit requested");
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Render now and write the frame
    pub fn save_frame(&self, dir: &Path, name: &str) -> Result<()> {
        self.window.render_frame();
        let frame = self
            .recorder
            .last_frame()
            .context("No frame was presented")?;
        save(&frame, dir, name)
    }

    pub fn frames_presented(&self) -> u64 {
        self.recorder.frames_presented()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowSection;

    pub(crate) fn small_config() -> AppConfig {
        AppConfig {
            window: WindowSection {
                title: "demo".to_string(),
                width: 64,
                height: 64,
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_headless_paces_rendering() {
        let mut headless = Headless::new(&small_config()).unwrap();
        assert_eq!(headless.tick_period(), Duration::from_millis(10));

        headless.run(100).unwrap();
        assert_eq!(headless.ticks(), 100);
        assert_eq!(headless.frames_presented(), 60);
    }

    #[test]
    fn test_headless_stops_on_quit() {
        let mut headless = Headless::new(&small_config()).unwrap();
        headless.push([Event::Quit]);
        headless.run(50).unwrap();
        assert_eq!(headless.ticks(), 1);
        assert!(headless.window().exit_requested());
    }

    #[test]
    fn test_run_every_demo() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            DemoName::Palette,
            DemoName::Buttons,
            DemoName::Viewport,
            DemoName::Spritesheet,
        ] {
            let args = DemoArgs {
                name,
                output: dir.path().join(format!("{name:?}")),
                ticks: 20,
            };
            run(&args, &small_config()).unwrap();
            assert!(fs::read_dir(&args.output).unwrap().next().is_some());
        }
    }
}
