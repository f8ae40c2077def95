//! Sprites

use std::time::Duration;

use pact_interface::{Anchor, Point, Renderable, Surface};
use tracing::trace;

use crate::error::{ImageError, Result};

/// A static image at a position
#[derive(Clone, Debug)]
pub struct Sprite {
    image: Surface,
    position: Point,
    anchor: Anchor,
}

impl Sprite {
    pub fn new(image: Surface) -> Self {
        Self {
            image,
            position: Point::ZERO,
            anchor: Anchor::TopLeft,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.position.shift(dx, dy);
    }

    pub fn set_image(&mut self, image: Surface) {
        self.image = image;
    }
}

impl Renderable for Sprite {
    fn surface(&self) -> &Surface {
        &self.image
    }

    fn position(&self) -> Point {
        self.position
    }

    fn anchor(&self) -> Anchor {
        self.anchor
    }
}

/// A sprite cycling through frames.
///
/// `frame_data` holds display rates in frames per second; frame `i` uses
/// `frame_data[i % frame_data.len()]`. Time only moves through
/// [`advance`](Self::advance), so the owner decides which loop drives it.
#[derive(Clone, Debug)]
pub struct AnimatedSprite {
    frames: Vec<Surface>,
    frame_data: Vec<u32>,
    current_frame: usize,
    elapsed: Duration,
    animating: bool,
    position: Point,
    anchor: Anchor,
}

impl AnimatedSprite {
    pub const DEFAULT_FRAME_RATE: u32 = 10;

    pub fn new(frames: Vec<Surface>) -> Result<Self> {
        Self::with_frame_data(frames, vec![Self::DEFAULT_FRAME_RATE])
    }

    pub fn with_frame_data(frames: Vec<Surface>, frame_data: Vec<u32>) -> Result<Self> {
        if frames.is_empty() {
            return Err(ImageError::EmptyAnimation);
        }
        if frame_data.is_empty() {
            return Err(ImageError::InvalidFrameData("no frame rates".to_string()));
        }
        if let Some(index) = frame_data.iter().position(|&rate| rate == 0) {
            return Err(ImageError::InvalidFrameData(format!(
                "frame rate {index} is zero"
            )));
        }

        Ok(Self {
            frames,
            frame_data,
            current_frame: 0,
            elapsed: Duration::ZERO,
            animating: false,
            position: Point::ZERO,
            anchor: Anchor::TopLeft,
        })
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.position.shift(dx, dy);
    }

    pub fn frame_data(&self) -> &[u32] {
        &self.frame_data
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Start cycling. The first step happens immediately.
    pub fn start_animation(&mut self) {
        if self.animating {
            return;
        }
        self.animating = true;
        self.elapsed = Duration::ZERO;
        self.step();
    }

    /// Stop and rewind to the first frame
    pub fn stop_animation(&mut self) {
        self.animating = false;
        self.elapsed = Duration::ZERO;
        self.current_frame = 0;
    }

    /// Let `elapsed` pass; returns how many frames were stepped
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if !self.animating {
            return 0;
        }

        self.elapsed += elapsed;
        let mut stepped = 0;
        loop {
            let hold = self.hold_time(self.current_frame);
            if self.elapsed < hold {
                break;
            }
            self.elapsed -= hold;
            self.step();
            stepped += 1;
        }
        stepped
    }

    /// How long `frame` stays on screen
    pub fn hold_time(&self, frame: usize) -> Duration {
        let rate = self.frame_data[frame % self.frame_data.len()];
        Duration::from_secs(1) / rate
    }

    fn step(&mut self) {
        self.current_frame = (self.current_frame + 1) % self.frames.len();
        trace!(frame = self.current_frame, "Animation step");
    }
}

impl Renderable for AnimatedSprite {
    fn surface(&self) -> &Surface {
        &self.frames[self.current_frame]
    }

    fn position(&self) -> Point {
        self.position
    }

    fn anchor(&self) -> Anchor {
        self.anchor
    }
}
