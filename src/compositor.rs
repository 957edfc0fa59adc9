//! Per-frame physics and the two-buffer glow.
//!
//! The persistent buffer is never cleared while the show runs. Each frame it is
//! dimmed a little, which leaves fading trails behind moving sparks. Live sparks
//! are painted into a scratch buffer that is then added on top, so overlapping
//! bursts brighten each other like real light.

use crate::color::Color;
use crate::firework::Firework;
use crate::random::Random;
use crate::schedule::{RepeatingTask, Task, TaskHandle, Timeline, Timing};
use crate::surface::{BlendMode, Surface};

/// Opacity of the black veil laid over the display every frame.
pub const TRAIL_FADE: f32 = 0.05;

/// Frame period at 60 fps, in milliseconds.
const BASE_FRAME_MS: f64 = 16.67;

/// Display-synced when the requested rate reaches the refresh rate, a plain timer otherwise.
pub fn frame_timing(fps: f64, refresh_rate: f64) -> Timing {
    if fps >= refresh_rate {
        Timing::NextFrame
    } else {
        Timing::After(BASE_FRAME_MS * (60.0 / fps))
    }
}

pub struct Compositor<S: Surface> {
    front: S,
    back: S,
    timing: Timing,
    task: RepeatingTask,
    frames: u64,
}

impl<S: Surface> Compositor<S> {
    pub fn new(front: S, timing: Timing) -> Self {
        let back = front.create_compatible();
        Self {
            front,
            back,
            timing,
            task: RepeatingTask::new(Task::Render),
            frames: 0,
        }
    }

    /// The visible, persistent buffer.
    pub fn front(&self) -> &S {
        &self.front
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.task.is_armed()
    }

    pub fn start(&mut self, timeline: &mut Timeline) {
        if !self.task.is_armed() {
            self.task.arm(timeline, self.timing);
        }
    }

    pub fn claim(&mut self, handle: TaskHandle) -> bool {
        self.task.claim(handle)
    }

    pub fn tick(&mut self, bursts: &mut [Firework], timeline: &mut Timeline, random: &mut Random) {
        self.draw_frame(bursts, random);
        self.task.arm(timeline, self.timing);
    }

    /// Fade, clear scratch, advance and draw every burst, then add scratch onto the display.
    pub fn draw_frame(&mut self, bursts: &mut [Firework], random: &mut Random) {
        let bounds = self.front.bounds();
        self.front
            .fill_rect(bounds, Color::BLACK.with_alpha(TRAIL_FADE), BlendMode::SourceOver);

        self.back.clear_rect(bounds);
        for burst in bursts.iter_mut() {
            burst.render(&mut self.back, random);
        }

        self.front.composite(&self.back, BlendMode::Lighter);
        self.frames += 1;
    }

    pub fn cancel(&mut self, timeline: &mut Timeline) {
        self.task.cancel(timeline);
    }

    /// Wipes both buffers back to the background.
    pub fn clear(&mut self) {
        let bounds = self.front.bounds();
        self.front.clear_rect(bounds);
        self.back.clear_rect(bounds);
    }
}
