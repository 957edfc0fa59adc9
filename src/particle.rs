//! A single spark: ballistic motion with drag, gravity and jitter, shrinking until it burns out.

use crate::color::{Color, SHADOW_ALPHA};
use crate::random::Random;
use crate::surface::{BlendMode, RadialGradient, Rect, Surface};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Particles smaller than this are burnt out.
pub const MIN_SIZE: f32 = 1.0;

/// Per-particle tuning shared by every spark in a burst.
///
/// `power` and `shrink` must lie in `(0, 1)`. With `shrink >= 1` particles never
/// burn out and their bursts never complete; this is not checked per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleOptions {
    /// Base side length; each particle gets `size ± size/2`.
    pub size: f32,
    /// Upper bound of the initial velocity magnitude.
    pub speed: f32,
    /// Added to the vertical velocity every tick.
    pub gravity: f32,
    /// Velocity multiplier per tick (drag).
    pub power: f32,
    /// Size multiplier per tick.
    pub shrink: f32,
    /// Amplitude of the per-tick positional noise.
    pub jitter: f32,
    /// Burst color used when the palette is empty.
    pub color: Color,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            size: 15.0,
            speed: 15.0,
            gravity: 0.08,
            power: 0.93,
            shrink: 0.97,
            jitter: 1.0,
            color: Color::hsla(210.0, 1.0, 0.5, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    color: Color,
    shadow: Color,
    gravity: f32,
    power: f32,
    shrink: f32,
    jitter: f32,
}

impl Particle {
    pub fn new(
        origin: (f32, f32),
        color: Color,
        size: f32,
        options: &ParticleOptions,
        random: &mut Random,
    ) -> Self {
        let angle = random.uniform(0.0, TAU);
        // cos of a uniform quarter turn: most sparks are slow, a few fly far
        let speed = random.uniform(0.0, FRAC_PI_2).cos() * options.speed;

        Self {
            x: origin.0,
            y: origin.1,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            size,
            color,
            shadow: color.with_alpha(SHADOW_ALPHA),
            gravity: options.gravity,
            power: options.power,
            shrink: options.shrink,
            jitter: options.jitter,
        }
    }

    pub fn update(&mut self, random: &mut Random) {
        self.vx *= self.power;
        self.vy *= self.power;
        self.vy += self.gravity;

        // One sample shared by both axes
        let jitter = random.uniform(-1.0, 1.0) * self.jitter;
        self.x += self.vx + jitter;
        self.y += self.vy + jitter;

        self.size *= self.shrink;
    }

    pub fn is_alive(&self) -> bool {
        self.size >= MIN_SIZE
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn shadow(&self) -> Color {
        self.shadow
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Square, not a disc: the gradient hides the corners and the fill is cheaper.
    pub fn render<S: Surface>(&self, surface: &mut S) {
        if !self.is_alive() {
            return;
        }

        let mut gradient = RadialGradient::new((self.x, self.y), 0.0, self.size / 2.0);
        gradient.add_stop(0.1, Color::rgba(1.0, 1.0, 1.0, 0.3));
        gradient.add_stop(0.6, self.color);
        gradient.add_stop(1.0, self.shadow);

        surface.fill_gradient(
            Rect::square(self.x, self.y, self.size),
            &gradient,
            BlendMode::Lighter,
        );
    }
}
