//! Endless fireworks: bursts of shrinking, drifting sparks layered with additive glow.
//!
//! [`Engine`] drives everything. A jittered spawn loop keeps a target number of
//! bursts in the sky and a render loop advances and draws them every frame,
//! both scheduled on a shared virtual clock the host advances.

pub mod buffer;
pub mod color;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod firework;
pub mod particle;
pub mod random;
pub mod schedule;
pub mod spawner;
pub mod surface;
pub mod terminal;

pub use buffer::PixelBuffer;
pub use color::Color;
pub use config::{AppConfig, EngineConfig, TerminalOptions};
pub use engine::Engine;
pub use error::{Error, Result};
pub use surface::Surface;
