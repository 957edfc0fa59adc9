//! The fireworks show: owns the bursts, both loops and the buffers.

use crate::color::Color;
use crate::compositor::{Compositor, frame_timing};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::firework::Firework;
use crate::random::Random;
use crate::schedule::{Task, Timeline};
use crate::spawner::{Launcher, SpawnScheduler};
use crate::surface::Surface;
use tracing::{debug, info};

/// A self-sustaining fireworks display over a drawing surface.
///
/// Nothing happens on its own: the host calls [`Engine::advance`] with the
/// current time and the engine runs whichever spawn and render ticks are due.
pub struct Engine<S: Surface> {
    config: EngineConfig,
    bursts: Vec<Firework>,
    launcher: Launcher,
    spawner: SpawnScheduler,
    compositor: Compositor<S>,
    timeline: Timeline,
    random: Random,
}

impl<S: Surface> Engine<S> {
    /// Fails when the surface has no drawable area.
    pub fn new(surface: S, config: EngineConfig) -> Result<Self> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Err(Error::UnusableSurface { width, height });
        }

        let launcher = Launcher::new(
            width,
            height,
            config.color_palette.clone(),
            config.min_particles..=config.max_particles,
            config.particle,
        );
        let timing = frame_timing(config.fps, config.refresh_rate);
        info!(width, height, ?timing, "fireworks engine ready");

        Ok(Self {
            bursts: Vec::with_capacity(config.target_burst_count),
            launcher,
            spawner: SpawnScheduler::new(config.spawn_interval_ms, config.target_burst_count),
            compositor: Compositor::new(surface, timing),
            timeline: Timeline::new(config.refresh_rate),
            random: Random::from_seed(config.seed),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bursts(&self) -> &[Firework] {
        &self.bursts
    }

    /// The persistent display buffer.
    pub fn surface(&self) -> &S {
        self.compositor.front()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn frames(&self) -> u64 {
        self.compositor.frames()
    }

    pub fn is_running(&self) -> bool {
        self.spawner.is_running() || self.compositor.is_running()
    }

    /// Starts both loops. Also resumes after [`Engine::pause`]; a second call while running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        info!(now_ms = self.timeline.now_ms(), "starting show");
        self.spawner.start(&mut self.timeline, &mut self.random);
        self.compositor.start(&mut self.timeline);
    }

    /// Cancels any pending ticks and leaves bursts and buffers as they are.
    pub fn pause(&mut self) {
        if self.is_running() {
            info!(bursts = self.bursts.len(), "pausing show");
        }
        self.spawner.cancel(&mut self.timeline);
        self.compositor.cancel(&mut self.timeline);
    }

    /// A fresh show over `surface` with the same settings, running only if this one is.
    ///
    /// Bursts are positioned for the old canvas, so they are not carried over.
    pub fn resize(&self, surface: S) -> Result<Self> {
        let mut resized = Self::new(surface, self.config.clone())?;
        if self.is_running() {
            resized.start();
        }
        Ok(resized)
    }

    /// Pauses, drops every burst and blanks the display.
    pub fn stop(&mut self) {
        self.pause();
        self.bursts.clear();
        self.compositor.clear();
        info!("show stopped");
    }

    /// Launches one burst right away, regardless of the target count.
    pub fn spawn_burst(&mut self, x: Option<f32>, y: Option<f32>, color: Option<Color>) {
        let burst = self.launcher.launch(x, y, color, &mut self.random);
        self.bursts.push(burst);
    }

    /// Runs every tick due by `now_ms`, in time order, one at a time.
    ///
    /// Returns how many frames were rendered.
    pub fn advance(&mut self, now_ms: f64) -> usize {
        let mut frames = 0;
        while let Some((handle, task)) = self.timeline.pop_due(now_ms) {
            match task {
                Task::Spawn => {
                    if self.spawner.claim(handle) {
                        self.spawner.tick(
                            &mut self.bursts,
                            &self.launcher,
                            &mut self.timeline,
                            &mut self.random,
                        );
                    }
                }
                Task::Render => {
                    if self.compositor.claim(handle) {
                        self.compositor
                            .tick(&mut self.bursts, &mut self.timeline, &mut self.random);
                        frames += 1;
                    }
                }
            }
        }
        if frames > 1 {
            debug!(frames, now_ms, "caught up on several frames");
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::particle::ParticleOptions;

    fn seeded(seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        }
    }

    fn engine(seed: u64) -> Engine<PixelBuffer> {
        Engine::new(PixelBuffer::new(320, 200), seeded(seed)).unwrap()
    }

    #[test]
    fn zero_area_surface_is_rejected() {
        let result = Engine::new(PixelBuffer::new(0, 10), EngineConfig::default());
        assert!(matches!(
            result,
            Err(Error::UnusableSurface { width: 0, height: 10 })
        ));
    }

    #[test]
    fn start_runs_both_loops() {
        let mut engine = engine(1);
        engine.start();
        assert_eq!(engine.timeline().pending(), 2);

        let frames = engine.advance(1000.0);
        assert!(frames >= 1);
        assert_eq!(engine.timeline().pending(), 2);
        assert!(!engine.bursts().is_empty());
    }

    #[test]
    fn frames_follow_the_clock() {
        let mut engine = engine(2);
        engine.start();
        let mut total = 0;
        let mut now = 0.0;
        while now < 1000.0 {
            now += 1.0;
            total += engine.advance(now);
        }
        // one frame per 1/60 s refresh
        assert!((59..=60).contains(&total), "rendered {total} frames");
    }

    #[test]
    fn slow_fps_uses_a_timer() {
        let config = EngineConfig {
            fps: 30.0,
            ..seeded(3)
        };
        let mut engine = Engine::new(PixelBuffer::new(64, 64), config).unwrap();
        engine.start();
        let mut total = 0;
        let mut now = 0.0;
        while now < 1000.0 {
            now += 1.0;
            total += engine.advance(now);
        }
        assert!((28..=30).contains(&total), "rendered {total} frames");
    }

    #[test]
    fn start_twice_does_not_double_the_loops() {
        let mut engine = engine(4);
        engine.start();
        engine.start();
        assert_eq!(engine.timeline().pending(), 2);
    }

    #[test]
    fn pause_is_idempotent_and_keeps_state() {
        let mut engine = engine(5);
        engine.start();
        engine.advance(2000.0);
        let bursts = engine.bursts().len();
        let display = engine.surface().clone();

        engine.pause();
        engine.pause();
        assert!(!engine.is_running());
        assert_eq!(engine.timeline().pending(), 0);
        assert_eq!(engine.advance(10_000.0), 0);
        assert_eq!(engine.bursts().len(), bursts);
        assert_eq!(engine.surface(), &display);
    }

    #[test]
    fn start_after_pause_resumes() {
        let mut engine = engine(6);
        engine.start();
        engine.advance(500.0);
        engine.pause();
        let frames = engine.frames();

        engine.start();
        engine.advance(1000.0);
        assert!(engine.frames() > frames);
    }

    #[test]
    fn resize_keeps_a_paused_show_paused() {
        let mut engine = engine(8);
        engine.start();
        engine.advance(500.0);
        engine.pause();

        let resized = engine.resize(PixelBuffer::new(640, 400)).unwrap();
        assert!(!resized.is_running());
        assert_eq!(resized.timeline().pending(), 0);
        assert!(resized.bursts().is_empty());
        assert_eq!(resized.surface().width(), 640);
    }

    #[test]
    fn resize_restarts_a_running_show() {
        let mut engine = engine(9);
        engine.start();
        engine.advance(500.0);

        let mut resized = engine.resize(PixelBuffer::new(100, 80)).unwrap();
        assert!(resized.is_running());
        assert!(resized.advance(500.0) > 0);
    }

    #[test]
    fn resize_to_nothing_fails() {
        let engine = engine(10);
        assert!(matches!(
            engine.resize(PixelBuffer::new(80, 0)),
            Err(Error::UnusableSurface { width: 80, height: 0 })
        ));
    }

    #[test]
    fn stop_empties_bursts_and_display() {
        let mut engine = engine(7);
        engine.start();
        let mut now = 0.0;
        while now < 1500.0 {
            now += 4.0;
            engine.advance(now);
        }
        assert!(!engine.bursts().is_empty());
        assert!(!engine.surface().is_blank());

        engine.stop();
        assert!(engine.bursts().is_empty());
        assert!(engine.surface().is_blank());
        assert_eq!(engine.surface().pixel(160, 100), [0.0; 4]);
        assert!(!engine.is_running());
    }

    #[test]
    fn manual_burst_with_fixed_seed() {
        let config = EngineConfig {
            min_particles: 80,
            max_particles: 80,
            ..seeded(2024)
        };
        let mut engine = Engine::new(PixelBuffer::new(320, 200), config).unwrap();
        let red = Color::rgb8(255, 0, 0);
        engine.spawn_burst(Some(100.0), Some(100.0), Some(red));

        let burst = &engine.bursts()[0];
        let ParticleOptions { size, speed, .. } = engine.config().particle;
        assert_eq!(burst.particles().len(), 80);
        assert_eq!(burst.origin(), (100.0, 100.0));
        for p in burst.particles() {
            assert!(p.size >= size / 2.0 && p.size <= 1.5 * size);
            assert!(p.speed() <= speed + 1e-4);
            assert_eq!(p.color(), red);
        }
    }

    #[test]
    fn manual_burst_ignores_target_count() {
        let config = EngineConfig {
            target_burst_count: 1,
            ..seeded(8)
        };
        let mut engine = Engine::new(PixelBuffer::new(64, 64), config).unwrap();
        for _ in 0..5 {
            engine.spawn_burst(None, None, None);
        }
        assert_eq!(engine.bursts().len(), 5);
    }

    #[test]
    fn same_seed_same_show() {
        let mut a = engine(99);
        let mut b = engine(99);
        a.start();
        b.start();
        a.advance(800.0);
        b.advance(800.0);
        assert_eq!(a.surface(), b.surface());
    }
}
