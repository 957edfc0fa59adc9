//! Keeps the sky populated: a jittered timer that launches at most one burst per tick.

use crate::color::Color;
use crate::firework::Firework;
use crate::particle::ParticleOptions;
use crate::random::Random;
use crate::schedule::{RepeatingTask, Task, TaskHandle, Timeline, Timing};
use std::ops::RangeInclusive;
use tracing::debug;

/// Fraction of the canvas kept clear of burst origins on every side.
const EDGE_MARGIN: f32 = 0.1;

/// Fills in whatever a burst request leaves unspecified.
#[derive(Debug, Clone)]
pub struct Launcher {
    width: f32,
    height: f32,
    palette: Vec<Color>,
    particle_count: RangeInclusive<usize>,
    options: ParticleOptions,
}

impl Launcher {
    pub fn new(
        width: usize,
        height: usize,
        palette: Vec<Color>,
        particle_count: RangeInclusive<usize>,
        options: ParticleOptions,
    ) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            palette,
            particle_count,
            options,
        }
    }

    pub fn launch(
        &self,
        x: Option<f32>,
        y: Option<f32>,
        color: Option<Color>,
        random: &mut Random,
    ) -> Firework {
        let x = x.unwrap_or_else(|| {
            random.uniform(self.width * EDGE_MARGIN, self.width * (1.0 - EDGE_MARGIN))
        });
        let y = y.unwrap_or_else(|| {
            random.uniform(self.height * EDGE_MARGIN, self.height * (1.0 - EDGE_MARGIN))
        });
        let color = color
            .or_else(|| random.choice(&self.palette).copied())
            .unwrap_or(self.options.color);
        let count = random.count(self.particle_count.clone());

        debug!(x, y, %color, count, "launching burst");
        Firework::new((x, y), color, count, &self.options, random)
    }
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    interval_ms: f64,
    target: usize,
    task: RepeatingTask,
}

impl SpawnScheduler {
    pub fn new(interval_ms: f64, target: usize) -> Self {
        Self {
            interval_ms,
            target,
            task: RepeatingTask::new(Task::Spawn),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.task.is_armed()
    }

    /// Randomized period so launches never fall into a visible rhythm.
    fn next_delay(&self, random: &mut Random) -> f64 {
        self.interval_ms * random.uniform_f64(0.5, 1.0)
    }

    /// Starts the loop unless it is already pending.
    pub fn start(&mut self, timeline: &mut Timeline, random: &mut Random) {
        if !self.task.is_armed() {
            let delay = self.next_delay(random);
            self.task.arm(timeline, Timing::After(delay));
        }
    }

    pub fn claim(&mut self, handle: TaskHandle) -> bool {
        self.task.claim(handle)
    }

    /// Prunes completed bursts, launches one if below target, and schedules the next tick.
    ///
    /// A large deficit is still filled one burst per tick.
    pub fn tick(
        &mut self,
        bursts: &mut Vec<Firework>,
        launcher: &Launcher,
        timeline: &mut Timeline,
        random: &mut Random,
    ) {
        let before = bursts.len();
        bursts.retain(|burst| !burst.is_completed());
        if bursts.len() != before {
            debug!(pruned = before - bursts.len(), "pruned completed bursts");
        }

        if bursts.len() < self.target {
            bursts.push(launcher.launch(None, None, None, random));
        }

        let delay = self.next_delay(random);
        self.task.arm(timeline, Timing::After(delay));
    }

    pub fn cancel(&mut self, timeline: &mut Timeline) {
        self.task.cancel(timeline);
    }
}
