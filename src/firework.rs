use crate::color::Color;
use crate::particle::{Particle, ParticleOptions};
use crate::random::Random;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstStatus {
    Active,
    /// Every particle has burnt out; the burst only waits to be pruned.
    Completed,
}

/// One explosion: a cloud of particles sharing an origin and a color.
#[derive(Debug, Clone)]
pub struct Firework {
    x: f32,
    y: f32,
    color: Color,
    status: BurstStatus,
    particles: Vec<Particle>,
}

impl Firework {
    pub fn new(
        origin: (f32, f32),
        color: Color,
        particle_count: usize,
        options: &ParticleOptions,
        random: &mut Random,
    ) -> Self {
        let base = options.size;
        let particles = (0..particle_count)
            .map(|_| {
                let size = base + random.uniform(-base / 2.0, base / 2.0);
                Particle::new(origin, color, size, options, random)
            })
            .collect();

        Self {
            x: origin.0,
            y: origin.1,
            color,
            status: BurstStatus::Active,
            particles,
        }
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn status(&self) -> BurstStatus {
        self.status
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_completed(&self) -> bool {
        self.status == BurstStatus::Completed
    }

    /// Advances every particle one tick and drops the ones that burnt out.
    pub fn update(&mut self, random: &mut Random) {
        if self.is_completed() {
            return;
        }

        for particle in &mut self.particles {
            particle.update(random);
        }
        // retain keeps the survivors in place, no per-tick allocation
        self.particles.retain(Particle::is_alive);

        if self.particles.is_empty() {
            self.status = BurstStatus::Completed;
        }
    }

    /// One tick: physics first, then the survivors are drawn.
    pub fn render<S: Surface>(&mut self, surface: &mut S, random: &mut Random) {
        self.update(random);
        if self.is_completed() {
            return;
        }

        for particle in &self.particles {
            particle.render(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::RecordingSurface;

    fn burst(count: usize, seed: u64) -> (Firework, Random) {
        let mut random = Random::with_seed(seed);
        let firework = Firework::new(
            (100.0, 100.0),
            Color::rgb8(255, 0, 0),
            count,
            &ParticleOptions::default(),
            &mut random,
        );
        (firework, random)
    }

    #[test]
    fn new_burst_is_active_with_jittered_sizes() {
        let (firework, _) = burst(90, 4);
        assert_eq!(firework.status(), BurstStatus::Active);
        assert_eq!(firework.particles().len(), 90);
        for p in firework.particles() {
            assert!((7.5..=22.5).contains(&p.size));
            assert_eq!((p.x, p.y), (100.0, 100.0));
        }
    }

    #[test]
    fn completes_exactly_once_when_empty() {
        let (mut firework, mut random) = burst(85, 8);
        let mut surface = RecordingSurface::new(400, 400);
        let mut transitions = 0;
        let mut last = firework.status();

        for _ in 0..200 {
            firework.render(&mut surface, &mut random);
            if firework.status() != last {
                transitions += 1;
                last = firework.status();
                assert!(firework.particles().is_empty());
            }
        }

        assert_eq!(transitions, 1);
        assert!(firework.is_completed());
    }

    #[test]
    fn render_after_completion_draws_nothing() {
        let (mut firework, mut random) = burst(80, 21);
        let mut surface = RecordingSurface::new(400, 400);
        while !firework.is_completed() {
            firework.render(&mut surface, &mut random);
        }

        let calls = surface.draw_calls();
        for _ in 0..10 {
            firework.render(&mut surface, &mut random);
        }
        assert_eq!(surface.draw_calls(), calls);
    }

    #[test]
    fn each_render_draws_every_survivor() {
        let (mut firework, mut random) = burst(80, 2);
        let mut surface = RecordingSurface::new(400, 400);
        firework.render(&mut surface, &mut random);
        assert_eq!(surface.gradients.len(), firework.particles().len());
    }

    #[test]
    fn empty_burst_completes_on_first_tick() {
        let (mut firework, mut random) = burst(0, 1);
        assert_eq!(firework.status(), BurstStatus::Active);
        let mut surface = RecordingSurface::new(10, 10);
        firework.render(&mut surface, &mut random);
        assert!(firework.is_completed());
        assert_eq!(surface.draw_calls(), 0);
    }
}
