use std::ops::RangeInclusive;

/// Random source for every jittered quantity in the show.
///
/// Holds its own generator so a seeded engine replays exactly.
#[derive(Debug, Clone)]
pub struct Random {
    rng: fastrand::Rng,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Uniform sample in `[min, max)`.
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.f32() * (max - min)
    }

    pub fn uniform_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.rng.f64() * (max - min)
    }

    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.rng.usize(0..items.len()))
    }

    pub fn count(&mut self, range: RangeInclusive<usize>) -> usize {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.usize(range)
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}
