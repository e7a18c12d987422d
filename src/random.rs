// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform randomness for the effect core.
///
/// Everything random in the simulation (spawn positions, velocities, gust
/// and fold rolls) goes through this trait so tests can script the values.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Uniform value in `[lo, hi)`.
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Bernoulli trial with success probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let i = (self.unit() * len as f32) as usize;
        i.min(len.saturating_sub(1))
    }
}

/// Probability that a per-frame chance `p` fires at least once over
/// `frames` reference frames.
pub fn chance_over(p: f32, frames: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if frames == 1.0 {
        return p;
    }
    1.0 - (1.0 - p).powf(frames.max(0.0))
}

/// Adapts any `rand` generator.
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn unit(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Replays a fixed list of unit values in a loop.
#[cfg(test)]
pub struct Scripted {
    values: Vec<f32>,
    pos: usize,
}

#[cfg(test)]
impl Scripted {
    pub fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty(), "scripted source needs values");
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }

    pub fn constant(v: f32) -> Self {
        Self::new(&[v])
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn unit(&mut self) -> f32 {
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
