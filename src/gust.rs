// Copyright (c) 2026 rezky_nightky

use crate::{
    geom::lerp,
    panel::Viewport,
    random::{chance_over, RandomSource},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GustConfig {
    /// Per-frame spawn chance at zero intensity.
    pub base_chance: f32,
    /// Extra per-frame chance at full intensity.
    pub intensity_chance: f32,
    /// Gusts keep clear of this much space at the top...
    pub band_top: f32,
    /// ...and this much at the bottom of the viewport.
    pub band_bottom: f32,
    pub width: f32,
    /// Seconds to cross the viewport. Visual only.
    pub duration: f32,
}

impl Default for GustConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.08,
            intensity_chance: 0.10,
            band_top: 70.0,
            band_bottom: 160.0,
            width: 240.0,
            duration: 1.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GustPhase {
    Entering,
    Traveling,
    Exiting,
}

/// A wind streak sweeping left to right. Its position is a pure function of
/// time; nothing else reads it back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gust {
    pub y: f32,
    pub width: f32,
    born: f64,
    duration: f32,
}

impl Gust {
    pub fn progress(&self, now: f64) -> f32 {
        ((now - self.born) as f32 / self.duration.max(f32::EPSILON)).max(0.0)
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Left edge at `now`; starts fully off-screen left, ends fully
    /// off-screen right.
    pub fn left(&self, now: f64, viewport_width: f32) -> f32 {
        lerp(-self.width, viewport_width, self.progress(now).min(1.0))
    }

    pub fn phase(&self, now: f64, viewport_width: f32) -> Option<GustPhase> {
        if self.is_done(now) {
            return None;
        }
        let left = self.left(now, viewport_width);
        Some(if left < 0.0 {
            GustPhase::Entering
        } else if left + self.width > viewport_width {
            GustPhase::Exiting
        } else {
            GustPhase::Traveling
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct GustSpawner {
    cfg: GustConfig,
    gusts: Vec<Gust>,
}

impl GustSpawner {
    pub fn new(cfg: GustConfig) -> Self {
        Self {
            cfg,
            gusts: Vec::new(),
        }
    }

    pub fn gusts(&self) -> &[Gust] {
        &self.gusts
    }

    pub fn clear(&mut self) {
        self.gusts.clear();
    }

    /// Per-frame spawn chance for an intensity in `[0, 1]`.
    pub fn probability(&self, intensity: f32) -> f32 {
        self.cfg.base_chance + intensity.clamp(0.0, 1.0) * self.cfg.intensity_chance
    }

    /// One independent roll per call; no timer, no cap.
    pub fn maybe_spawn(
        &mut self,
        intensity: f32,
        frames: f32,
        now: f64,
        viewport: Viewport,
        rng: &mut dyn RandomSource,
    ) -> Option<Gust> {
        if !rng.chance(chance_over(self.probability(intensity), frames)) {
            return None;
        }
        let lo = self.cfg.band_top;
        let hi = viewport.height - self.cfg.band_bottom;
        let y = if hi > lo {
            rng.range(lo, hi)
        } else {
            viewport.height * 0.5
        };
        let gust = Gust {
            y,
            width: self.cfg.width,
            born: now,
            duration: self.cfg.duration,
        };
        self.gusts.push(gust);
        Some(gust)
    }

    /// Drops gusts whose traversal finished.
    pub fn expire(&mut self, now: f64) {
        self.gusts.retain(|g| !g.is_done(now));
    }

    pub fn shift_clocks(&mut self, by: f64) {
        for g in &mut self.gusts {
            g.born += by;
        }
    }
}
