// Copyright (c) 2026 rezky_nightky

use log::trace;

use crate::{
    geom::Point,
    panel::{Panel, PanelId, PanelRegistry},
    puddle::Puddle,
    random::RandomSource,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropConfig {
    /// Horizontal inset from each side of the origin panel's lower edge.
    pub edge_margin: f32,
    /// Drops start this far above the origin panel's bottom edge.
    pub lip: f32,
    pub velocity: (f32, f32),
    pub gravity: (f32, f32),
    /// Puddle growth per ground impact.
    pub deposit: (f32, f32),
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            edge_margin: 28.0,
            lip: 6.0,
            velocity: (180.0, 260.0),
            gravity: (900.0, 1200.0),
            deposit: (2.0, 4.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    y0: f32,
    velocity: f32,
    gravity: f32,
    spawn_time: f64,
    pub origin: PanelId,
}

impl Raindrop {
    pub fn new(
        x: f32,
        y0: f32,
        velocity: f32,
        gravity: f32,
        spawn_time: f64,
        origin: PanelId,
    ) -> Self {
        Self {
            x,
            y: y0,
            y0,
            velocity,
            gravity,
            spawn_time,
            origin,
        }
    }

    /// Closed-form height at `now`: `y0 + v0*t + g*t^2/2`.
    pub fn height_at(&self, now: f64) -> f32 {
        let t = (now - self.spawn_time).max(0.0) as f32;
        self.y0 + self.velocity * t + 0.5 * self.gravity * t * t
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Impact {
    Panel(PanelId),
    Ground,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Splash {
    pub at: Point,
    pub impact: Impact,
}

/// Fractional spawn budget. Whole drops are flushed once the running total
/// crosses an integer, so the count after N frames is `floor(total)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DripAccumulator {
    total: f64,
    flushed: u64,
}

impl DripAccumulator {
    pub fn accrue(&mut self, amount: f32) -> usize {
        self.total += amount.max(0.0) as f64;
        let due = self.total.floor() as u64;
        let n = due.saturating_sub(self.flushed);
        self.flushed = due;
        n as usize
    }

    #[cfg(test)]
    pub fn owed(&self) -> f32 {
        (self.total - self.flushed as f64) as f32
    }

    #[cfg(test)]
    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Owns every falling drop from spawn to termination.
#[derive(Clone, Debug, Default)]
pub struct DropSimulator {
    cfg: DropConfig,
    drops: Vec<Raindrop>,
}

impl DropSimulator {
    pub fn new(cfg: DropConfig) -> Self {
        Self {
            cfg,
            drops: Vec::new(),
        }
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn clear(&mut self) {
        self.drops.clear();
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, drop: Raindrop) {
        self.drops.push(drop);
    }

    pub fn spawn(&mut self, origin: &Panel, now: f64, rng: &mut dyn RandomSource) {
        let r = origin.visual_bounds();
        let lo = r.left + self.cfg.edge_margin;
        let hi = r.right - self.cfg.edge_margin;
        let x = if hi > lo {
            rng.range(lo, hi)
        } else {
            (r.left + r.right) * 0.5
        };
        let y = r.bottom - self.cfg.lip;
        let velocity = rng.range(self.cfg.velocity.0, self.cfg.velocity.1);
        let gravity = rng.range(self.cfg.gravity.0, self.cfg.gravity.1);
        self.drops
            .push(Raindrop::new(x, y, velocity, gravity, now, origin.id));
    }

    /// Moves every drop to its position at `now`, terminating the ones that
    /// hit a panel or the ground. One splash per terminated drop.
    pub fn advance(
        &mut self,
        now: f64,
        panels: &PanelRegistry,
        viewport_height: f32,
        puddle: &mut Puddle,
        rng: &mut dyn RandomSource,
        splashes: &mut Vec<Splash>,
    ) {
        let deposit = self.cfg.deposit;
        self.drops.retain_mut(|d| {
            let y = d.height_at(now);
            let at = Point::new(d.x, y);

            let hit = panels
                .iter()
                .filter(|p| p.id != d.origin)
                .find(|p| p.visual_bounds().contains(at));
            if let Some(p) = hit {
                trace!("drop hit panel {} at ({:.1}, {:.1})", p.id.0, at.x, at.y);
                splashes.push(Splash {
                    at,
                    impact: Impact::Panel(p.id),
                });
                return false;
            }

            let ground = puddle.ground_line(viewport_height);
            if y >= ground {
                splashes.push(Splash {
                    at: Point::new(d.x, ground),
                    impact: Impact::Ground,
                });
                puddle.deposit(rng.range(deposit.0, deposit.1));
                return false;
            }

            d.y = y;
            true
        });
    }

    pub fn shift_clocks(&mut self, by: f64) {
        for d in &mut self.drops {
            d.spawn_time += by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::panel::{FixedLayout, Viewport};
    use crate::random::Scripted;
    use rstest::rstest;

    fn registry(rects: Vec<Rect>) -> PanelRegistry {
        let mut reg = PanelRegistry::new((0..rects.len()).map(|i| format!("p{i}")));
        reg.refresh(&FixedLayout {
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
            },
            rects,
        });
        reg
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.1)]
    #[case(0.37)]
    #[case(1.25)]
    fn trajectory_is_closed_form(#[case] t: f32) {
        let d = Raindrop::new(5.0, 10.0, 200.0, 1000.0, 2.0, PanelId(0));
        let expected = 10.0 + 200.0 * t + 0.5 * 1000.0 * t * t;
        assert!((d.height_at(2.0 + t as f64) - expected).abs() < 1e-3);
    }

    #[test]
    fn late_spawn_keeps_sub_frame_precision() {
        let t0 = 300_000.0;
        let d = Raindrop::new(0.0, 0.0, 200.0, 1000.0, t0, PanelId(0));
        let mut last = -1.0;
        for i in 0..=5 {
            let t = i as f64 / 60.0;
            let expected = (200.0 * t + 500.0 * t * t) as f32;
            let y = d.height_at(t0 + t);
            assert!((y - expected).abs() < 1e-3, "frame {i}: {y} vs {expected}");
            assert!(y > last);
            last = y;
        }
    }

    #[test]
    fn position_is_independent_of_frame_count() {
        let reg = registry(vec![Rect::new(0.0, 0.0, 100.0, 50.0)]);
        let mut coarse = DropSimulator::default();
        let mut fine = DropSimulator::default();
        let drop = Raindrop::new(50.0, 44.0, 200.0, 1000.0, 0.0, PanelId(0));
        coarse.insert(drop);
        fine.insert(drop);

        let mut puddle = Puddle::new(120.0);
        let mut rng = Scripted::constant(0.5);
        let mut out = Vec::new();

        coarse.advance(0.4, &reg, 10_000.0, &mut puddle, &mut rng, &mut out);
        for i in 1..=40 {
            fine.advance(i as f64 * 0.01, &reg, 10_000.0, &mut puddle, &mut rng, &mut out);
        }

        assert!(out.is_empty());
        let a = coarse.drops()[0].y;
        let b = fine.drops()[0].y;
        assert!((a - b).abs() < 1e-2, "{a} vs {b}");
    }

    #[test]
    fn spawn_uses_lower_edge_and_ranges() {
        let reg = registry(vec![Rect::new(100.0, 20.0, 200.0, 80.0)]);
        let mut sim = DropSimulator::default();
        let mut rng = Scripted::new(&[0.0, 0.5, 0.5]);
        sim.spawn(reg.get(PanelId(0)).unwrap(), 3.0, &mut rng);

        let d = sim.drops()[0];
        assert_eq!(d.x, 128.0);
        assert_eq!(d.y, 94.0);
        assert_eq!(d.origin, PanelId(0));
        assert_eq!(d.height_at(3.0), 94.0);
    }

    #[test]
    fn narrow_panel_spawns_at_centre() {
        let reg = registry(vec![Rect::new(0.0, 0.0, 40.0, 40.0)]);
        let mut sim = DropSimulator::default();
        sim.spawn(reg.get(PanelId(0)).unwrap(), 0.0, &mut Scripted::constant(0.9));
        assert_eq!(sim.drops()[0].x, 20.0);
    }

    #[test]
    fn panel_below_catches_drop_before_ground() {
        let reg = registry(vec![
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 200.0, 200.0, 100.0),
        ]);
        let mut sim = DropSimulator::default();
        sim.insert(Raindrop::new(100.0, 94.0, 200.0, 1000.0, 0.0, PanelId(0)));

        let mut puddle = Puddle::new(120.0);
        let mut rng = Scripted::constant(0.5);
        let mut out = Vec::new();
        for i in 1..=120 {
            sim.advance(i as f64 / 60.0, &reg, 600.0, &mut puddle, &mut rng, &mut out);
        }

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].impact, Impact::Panel(PanelId(1)));
        assert!(out[0].at.y >= 200.0 && out[0].at.y <= 300.0);
        assert_eq!(sim.len(), 0);
        assert_eq!(puddle.height(), 0.0);
    }

    #[test]
    fn origin_panel_never_catches_its_own_drop() {
        let reg = registry(vec![Rect::new(0.0, 0.0, 200.0, 600.0)]);
        let mut sim = DropSimulator::default();
        sim.insert(Raindrop::new(100.0, 94.0, 200.0, 1000.0, 0.0, PanelId(0)));

        let mut puddle = Puddle::new(120.0);
        let mut out = Vec::new();
        sim.advance(0.5, &reg, 600.0, &mut puddle, &mut Scripted::constant(0.5), &mut out);
        assert!(out.is_empty());
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn first_panel_in_registry_order_wins() {
        let reg = registry(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 100.0, 200.0, 100.0),
            Rect::new(0.0, 100.0, 200.0, 100.0),
        ]);
        let mut sim = DropSimulator::default();
        sim.insert(Raindrop::new(50.0, 150.0, 0.0, 0.0, 0.0, PanelId(0)));

        let mut out = Vec::new();
        sim.advance(
            0.0,
            &reg,
            600.0,
            &mut Puddle::new(120.0),
            &mut Scripted::constant(0.5),
            &mut out,
        );
        assert_eq!(out[0].impact, Impact::Panel(PanelId(1)));
    }

    #[test]
    fn ground_impact_fills_puddle_and_raises_ground() {
        let reg = registry(vec![Rect::new(0.0, 0.0, 100.0, 100.0)]);
        let mut sim = DropSimulator::default();
        sim.insert(Raindrop::new(50.0, 596.0, 0.0, 0.0, 0.0, PanelId(0)));
        sim.insert(Raindrop::new(60.0, 591.0, 0.0, 0.0, 0.0, PanelId(0)));

        let mut puddle = Puddle::new(120.0);
        puddle.deposit(5.0);
        let mut out = Vec::new();
        sim.advance(0.0, &reg, 600.0, &mut puddle, &mut Scripted::constant(0.5), &mut out);

        // ground is at 595 for the first drop; 592 after it lands
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].impact, Impact::Ground);
        assert_eq!(out[0].at, Point::new(50.0, 595.0));
        assert_eq!(puddle.height(), 8.0);
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn zero_area_panel_is_ignored() {
        let reg = registry(vec![
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 300.0, 100.0, 0.0),
        ]);
        let mut sim = DropSimulator::default();
        sim.insert(Raindrop::new(50.0, 300.0, 0.0, 0.0, 0.0, PanelId(0)));
        let mut out = Vec::new();
        sim.advance(
            0.0,
            &reg,
            600.0,
            &mut Puddle::new(120.0),
            &mut Scripted::constant(0.5),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn accumulator_flushes_whole_drops_only() {
        let mut acc = DripAccumulator::default();
        let spawned: usize = (0..10).map(|_| acc.accrue(0.25)).sum();
        assert_eq!(spawned, 2);
        assert_eq!(acc.owed(), 0.5);
        assert_eq!(acc.accrue(0.0), 0);
        assert_eq!(acc.accrue(3.5), 4);
    }
}
