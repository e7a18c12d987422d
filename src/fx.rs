// Copyright (c) 2026 rezky_nightky

use log::{debug, info};

use crate::{
    geom::Point,
    gust::{Gust, GustConfig, GustSpawner},
    panel::{LayoutProvider, PanelId, PanelRegistry, Viewport},
    puddle::Puddle,
    rain::{DripAccumulator, DropConfig, DropSimulator, Raindrop, Splash},
    random::RandomSource,
    sway::{SwayConfig, SwayController},
    weather::{Thresholds, WeatherReading},
};

/// How per-frame constants (decay, spawn rate, phase step, chances) scale
/// with the time between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Every tick counts as one reference frame, whatever its duration.
    Frame,
    /// Ticks count as elapsed time in reference frames, capped.
    Elapsed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FxConfig {
    pub thresholds: Thresholds,
    /// Drops per second at a hot factor of 1.
    pub drip_rate: f32,
    /// Degrees above the hot threshold that make a hot factor of 1.
    pub hot_span: f32,
    pub hot_factor_max: f32,
    pub puddle_max: f32,
    /// Puddle loss per reference frame while not hot.
    pub evaporation: f32,
    pub fold_duration: f32,
    pub reference_fps: f32,
    /// Longest step `Pacing::Elapsed` will take in one tick, in frames.
    pub max_step_frames: f32,
    pub pacing: Pacing,
    pub drop: DropConfig,
    pub gust: GustConfig,
    pub sway: SwayConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            drip_rate: 2.0,
            hot_span: 10.0,
            hot_factor_max: 1.8,
            puddle_max: 120.0,
            evaporation: 0.06,
            fold_duration: 0.6,
            reference_fps: 60.0,
            max_step_frames: 3.0,
            pacing: Pacing::Elapsed,
            drop: DropConfig::default(),
            gust: GustConfig::default(),
            sway: SwayConfig::default(),
        }
    }
}

/// One-shot things that happened during a tick, for the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FxEvent {
    DropSpawned { origin: PanelId, at: Point },
    Splash(Splash),
    GustSpawned(Gust),
    Fold(PanelId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FxStats {
    pub frames: u64,
    pub drops_spawned: u64,
    pub splashes: u64,
    pub gusts: u64,
    pub folds: u64,
}

/// Per-frame driver tying weather to drops, puddle, gusts and sway.
pub struct EffectLoop {
    cfg: FxConfig,
    panels: PanelRegistry,
    drops: DropSimulator,
    puddle: Puddle,
    gusts: GustSpawner,
    sway: SwayController,
    drip: DripAccumulator,
    viewport: Viewport,
    last_tick: Option<f64>,
    paused_at: Option<f64>,
    disposed: bool,
    events: Vec<FxEvent>,
    splashes: Vec<Splash>,
    stats: FxStats,
}

impl EffectLoop {
    pub fn new(cfg: FxConfig, panels: PanelRegistry) -> Self {
        Self {
            panels,
            drops: DropSimulator::new(cfg.drop),
            puddle: Puddle::new(cfg.puddle_max),
            gusts: GustSpawner::new(cfg.gust),
            sway: SwayController::new(cfg.sway, cfg.thresholds.windy_ms, cfg.thresholds.gust_ms),
            drip: DripAccumulator::default(),
            viewport: Viewport {
                width: 0.0,
                height: 0.0,
            },
            last_tick: None,
            paused_at: None,
            disposed: false,
            events: Vec::new(),
            splashes: Vec::new(),
            stats: FxStats::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &FxConfig {
        &self.cfg
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    pub fn drops(&self) -> &[Raindrop] {
        self.drops.drops()
    }

    pub fn gusts(&self) -> &[Gust] {
        self.gusts.gusts()
    }

    pub fn puddle(&self) -> &Puddle {
        &self.puddle
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stats(&self) -> FxStats {
        self.stats
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    fn step_frames(&mut self, now: f64) -> f32 {
        let frames = match (self.cfg.pacing, self.last_tick) {
            (Pacing::Frame, _) | (Pacing::Elapsed, None) => 1.0,
            (Pacing::Elapsed, Some(last)) => {
                ((now - last) as f32 * self.cfg.reference_fps).clamp(0.0, self.cfg.max_step_frames)
            }
        };
        self.last_tick = Some(now);
        frames
    }

    fn hot_factor(&self, heat: f32) -> f32 {
        (heat / self.cfg.hot_span.max(f32::EPSILON)).clamp(0.0, self.cfg.hot_factor_max)
    }

    /// Runs one frame at time `now` (seconds, any monotonic origin) and
    /// returns what happened. After [`EffectLoop::dispose`], or while
    /// paused, nothing happens.
    pub fn tick(
        &mut self,
        now: f64,
        reading: &WeatherReading,
        layout: &dyn LayoutProvider,
        rng: &mut dyn RandomSource,
    ) -> &[FxEvent] {
        self.events.clear();
        if self.disposed || self.paused_at.is_some() {
            return &self.events;
        }

        let frames = self.step_frames(now);
        let reading = *reading;
        self.viewport = layout.viewport();
        self.panels.refresh(layout);
        self.panels.expire_folds(now, self.cfg.fold_duration);
        self.gusts.expire(now);

        self.splashes.clear();
        self.drops.advance(
            now,
            &self.panels,
            self.viewport.height,
            &mut self.puddle,
            rng,
            &mut self.splashes,
        );
        self.stats.splashes += self.splashes.len() as u64;
        self.events
            .extend(self.splashes.iter().copied().map(FxEvent::Splash));

        match reading.heat_above(self.cfg.thresholds.hot_c) {
            Some(heat) => {
                let rate = self.cfg.drip_rate * self.hot_factor(heat);
                let due = self.drip.accrue(rate / self.cfg.reference_fps * frames);
                for _ in 0..due {
                    if self.panels.is_empty() {
                        break;
                    }
                    let id = PanelId(rng.index(self.panels.len()));
                    let Some(origin) = self.panels.get(id) else {
                        continue;
                    };
                    self.drops.spawn(origin, now, rng);
                    if let Some(d) = self.drops.drops().last() {
                        self.events.push(FxEvent::DropSpawned {
                            origin: id,
                            at: d.position(),
                        });
                    }
                    self.stats.drops_spawned += 1;
                }
            }
            None => self.puddle.decay(self.cfg.evaporation * frames),
        }

        match reading.wind_above(self.cfg.thresholds.windy_ms) {
            Some(wind) => {
                let intensity = self.sway.intensity(wind);
                if let Some(g) = self
                    .gusts
                    .maybe_spawn(intensity, frames, now, self.viewport, rng)
                {
                    self.events.push(FxEvent::GustSpawned(g));
                    self.stats.gusts += 1;
                }
                if let Some(id) = self
                    .sway
                    .advance(Some(wind), frames, now, &mut self.panels, rng)
                {
                    self.events.push(FxEvent::Fold(id));
                    self.stats.folds += 1;
                }
            }
            None => self.sway.calm(&mut self.panels),
        }

        self.stats.frames += 1;
        &self.events
    }

    /// Freezes simulation time. Ticks while paused do nothing.
    pub fn pause(&mut self, now: f64) {
        if self.disposed || self.paused_at.is_some() {
            return;
        }
        self.paused_at = Some(now);
        debug!("effects paused at {:.3}", now);
    }

    /// Resumes, shifting every clock by the paused span so drops and gusts
    /// continue from where they stopped.
    pub fn resume(&mut self, now: f64) {
        let Some(at) = self.paused_at.take() else {
            return;
        };
        let span = (now - at).max(0.0);
        self.drops.shift_clocks(span);
        self.gusts.shift_clocks(span);
        self.panels.shift_clocks(span);
        if let Some(t) = self.last_tick.as_mut() {
            *t += span;
        }
        debug!("effects resumed after {:.3}s", span);
    }

    /// Clears drops, gusts and the puddle; panels go back to rest.
    pub fn reset(&mut self) {
        self.drops.clear();
        self.gusts.clear();
        self.puddle.drain();
        self.drip = DripAccumulator::default();
        self.panels.rest();
        self.events.clear();
    }

    /// Stops the loop for good. Safe to call at any point, any number of
    /// times.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let (drops, gusts) = (self.drops.len(), self.gusts.gusts().len());
        self.reset();
        self.paused_at = None;
        info!(
            "effect loop disposed ({} drops, {} gusts in flight)",
            drops, gusts
        );
    }

    #[cfg(test)]
    pub(crate) fn drip(&self) -> &DripAccumulator {
        &self.drip
    }

    #[cfg(test)]
    pub(crate) fn puddle_mut(&mut self) -> &mut Puddle {
        &mut self.puddle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Offset, Rect};
    use crate::panel::FixedLayout;
    use crate::random::Scripted;

    const DT: f64 = 1.0 / 60.0;

    fn layout() -> FixedLayout {
        FixedLayout {
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
            },
            rects: vec![
                Rect::new(0.0, 0.0, 400.0, 200.0),
                Rect::new(400.0, 0.0, 400.0, 200.0),
                Rect::new(200.0, 300.0, 500.0, 100.0),
            ],
        }
    }

    fn fx(cfg: FxConfig) -> EffectLoop {
        EffectLoop::new(cfg, PanelRegistry::new(["a", "b", "c"]))
    }

    fn frame_paced() -> FxConfig {
        FxConfig {
            pacing: Pacing::Frame,
            ..FxConfig::default()
        }
    }

    #[test]
    fn hot_frames_spawn_floor_of_accumulated_rate() {
        let mut fx = fx(frame_paced());
        let reading = WeatherReading::new(Some(35.0), None);
        let mut rng = Scripted::new(&[0.1, 0.6, 0.3, 0.8]);
        let lay = layout();

        let per_frame = 2.0f32 * 0.5 / 60.0;
        let mut expected_total = 0.0f64;
        let mut spawned = 0usize;
        let mut last_total = 0.0;
        for i in 0..290 {
            let events = fx.tick(i as f64 * DT, &reading, &lay, &mut rng);
            spawned += events
                .iter()
                .filter(|e| matches!(e, FxEvent::DropSpawned { .. }))
                .count();
            expected_total += per_frame as f64;
            assert!(fx.drip().total() > last_total);
            last_total = fx.drip().total();
            assert_eq!(spawned, expected_total.floor() as usize);
        }
        assert_eq!(spawned, 4);
        assert_eq!(fx.stats().drops_spawned, 4);
    }

    #[test]
    fn cool_frames_evaporate_puddle_to_zero() {
        let mut fx = fx(frame_paced());
        fx.puddle_mut().deposit(50.0);
        let reading = WeatherReading::new(Some(20.0), None);
        let mut rng = Scripted::constant(0.5);
        let lay = layout();

        let mut last = fx.puddle().height();
        for i in 0..1000 {
            fx.tick(i as f64 * DT, &reading, &lay, &mut rng);
            let h = fx.puddle().height();
            if last > 0.0 {
                assert!(h < last, "frame {i}: {h} !< {last}");
            } else {
                assert_eq!(h, 0.0);
            }
            last = h;
        }
        assert_eq!(fx.puddle().height(), 0.0);
    }

    #[test]
    fn hot_branch_does_not_evaporate() {
        let mut fx = fx(frame_paced());
        fx.puddle_mut().deposit(50.0);
        let reading = WeatherReading::new(Some(31.0), None);
        fx.tick(0.0, &reading, &layout(), &mut Scripted::constant(0.5));
        assert_eq!(fx.puddle().height(), 50.0);
    }

    #[test]
    fn missing_weather_is_quiescent() {
        let mut fx = fx(FxConfig::default());
        let lay = layout();
        let mut rng = Scripted::constant(0.0);
        for i in 0..120 {
            let events = fx.tick(i as f64 * DT, &WeatherReading::UNAVAILABLE, &lay, &mut rng);
            assert!(events.is_empty());
        }
        assert!(fx.drops().is_empty());
        assert!(fx.gusts().is_empty());
        assert!(fx.panels().iter().all(|p| p.offset == Offset::ZERO));
    }

    #[test]
    fn windy_frames_sway_and_gust_then_settle() {
        let mut fx = fx(frame_paced());
        let lay = layout();
        let mut rng = Scripted::constant(0.0);
        let windy = WeatherReading::new(None, Some(16.0));

        let events = fx.tick(0.0, &windy, &lay, &mut rng).to_vec();
        assert!(events.iter().any(|e| matches!(e, FxEvent::GustSpawned(_))));
        assert!(events.contains(&FxEvent::Fold(PanelId(0))));
        assert!(fx.panels().iter().any(|p| p.offset != Offset::ZERO));

        let calm = WeatherReading::new(None, Some(9.0));
        fx.tick(DT, &calm, &lay, &mut rng);
        assert!(fx.panels().iter().all(|p| p.offset == Offset::ZERO));
        assert_eq!(fx.gusts().len(), 1);

        fx.tick(2.0, &calm, &lay, &mut rng);
        assert!(fx.gusts().is_empty());
    }

    #[test]
    fn dispose_mid_flight_silences_the_loop() {
        let mut fx = fx(FxConfig {
            drip_rate: 300.0,
            ..frame_paced()
        });
        let lay = layout();
        let mut rng = Scripted::constant(0.0);
        let storm = WeatherReading::new(Some(50.0), Some(20.0));

        fx.tick(0.0, &storm, &lay, &mut rng);
        fx.tick(DT, &storm, &lay, &mut rng);
        assert!(fx.drops().len() >= 5);
        assert_eq!(fx.gusts().len(), 2);

        fx.dispose();
        assert!(fx.is_disposed());
        assert!(fx.drops().is_empty());
        assert!(fx.gusts().is_empty());
        for i in 2..60 {
            assert!(fx.tick(i as f64 * DT, &storm, &lay, &mut rng).is_empty());
        }
        fx.dispose();
        fx.pause(5.0);
        fx.resume(6.0);
        assert!(fx.drops().is_empty());
    }

    #[test]
    fn elapsed_pacing_scales_and_caps_steps() {
        let mut fx = fx(FxConfig::default());
        fx.puddle_mut().deposit(10.0);
        let cool = WeatherReading::new(Some(0.0), None);
        let lay = layout();
        let mut rng = Scripted::constant(0.5);

        fx.tick(0.0, &cool, &lay, &mut rng);
        assert!((fx.puddle().height() - 9.94).abs() < 1e-4);
        fx.tick(2.0 * DT, &cool, &lay, &mut rng);
        assert!((fx.puddle().height() - 9.82).abs() < 1e-4);
        fx.tick(10.0, &cool, &lay, &mut rng);
        assert!((fx.puddle().height() - 9.64).abs() < 1e-4);
    }

    #[test]
    fn pause_freezes_drops_in_place() {
        let mut fx = fx(FxConfig {
            drip_rate: 120.0,
            ..frame_paced()
        });
        let lay = layout();
        let mut rng = Scripted::constant(0.0);
        let hot = WeatherReading::new(Some(40.0), None);

        fx.tick(0.0, &hot, &lay, &mut rng);
        fx.tick(DT, &hot, &lay, &mut rng);
        let before: Vec<f32> = fx.drops().iter().map(|d| d.y).collect();
        assert!(!before.is_empty());

        fx.pause(DT);
        assert!(fx.tick(5.0, &hot, &lay, &mut rng).is_empty());
        fx.resume(10.0);

        let cool = WeatherReading::new(Some(20.0), None);
        fx.tick(10.0, &cool, &lay, &mut rng);
        let after: Vec<f32> = fx.drops().iter().map(|d| d.y).collect();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }

    #[test]
    fn drops_move_every_frame_after_days_of_uptime() {
        let mut fx = fx(FxConfig::default());
        let lay = layout();
        let mut rng = Scripted::constant(0.5);
        let hot = WeatherReading::new(Some(40.0), None);
        let t0 = 3.5 * 86_400.0;

        let mut i = 0;
        while fx.drops().is_empty() {
            fx.tick(t0 + i as f64 * DT, &hot, &lay, &mut rng);
            i += 1;
        }
        let mut last = fx.drops()[0].y;
        for _ in 0..5 {
            fx.tick(t0 + i as f64 * DT, &hot, &lay, &mut rng);
            i += 1;
            let y = fx.drops()[0].y;
            assert!(y > last, "drop stalled at {y}");
            last = y;
        }
    }

    #[test]
    fn drops_from_upper_panel_land_on_lower_panel() {
        let mut fx = fx(FxConfig {
            drip_rate: 60.0,
            ..frame_paced()
        });
        let lay = layout();
        let mut rng = Scripted::constant(0.5);
        let hot = WeatherReading::new(Some(40.0), None);

        let mut hits = 0;
        for i in 0..120 {
            hits += fx
                .tick(i as f64 * DT, &hot, &lay, &mut rng)
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        FxEvent::Splash(Splash {
                            impact: crate::rain::Impact::Panel(PanelId(2)),
                            ..
                        })
                    )
                })
                .count();
        }
        assert!(hits > 0);
        assert_eq!(fx.puddle().height(), 0.0);
    }
}
