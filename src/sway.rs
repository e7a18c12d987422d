// Copyright (c) 2026 rezky_nightky

use std::f32::consts::PI;

use log::debug;

use crate::{
    geom::Offset,
    panel::{PanelId, PanelRegistry},
    random::{chance_over, RandomSource},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwayConfig {
    /// Wind above the windy threshold that maps to full intensity.
    pub intensity_range: f32,
    pub base_step: f32,
    pub intensity_step: f32,
    /// Peak horizontal displacement at full intensity.
    pub shake: f32,
    /// Per-frame fold chance once wind passes the gust threshold.
    pub fold_chance: f32,
}

impl Default for SwayConfig {
    fn default() -> Self {
        Self {
            intensity_range: 8.0,
            base_step: 0.12,
            intensity_step: 0.10,
            shake: 9.0,
            fold_chance: 0.06,
        }
    }
}

/// Shared period of the horizontal (`phase`) and vertical (`0.85 * phase`)
/// oscillations. The phase wraps here so it never grows past f32 precision.
const PHASE_PERIOD: f32 = 40.0 * PI;

/// Drives the correlated panel sway and the occasional fold pulse.
#[derive(Clone, Debug)]
pub struct SwayController {
    cfg: SwayConfig,
    windy_ms: f32,
    gust_ms: f32,
    phase: f32,
}

impl SwayController {
    pub fn new(cfg: SwayConfig, windy_ms: f32, gust_ms: f32) -> Self {
        Self {
            cfg,
            windy_ms,
            gust_ms,
            phase: 0.0,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn intensity(&self, wind_ms: f32) -> f32 {
        ((wind_ms - self.windy_ms) / self.cfg.intensity_range.max(f32::EPSILON)).clamp(0.0, 1.0)
    }

    pub fn amplitude(&self, intensity: f32) -> f32 {
        self.cfg.shake * (0.25 + intensity * 0.75)
    }

    pub fn fold_probability(&self, wind_ms: Option<f32>) -> f32 {
        match wind_ms {
            Some(w) if w > self.gust_ms => self.cfg.fold_chance,
            _ => 0.0,
        }
    }

    /// Offset of the panel at `index` for the current phase.
    pub fn offset_for(&self, index: usize, amplitude: f32) -> Offset {
        let i = index as f32;
        Offset {
            dx: (self.phase + i * 0.9).sin() * amplitude,
            dy: (self.phase * 0.85 + i * 0.7).cos() * amplitude * 0.35,
        }
    }

    /// Sends every panel back to rest. The phase stays where it is.
    pub fn calm(&mut self, panels: &mut PanelRegistry) {
        panels.rest();
    }

    /// Windy branch: advances the phase, moves every panel and maybe folds
    /// one of them. Calm wind falls back to [`SwayController::calm`].
    pub fn advance(
        &mut self,
        wind_ms: Option<f32>,
        frames: f32,
        now: f64,
        panels: &mut PanelRegistry,
        rng: &mut dyn RandomSource,
    ) -> Option<PanelId> {
        let Some(wind) = wind_ms.filter(|&w| w > self.windy_ms) else {
            self.calm(panels);
            return None;
        };

        let intensity = self.intensity(wind);
        self.phase = (self.phase
            + (self.cfg.base_step + intensity * self.cfg.intensity_step) * frames)
            .rem_euclid(PHASE_PERIOD);
        let amplitude = self.amplitude(intensity);
        for (i, p) in panels.iter_mut().enumerate() {
            p.offset = self.offset_for(i, amplitude);
        }

        let p = chance_over(self.fold_probability(Some(wind)), frames);
        if panels.is_empty() || p <= 0.0 || !rng.chance(p) {
            return None;
        }
        let id = PanelId(rng.index(panels.len()));
        if let Some(panel) = panels.get_mut(id) {
            debug!("fold pulse on panel {} (wind {:.1})", id.0, wind);
            panel.trigger_fold(now);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Scripted;
    use rstest::rstest;

    fn controller() -> SwayController {
        SwayController::new(SwayConfig::default(), 10.0, 14.0)
    }

    #[rstest]
    #[case(None)]
    #[case(Some(3.0))]
    #[case(Some(10.0))]
    fn calm_wind_resets_every_panel(#[case] wind: Option<f32>) {
        let mut sway = controller();
        let mut panels = PanelRegistry::new(["a", "b", "c"]);
        let mut rng = Scripted::constant(0.9);
        for _ in 0..17 {
            sway.advance(Some(15.0), 1.0, 0.0, &mut panels, &mut rng);
        }
        assert!(panels.iter().any(|p| p.offset != Offset::ZERO));
        let phase = sway.phase();

        sway.advance(wind, 1.0, 0.0, &mut panels, &mut rng);
        assert!(panels.iter().all(|p| p.offset == Offset::ZERO));
        assert_eq!(sway.phase(), phase);
    }

    #[test]
    fn stronger_wind_never_sways_less() {
        let sway = controller();
        let mut last_i = 0.0;
        let mut last_a = 0.0;
        for step in 1..=40 {
            let w = 10.0 + step as f32 * 0.5;
            let i = sway.intensity(w);
            let a = sway.amplitude(i);
            assert!(i >= last_i && a >= last_a);
            last_i = i;
            last_a = a;
        }
        assert_eq!(sway.intensity(30.0), 1.0);
        assert_eq!(sway.amplitude(1.0), 9.0);
    }

    #[test]
    fn panels_are_phase_shifted() {
        let mut sway = controller();
        let mut panels = PanelRegistry::new(["a", "b"]);
        sway.advance(Some(14.0), 1.0, 0.0, &mut panels, &mut Scripted::constant(0.9));

        let p: Vec<Offset> = panels.iter().map(|p| p.offset).collect();
        assert_ne!(p[0], p[1]);
        // intensity 0.5: phase 0.17, amplitude 5.625
        assert!((p[0].dx - 0.17f32.sin() * 5.625).abs() < 1e-4);
        assert!((p[1].dy - (0.17f32 * 0.85 + 0.7).cos() * 5.625 * 0.35).abs() < 1e-4);
    }

    #[test]
    fn phase_wraps_without_moving_panels() {
        let mut sway = controller();
        sway.phase = 1.3;
        let a = sway.offset_for(2, 9.0);
        sway.phase = 1.3 + PHASE_PERIOD;
        let b = sway.offset_for(2, 9.0);
        assert!((a.dx - b.dx).abs() < 1e-3 && (a.dy - b.dy).abs() < 1e-3);

        let mut panels = PanelRegistry::new(["a"]);
        let mut rng = Scripted::constant(0.9);
        for _ in 0..200_000 {
            sway.advance(Some(18.0), 3.0, 0.0, &mut panels, &mut rng);
        }
        assert!((0.0..PHASE_PERIOD).contains(&sway.phase()));
    }

    #[test]
    fn fold_needs_gust_wind() {
        let sway = controller();
        assert_eq!(sway.fold_probability(Some(11.0)), 0.0);
        assert_eq!(sway.fold_probability(None), 0.0);
        assert!(sway.fold_probability(Some(16.0)) > sway.fold_probability(Some(11.0)));
    }

    #[test]
    fn fold_hits_a_random_panel_and_retriggers() {
        let mut sway = controller();
        let mut panels = PanelRegistry::new(["a", "b", "c"]);
        let mut rng = Scripted::new(&[0.0, 0.5]);

        assert_eq!(
            sway.advance(Some(16.0), 1.0, 1.0, &mut panels, &mut rng),
            Some(PanelId(1))
        );
        assert!(panels.get(PanelId(1)).unwrap().fold_progress(1.3, 0.6).is_some());

        assert_eq!(
            sway.advance(Some(16.0), 1.0, 1.5, &mut panels, &mut rng),
            Some(PanelId(1))
        );
        assert_eq!(panels.get(PanelId(1)).unwrap().fold_progress(1.5, 0.6), Some(0.0));
    }

    #[test]
    fn below_gust_wind_never_folds() {
        let mut sway = controller();
        let mut panels = PanelRegistry::new(["a"]);
        let mut rng = Scripted::constant(0.0);
        for _ in 0..100 {
            assert_eq!(sway.advance(Some(11.0), 1.0, 0.0, &mut panels, &mut rng), None);
        }
    }
}
