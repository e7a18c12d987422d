// Copyright (c) 2026 rezky_nightky

use std::f32::consts::PI;

use crossterm::style::Color;

use crate::{
    feed::FeedStatus,
    frame::Frame,
    fx::{EffectLoop, FxEvent, FxStats},
    gust::GustPhase,
    layout::{to_col, to_row, CELL_HEIGHT, CELL_WIDTH},
    palette::Palette,
    panel::Panel,
    rain::Impact,
    runtime::Glyphs,
    weather::{Badge, WeatherReport, WeatherState},
};

/// How long a splash mark stays on screen.
const SPLASH_LIFE: f32 = 0.3;
/// How far a fold pulse squashes a panel at its peak.
const FOLD_DEPTH: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SplashMark {
    col: i32,
    row: i32,
    born: f64,
    on_ground: bool,
}

/// What the status line and panels show besides the effects.
pub struct Hud<'a> {
    pub weather: &'a WeatherState,
    pub feed: &'a FeedStatus,
    pub source: &'a str,
    pub paused: bool,
}

/// Turns the effect loop's state into terminal cells.
pub struct Scene {
    glyphs: Glyphs,
    splashes: Vec<SplashMark>,
}

fn cell_span(lo: f32, hi: f32, unit: f32) -> (i32, i32) {
    let a = (lo / unit).round() as i32;
    let b = (hi / unit).round() as i32;
    (a, (b - a).max(0))
}

fn fmt_opt(v: Option<f32>, unit: &str) -> String {
    match v {
        Some(v) => format!("{v:.1} {unit}"),
        None => "--".to_string(),
    }
}

fn weather_lines(report: &WeatherReport) -> Vec<String> {
    vec![
        format!("temp    {}", fmt_opt(report.temperature_c, "°C")),
        format!("feels   {}", fmt_opt(report.feels_like_c, "°C")),
        format!("wind    {}", fmt_opt(report.wind_speed_ms, "m/s")),
        format!("humid   {}", fmt_opt(report.humidity_pct, "%")),
        format!("updated {}", report.updated.as_deref().unwrap_or("--")),
    ]
}

fn effect_lines(stats: &FxStats, fx: &EffectLoop) -> Vec<String> {
    vec![
        format!("drops    {} ({} live)", stats.drops_spawned, fx.drops().len()),
        format!("splashes {}", stats.splashes),
        format!("gusts    {}", stats.gusts),
        format!("folds    {}", stats.folds),
        format!(
            "puddle   {:.0}/{:.0}",
            fx.puddle().height(),
            fx.puddle().max()
        ),
    ]
}

fn status_lines(hud: &Hud) -> Vec<String> {
    let mut lines = vec![
        format!("state  {}", hud.weather.badge().label()),
        format!("feed   {}", hud.feed.label()),
        format!("source {}", hud.source),
    ];
    if let FeedStatus::Unavailable(why) = hud.feed {
        lines.push(why.clone());
    }
    lines.push("p pause  q quit  r refresh".to_string());
    lines.push("arrows temp/wind  x clear".to_string());
    lines
}

impl Scene {
    pub fn new(glyphs: Glyphs) -> Self {
        Self {
            glyphs,
            splashes: Vec::new(),
        }
    }

    #[cfg(test)]
    fn splash_count(&self) -> usize {
        self.splashes.len()
    }

    /// Picks up this tick's splashes.
    pub fn absorb(&mut self, events: &[FxEvent], now: f64) {
        for ev in events {
            if let FxEvent::Splash(s) = ev {
                self.splashes.push(SplashMark {
                    col: to_col(s.at.x),
                    row: to_row(s.at.y),
                    born: now,
                    on_ground: s.impact == Impact::Ground,
                });
            }
        }
    }

    pub fn clear(&mut self) {
        self.splashes.clear();
    }

    pub fn shift_clocks(&mut self, by: f64) {
        for s in &mut self.splashes {
            s.born += by;
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, fx: &EffectLoop, hud: &Hud, palette: &Palette, now: f64) {
        frame.clear_with_bg(palette.bg);

        self.draw_gusts(frame, fx, palette, now);
        let stats = fx.stats();
        for (i, panel) in fx.panels().iter().enumerate() {
            let lines = match i % 3 {
                0 => weather_lines(hud.weather.report()),
                1 => effect_lines(&stats, fx),
                _ => status_lines(hud),
            };
            self.draw_panel(frame, panel, &lines, hud.weather.badge(), fx, palette, now);
        }
        self.draw_drops(frame, fx, palette);
        self.draw_puddle(frame, fx, palette);
        self.draw_splashes(frame, palette, now);
        self.draw_status_line(frame, hud, palette);
    }

    fn draw_gusts(&self, frame: &mut Frame, fx: &EffectLoop, palette: &Palette, now: f64) {
        let vw = fx.viewport().width;
        let pattern = self.glyphs.gust;
        for g in fx.gusts() {
            let Some(phase) = g.phase(now, vw) else {
                continue;
            };
            let color = match phase {
                GustPhase::Traveling => palette.gust,
                GustPhase::Entering | GustPhase::Exiting => palette.dim,
            };
            let col0 = to_col(g.left(now, vw));
            let row = to_row(g.y);
            let len = (g.width / CELL_WIDTH) as i32;
            for i in 0..len {
                // ragged edges
                if (i == 0 || i == len - 1) && (row + i) % 2 == 0 {
                    continue;
                }
                let ch = pattern[(i.unsigned_abs() as usize + row.unsigned_abs() as usize) % pattern.len()];
                frame.put(col0 + i, row, ch, color);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_panel(
        &self,
        frame: &mut Frame,
        panel: &Panel,
        lines: &[String],
        badge: Badge,
        fx: &EffectLoop,
        palette: &Palette,
        now: f64,
    ) {
        let vb = panel.visual_bounds();
        if vb.is_degenerate() {
            return;
        }
        let (x0, w) = cell_span(vb.left, vb.right, CELL_WIDTH);
        let (y0, mut h) = cell_span(vb.top, vb.bottom, CELL_HEIGHT);
        if let Some(t) = panel.fold_progress(now, fx.config().fold_duration) {
            let squash = 1.0 - FOLD_DEPTH * (PI * t).sin();
            h = ((h as f32 * squash).round() as i32).max(2);
        }
        if w < 2 || h < 2 {
            return;
        }

        let g = &self.glyphs;
        let hot = badge.is_hot();
        let border = if hot { palette.border_hot } else { palette.border };
        let (x1, y1) = (x0 + w - 1, y0 + h - 1);

        for x in x0 + 1..x1 {
            frame.put(x, y0, g.horizontal, border);
            frame.put(x, y1, g.horizontal, border);
        }
        for y in y0 + 1..y1 {
            frame.put(x0, y, g.vertical, border);
            frame.put(x1, y, g.vertical, border);
        }
        frame.put(x0, y0, g.top_left, border);
        frame.put(x1, y0, g.top_right, border);
        frame.put(x0, y1, g.bottom_left, border);
        frame.put(x1, y1, g.bottom_right, border);

        let inner = (w - 4).max(0) as usize;
        let title = format!(" {} ", panel.title);
        frame.put_bold_str(x0 + 2, y0, &title, palette.text, inner);

        for (i, line) in lines.iter().take((h - 2).max(0) as usize).enumerate() {
            let fg = if i == 0 { palette.text } else { palette.dim };
            frame.put_str(x0 + 2, y0 + 1 + i as i32, line, fg, inner);
        }

        if hot {
            // melting edge: drip marks hang under the bottom border and crawl
            let shift = (now * 2.0) as i32;
            for x in x0 + 1..x1 {
                if (x + shift).rem_euclid(5) == 0 {
                    frame.put(x, y1 + 1, g.drip, border);
                }
            }
        }
    }

    fn draw_drops(&self, frame: &mut Frame, fx: &EffectLoop, palette: &Palette) {
        for d in fx.drops() {
            frame.put(to_col(d.x), to_row(d.y), self.glyphs.drop, palette.drop);
        }
    }

    fn draw_splashes(&mut self, frame: &mut Frame, palette: &Palette, now: f64) {
        self.splashes.retain(|s| ((now - s.born) as f32) < SPLASH_LIFE);
        let stages = self.glyphs.splash.len();
        for s in &self.splashes {
            let age = (((now - s.born) as f32 / SPLASH_LIFE) * stages as f32) as usize;
            let age = age.min(stages - 1);
            let ch = self.glyphs.splash[age];
            let color = palette.splash_at(age);
            frame.put(s.col, s.row, ch, color);
            if s.on_ground && age == 0 {
                frame.put(s.col - 1, s.row, '.', color);
                frame.put(s.col + 1, s.row, '.', color);
            }
        }
    }

    fn draw_puddle(&self, frame: &mut Frame, fx: &EffectLoop, palette: &Palette) {
        let height = fx.puddle().height();
        if height <= 0.0 || frame.height == 0 {
            return;
        }
        let rows = height / CELL_HEIGHT;
        let full = rows.floor() as i32;
        let frac = rows - full as f32;
        let bottom = frame.height as i32 - 1;
        let levels = self.glyphs.water_levels;
        let partial = ((frac * levels.len() as f32) as usize).min(levels.len() - 1);
        let has_partial = frac * levels.len() as f32 >= 1.0;
        let surface = bottom - full + if has_partial { 0 } else { 1 };

        for x in 0..frame.width as i32 {
            if has_partial {
                frame.put(x, bottom - full, levels[partial], palette.water_at(0));
            }
            for r in 0..full {
                let row = bottom - r;
                let depth = (row - surface).max(0) as usize;
                frame.put(x, row, self.glyphs.water, palette.water_at(depth));
            }
        }
    }

    fn draw_status_line(&self, frame: &mut Frame, hud: &Hud, palette: &Palette) {
        let badge = hud.weather.badge();
        let w = frame.width as usize;
        let mut x = 1;
        frame.put_bold_str(x, 0, "weatherfx", palette.text, w);
        x += 11;
        let label = format!("[{}]", badge.label());
        frame.put_bold_str(x, 0, &label, palette.badge(badge), w.saturating_sub(x as usize));
        x += label.chars().count() as i32 + 2;

        let r = hud.weather.reading();
        let summary = format!(
            "{}  {}",
            fmt_opt(r.temperature_c, "°C"),
            fmt_opt(r.wind_speed_ms, "m/s")
        );
        x += frame.put_str(x, 0, &summary, palette.dim, w.saturating_sub(x as usize)) as i32 + 2;

        let flag: Option<(&str, Option<Color>)> = if hud.paused {
            Some(("PAUSED", palette.text))
        } else if matches!(hud.feed, FeedStatus::Unavailable(_)) {
            Some((hud.feed.label(), palette.border_hot))
        } else {
            None
        };
        if let Some((text, color)) = flag {
            frame.put_bold_str(x, 0, text, color, w.saturating_sub(x as usize));
        }
    }
}
