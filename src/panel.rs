// Copyright (c) 2026 rezky_nightky

use crate::geom::{Offset, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PanelId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Live geometry supplied by whoever lays the panels out.
///
/// Queried once per tick; answers may change between ticks (resize,
/// reflow), so nothing returned here is cached past the tick.
pub trait LayoutProvider {
    fn viewport(&self) -> Viewport;
    fn panel_bounds(&self, id: PanelId) -> Rect;
}

#[derive(Clone, Debug)]
pub struct Panel {
    pub id: PanelId,
    pub title: String,
    pub bounds: Rect,
    pub offset: Offset,
    fold_started: Option<f64>,
}

impl Panel {
    fn new(id: PanelId, title: String) -> Self {
        Self {
            id,
            title,
            bounds: Rect::default(),
            offset: Offset::ZERO,
            fold_started: None,
        }
    }

    /// Layout bounds with the sway offset applied, i.e. where the panel is
    /// actually drawn this frame.
    pub fn visual_bounds(&self) -> Rect {
        self.bounds.translated(self.offset)
    }

    /// Starts a fold pulse; a pulse already running restarts from zero.
    pub fn trigger_fold(&mut self, now: f64) {
        self.fold_started = Some(now);
    }

    /// Progress of the running fold pulse in `[0, 1)`.
    pub fn fold_progress(&self, now: f64, duration: f32) -> Option<f32> {
        let started = self.fold_started?;
        let t = (now - started) as f32 / duration.max(f32::EPSILON);
        (0.0..1.0).contains(&t).then_some(t)
    }

    fn expire_fold(&mut self, now: f64, duration: f32) {
        if self.fold_progress(now, duration).is_none() {
            self.fold_started = None;
        }
    }

    fn shift_clock(&mut self, by: f64) {
        if let Some(s) = self.fold_started.as_mut() {
            *s += by;
        }
    }
}

/// Fixed, ordered panel list. Registry order is collision order.
#[derive(Clone, Debug, Default)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
}

impl PanelRegistry {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let panels = titles
            .into_iter()
            .enumerate()
            .map(|(i, t)| Panel::new(PanelId(i), t.into()))
            .collect();
        Self { panels }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.panels.iter_mut()
    }

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id.0)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id.0)
    }

    /// Re-reads every panel's bounds from the layout.
    pub fn refresh(&mut self, layout: &dyn LayoutProvider) {
        for p in &mut self.panels {
            p.bounds = layout.panel_bounds(p.id);
        }
    }

    pub fn expire_folds(&mut self, now: f64, duration: f32) {
        for p in &mut self.panels {
            p.expire_fold(now, duration);
        }
    }

    pub fn shift_clocks(&mut self, by: f64) {
        for p in &mut self.panels {
            p.shift_clock(by);
        }
    }

    pub fn rest(&mut self) {
        for p in &mut self.panels {
            p.offset = Offset::ZERO;
        }
    }
}

/// Layout with fixed rectangles, for headless use.
#[cfg(test)]
pub struct FixedLayout {
    pub viewport: Viewport,
    pub rects: Vec<Rect>,
}

#[cfg(test)]
impl LayoutProvider for FixedLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn panel_bounds(&self, id: PanelId) -> Rect {
        self.rects.get(id.0).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_requeries_bounds() {
        let mut reg = PanelRegistry::new(["a", "b"]);
        let mut layout = FixedLayout {
            viewport: Viewport {
                width: 100.0,
                height: 100.0,
            },
            rects: vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 0.0, 10.0, 10.0)],
        };
        reg.refresh(&layout);
        assert_eq!(reg.get(PanelId(1)).map(|p| p.bounds.left), Some(20.0));

        layout.rects[1] = Rect::new(50.0, 0.0, 10.0, 10.0);
        reg.refresh(&layout);
        assert_eq!(reg.get(PanelId(1)).map(|p| p.bounds.left), Some(50.0));
    }

    #[test]
    fn fold_retrigger_restarts_pulse() {
        let mut reg = PanelRegistry::new(["a"]);
        let p = reg.get_mut(PanelId(0)).unwrap();
        p.trigger_fold(1.0);
        assert_eq!(p.fold_progress(1.25, 0.5), Some(0.5));
        p.trigger_fold(1.25);
        assert_eq!(p.fold_progress(1.25, 0.5), Some(0.0));

        reg.expire_folds(2.0, 0.5);
        assert_eq!(reg.get(PanelId(0)).unwrap().fold_progress(2.0, 0.5), None);
    }

    #[test]
    fn visual_bounds_follow_offset() {
        let mut reg = PanelRegistry::new(["a"]);
        let p = reg.get_mut(PanelId(0)).unwrap();
        p.bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        p.offset = Offset { dx: 3.0, dy: 1.0 };
        assert_eq!(p.visual_bounds().left, 3.0);
        reg.rest();
        assert_eq!(reg.get(PanelId(0)).unwrap().offset, Offset::ZERO);
    }
}
