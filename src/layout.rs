// Copyright (c) 2026 rezky_nightky

use crate::geom::Rect;
use crate::panel::{LayoutProvider, PanelId, Viewport};

/// Virtual pixels per terminal column.
pub const CELL_WIDTH: f32 = 8.0;
/// Virtual pixels per terminal row.
pub const CELL_HEIGHT: f32 = 16.0;

const TOP_MARGIN: u16 = 2;
const GROUND_RESERVE: u16 = 9;
const SLOT_MIN_COLS: u16 = 30;
const PANEL_MAX_COLS: u16 = 42;
const PANEL_MAX_ROWS: u16 = 8;
const PANEL_MIN_ROWS: u16 = 3;

pub fn to_col(x: f32) -> i32 {
    (x / CELL_WIDTH).floor() as i32
}

pub fn to_row(y: f32) -> i32 {
    (y / CELL_HEIGHT).floor() as i32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRect {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

/// Panels on staggered tiers: odd tiers are shifted by half a slot so rain
/// off an upper panel has something to land on.
fn arrange(cols: u16, rows: u16, count: usize) -> Vec<CellRect> {
    if count == 0 {
        return Vec::new();
    }
    let per_tier = ((cols.saturating_sub(2) / SLOT_MIN_COLS) as usize).clamp(1, count);
    let tiers = count.div_ceil(per_tier);

    let avail = rows.saturating_sub(TOP_MARGIN + GROUND_RESERVE);
    let tier_h = avail / tiers as u16;
    let panel_h = tier_h.saturating_sub(2).min(PANEL_MAX_ROWS);
    let slot_w = cols.saturating_sub(2) / per_tier as u16;
    let panel_w = slot_w.saturating_sub(4).min(PANEL_MAX_COLS);

    (0..count)
        .map(|i| {
            let tier = (i / per_tier) as u16;
            let col = (i % per_tier) as u16;
            if panel_h < PANEL_MIN_ROWS || panel_w < 8 {
                return CellRect {
                    x: 0,
                    y: TOP_MARGIN,
                    w: 0,
                    h: 0,
                };
            }
            let stagger = if tier % 2 == 1 { slot_w / 2 } else { 0 };
            let centre = (slot_w - panel_w) / 2;
            let x = (1 + col * slot_w + centre + stagger).min(cols.saturating_sub(panel_w + 1));
            CellRect {
                x,
                y: TOP_MARGIN + tier * tier_h + 1,
                w: panel_w,
                h: panel_h,
            }
        })
        .collect()
}

/// Lays panels out on the terminal grid and reports the result in virtual
/// pixels.
#[derive(Clone, Debug)]
pub struct GridLayout {
    cols: u16,
    rows: u16,
    count: usize,
    rects: Vec<Rect>,
}

impl GridLayout {
    pub fn new(cols: u16, rows: u16, count: usize) -> Self {
        let mut layout = Self {
            cols,
            rows,
            count,
            rects: Vec::new(),
        };
        layout.reflow();
        layout
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.reflow();
        }
    }

    fn reflow(&mut self) {
        self.rects = arrange(self.cols, self.rows, self.count)
            .into_iter()
            .map(|c| {
                Rect::new(
                    c.x as f32 * CELL_WIDTH,
                    c.y as f32 * CELL_HEIGHT,
                    c.w as f32 * CELL_WIDTH,
                    c.h as f32 * CELL_HEIGHT,
                )
            })
            .collect();
    }
}

impl LayoutProvider for GridLayout {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.cols as f32 * CELL_WIDTH,
            height: self.rows as f32 * CELL_HEIGHT,
        }
    }

    fn panel_bounds(&self, id: PanelId) -> Rect {
        self.rects.get(id.0).copied().unwrap_or_default()
    }
}
