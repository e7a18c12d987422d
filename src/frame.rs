// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Off-screen cell buffer. The scene repaints it from scratch every tick;
/// the terminal diffs it against what was last shown.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    blank: Cell,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; width as usize * height as usize],
            blank,
        }
    }

    pub fn clear_with_bg(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank_with_bg(bg);
        self.cells.fill(self.blank);
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Signed-coordinate variant of [`Frame::set`]; anything off-screen is
    /// dropped.
    pub fn put(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>) {
        if x < 0 || y < 0 || x > u16::MAX as i32 || y > u16::MAX as i32 {
            return;
        }
        let bg = self.blank.bg;
        self.set(x as u16, y as u16, Cell::glyph(ch, fg, bg));
    }

    /// Writes `text` starting at `(x, y)`, clipped to `max` columns.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, fg: Option<Color>, max: usize) -> usize {
        let mut n = 0;
        for (i, ch) in text.chars().take(max).enumerate() {
            self.put(x + i as i32, y, ch, fg);
            n += 1;
        }
        n
    }

    pub fn put_bold_str(&mut self, x: i32, y: i32, text: &str, fg: Option<Color>, max: usize) {
        let bg = self.blank.bg;
        for (i, ch) in text.chars().take(max).enumerate() {
            let cx = x + i as i32;
            if cx < 0 || y < 0 {
                continue;
            }
            self.set(cx as u16, y as u16, Cell::glyph(ch, fg, bg).bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_with_bg_makes_cells_blank() {
        let mut f = Frame::new(2, 2, None);
        f.put(0, 0, 'x', None);
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear_with_bg(Some(Color::Black));
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
        assert_eq!(f.get(1, 1).unwrap().bg, Some(Color::Black));
    }

    #[test]
    fn off_screen_writes_are_ignored() {
        let mut f = Frame::new(3, 1, None);
        f.put(-1, 0, 'a', None);
        f.put(3, 0, 'b', None);
        f.put(0, -4, 'c', None);
        assert!(f.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn put_str_clips() {
        let mut f = Frame::new(4, 1, None);
        assert_eq!(f.put_str(1, 0, "rainy", None, 2), 2);
        let row: String = f.cells.iter().map(|c| c.ch).collect();
        assert_eq!(row, " ra ");
    }
}
