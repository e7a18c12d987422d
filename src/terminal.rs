// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// A horizontal stretch of changed cells sharing one style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    x: u16,
    y: u16,
    len: u16,
}

fn same_style(a: &Cell, b: &Cell) -> bool {
    a.fg == b.fg && a.bg == b.bg && a.bold == b.bold
}

/// Runs of cells in `cur` that differ from `last`. Both buffers must have
/// the same dimensions.
fn diff_runs(last: &[Cell], cur: &[Cell], width: u16) -> Vec<Run> {
    let mut runs = Vec::new();
    if width == 0 {
        return runs;
    }
    let w = width as usize;
    for (y, (old_row, new_row)) in last.chunks(w).zip(cur.chunks(w)).enumerate() {
        let mut x = 0usize;
        while x < new_row.len() {
            if old_row[x] == new_row[x] {
                x += 1;
                continue;
            }
            let start = x;
            x += 1;
            while x < new_row.len()
                && old_row[x] != new_row[x]
                && same_style(&new_row[start], &new_row[x])
            {
                x += 1;
            }
            runs.push(Run {
                x: start as u16,
                y: y as u16,
                len: (x - start) as u16,
            });
        }
    }
    runs
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<Frame>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Forgets what is on screen so the next draw repaints everything.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let mut pen = Pen::default();
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;

        let reusable = self
            .last
            .as_ref()
            .is_some_and(|l| l.width == frame.width && l.height == frame.height);

        match self.last.as_mut().filter(|_| reusable) {
            Some(last) => {
                for run in diff_runs(&last.cells, &frame.cells, frame.width) {
                    let start = run.y as usize * frame.width as usize + run.x as usize;
                    let cells = &frame.cells[start..start + run.len as usize];
                    self.run_buf.clear();
                    self.run_buf.extend(cells.iter().map(|c| c.ch));
                    self.stdout.queue(cursor::MoveTo(run.x, run.y))?;
                    pen.apply(&mut self.stdout, &cells[0])?;
                    self.stdout.queue(Print(self.run_buf.as_str()))?;
                }
                last.cells.copy_from_slice(&frame.cells);
            }
            None => {
                self.stdout
                    .queue(terminal::Clear(terminal::ClearType::All))?;
                for y in 0..frame.height {
                    self.stdout.queue(cursor::MoveTo(0, y))?;
                    let w = frame.width as usize;
                    for cell in &frame.cells[y as usize * w..(y as usize + 1) * w] {
                        pen.apply(&mut self.stdout, cell)?;
                        self.stdout.queue(Print(cell.ch))?;
                    }
                }
                self.last = Some(frame.clone());
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(s: &str) -> Vec<Cell> {
        s.chars().map(|ch| Cell::glyph(ch, None, None)).collect()
    }

    #[test]
    fn identical_frames_produce_no_runs() {
        let a = row("abcd");
        assert!(diff_runs(&a, &a, 4).is_empty());
    }

    #[test]
    fn changed_cells_group_into_runs_per_row() {
        let last = row("aaaabbbb");
        let cur = row("axyabbzb");
        assert_eq!(
            diff_runs(&last, &cur, 4),
            vec![
                Run { x: 1, y: 0, len: 2 },
                Run { x: 2, y: 1, len: 1 },
            ]
        );
    }

    #[test]
    fn style_change_splits_a_run() {
        let last = row("....");
        let mut cur = row("abcd");
        cur[2].bold = true;
        assert_eq!(
            diff_runs(&last, &cur, 4),
            vec![
                Run { x: 0, y: 0, len: 2 },
                Run { x: 2, y: 0, len: 1 },
                Run { x: 3, y: 0, len: 1 },
            ]
        );
    }
}
