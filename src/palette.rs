// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;
use crate::weather::Badge;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Storm,
    Dusk,
    Glacier,
}

type Rgb = (u8, u8, u8);

struct ThemeColors {
    text: Rgb,
    dim: Rgb,
    border: Rgb,
    border_hot: Rgb,
    drop: Rgb,
    splash: Rgb,
    gust: Rgb,
    water_deep: Rgb,
    water_top: Rgb,
    calm: Rgb,
    hot: Rgb,
    windy: Rgb,
    hot_windy: Rgb,
}

const STORM: ThemeColors = ThemeColors {
    text: (214, 222, 235),
    dim: (110, 122, 140),
    border: (120, 150, 190),
    border_hot: (255, 140, 60),
    drop: (120, 190, 255),
    splash: (200, 235, 255),
    gust: (170, 180, 200),
    water_deep: (10, 40, 110),
    water_top: (90, 170, 255),
    calm: (110, 210, 140),
    hot: (255, 150, 60),
    windy: (90, 210, 230),
    hot_windy: (255, 90, 90),
};

const DUSK: ThemeColors = ThemeColors {
    text: (240, 225, 210),
    dim: (140, 115, 120),
    border: (180, 120, 170),
    border_hot: (255, 110, 70),
    drop: (200, 160, 255),
    splash: (255, 220, 250),
    gust: (210, 170, 190),
    water_deep: (50, 20, 80),
    water_top: (190, 120, 230),
    calm: (160, 210, 150),
    hot: (255, 130, 80),
    windy: (150, 190, 255),
    hot_windy: (255, 80, 120),
};

const GLACIER: ThemeColors = ThemeColors {
    text: (235, 245, 250),
    dim: (130, 150, 160),
    border: (160, 210, 225),
    border_hot: (255, 170, 90),
    drop: (200, 240, 255),
    splash: (255, 255, 255),
    gust: (190, 215, 225),
    water_deep: (0, 70, 100),
    water_top: (120, 230, 255),
    calm: (150, 230, 200),
    hot: (255, 180, 90),
    windy: (120, 220, 255),
    hot_windy: (255, 120, 100),
};

/// Resolved colors for each role the scene draws.
#[derive(Clone, Debug)]
pub struct Palette {
    pub bg: Option<Color>,
    pub text: Option<Color>,
    pub dim: Option<Color>,
    pub border: Option<Color>,
    pub border_hot: Option<Color>,
    pub drop: Option<Color>,
    pub gust: Option<Color>,
    /// Splash colors, freshest first.
    pub splash: Vec<Color>,
    /// Water colors, surface first.
    pub water: Vec<Color>,
    badge: [Option<Color>; 4],
}

impl Palette {
    pub fn badge(&self, badge: Badge) -> Option<Color> {
        let i = match badge {
            Badge::Calm => 0,
            Badge::Hot => 1,
            Badge::Windy => 2,
            Badge::HotWindy => 3,
        };
        self.badge[i]
    }

    pub fn splash_at(&self, age: usize) -> Option<Color> {
        self.splash
            .get(age.min(self.splash.len().saturating_sub(1)))
            .copied()
    }

    pub fn water_at(&self, depth: usize) -> Option<Color> {
        self.water
            .get(depth.min(self.water.len().saturating_sub(1)))
            .copied()
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn color_from_rgb(mode: ColorMode, (r, g, b): Rgb) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn gradient(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    match steps {
        0 => Vec::new(),
        1 => vec![from],
        _ => (0..steps)
            .map(|i| {
                let t = i as f32 / (steps - 1) as f32;
                (
                    lerp_u8(from.0, to.0, t),
                    lerp_u8(from.1, to.1, t),
                    lerp_u8(from.2, to.2, t),
                )
            })
            .collect(),
    }
}

fn colors_from_gradient(mode: ColorMode, from: Rgb, to: Rgb, steps: usize) -> Vec<Color> {
    gradient(from, to, steps)
        .into_iter()
        .filter_map(|rgb| color_from_rgb(mode, rgb))
        .collect()
}

pub fn build_palette(theme: Theme, mode: ColorMode, default_background: bool) -> Palette {
    let c = match theme {
        Theme::Storm => &STORM,
        Theme::Dusk => &DUSK,
        Theme::Glacier => &GLACIER,
    };
    let role = |rgb| color_from_rgb(mode, rgb);

    let bg = if default_background {
        None
    } else {
        match mode {
            ColorMode::Mono => None,
            ColorMode::Color16 => Some(Color::Black),
            ColorMode::TrueColor => Some(Color::Rgb { r: 0, g: 0, b: 0 }),
            ColorMode::Color256 => Some(Color::AnsiValue(16)),
        }
    };

    let fade_to = c.dim;
    Palette {
        bg,
        text: role(c.text),
        dim: role(c.dim),
        border: role(c.border),
        border_hot: role(c.border_hot),
        drop: role(c.drop),
        gust: role(c.gust),
        splash: colors_from_gradient(mode, c.splash, fade_to, 3),
        water: colors_from_gradient(mode, c.water_top, c.water_deep, 4),
        badge: [role(c.calm), role(c.hot), role(c.windy), role(c.hot_windy)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_picks_cube_and_gray() {
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
    }

    #[test]
    fn color16_nearest() {
        assert_eq!(rgb_to_color16(250, 10, 10), Color::Red);
        assert_eq!(rgb_to_color16(10, 10, 120), Color::DarkBlue);
    }

    #[test]
    fn gradient_hits_both_ends() {
        let g = gradient((0, 0, 0), (200, 100, 50), 3);
        assert_eq!(g, vec![(0, 0, 0), (100, 50, 25), (200, 100, 50)]);
    }

    #[test]
    fn mono_has_no_colors() {
        let p = build_palette(Theme::Storm, ColorMode::Mono, false);
        assert!(p.bg.is_none() && p.drop.is_none());
        assert!(p.splash.is_empty());
        assert_eq!(p.splash_at(5), None);
        assert_eq!(p.badge(Badge::Hot), None);
    }

    #[test]
    fn lookups_clamp_to_last_shade() {
        let p = build_palette(Theme::Dusk, ColorMode::TrueColor, true);
        assert!(p.bg.is_none());
        assert_eq!(p.water.len(), 4);
        assert_eq!(p.water_at(99), p.water.last().copied());
        assert_eq!(p.splash_at(0), p.splash.first().copied());
        assert_ne!(p.badge(Badge::Calm), p.badge(Badge::HotWindy));
    }
}
