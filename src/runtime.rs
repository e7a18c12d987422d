// Copyright (c) 2025 rezk_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphMode {
    Ascii,
    Unicode,
}

/// Glyphs the scene is drawn with.
#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    pub drop: char,
    pub splash: [char; 3],
    pub gust: &'static [char],
    pub water: char,
    pub water_levels: &'static [char],
    pub drip: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl Glyphs {
    pub fn for_mode(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self {
                drop: '│',
                splash: ['✶', '⁕', '·'],
                gust: &['~', '≈', '∼', '~', '-', '≈', '~', '∽'],
                water: '≈',
                water_levels: &['▁', '▂', '▃', '▄', '▅', '▆', '▇'],
                drip: '╽',
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
            },
            GlyphMode::Ascii => Self {
                drop: '|',
                splash: ['*', 'o', '.'],
                gust: &['~', '~', '-', '~', '=', '~'],
                water: '~',
                water_levels: &['_', '_', '-', '-', '~', '~', '~'],
                drip: '!',
                top_left: '+',
                top_right: '+',
                bottom_left: '+',
                bottom_right: '+',
                horizontal: '-',
                vertical: '|',
            },
        }
    }
}
