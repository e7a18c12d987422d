// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::fx::Pacing;
use crate::palette::Theme;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  weatherfx --duration 0 --fps 60 --panels 3 --hot-temp 30 --windy 10 --gust 14 --drip-rate 2 --puddle-max 120 --shake 9 --pacing elapsed --refresh-secs 600 --theme storm --color-bg black";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str("      \x1b[32mExample:\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("  weatherfx") {
            out.push_str("  \x1b[1;34mweatherfx\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("  -") {
            out.push_str("  \x1b[33m-");
            out.push_str(rest);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingArg {
    #[value(name = "frame")]
    Frame,
    #[value(name = "elapsed")]
    Elapsed,
}

impl From<PacingArg> for Pacing {
    fn from(p: PacingArg) -> Self {
        match p {
            PacingArg::Frame => Pacing::Frame,
            PacingArg::Elapsed => Pacing::Elapsed,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    #[value(name = "storm")]
    Storm,
    #[value(name = "dusk")]
    Dusk,
    #[value(name = "glacier")]
    Glacier,
}

impl From<ThemeArg> for Theme {
    fn from(t: ThemeArg) -> Self {
        match t {
            ThemeArg::Storm => Theme::Storm,
            ThemeArg::Dusk => Theme::Dusk,
            ThemeArg::Glacier => Theme::Glacier,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "weatherfx", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        short = 'p',
        long = "panels",
        default_value_t = 3,
        help_heading = "GENERAL",
        help = "Number of panels (min 1 max 6)"
    )]
    pub panels: usize,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Append log records to this file"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value = "info",
        help_heading = "GENERAL",
        help = "Log level (off, error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[arg(
        short = 't',
        long = "temp",
        allow_negative_numbers = true,
        help_heading = "WEATHER",
        help = "Temperature in °C (min -90 max 60)"
    )]
    pub temp: Option<f32>,

    #[arg(
        short = 'w',
        long = "wind",
        help_heading = "WEATHER",
        help = "Wind speed in m/s (min 0 max 120)"
    )]
    pub wind: Option<f32>,

    #[arg(
        long = "humidity",
        help_heading = "WEATHER",
        help = "Relative humidity in percent (min 0 max 100)"
    )]
    pub humidity: Option<f32>,

    #[arg(
        long = "feels-like",
        allow_negative_numbers = true,
        help_heading = "WEATHER",
        help = "Apparent temperature in °C (min -90 max 60)"
    )]
    pub feels_like: Option<f32>,

    #[arg(
        long = "weather-file",
        help_heading = "WEATHER",
        help = "Read readings from a TOML file, re-read every --refresh-secs"
    )]
    pub weather_file: Option<PathBuf>,

    #[arg(
        long = "refresh-secs",
        default_value_t = 600.0,
        help_heading = "WEATHER",
        help = "Weather file refresh interval (min 1 max 86400)"
    )]
    pub refresh_secs: f64,

    #[arg(
        long = "hot-temp",
        default_value_t = 30.0,
        allow_negative_numbers = true,
        help_heading = "EFFECTS",
        help = "Dripping starts above this temperature in °C (min -60 max 60)"
    )]
    pub hot_temp: f32,

    #[arg(
        long = "windy",
        default_value_t = 10.0,
        help_heading = "EFFECTS",
        help = "Sway and gusts start above this wind speed in m/s (min 0 max 100)"
    )]
    pub windy: f32,

    #[arg(
        long = "gust",
        default_value_t = 14.0,
        help_heading = "EFFECTS",
        help = "Panels may fold above this wind speed in m/s (min 0 max 100)"
    )]
    pub gust: f32,

    #[arg(
        long = "drip-rate",
        default_value_t = 2.0,
        help_heading = "EFFECTS",
        help = "Drops per second at full heat (min 0 max 100)"
    )]
    pub drip_rate: f32,

    #[arg(
        long = "puddle-max",
        default_value_t = 120.0,
        help_heading = "EFFECTS",
        help = "Maximum puddle depth in virtual pixels (min 0 max 2000)"
    )]
    pub puddle_max: f32,

    #[arg(
        long = "shake",
        default_value_t = 9.0,
        help_heading = "EFFECTS",
        help = "Peak sway displacement in virtual pixels (min 0 max 100)"
    )]
    pub shake: f32,

    #[arg(
        long = "pacing",
        default_value_t = PacingArg::Elapsed,
        value_enum,
        help_heading = "EFFECTS",
        help = "Scale per-frame constants per tick (frame) or by elapsed time (elapsed)"
    )]
    pub pacing: PacingArg,

    #[arg(
        long = "seed",
        help_heading = "EFFECTS",
        help = "Seed the random source for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "theme",
        default_value_t = ThemeArg::Storm,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Color theme (storm, dusk, glacier)"
    )]
    pub theme: ThemeArg,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "ascii",
        help_heading = "APPEARANCE",
        help = "Draw with ASCII glyphs only"
    )]
    pub ascii: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  weatherfx [OPTIONS]\n\nGENERAL:\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: weatherfx --duration 10\n\n  -s, --screensaver\n      Screensaver mode (exit on keypress).\n      Example: weatherfx -s\n\n  -p, --panels <count>\n      Number of panels the effects play over (min 1 max 6).\n      Example: weatherfx --panels 5\n\n  --log-file <path>\n      Append log records to a file (logging is off otherwise).\n      Example: weatherfx --log-file /tmp/weatherfx.log --log-level debug\n\nWEATHER:\n  -t, --temp <celsius>\n      Fixed temperature reading.\n      Example: weatherfx --temp 34\n\n  -w, --wind <m/s>\n      Fixed wind speed reading.\n      Example: weatherfx --wind 16\n\n  --humidity <percent>, --feels-like <celsius>\n      Extra readings shown in the weather panel.\n      Example: weatherfx --temp 31 --humidity 40 --feels-like 33\n\n  --weather-file <path>\n      Read readings from a TOML file (keys: temperature, wind, humidity,\n      feels_like, updated or temperature_2m, wind_speed_10m,\n      relative_humidity_2m, apparent_temperature, time; \"--\" = no value).\n      Example: weatherfx --weather-file ~/.cache/weather.toml\n\n  --refresh-secs <seconds>\n      Weather file refresh interval (min 1 max 86400).\n      Example: weatherfx --weather-file now.txt --refresh-secs 60\n\nEFFECTS:\n  --hot-temp <celsius>\n      Panels drip above this temperature.\n      Example: weatherfx --hot-temp 25\n\n  --windy <m/s>, --gust <m/s>\n      Sway and gusts above --windy, folds above --gust.\n      Example: weatherfx --windy 8 --gust 12\n\n  --drip-rate <per second>\n      Drops per second at full heat (min 0 max 100).\n      Example: weatherfx --temp 40 --drip-rate 6\n\n  --puddle-max <pixels>\n      Maximum puddle depth (min 0 max 2000).\n      Example: weatherfx --puddle-max 200\n\n  --shake <pixels>\n      Peak sway displacement (min 0 max 100).\n      Example: weatherfx --wind 18 --shake 16\n\n  --pacing <frame|elapsed>\n      frame: one step per tick. elapsed: steps follow wall time, capped.\n      Example: weatherfx --pacing frame\n\n  --seed <number>\n      Repeatable randomness.\n      Example: weatherfx --seed 42\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n      Example: weatherfx --fps 30\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: weatherfx --duration 10 --perf-stats\n\nAPPEARANCE:\n  --theme <storm|dusk|glacier>\n      Color theme.\n      Example: weatherfx --theme dusk\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: weatherfx --colormode 24\n\n  --color-bg <black|default-background|transparent>\n      Background mode.\n      Example: weatherfx --color-bg transparent\n\n  --ascii\n      ASCII glyphs only.\n      Example: weatherfx --ascii\n\nKEYS:\n  q, Esc        quit\n  p             pause / resume\n  space         reset drops, gusts and puddle\n  Up / Down     temperature +1 / -1\n  Right / Left  wind +1 / -1\n  x             clear readings\n  r             refresh weather file now\n\nHELP:\n  --check-bitcolor\n      Print detected terminal color capability and exit.\n\n  --help\n      Show short help.\n\n  --help-detail\n      Show this detailed help.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }

    let tail = "\nLIMITS / VALID RANGES:\n";
    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(tail));
    } else {
        print!("{}", tail);
    }
    println!("  --duration <seconds>     min 0.1 max 86400 (<=0 disables)");
    println!("  --panels <count>         min 1 max 6");
    println!("  --temp <celsius>         min -90 max 60");
    println!("  --wind <m/s>             min 0 max 120");
    println!("  --humidity <percent>     min 0 max 100");
    println!("  --refresh-secs <seconds> min 1 max 86400");
    println!("  --hot-temp <celsius>     min -60 max 60");
    println!("  --windy, --gust <m/s>    min 0 max 100");
    println!("  --drip-rate <number>     min 0 max 100");
    println!("  --puddle-max <pixels>    min 0 max 2000");
    println!("  --shake <pixels>         min 0 max 100");
    println!("  --fps <number>           min 1 max 240");
    println!("  --colormode <0|16|8|24>  allowed values only (8==256, 24==32)");
}
