// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod feed;
mod frame;
mod fx;
mod geom;
mod gust;
mod layout;
mod logging;
mod palette;
mod panel;
mod puddle;
mod rain;
mod random;
mod runtime;
mod scene;
mod sway;
mod terminal;
mod weather;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, Args, ColorBg,
};
use crate::feed::{FileFeed, FixedFeed, WeatherFeed, WeatherSource};
use crate::frame::Frame;
use crate::fx::{EffectLoop, FxConfig};
use crate::layout::GridLayout;
use crate::palette::build_palette;
use crate::panel::PanelRegistry;
use crate::random::RngSource;
use crate::runtime::{ColorMode, GlyphMode, Glyphs};
use crate::scene::{Hud, Scene};
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::weather::{Thresholds, WeatherReport, WeatherState};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const PANEL_TITLES: [&str; 3] = ["weather", "effects", "status"];

fn build_info() -> &'static str {
    env!("WEATHERFX_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_usize_range(name: &str, v: usize, min: usize, max: usize) -> usize {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

fn panel_titles(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match PANEL_TITLES.get(i) {
            Some(t) => t.to_string(),
            None => format!("panel {}", i + 1),
        })
        .collect()
}

fn cli_report(args: &Args) -> Option<WeatherReport> {
    let temperature_c = args.temp.map(|t| require_f32_range("--temp", t, -90.0, 60.0));
    let wind_speed_ms = args.wind.map(|w| require_f32_range("--wind", w, 0.0, 120.0));
    let humidity_pct = args
        .humidity
        .map(|h| require_f32_range("--humidity", h, 0.0, 100.0));
    let feels_like_c = args
        .feels_like
        .map(|t| require_f32_range("--feels-like", t, -90.0, 60.0));
    if temperature_c.is_none()
        && wind_speed_ms.is_none()
        && humidity_pct.is_none()
        && feels_like_c.is_none()
    {
        return None;
    }
    Some(WeatherReport {
        temperature_c,
        wind_speed_ms,
        humidity_pct,
        feels_like_c,
        updated: Some("command line".to_string()),
    })
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let stop = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    info!("signal {} received, shutting down", sig);
                    stop.store(true, Ordering::SeqCst);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(effective));
        }
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        let sha = env!("WEATHERFX_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);
    let glyph_mode = if args.ascii || default_to_ascii() {
        GlyphMode::Ascii
    } else {
        GlyphMode::Unicode
    };

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });
    let panel_count = require_usize_range("--panels", args.panels, 1, 6);
    let refresh_s = require_f64_range("--refresh-secs", args.refresh_secs, 1.0, 86400.0);

    let mut fx_cfg = FxConfig::default();
    fx_cfg.thresholds = Thresholds {
        hot_c: require_f32_range("--hot-temp", args.hot_temp, -60.0, 60.0),
        windy_ms: require_f32_range("--windy", args.windy, 0.0, 100.0),
        gust_ms: require_f32_range("--gust", args.gust, 0.0, 100.0),
    };
    fx_cfg.drip_rate = require_f32_range("--drip-rate", args.drip_rate, 0.0, 100.0);
    fx_cfg.puddle_max = require_f32_range("--puddle-max", args.puddle_max, 0.0, 2000.0);
    fx_cfg.sway.shake = require_f32_range("--shake", args.shake, 0.0, 100.0);
    fx_cfg.pacing = args.pacing.into();

    let log_level = match logging::parse_level(&args.log_level) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(args.log_file.as_deref(), log_level) {
        eprintln!("failed to open log file: {}", e);
        std::process::exit(1);
    }

    let mut weather = WeatherState::new(fx_cfg.thresholds);
    let initial = cli_report(&args);
    let feed: Option<Box<dyn WeatherFeed>> = match (&args.weather_file, initial) {
        (Some(path), initial) => {
            if let Some(report) = initial {
                weather.apply(report);
            }
            Some(Box::new(FileFeed::new(
                path.clone(),
                Duration::from_secs_f64(refresh_s),
            )))
        }
        (None, Some(report)) => Some(Box::new(FixedFeed::new(report))),
        (None, None) => None,
    };
    let mut source = WeatherSource::new(feed);
    let source_name = source.describe();

    let mut rng = match args.seed {
        Some(seed) => RngSource(StdRng::seed_from_u64(seed)),
        None => RngSource::from_os(),
    };

    let palette = build_palette(
        args.theme.into(),
        color_mode,
        matches!(
            args.color_bg,
            ColorBg::DefaultBackground | ColorBg::Transparent
        ),
    );

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;

    let mut layout = GridLayout::new(w, h, panel_count);
    let mut fx = EffectLoop::new(fx_cfg, PanelRegistry::new(panel_titles(panel_count)));
    let mut scene = Scene::new(Glyphs::for_mode(glyph_mode));
    let mut frame = Frame::new(w, h, palette.bg);

    info!(
        "weatherfx {} started: {}x{} cells, {} panels, feed {}",
        env!("CARGO_PKG_VERSION"),
        w,
        h,
        panel_count,
        source_name
    );

    let start_time = Instant::now();
    let end_time = duration_s
        .filter(|&s| s > 0.0)
        .map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut paused_since: Option<f64> = None;
    let mut running = true;

    let mut perf_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;

    while running && !fx.is_disposed() {
        if end_time.is_some_and(|end| Instant::now() >= end) || stop.load(Ordering::SeqCst) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let ev = Terminal::read_event()?;
                let now = start_time.elapsed().as_secs_f64();
                match ev {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }

                        let reading = weather.reading();
                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                            (KeyCode::Char('c'), KeyModifiers::CONTROL) => running = false,
                            (KeyCode::Char(' '), _) => {
                                fx.reset();
                                scene.clear();
                            }
                            (KeyCode::Char('p'), _) => match paused_since.take() {
                                Some(at) => {
                                    fx.resume(now);
                                    scene.shift_clocks(now - at);
                                }
                                None => {
                                    fx.pause(now);
                                    paused_since = Some(now);
                                }
                            },
                            (KeyCode::Up, _) | (KeyCode::Down, _) => {
                                let step = if k.code == KeyCode::Up { 1.0 } else { -1.0 };
                                let t = reading.temperature_c.unwrap_or(fx_cfg.thresholds.hot_c);
                                weather.adjust(
                                    Some((t + step).clamp(-90.0, 60.0)),
                                    reading.wind_speed_ms,
                                );
                                source.mark_manual();
                            }
                            (KeyCode::Left, _) | (KeyCode::Right, _) => {
                                let step = if k.code == KeyCode::Right { 1.0 } else { -1.0 };
                                let v = reading.wind_speed_ms.unwrap_or(fx_cfg.thresholds.windy_ms);
                                weather.adjust(
                                    reading.temperature_c,
                                    Some((v + step).clamp(0.0, 120.0)),
                                );
                                source.mark_manual();
                            }
                            (KeyCode::Char('x'), _) => {
                                weather.adjust(None, None);
                                source.mark_manual();
                            }
                            (KeyCode::Char('r'), _) => source.refresh_now(),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() || stop.load(Ordering::SeqCst) {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running || stop.load(Ordering::SeqCst) {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            layout.resize(nw, nh);
            frame = Frame::new(nw, nh, palette.bg);
            term.invalidate();
        }

        let work_start = Instant::now();
        source.update(work_start, &mut weather);

        let now = start_time.elapsed().as_secs_f64();
        let events = fx.tick(now, &weather.reading(), &layout, &mut rng);
        scene.absorb(events, now);

        let hud = Hud {
            weather: &weather,
            feed: source.status(),
            source: &source_name,
            paused: fx.is_paused(),
        };
        scene.draw(&mut frame, &fx, &hud, &palette, paused_since.unwrap_or(now));
        term.draw(&frame)?;

        let work_s = work_start.elapsed().as_secs_f32();
        perf_frames = perf_frames.saturating_add(1);
        perf_work_sum_s += work_s as f64;
        perf_work_max_s = perf_work_max_s.max(work_s);

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let stats = fx.stats();
    fx.dispose();
    drop(term);
    log::logger().flush();

    if args.perf_stats {
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);
        let avg_work_ms = (perf_work_sum_s / frames as f64) * 1000.0;
        let avg_fps = (perf_frames as f64) / elapsed_s;

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", avg_fps);
        println!("  frames: {}", perf_frames);
        println!("  sim_frames: {}", stats.frames);
        println!("  avg_work_ms: {:.3}", avg_work_ms);
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
        println!("  drops_spawned: {}", stats.drops_spawned);
        println!("  splashes: {}", stats.splashes);
        println!("  gusts: {}", stats.gusts);
        println!("  folds: {}", stats.folds);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_fill_past_named_panels() {
        assert_eq!(
            panel_titles(5),
            vec!["weather", "effects", "status", "panel 4", "panel 5"]
        );
        assert_eq!(panel_titles(1), vec!["weather"]);
    }
}
