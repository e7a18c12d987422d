// Copyright (c) 2026 rezky_nightky

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use env_logger::{Builder, Logger, Target, WriteStyle};
use log::{Level, LevelFilter};

fn format_line(secs: f64, level: Level, target: &str, msg: &str) -> String {
    format!("[{secs:>10.3}s {level:<5} {target}] {msg}")
}

pub fn parse_level(s: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(s.trim())
        .map_err(|_| format!("unknown log level '{s}' (off, error, warn, info, debug, trace)"))
}

/// Logger appending to `file`. The screen belongs to the renderer, so
/// nothing is ever written to stdout or stderr while running.
fn build(file: File, level: LevelFilter) -> Logger {
    let started = Instant::now();
    Builder::new()
        .filter_level(level)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(
                    started.elapsed().as_secs_f64(),
                    record.level(),
                    record.target(),
                    &record.args().to_string()
                )
            )
        })
        .build()
}

/// Installs the file logger. Without a path logging stays off.
pub fn init(path: Option<&Path>, level: LevelFilter) -> io::Result<()> {
    let Some(path) = path else {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let logger = build(file, level);
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Log, Metadata, Record};
    use rstest::rstest;

    #[rstest]
    #[case("info", LevelFilter::Info)]
    #[case(" DEBUG ", LevelFilter::Debug)]
    #[case("off", LevelFilter::Off)]
    #[case("Trace", LevelFilter::Trace)]
    fn parses_levels(#[case] input: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(input), Ok(expected));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn line_format() {
        assert_eq!(
            format_line(1.5, Level::Warn, "weatherfx::feed", "offline"),
            "[     1.500s WARN  weatherfx::feed] offline"
        );
    }

    #[test]
    fn file_logger_appends_records_at_or_above_level() {
        let path = std::env::temp_dir().join(format!("weatherfx-log-{}.log", std::process::id()));
        let file = File::create(&path).unwrap();
        let logger = build(file, LevelFilter::Info);

        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
        logger.log(
            &Record::builder()
                .args(format_args!("offline"))
                .level(Level::Warn)
                .target("weatherfx::feed")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden"))
                .level(Level::Debug)
                .target("weatherfx::feed")
                .build(),
        );
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.ends_with("s WARN  weatherfx::feed] offline\n"), "{text}");
        assert!(!text.contains("hidden"));
    }
}
