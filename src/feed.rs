// Copyright (c) 2026 rezky_nightky

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{de, Deserialize, Deserializer};

use crate::weather::{WeatherReport, WeatherState};

/// Where weather reports come from. Implementations decide when a new
/// report is due; the caller polls every frame.
pub trait WeatherFeed {
    fn describe(&self) -> String;

    /// `None` when nothing is due yet.
    fn poll(&mut self, now: Instant) -> Option<Result<WeatherReport, String>>;

    /// Makes the next poll fetch regardless of the schedule.
    fn force(&mut self) {}
}

/// Values given on the command line. Delivered once.
pub struct FixedFeed {
    report: Option<WeatherReport>,
}

impl FixedFeed {
    pub fn new(report: WeatherReport) -> Self {
        Self {
            report: Some(report),
        }
    }
}

impl WeatherFeed for FixedFeed {
    fn describe(&self) -> String {
        "command line".to_string()
    }

    fn poll(&mut self, _now: Instant) -> Option<Result<WeatherReport, String>> {
        self.report.take().map(Ok)
    }
}

/// A TOML weather file re-read on a fixed interval.
pub struct FileFeed {
    path: PathBuf,
    every: Duration,
    next_due: Option<Instant>,
}

impl FileFeed {
    pub fn new(path: PathBuf, every: Duration) -> Self {
        Self {
            path,
            every,
            next_due: None,
        }
    }
}

impl WeatherFeed for FileFeed {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn poll(&mut self, now: Instant) -> Option<Result<WeatherReport, String>> {
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        self.next_due = Some(now + self.every);
        debug!("reading weather from {}", self.path.display());
        Some(
            fs::read_to_string(&self.path)
                .map_err(|e| format!("{}: {e}", self.path.display()))
                .and_then(|text| parse_report(&text)),
        )
    }

    fn force(&mut self) {
        self.next_due = None;
    }
}

/// On-disk weather record (TOML). The short names and the forecast-API
/// names are both accepted; unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct ReportFile {
    #[serde(default, alias = "temperature_2m", deserialize_with = "reading")]
    temperature: Option<f32>,
    #[serde(default, alias = "wind_speed_10m", deserialize_with = "reading")]
    wind: Option<f32>,
    #[serde(default, alias = "relative_humidity_2m", deserialize_with = "reading")]
    humidity: Option<f32>,
    #[serde(default, alias = "apparent_temperature", deserialize_with = "reading")]
    feels_like: Option<f32>,
    #[serde(default, alias = "time")]
    updated: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
}

/// A number, or a quoted placeholder (`"--"`, `"null"`, `""`) for a sensor
/// with no value. Non-finite numbers count as missing.
fn reading<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f32>, D::Error> {
    let v = match RawReading::deserialize(d)? {
        RawReading::Number(v) => v as f32,
        RawReading::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s == "--" || s.eq_ignore_ascii_case("null") {
                return Ok(None);
            }
            s.parse::<f32>()
                .map_err(|_| de::Error::custom(format!("invalid reading: {s}")))?
        }
    };
    Ok(v.is_finite().then_some(v))
}

pub fn parse_report(text: &str) -> Result<WeatherReport, String> {
    let file: ReportFile = toml::from_str(text).map_err(|e| e.message().to_string())?;
    Ok(WeatherReport {
        temperature_c: file.temperature,
        wind_speed_ms: file.wind,
        humidity_pct: file.humidity,
        feels_like_c: file.feels_like,
        updated: file.updated.filter(|s| !s.trim().is_empty()),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    Waiting,
    Live,
    Manual,
    Unavailable(String),
}

impl FeedStatus {
    pub fn label(&self) -> &str {
        match self {
            FeedStatus::Waiting => "waiting for weather",
            FeedStatus::Live => "live",
            FeedStatus::Manual => "manual",
            FeedStatus::Unavailable(_) => "weather unavailable",
        }
    }
}

/// Drives a feed and folds its results into the shared weather state.
/// A failed fetch keeps the previous reading.
pub struct WeatherSource {
    feed: Option<Box<dyn WeatherFeed>>,
    status: FeedStatus,
}

impl WeatherSource {
    pub fn new(feed: Option<Box<dyn WeatherFeed>>) -> Self {
        Self {
            feed,
            status: FeedStatus::Waiting,
        }
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn describe(&self) -> String {
        self.feed
            .as_ref()
            .map(|f| f.describe())
            .unwrap_or_else(|| "none".to_string())
    }

    pub fn refresh_now(&mut self) {
        if let Some(f) = self.feed.as_mut() {
            f.force();
        }
    }

    /// Marks the reading as edited by hand.
    pub fn mark_manual(&mut self) {
        self.status = FeedStatus::Manual;
    }

    /// Returns true when the weather badge changed.
    pub fn update(&mut self, now: Instant, weather: &mut WeatherState) -> bool {
        let Some(result) = self.feed.as_mut().and_then(|f| f.poll(now)) else {
            return false;
        };
        match result {
            Ok(report) => {
                self.status = FeedStatus::Live;
                weather.apply(report)
            }
            Err(e) => {
                warn!("weather refresh failed: {e}");
                self.status = FeedStatus::Unavailable(e);
                false
            }
        }
    }
}
