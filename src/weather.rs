// Copyright (c) 2026 rezky_nightky

use log::info;

/// Temperature and wind thresholds that switch effect branches on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub hot_c: f32,
    pub windy_ms: f32,
    pub gust_ms: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hot_c: 30.0,
            windy_ms: 10.0,
            gust_ms: 14.0,
        }
    }
}

/// The two values the effect core reacts to. `None` means "not available
/// yet" and switches the matching effect off entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeatherReading {
    pub temperature_c: Option<f32>,
    pub wind_speed_ms: Option<f32>,
}

impl WeatherReading {
    pub const UNAVAILABLE: WeatherReading = WeatherReading {
        temperature_c: None,
        wind_speed_ms: None,
    };

    pub fn new(temperature_c: Option<f32>, wind_speed_ms: Option<f32>) -> Self {
        Self {
            temperature_c: temperature_c.filter(|v| v.is_finite()),
            wind_speed_ms: wind_speed_ms.filter(|v| v.is_finite()),
        }
    }

    /// Degrees above `threshold` when strictly hotter than it.
    pub fn heat_above(&self, threshold: f32) -> Option<f32> {
        self.temperature_c
            .filter(|&t| t > threshold)
            .map(|t| t - threshold)
    }

    /// Wind speed when strictly above `threshold`.
    pub fn wind_above(&self, threshold: f32) -> Option<f32> {
        self.wind_speed_ms.filter(|&w| w > threshold)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
    Calm,
    Hot,
    Windy,
    HotWindy,
}

impl Badge {
    pub fn classify(reading: &WeatherReading, thresholds: &Thresholds) -> Self {
        let hot = reading.heat_above(thresholds.hot_c).is_some();
        let windy = reading.wind_above(thresholds.windy_ms).is_some();
        match (hot, windy) {
            (true, true) => Badge::HotWindy,
            (true, false) => Badge::Hot,
            (false, true) => Badge::Windy,
            (false, false) => Badge::Calm,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::Calm => "calm",
            Badge::Hot => "hot",
            Badge::Windy => "windy",
            Badge::HotWindy => "hot + windy",
        }
    }

    pub fn is_hot(self) -> bool {
        matches!(self, Badge::Hot | Badge::HotWindy)
    }
}

/// Everything the weather collaborator knows; the core only sees
/// [`WeatherReport::reading`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: Option<f32>,
    pub wind_speed_ms: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub feels_like_c: Option<f32>,
    pub updated: Option<String>,
}

impl WeatherReport {
    pub fn reading(&self) -> WeatherReading {
        WeatherReading::new(self.temperature_c, self.wind_speed_ms)
    }
}

/// Latest report plus the badge derived from it.
#[derive(Clone, Debug)]
pub struct WeatherState {
    report: WeatherReport,
    reading: WeatherReading,
    badge: Badge,
    thresholds: Thresholds,
}

impl WeatherState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            report: WeatherReport::default(),
            reading: WeatherReading::UNAVAILABLE,
            badge: Badge::Calm,
            thresholds,
        }
    }

    pub fn reading(&self) -> WeatherReading {
        self.reading
    }

    pub fn report(&self) -> &WeatherReport {
        &self.report
    }

    pub fn badge(&self) -> Badge {
        self.badge
    }

    /// Replaces the report (both reading fields at once) and recomputes the
    /// badge. Returns true when the badge changed.
    pub fn apply(&mut self, report: WeatherReport) -> bool {
        self.reading = report.reading();
        self.report = report;
        let badge = Badge::classify(&self.reading, &self.thresholds);
        if badge == self.badge {
            return false;
        }
        info!(
            "weather badge {} -> {} (temp {:?} wind {:?})",
            self.badge.label(),
            badge.label(),
            self.reading.temperature_c,
            self.reading.wind_speed_ms
        );
        self.badge = badge;
        true
    }

    /// Applies a manual change to the reading fields, keeping the rest of
    /// the report.
    pub fn adjust(&mut self, temperature_c: Option<f32>, wind_speed_ms: Option<f32>) -> bool {
        let mut report = self.report.clone();
        report.temperature_c = temperature_c;
        report.wind_speed_ms = wind_speed_ms;
        report.updated = Some("manual".to_string());
        self.apply(report)
    }
}
