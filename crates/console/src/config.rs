//! Console configuration, read from `ZBALO_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::charts::Color;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_STATUS_MS: u64 = 3000;
const DEFAULT_CHART_DIR: &str = "charts";
const DEFAULT_PREFS_FILE: &str = "zbalo_prefs.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Base URL of the remote record service, without the `/api` prefix.
    pub api_url: String,
    pub auth_token: Option<String>,
    /// Default lifetime of a transient status banner.
    pub status_duration: Duration,
    pub chart_dir: PathBuf,
    /// Where the tab order preference is kept between runs.
    pub prefs_path: PathBuf,
    pub reminders: ReminderThresholds,
    pub charts: ChartConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            status_duration: Duration::from_millis(DEFAULT_STATUS_MS),
            chart_dir: PathBuf::from(DEFAULT_CHART_DIR),
            prefs_path: PathBuf::from(DEFAULT_PREFS_FILE),
            reminders: ReminderThresholds::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values keep
    /// their defaults, unparsable numbers too.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("ZBALO_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config.auth_token = get("ZBALO_AUTH_TOKEN");
        if let Some(ms) = get("ZBALO_STATUS_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => config.status_duration = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %ms, "ignoring invalid ZBALO_STATUS_MS"),
            }
        }
        if let Some(dir) = get("ZBALO_CHART_DIR") {
            config.chart_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("ZBALO_PREFS_PATH") {
            config.prefs_path = PathBuf::from(path);
        }
        config
    }
}

/// Day-count boundaries for reminders.
///
/// These are independent settings: the badge window is not the dashboard
/// window, and neither is the end of the "soon" tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReminderThresholds {
    /// Last day (inclusive) still classified urgent.
    pub urgent_within: i64,
    /// Last day (inclusive) still classified soon.
    pub soon_within: i64,
    /// Reminders shown on the dashboard.
    pub dashboard_within: i64,
    /// Reminders counted on the tab badge.
    pub badge_within: i64,
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        Self {
            urgent_within: 3,
            soon_within: 7,
            dashboard_within: 7,
            badge_within: 14,
        }
    }
}

/// Raster chart geometry and colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Horizontal space between bars.
    pub gutter: u32,
    /// Left edge of the first bar.
    pub margin: u32,
    /// Space below the bars reserved for labels.
    pub label_band: u32,
    pub background: Color,
    pub placeholder: Color,
    pub label: Color,
    pub value_label: Color,
    pub revenue: Color,
    pub maintenance: Color,
    pub products: Color,
    pub pie_palette: Vec<Color>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 160,
            gutter: 4,
            margin: 10,
            label_band: 20,
            background: Color::rgb(0xff, 0xff, 0xff),
            placeholder: Color::rgb(0xcc, 0xcc, 0xcc),
            label: Color::rgb(0x99, 0x99, 0x99),
            value_label: Color::rgb(0x55, 0x55, 0x55),
            revenue: Color::rgb(0x7a, 0x9e, 0x6a),
            maintenance: Color::rgb(0x7a, 0xb5, 0xc8),
            products: Color::rgb(0xc9, 0xa8, 0x4c),
            pie_palette: vec![
                Color::rgb(0x7a, 0x9e, 0x6a),
                Color::rgb(0xc9, 0xa8, 0x4c),
                Color::rgb(0xa0, 0x45, 0x20),
                Color::rgb(0x88, 0x88, 0x88),
            ],
        }
    }
}
