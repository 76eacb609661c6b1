use crate::error::{config_error, Error, WidgetResult};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use dotenvy::dotenv;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Config file used when `GCAL_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/gcal.toml";
/// Seconds between re-renders of the panel
pub const DEFAULT_REFRESH_INTERVAL: u64 = 30;
/// Seconds between fetches driven by the host
pub const DEFAULT_FETCH_INTERVAL: u64 = 300;
/// Seconds before a calendar request is abandoned
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
/// Upper bound for the fetch window
pub const MAX_DAYS_AHEAD: i64 = 3660;
pub const DEFAULT_CURRENT_ICON: &str = "🔸";
pub const DEFAULT_CONFLICT_ICON: &str = "🚨";
pub const DEFAULT_DATE_FORMAT: &str = "%a, %b %-d";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%a, %b %-d, %H:%M";

/// A title pattern and the color applied to matching events
#[derive(Debug, Clone)]
pub struct HighlightRule {
    pattern: Regex,
    color: String,
}

impl HighlightRule {
    /// Compile a rule. The pattern is lower-cased so matching is case-insensitive
    pub fn new(pattern: &str, color: &str) -> WidgetResult<Self> {
        if pattern.is_empty() {
            return Err(config_error("highlight pattern must not be empty"));
        }

        let pattern = Regex::new(&pattern.to_lowercase()).map_err(|e| {
            config_error(&format!("invalid highlight pattern '{}': {}", pattern, e))
        })?;

        Ok(Self {
            pattern,
            color: color.to_string(),
        })
    }

    /// Check the rule against an event summary
    pub fn matches(&self, summary: &str) -> bool {
        self.pattern.is_match(&summary.to_lowercase())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Title and description colors
#[derive(Debug, Clone)]
pub struct ColorConfig {
    pub title: String,
    pub description: String,
    pub past: String,
    /// Evaluated in order, the last matching rule wins
    pub highlights: Vec<HighlightRule>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            title: "white".to_string(),
            description: "white".to_string(),
            past: "gray".to_string(),
            highlights: Vec::new(),
        }
    }
}

/// Everything the renderer and the refresh scheduler need
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Seconds between re-renders, 0 disables the refresh loop
    pub refresh_interval: u64,
    pub colors: ColorConfig,
    /// Glyph prepended to events happening right now
    pub current_icon: String,
    /// Glyph prepended to events overlapping another event
    pub conflict_icon: String,
    pub display_location: bool,
    pub display_response_status: bool,
    /// The viewer's own address, used to find their attendee response
    pub email: Option<String>,
    /// Timezone used for display and calendar-day grouping
    pub timezone: Tz,
    /// strftime pattern for all-day events
    pub date_format: String,
    /// strftime pattern for timed events
    pub date_time_format: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            colors: ColorConfig::default(),
            current_icon: DEFAULT_CURRENT_ICON.to_string(),
            conflict_icon: DEFAULT_CONFLICT_ICON.to_string(),
            display_location: true,
            display_response_status: true,
            email: None,
            timezone: Tz::UTC,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
        }
    }
}

/// Google Calendar source settings
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub calendar_id: String,
    /// Pre-issued OAuth bearer token
    pub access_token: Option<String>,
    pub num_events: u32,
    pub days_ahead: i64,
    pub fetch_interval: u64,
    /// Seconds a single events request may take
    pub request_timeout: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            access_token: None,
            num_events: 10,
            days_ahead: 28,
            fetch_interval: DEFAULT_FETCH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Main configuration structure for the widget
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    calendar: RawCalendarConfig,
    widget: RawWidgetConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCalendarConfig {
    calendar_id: String,
    access_token: Option<String>,
    num_events: u32,
    days_ahead: i64,
    fetch_interval: u64,
    request_timeout: u64,
}

impl Default for RawCalendarConfig {
    fn default() -> Self {
        let defaults = CalendarConfig::default();
        Self {
            calendar_id: defaults.calendar_id,
            access_token: defaults.access_token,
            num_events: defaults.num_events,
            days_ahead: defaults.days_ahead,
            fetch_interval: defaults.fetch_interval,
            request_timeout: defaults.request_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawWidgetConfig {
    refresh_interval: u64,
    colors: RawColorConfig,
    current_icon: String,
    conflict_icon: String,
    display_location: bool,
    display_response_status: bool,
    email: Option<String>,
    timezone: String,
    date_format: String,
    date_time_format: String,
}

impl Default for RawWidgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            colors: RawColorConfig::default(),
            current_icon: DEFAULT_CURRENT_ICON.to_string(),
            conflict_icon: DEFAULT_CONFLICT_ICON.to_string(),
            display_location: true,
            display_response_status: true,
            email: None,
            timezone: "UTC".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawColorConfig {
    title: String,
    description: String,
    past: String,
    // Kept untyped so malformed entries get a precise error
    highlights: Vec<toml::Value>,
}

impl Default for RawColorConfig {
    fn default() -> Self {
        let defaults = ColorConfig::default();
        Self {
            title: defaults.title,
            description: defaults.description,
            past: defaults.past,
            highlights: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> WidgetResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("GCAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut raw = if Path::new(&path).exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<RawConfig>(&content)?
        } else {
            RawConfig::default()
        };

        // Environment takes precedence over the file
        if let Ok(calendar_id) = env::var("GOOGLE_CALENDAR_ID") {
            raw.calendar.calendar_id = calendar_id;
        }
        if let Ok(token) = env::var("GOOGLE_ACCESS_TOKEN") {
            raw.calendar.access_token = Some(token);
        }
        if let Ok(email) = env::var("GCAL_EMAIL") {
            raw.widget.email = Some(email);
        }
        if let Ok(timezone) = env::var("TIMEZONE") {
            raw.widget.timezone = timezone;
        }

        raw.validate()
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(content: &str) -> WidgetResult<Self> {
        toml::from_str::<RawConfig>(content)?.validate()
    }
}

impl RawConfig {
    fn validate(self) -> WidgetResult<Config> {
        let calendar = self.calendar;
        if calendar.calendar_id.trim().is_empty() {
            return Err(config_error("calendar_id must not be empty"));
        }
        if calendar.num_events == 0 {
            return Err(config_error("num_events must be greater than zero"));
        }
        if !(1..=MAX_DAYS_AHEAD).contains(&calendar.days_ahead) {
            return Err(config_error(&format!(
                "days_ahead must be between 1 and {}, got {}",
                MAX_DAYS_AHEAD, calendar.days_ahead
            )));
        }
        if calendar.request_timeout == 0 {
            return Err(config_error("request_timeout must be greater than zero"));
        }

        let widget = self.widget;
        let timezone = widget
            .timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("unknown timezone '{}'", widget.timezone)))?;

        let highlights = widget
            .colors
            .highlights
            .iter()
            .enumerate()
            .map(|(index, value)| parse_highlight(index, value))
            .collect::<WidgetResult<Vec<_>>>()?;

        Ok(Config {
            calendar: CalendarConfig {
                calendar_id: calendar.calendar_id,
                access_token: calendar.access_token.filter(|t| !t.is_empty()),
                num_events: calendar.num_events,
                days_ahead: calendar.days_ahead,
                fetch_interval: calendar.fetch_interval,
                request_timeout: calendar.request_timeout,
            },
            widget: WidgetConfig {
                refresh_interval: widget.refresh_interval,
                colors: ColorConfig {
                    title: widget.colors.title,
                    description: widget.colors.description,
                    past: widget.colors.past,
                    highlights,
                },
                current_icon: widget.current_icon,
                conflict_icon: widget.conflict_icon,
                display_location: widget.display_location,
                display_response_status: widget.display_response_status,
                email: widget.email.filter(|e| !e.is_empty()),
                timezone,
                date_format: validate_format("date_format", widget.date_format)?,
                date_time_format: validate_format("date_time_format", widget.date_time_format)?,
            },
        })
    }
}

/// Turn one `[pattern, color]` entry into a rule
fn parse_highlight(index: usize, value: &toml::Value) -> WidgetResult<HighlightRule> {
    let pair = value.as_array().ok_or_else(|| {
        config_error(&format!(
            "highlight #{} must be a [pattern, color] array, got {}",
            index,
            value.type_str()
        ))
    })?;

    if pair.len() != 2 {
        return Err(config_error(&format!(
            "highlight #{} must have exactly 2 elements, got {}",
            index,
            pair.len()
        )));
    }

    let (Some(pattern), Some(color)) = (pair[0].as_str(), pair[1].as_str()) else {
        return Err(config_error(&format!(
            "highlight #{} must contain two strings",
            index
        )));
    };

    HighlightRule::new(pattern, color).map_err(|e| match e {
        Error::Config(message) => config_error(&format!("highlight #{}: {}", index, message)),
        other => other,
    })
}

fn validate_format(name: &str, format: String) -> WidgetResult<String> {
    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(config_error(&format!(
            "{} '{}' is not a valid strftime pattern",
            name, format
        )));
    }
    Ok(format)
}
