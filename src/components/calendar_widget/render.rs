use super::conflicts::conflicts;
use super::highlight::{description_color, event_title_color};
use super::time::{parse_event_times, EventTimes};
use crate::components::google_calendar::models::{CalendarEvent, EventSnapshot, ResponseStatus};
use crate::config::WidgetConfig;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

/// Color tag restoring the default after a colored span
const RESET: &str = "[white]";
const RESPONSE_COLOR: &str = "[gray]";
const COUNTDOWN_COLOR: &str = "[lightblue]";

pub const ACCEPTED_ICON: &str = "\u{2714}\u{fe0e} ";
pub const DECLINED_ICON: &str = "\u{2718} ";
pub const NEEDS_ACTION_ICON: &str = "? ";
pub const TENTATIVE_ICON: &str = "~ ";

/// Builds the panel body from an event snapshot
#[derive(Debug, Clone)]
pub struct Renderer {
    config: WidgetConfig,
}

impl Renderer {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Render every event in snapshot order. A missing or empty snapshot
    /// renders as the empty string
    pub fn render(&self, snapshot: Option<&EventSnapshot>, now: DateTime<Utc>) -> String {
        let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
            return String::new();
        };

        let mut out = String::new();
        let mut prev_day: Option<NaiveDate> = None;

        for event in snapshot.events() {
            // Reported once per fetch by the widget, this runs on every tick
            let times = match parse_event_times(event) {
                Ok(times) => Some(times),
                Err(e) => {
                    debug!("Rendering event '{}' without time decorations: {}", event.id, e);
                    None
                }
            };

            let day = times.map(|t| t.calendar_day(self.config.timezone));
            let divider = match (prev_day, day) {
                (Some(prev), Some(current)) => prev != current,
                _ => false,
            };

            out.push_str(&self.render_event(event, times.as_ref(), snapshot, divider, now));
            prev_day = day;
        }

        out
    }

    fn render_event(
        &self,
        event: &CalendarEvent,
        times: Option<&EventTimes>,
        snapshot: &EventSnapshot,
        divider: bool,
        now: DateTime<Utc>,
    ) -> String {
        let is_now = times.is_some_and(|t| t.is_now(now));
        let is_past = times.is_some_and(|t| t.is_past(now, self.config.timezone));
        let conflict = conflicts(event, snapshot);
        let colors = &self.config.colors;
        let desc_color = description_color(colors, is_past);

        let timestamp = match times {
            Some(t) => t.format_start(
                self.config.timezone,
                &self.config.date_format,
                &self.config.date_time_format,
            ),
            None => raw_start(event),
        };
        let until = times.map(|t| t.until(now)).unwrap_or_default();
        let until = if until.is_empty() {
            until
        } else {
            format!("{}{}{}", COUNTDOWN_COLOR, until, RESET)
        };

        format!(
            "{} {}[{}]{}{}\n {}[{}]{} {}{}\n\n",
            if divider { "\n" } else { "" },
            self.response_icon(event),
            event_title_color(colors, &event.summary, is_past),
            self.title(event, is_now, conflict),
            RESET,
            self.location(event, desc_color),
            desc_color,
            timestamp,
            until,
            RESET,
        )
    }

    fn title(&self, event: &CalendarEvent, is_now: bool, conflict: bool) -> String {
        let mut title = event.summary.clone();
        if is_now {
            title = format!("{} {}", self.config.current_icon, title);
        }
        if conflict {
            title = format!("{} {}", self.config.conflict_icon, title);
        }
        title
    }

    fn location(&self, event: &CalendarEvent, color: &str) -> String {
        if !self.config.display_location {
            return String::new();
        }

        match event.location.as_deref() {
            Some(location) if !location.is_empty() => format!("[{}]{}\n ", color, location),
            _ => String::new(),
        }
    }

    fn response_icon(&self, event: &CalendarEvent) -> String {
        if !self.config.display_response_status {
            return String::new();
        }

        let response = self
            .config
            .email
            .as_deref()
            .and_then(|email| event.response_for(email));

        let icon = match response {
            Some(ResponseStatus::Accepted) => ACCEPTED_ICON,
            Some(ResponseStatus::Declined) => DECLINED_ICON,
            Some(ResponseStatus::NeedsAction) => NEEDS_ACTION_ICON,
            Some(ResponseStatus::Tentative) => TENTATIVE_ICON,
            Some(ResponseStatus::None) | None => "",
        };

        format!("{}{}", RESPONSE_COLOR, icon)
    }
}

/// Start value exactly as fetched, shown when it cannot be parsed
fn raw_start(event: &CalendarEvent) -> String {
    event
        .start
        .date_time
        .clone()
        .or_else(|| event.start.date.clone())
        .unwrap_or_default()
}
