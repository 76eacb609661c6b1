use crate::error::WidgetResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod calendar_widget;
pub mod google_calendar;

pub use calendar_widget::CalendarWidget;
pub use google_calendar::{CalendarEvent, GoogleCalendarHandle};

/// Where the widget gets its events from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch upcoming events ordered by start time
    async fn fetch_events(&self) -> WidgetResult<Vec<CalendarEvent>>;
}

/// Text surface the widget renders into
pub trait DisplaySink: Send + Sync {
    /// Replace the displayed text
    fn set_text(&self, text: &str);

    /// Record when the data was last fetched successfully
    fn mark_refreshed(&self, at: DateTime<Utc>);

    fn enable(&self) {}

    fn disable(&self) {}
}
