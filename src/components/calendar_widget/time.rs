use crate::components::google_calendar::models::{CalendarEvent, EventDateTime};
use crate::error::{parse_error, WidgetResult};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// A parsed start or end value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    AllDay(NaiveDate),
    Timed(DateTime<FixedOffset>),
}

/// Parsed start and end of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimes {
    pub start: EventTime,
    pub end: Option<EventTime>,
}

/// Parse a single start/end value. A missing value yields `Ok(None)`
pub fn parse_event_time(value: &EventDateTime) -> WidgetResult<Option<EventTime>> {
    if let Some(date_time) = &value.date_time {
        let parsed = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| parse_error(&format!("'{}': {}", date_time, e)))?;
        Ok(Some(EventTime::Timed(parsed)))
    } else if let Some(date) = &value.date {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| parse_error(&format!("'{}': {}", date, e)))?;
        Ok(Some(EventTime::AllDay(parsed)))
    } else {
        Ok(None)
    }
}

/// Parse both ends of an event. The start is required
pub fn parse_event_times(event: &CalendarEvent) -> WidgetResult<EventTimes> {
    let start = parse_event_time(&event.start)?
        .ok_or_else(|| parse_error(&format!("event '{}' has no start", event.id)))?;
    let end = parse_event_time(&event.end)?;

    Ok(EventTimes { start, end })
}

/// Start and end instants of a timed event, `None` for all-day events
pub fn timed_interval(
    event: &CalendarEvent,
) -> WidgetResult<Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>> {
    if event.is_date_only() {
        return Ok(None);
    }

    match parse_event_times(event)? {
        EventTimes {
            start: EventTime::Timed(start),
            end: Some(EventTime::Timed(end)),
        } => Ok(Some((start, end))),
        EventTimes {
            start: EventTime::Timed(_),
            ..
        } => Err(parse_error(&format!(
            "event '{}' has a timed start but no timed end",
            event.id
        ))),
        _ => Ok(None),
    }
}

impl EventTimes {
    /// Happening right now. All-day events are never "now"
    pub fn is_now(&self, now: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (EventTime::Timed(start), Some(EventTime::Timed(end))) => start < now && now < end,
            _ => false,
        }
    }

    /// Entirely in the past.
    ///
    /// All-day events end at the start of their exclusive end date, or the
    /// day after they start when no end date is given. A start on the last
    /// representable date has no next day and is never past.
    pub fn is_past(&self, now: DateTime<Utc>, timezone: Tz) -> bool {
        match self.start {
            EventTime::Timed(start) => !self.is_now(now) && start < now,
            EventTime::AllDay(start) => {
                let end = match self.end {
                    Some(EventTime::AllDay(end)) => Some(end),
                    _ => start.succ_opt(),
                };
                end.is_some_and(|end| end <= now.with_timezone(&timezone).date_naive())
            }
        }
    }

    /// Calendar day the event starts on, in the display timezone
    pub fn calendar_day(&self, timezone: Tz) -> NaiveDate {
        match self.start {
            EventTime::AllDay(date) => date,
            EventTime::Timed(start) => start.with_timezone(&timezone).date_naive(),
        }
    }

    /// Countdown label until the start, empty once the event has started.
    /// All-day events carry no countdown
    pub fn until(&self, now: DateTime<Utc>) -> String {
        match self.start {
            EventTime::Timed(start) => countdown_label(start.with_timezone(&Utc) - now),
            EventTime::AllDay(_) => String::new(),
        }
    }

    /// Absolute start time using the configured strftime patterns
    pub fn format_start(&self, timezone: Tz, date_format: &str, date_time_format: &str) -> String {
        let mut out = String::new();
        // write! reports a bad pattern as an error instead of panicking
        let result = match self.start {
            EventTime::AllDay(date) => write!(out, "{}", date.format(date_format)),
            EventTime::Timed(start) => write!(
                out,
                "{}",
                start.with_timezone(&timezone).format(date_time_format)
            ),
        };

        if result.is_err() {
            out.clear();
        }
        out
    }
}

/// Round to the nearest minute, halves away from zero
fn round_to_minutes(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds();
    if millis < 0 {
        -((-millis + 30_000) / 60_000)
    } else {
        (millis + 30_000) / 60_000
    }
}

/// Show only the coarsest nonzero unit of the time left: `3d`, `5h` or `12m`.
/// Negative durations give an empty label
pub fn countdown_label(duration: Duration) -> String {
    let minutes = round_to_minutes(duration);
    if minutes < 0 {
        return String::new();
    }

    let days = minutes / MINUTES_PER_DAY;
    let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let mins = minutes % MINUTES_PER_HOUR;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn timed(start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: "timed".to_string(),
            start: EventDateTime::date_time(start),
            end: EventDateTime::date_time(end),
            ..Default::default()
        }
    }

    fn all_day(start: &str, end: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            id: "all-day".to_string(),
            start: EventDateTime::date(start),
            end: end.map(EventDateTime::date).unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn test_countdown_label() {
        assert_eq!(countdown_label(Duration::hours(25) + Duration::minutes(30)), "1d");
        assert_eq!(countdown_label(Duration::minutes(90)), "1h");
        assert_eq!(countdown_label(Duration::minutes(45)), "45m");
        assert_eq!(countdown_label(Duration::minutes(-5)), "");
        assert_eq!(countdown_label(Duration::zero()), "0m");
        assert_eq!(countdown_label(Duration::days(3) + Duration::hours(23)), "3d");
    }

    #[test]
    fn test_countdown_rounds_to_nearest_minute() {
        assert_eq!(countdown_label(Duration::seconds(59 * 60 + 31)), "1h");
        assert_eq!(countdown_label(Duration::seconds(59 * 60 + 29)), "59m");
        // Started moments ago still rounds to zero
        assert_eq!(countdown_label(Duration::seconds(-29)), "0m");
        assert_eq!(countdown_label(Duration::seconds(-30)), "");
    }

    #[test]
    fn test_parse_event_times() {
        let times = parse_event_times(&timed("2024-03-04T10:00:00+02:00", "2024-03-04T11:00:00+02:00")).unwrap();
        assert!(matches!(times.start, EventTime::Timed(_)));

        let times = parse_event_times(&all_day("2024-03-04", Some("2024-03-05"))).unwrap();
        assert_eq!(
            times.start,
            EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );

        let broken = timed("tomorrow-ish", "2024-03-04T11:00:00+02:00");
        assert!(matches!(parse_event_times(&broken), Err(Error::TimestampParse(_))));

        let no_start = CalendarEvent::default();
        assert!(matches!(parse_event_times(&no_start), Err(Error::TimestampParse(_))));
    }

    #[test]
    fn test_timed_interval() {
        assert!(timed_interval(&timed("2024-03-04T10:00:00Z", "2024-03-04T11:00:00Z"))
            .unwrap()
            .is_some());
        assert!(timed_interval(&all_day("2024-03-04", None)).unwrap().is_none());

        let no_end = CalendarEvent {
            start: EventDateTime::date_time("2024-03-04T10:00:00Z"),
            ..Default::default()
        };
        assert!(timed_interval(&no_end).is_err());
    }

    #[test]
    fn test_now_and_past_for_timed_events() {
        let times = parse_event_times(&timed("2024-03-04T10:00:00Z", "2024-03-04T11:00:00Z")).unwrap();

        let before = utc("2024-03-04T09:00:00Z");
        assert!(!times.is_now(before));
        assert!(!times.is_past(before, Tz::UTC));

        let during = utc("2024-03-04T10:30:00Z");
        assert!(times.is_now(during));
        assert!(!times.is_past(during, Tz::UTC));

        let after = utc("2024-03-04T12:00:00Z");
        assert!(!times.is_now(after));
        assert!(times.is_past(after, Tz::UTC));
    }

    #[test]
    fn test_all_day_events_are_never_now() {
        let times = parse_event_times(&all_day("2024-03-04", Some("2024-03-05"))).unwrap();

        let same_day = utc("2024-03-04T12:00:00Z");
        assert!(!times.is_now(same_day));
        assert!(!times.is_past(same_day, Tz::UTC));
        assert!(times.is_past(utc("2024-03-05T00:30:00Z"), Tz::UTC));
        assert_eq!(times.until(utc("2024-03-01T00:00:00Z")), "");

        let open_ended = parse_event_times(&all_day("2024-03-04", None)).unwrap();
        assert!(!open_ended.is_past(same_day, Tz::UTC));
        assert!(open_ended.is_past(utc("2024-03-05T08:00:00Z"), Tz::UTC));
    }

    #[test]
    fn test_open_ended_all_day_event_on_last_date() {
        let times = parse_event_times(&all_day("+262142-12-31", None)).unwrap();
        assert_eq!(times.start, EventTime::AllDay(NaiveDate::MAX));

        assert!(!times.is_past(Utc::now(), Tz::UTC));
        assert!(!times.is_now(Utc::now()));
        assert_eq!(times.until(Utc::now()), "");
    }

    #[test]
    fn test_calendar_day_uses_display_timezone() {
        let times = parse_event_times(&timed("2024-03-04T23:30:00Z", "2024-03-05T00:30:00Z")).unwrap();

        assert_eq!(
            times.calendar_day(Tz::UTC),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        assert_eq!(
            times.calendar_day(chrono_tz::Europe::Helsinki),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_format_start() {
        let times = parse_event_times(&timed("2024-03-04T10:05:00+02:00", "2024-03-04T11:00:00+02:00")).unwrap();
        assert_eq!(times.format_start(Tz::UTC, "%a, %b %-d", "%a, %b %-d, %H:%M"), "Mon, Mar 4, 08:05");
        assert_eq!(
            times.format_start(chrono_tz::Europe::Helsinki, "%a, %b %-d", "%d.%m. %H:%M"),
            "04.03. 10:05"
        );

        let times = parse_event_times(&all_day("2024-03-04", None)).unwrap();
        assert_eq!(times.format_start(Tz::UTC, "%a, %b %-d", "%a, %b %-d, %H:%M"), "Mon, Mar 4");
    }

    #[test]
    fn test_until() {
        let times = parse_event_times(&timed("2024-03-05T11:30:00Z", "2024-03-05T12:00:00Z")).unwrap();
        assert_eq!(times.until(utc("2024-03-04T10:00:00Z")), "1d");
        assert_eq!(times.until(utc("2024-03-05T10:00:00Z")), "1h");
        assert_eq!(times.until(utc("2024-03-05T10:45:00Z")), "45m");
        assert_eq!(times.until(utc("2024-03-05T11:45:00Z")), "");
    }
}
