use serde::{Deserialize, Serialize};

/// Start or end of an event as returned by the Calendar API.
///
/// All-day events carry `date` (`YYYY-MM-DD`), timed events carry
/// `date_time` (RFC 3339 with offset). Values are kept as fetched and
/// parsed when rendering so a single malformed event cannot fail a fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl EventDateTime {
    /// An all-day value
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            date_time: None,
        }
    }

    /// A timed value
    pub fn date_time(date_time: impl Into<String>) -> Self {
        Self {
            date: None,
            date_time: Some(date_time.into()),
        }
    }
}

/// Attendee response to an invitation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    NeedsAction,
    Tentative,
    #[default]
    #[serde(other)]
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub response_status: ResponseStatus,
}

/// Simplified calendar event representation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl CalendarEvent {
    /// True when the event has no time-of-day, i.e. it is an all-day event
    pub fn is_date_only(&self) -> bool {
        self.start.date_time.is_none() && self.start.date.is_some()
    }

    /// Identity comparison. Two events with equal fields are still distinct
    pub fn is_same(&self, other: &CalendarEvent) -> bool {
        std::ptr::eq(self, other)
    }

    /// Response status of the attendee with the given email
    pub fn response_for(&self, email: &str) -> Option<ResponseStatus> {
        self.attendees
            .iter()
            .find(|attendee| attendee.email.eq_ignore_ascii_case(email))
            .map(|attendee| attendee.response_status)
    }
}

/// Events produced by one fetch, ordered by start time
#[derive(Debug, Clone, Default)]
pub struct EventSnapshot {
    events: Vec<CalendarEvent>,
}

impl EventSnapshot {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<Vec<CalendarEvent>> for EventSnapshot {
    fn from(events: Vec<CalendarEvent>) -> Self {
        Self::new(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_event() {
        let event: CalendarEvent = serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "summary": "Planning",
            "location": "Room 4",
            "start": { "dateTime": "2024-03-04T10:00:00+02:00" },
            "end": { "dateTime": "2024-03-04T11:00:00+02:00" },
            "attendees": [
                { "email": "me@example.com", "responseStatus": "needsAction" },
                { "email": "other@example.com", "responseStatus": "somethingNew" },
                { "email": "third@example.com" }
            ]
        }))
        .unwrap();

        assert_eq!(event.id, "abc123");
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert!(!event.is_date_only());
        assert_eq!(event.attendees[0].response_status, ResponseStatus::NeedsAction);
        assert_eq!(event.attendees[1].response_status, ResponseStatus::None);
        assert_eq!(event.attendees[2].response_status, ResponseStatus::None);
    }

    #[test]
    fn test_is_date_only() {
        let all_day = CalendarEvent {
            start: EventDateTime::date("2024-03-04"),
            end: EventDateTime::date("2024-03-05"),
            ..Default::default()
        };
        assert!(all_day.is_date_only());

        let missing = CalendarEvent::default();
        assert!(!missing.is_date_only());
    }

    #[test]
    fn test_identity_is_not_equality() {
        let first = CalendarEvent {
            id: "same".to_string(),
            ..Default::default()
        };
        let second = first.clone();

        assert_eq!(first, second);
        assert!(first.is_same(&first));
        assert!(!first.is_same(&second));
    }

    #[test]
    fn test_response_for() {
        let event = CalendarEvent {
            attendees: vec![Attendee {
                email: "Me@Example.com".to_string(),
                response_status: ResponseStatus::Tentative,
            }],
            ..Default::default()
        };

        assert_eq!(event.response_for("me@example.com"), Some(ResponseStatus::Tentative));
        assert_eq!(event.response_for("nobody@example.com"), None);
    }
}
