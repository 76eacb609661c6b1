use super::time::timed_interval;
use crate::components::google_calendar::models::{CalendarEvent, EventSnapshot};
use tracing::debug;

/// Returns true if `event` overlaps any other event in the same snapshot.
///
/// Intervals are half-open: an event ending exactly when another starts does
/// not conflict. All-day events never conflict, and events whose times cannot
/// be parsed are treated as non-conflicting.
pub fn conflicts(event: &CalendarEvent, snapshot: &EventSnapshot) -> bool {
    let (start, end) = match timed_interval(event) {
        Ok(Some(interval)) => interval,
        Ok(None) => return false,
        Err(e) => {
            debug!("Skipping conflict check for event '{}': {}", event.id, e);
            return false;
        }
    };

    snapshot.events().iter().any(|other| {
        if other.is_same(event) {
            return false;
        }

        match timed_interval(other) {
            Ok(Some((other_start, other_end))) => start < other_end && end > other_start,
            Ok(None) => false,
            Err(e) => {
                debug!("Ignoring event '{}' as a conflict candidate: {}", other.id, e);
                false
            }
        }
    })
}
