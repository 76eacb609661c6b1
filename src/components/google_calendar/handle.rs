use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::models::CalendarEvent;
use crate::components::EventSource;
use crate::config::CalendarConfig;
use crate::error::WidgetResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: CalendarConfig) -> WidgetResult<Self> {
        let (mut actor, handle) = GoogleCalendarActor::new(config)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Get upcoming events from the calendar
    pub async fn get_upcoming_events(&self) -> WidgetResult<Vec<CalendarEvent>> {
        self.actor_handle.get_upcoming_events().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> WidgetResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl EventSource for GoogleCalendarHandle {
    async fn fetch_events(&self) -> WidgetResult<Vec<CalendarEvent>> {
        self.get_upcoming_events().await
    }
}
