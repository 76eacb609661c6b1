use super::models::CalendarEvent;
use crate::config::CalendarConfig;
use crate::error::{fetch_error, WidgetResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

const EVENTS_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: CalendarConfig,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    GetUpcomingEvents(oneshot::Sender<WidgetResult<Vec<CalendarEvent>>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Get upcoming events from the calendar
    pub async fn get_upcoming_events(&self) -> WidgetResult<Vec<CalendarEvent>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::GetUpcomingEvents(response_tx))
            .await
            .map_err(|e| fetch_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| fetch_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> WidgetResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: CalendarConfig) -> WidgetResult<(Self, GoogleCalendarActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        // A hung request would stall every queued fetch behind it
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| fetch_error(&format!("Failed to build HTTP client: {}", e)))?;

        let actor = Self {
            config,
            client,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::GetUpcomingEvents(response_tx) => {
                    let result = self.get_upcoming_events().await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Get upcoming events from the calendar
    async fn get_upcoming_events(&self) -> WidgetResult<Vec<CalendarEvent>> {
        let access_token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| fetch_error("No access token configured"))?;

        let url = events_url(&self.config, Utc::now())?;
        debug!("Fetching calendar events from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(fetch_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: Value = response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events response: {}", e)))?;

        parse_events(&response_data)
    }
}

/// Events list URL covering `days_ahead` days from `now`
pub(crate) fn events_url(config: &CalendarConfig, now: DateTime<Utc>) -> WidgetResult<Url> {
    let mut url = Url::parse(EVENTS_API_BASE)
        .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| fetch_error("Calendar API base URL cannot have path segments"))?
        .push(&config.calendar_id)
        .push("events");

    let time_max = Duration::try_days(config.days_ahead)
        .and_then(|window| now.checked_add_signed(window))
        .ok_or_else(|| {
            fetch_error(&format!("days_ahead {} is out of range", config.days_ahead))
        })?;
    url.query_pairs_mut()
        .append_pair("timeMin", &now.to_rfc3339())
        .append_pair("timeMax", &time_max.to_rfc3339())
        .append_pair("maxResults", &config.num_events.to_string())
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime");

    Ok(url)
}

/// Extract the `items` array of an events list response
pub(crate) fn parse_events(response: &Value) -> WidgetResult<Vec<CalendarEvent>> {
    let items = response
        .get("items")
        .filter(|items| items.is_array())
        .ok_or_else(|| fetch_error("No items in response"))?;

    serde_json::from_value(items.clone())
        .map_err(|e| fetch_error(&format!("Failed to parse events: {}", e)))
}
