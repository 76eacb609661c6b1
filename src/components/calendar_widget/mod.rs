mod conflicts;
mod highlight;
mod render;
mod scheduler;
mod state;
mod time;

pub use conflicts::conflicts;
pub use highlight::{description_color, event_title_color, title_color};
pub use render::Renderer;
pub use scheduler::{run_refresh_loop, RefreshScheduler};
pub use state::WidgetState;
pub use time::{countdown_label, parse_event_times, EventTime, EventTimes};

use crate::components::google_calendar::models::EventSnapshot;
use crate::components::{DisplaySink, EventSource};
use crate::config::WidgetConfig;
use crate::error::{other_error, WidgetResult};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info, warn};

struct WidgetShared {
    renderer: Renderer,
    state: WidgetState,
    source: Arc<dyn EventSource>,
    sink: Arc<dyn DisplaySink>,
}

impl WidgetShared {
    async fn rerender(&self) -> String {
        self.state
            .rerender(&self.renderer, self.sink.as_ref(), Utc::now())
            .await
    }
}

/// Calendar panel: fetches events on demand and keeps the rendered text
/// current in the display sink.
///
/// Must be created inside a tokio runtime, which runs its re-render loop.
pub struct CalendarWidget {
    shared: Arc<WidgetShared>,
    scheduler: RefreshScheduler,
    enabled: AtomicBool,
}

impl CalendarWidget {
    pub fn new(
        config: &WidgetConfig,
        source: Arc<dyn EventSource>,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        sink.enable();

        let shared = Arc::new(WidgetShared {
            renderer: Renderer::new(config),
            state: WidgetState::new(),
            source,
            sink,
        });

        let tick_shared = Arc::clone(&shared);
        let scheduler = RefreshScheduler::start(
            Duration::from_secs(config.refresh_interval),
            move || {
                let shared = Arc::clone(&tick_shared);
                async move {
                    shared.rerender().await;
                }
            },
        );

        info!("Calendar widget enabled");

        Self {
            shared,
            scheduler,
            enabled: AtomicBool::new(true),
        }
    }

    /// Fetch a new snapshot and publish it. Returns the number of events.
    ///
    /// On a fetch error the previous snapshot stays on display, the widget is
    /// marked stale and the error is returned.
    pub async fn refresh(&self) -> WidgetResult<usize> {
        self.refresh_at(Utc::now()).await
    }

    /// Same as [`CalendarWidget::refresh`] with an explicit clock
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> WidgetResult<usize> {
        if !self.is_enabled() {
            return Err(other_error("widget is disabled"));
        }

        let shared = &self.shared;
        match shared.source.fetch_events().await {
            Ok(events) => {
                let count = events.len();
                // Rendering skips these quietly on every tick
                for event in &events {
                    if let Err(e) = parse_event_times(event) {
                        warn!("Event '{}' has unusable times: {}", event.id, e);
                    }
                }
                shared
                    .state
                    .store(
                        EventSnapshot::new(events),
                        &shared.renderer,
                        shared.sink.as_ref(),
                        now,
                    )
                    .await;
                info!("Calendar refreshed with {} events", count);
                Ok(count)
            }
            Err(e) => {
                error!("Failed to fetch calendar events: {}", e);
                shared
                    .state
                    .mark_stale(e.to_string(), &shared.renderer, shared.sink.as_ref(), now)
                    .await;
                Err(e)
            }
        }
    }

    /// Re-render the current snapshot without fetching
    pub async fn display(&self) -> String {
        self.shared.rerender().await
    }

    /// Render the current snapshot at a given instant
    pub async fn display_at(&self, now: DateTime<Utc>) -> String {
        self.shared
            .state
            .rerender(&self.shared.renderer, self.shared.sink.as_ref(), now)
            .await
    }

    /// Stop the refresh loop and disable the sink.
    ///
    /// Safe to call repeatedly; only the first call has any effect and
    /// returns true.
    pub fn disable(&self) -> bool {
        if !self.enabled.swap(false, Ordering::SeqCst) {
            warn!("Calendar widget is already disabled");
            return false;
        }

        self.scheduler.cancel();
        self.shared.sink.disable();
        info!("Calendar widget disabled");
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Text most recently pushed to the sink
    pub async fn text(&self) -> String {
        self.shared.state.text().await
    }

    pub async fn snapshot(&self) -> Option<Arc<EventSnapshot>> {
        self.shared.state.snapshot().await
    }

    /// True when the latest fetch failed
    pub async fn is_stale(&self) -> bool {
        self.shared.state.is_stale().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.shared.state.last_error().await
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.shared.state.refreshed_at().await
    }
}
