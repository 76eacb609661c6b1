use super::render::Renderer;
use crate::components::google_calendar::models::EventSnapshot;
use crate::components::DisplaySink;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct StateInner {
    snapshot: Option<Arc<EventSnapshot>>,
    text: String,
    last_error: Option<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Latest snapshot and rendered text of one widget.
///
/// Every method takes the lock itself, so storing a snapshot, rendering it
/// and pushing the text to the sink happen as one step.
#[derive(Debug, Default)]
pub struct WidgetState {
    inner: Mutex<StateInner>,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot after a successful fetch, then render and publish
    pub async fn store(
        &self,
        snapshot: EventSnapshot,
        renderer: &Renderer,
        sink: &dyn DisplaySink,
        now: DateTime<Utc>,
    ) -> String {
        let mut inner = self.inner.lock().await;
        inner.snapshot = Some(Arc::new(snapshot));
        inner.last_error = None;
        inner.refreshed_at = Some(now);
        sink.mark_refreshed(now);

        Self::publish(&mut inner, renderer, sink, now)
    }

    /// Record a failed fetch. The last good snapshot stays on display
    pub async fn mark_stale(
        &self,
        error: String,
        renderer: &Renderer,
        sink: &dyn DisplaySink,
        now: DateTime<Utc>,
    ) -> String {
        let mut inner = self.inner.lock().await;
        inner.last_error = Some(error);

        Self::publish(&mut inner, renderer, sink, now)
    }

    /// Re-render the current snapshot, e.g. to update countdowns
    pub async fn rerender(
        &self,
        renderer: &Renderer,
        sink: &dyn DisplaySink,
        now: DateTime<Utc>,
    ) -> String {
        let mut inner = self.inner.lock().await;
        Self::publish(&mut inner, renderer, sink, now)
    }

    fn publish(
        inner: &mut StateInner,
        renderer: &Renderer,
        sink: &dyn DisplaySink,
        now: DateTime<Utc>,
    ) -> String {
        // Nothing fetched yet, leave the panel as it is
        let Some(snapshot) = inner.snapshot.as_deref() else {
            debug!("No snapshot to render yet");
            return String::new();
        };

        let text = renderer.render(Some(snapshot), now);
        sink.set_text(&text);
        inner.text = text.clone();
        text
    }

    pub async fn snapshot(&self) -> Option<Arc<EventSnapshot>> {
        self.inner.lock().await.snapshot.clone()
    }

    /// Text most recently pushed to the sink
    pub async fn text(&self) -> String {
        self.inner.lock().await.text.clone()
    }

    /// True when the latest fetch failed and the shown data may be outdated
    pub async fn is_stale(&self) -> bool {
        self.inner.lock().await.last_error.is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.refreshed_at
    }
}
