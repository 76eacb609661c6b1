use crate::components::DisplaySink;
use chrono::{DateTime, Local, Utc};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Display sink writing the panel to a terminal
pub struct TerminalSink<W: Write + Send> {
    title: String,
    out: Mutex<W>,
    refreshed_at: Mutex<Option<DateTime<Utc>>>,
    enabled: AtomicBool,
    clear: bool,
}

impl TerminalSink<io::Stdout> {
    /// Sink redrawing the whole terminal on every update
    pub fn stdout(title: impl Into<String>) -> Self {
        Self::new(title, io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(title: impl Into<String>, out: W, clear: bool) -> Self {
        Self {
            title: title.into(),
            out: Mutex::new(out),
            refreshed_at: Mutex::new(None),
            enabled: AtomicBool::new(false),
            clear,
        }
    }

    fn header(&self) -> String {
        let refreshed = self
            .refreshed_at
            .lock()
            .ok()
            .and_then(|at| *at)
            .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        format!(" {} (refreshed {})", self.title, refreshed)
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> Option<W> {
        self.out.into_inner().ok()
    }
}

impl<W: Write + Send> DisplaySink for TerminalSink<W> {
    fn set_text(&self, text: &str) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }

        let header = self.header();
        let Ok(mut out) = self.out.lock() else {
            warn!("Terminal output lock poisoned, dropping update");
            return;
        };

        let clear = if self.clear { CLEAR_SCREEN } else { "" };
        if let Err(e) = write!(out, "{}{}\n\n{}", clear, header, text).and_then(|_| out.flush()) {
            warn!("Failed to write calendar panel: {}", e);
        }
    }

    fn mark_refreshed(&self, at: DateTime<Utc>) {
        if let Ok(mut refreshed_at) = self.refreshed_at.lock() {
            *refreshed_at = Some(at);
        }
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }
}
