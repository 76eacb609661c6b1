use gcal_widget::components::{CalendarWidget, GoogleCalendarHandle};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Wait for a termination signal, then tear the widget down
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    widget: Arc<CalendarWidget>,
    calendar: GoogleCalendarHandle,
) {
    if let Err(e) = wait_for_signal().await {
        error!("Failed to install signal handlers: {}", e);
    }

    if widget.disable() {
        info!("Calendar widget shut down successfully");
    }

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down Google Calendar actor: {:?}", e);
    } else {
        info!("Google Calendar actor shut down successfully");
    }

    let _ = shutdown_send.send(());
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    // SIGTERM from service managers, SIGINT from Ctrl+C
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_signal() -> std::io::Result<()> {
    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
    Ok(())
}
