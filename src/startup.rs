use crate::shutdown;
use gcal_widget::components::calendar_widget::run_refresh_loop;
use gcal_widget::components::{CalendarWidget, GoogleCalendarHandle};
use gcal_widget::config::Config;
use gcal_widget::error::other_error;
use gcal_widget::terminal::TerminalSink;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const PANEL_TITLE: &str = "Calendar";

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        // Keep log lines off the panel
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the configuration
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the widget and keep it fed until a termination signal arrives
pub async fn run(config: Config) -> miette::Result<()> {
    if config.calendar.access_token.is_none() {
        warn!("No Google access token configured, fetches will fail until one is set");
    }

    let calendar = GoogleCalendarHandle::new(config.calendar.clone())?;
    let sink = Arc::new(TerminalSink::stdout(PANEL_TITLE));
    let widget = Arc::new(CalendarWidget::new(
        &config.widget,
        Arc::new(calendar.clone()),
        sink,
    ));

    if let Err(e) = widget.refresh().await {
        warn!("Initial calendar fetch failed: {}", e);
    }

    // The widget only re-renders on its own; fetching is the host's job
    let fetch_token = CancellationToken::new();
    let fetch_widget = Arc::clone(&widget);
    let fetch_task = tokio::spawn(run_refresh_loop(
        Duration::from_secs(config.calendar.fetch_interval),
        fetch_token.clone(),
        move || {
            let widget = Arc::clone(&fetch_widget);
            async move {
                if let Err(e) = widget.refresh().await {
                    warn!("Calendar fetch failed, keeping previous events: {}", e);
                }
            }
        },
    ));

    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(
        shutdown_send,
        Arc::clone(&widget),
        calendar,
    ));

    let _ = shutdown_recv.await;
    fetch_token.cancel();
    let _ = fetch_task.await;

    info!("gcal-widget stopped");
    Ok(())
}
