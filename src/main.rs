mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting gcal-widget");

    // Load configuration
    let config = startup::load_config()?;

    // Run the panel until a termination signal
    startup::run(config).await
}
