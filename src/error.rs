use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the widget
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(gcal_widget::config),
        help("check the [widget] and [calendar] tables of the config file")
    )]
    Config(String),

    #[error("Calendar fetch failed: {0}")]
    #[diagnostic(code(gcal_widget::fetch))]
    Fetch(String),

    #[error("Invalid event timestamp: {0}")]
    #[diagnostic(code(gcal_widget::timestamp))]
    TimestampParse(String),

    #[error(transparent)]
    #[diagnostic(code(gcal_widget::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gcal_widget::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gcal_widget::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type WidgetResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create timestamp parse errors
pub fn parse_error(message: &str) -> Error {
    Error::TimestampParse(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
