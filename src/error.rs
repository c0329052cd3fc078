//! Unified error types for storefront-pom

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for storefront-pom
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport or connection failure with the remote browser
    #[error("Session error: {0}")]
    Session(String),

    /// CDP protocol error replies
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Navigation rejected or page failed to load
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Selector matched nothing
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Matched node detached from the document before use
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Native and script click both failed
    #[error("Click failed ({label}): {source}")]
    Click {
        label: String,
        #[source]
        source: Box<Error>,
    },

    /// wait / wait_any exceeded its timeout
    #[error("Timed out after {timeout_ms}ms: {message}")]
    WaitTimeout { timeout_ms: u64, message: String },

    /// Dropdown has no option matching the request
    #[error("Option not found ({label}): {wanted}")]
    OptionNotFound { label: String, wanted: String },

    /// Dropdown has no visible, enabled option
    #[error("No available option: {0}")]
    NoAvailableOption(String),

    /// navigate() called on a page without a URL
    #[error("No URL configured for page {0}")]
    MissingUrl(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    Script(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a new session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Error::Session(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new navigation error
    pub fn navigation<S: Into<String>>(msg: S) -> Self {
        Error::Navigation(msg.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(label: S) -> Self {
        Error::ElementNotFound(label.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(label: S) -> Self {
        Error::StaleElement(label.into())
    }

    /// Wrap a failed native click
    pub fn click<S: Into<String>>(label: S, source: Error) -> Self {
        Error::Click {
            label: label.into(),
            source: Box::new(source),
        }
    }

    /// Create a new wait timeout error
    pub fn timeout<S: Into<String>>(timeout_ms: u64, message: S) -> Self {
        Error::WaitTimeout {
            timeout_ms,
            message: message.into(),
        }
    }

    /// Create a new option not found error
    pub fn option_not_found<L: Into<String>, W: Into<String>>(label: L, wanted: W) -> Self {
        Error::OptionNotFound {
            label: label.into(),
            wanted: wanted.into(),
        }
    }

    /// Create a new no available option error
    pub fn no_available_option<S: Into<String>>(label: S) -> Self {
        Error::NoAvailableOption(label.into())
    }

    /// Create a new missing URL error
    pub fn missing_url<S: Into<String>>(page: S) -> Self {
        Error::MissingUrl(page.into())
    }

    /// Create a new script execution error
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Error::Script(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Whether the error ends the current scenario (the session is unusable)
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Session(format!("WebSocket error: {}", err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Session(format!("HTTP error: {}", err))
    }
}
