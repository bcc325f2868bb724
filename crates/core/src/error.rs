//! Structured error handling with codes, context and recovery suggestions
//!
//! Every failure the picker reports to its host page goes through [`Error`]:
//! - Error codes for programmatic handling
//! - Human-readable context and recovery suggestions
//! - Serializable error reports (the `reject` message payload)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Unclassified failure
    Unknown = 1000,
    /// Invariant violated inside the picker
    Internal = 1001,

    // Configuration errors (2xxx)
    /// Generic configuration failure
    ConfigError = 2000,
    /// `apiKey` absent or empty
    MissingApiKey = 2001,
    /// Settings document could not be parsed
    ConfigParseError = 2002,
    /// A setting or URL has an unusable value
    InvalidConfigValue = 2003,

    // Geolocation errors (3xxx)
    /// Generic geolocation failure
    GeolocationError = 3000,
    /// The environment has no geolocation
    GeolocationUnsupported = 3001,
    /// Location access refused
    PermissionDenied = 3002,
    /// No fix could be obtained
    PositionUnavailable = 3003,
    /// The provider gave up waiting for a fix
    GeolocationTimeout = 3004,

    // Geocoding errors (4xxx)
    /// Generic geocoding failure
    GeocodeError = 4000,
    /// The geocoder answered with a non-OK status
    GeocodeDeclined = 4001,
    /// The geocoder request failed or returned garbage
    GeocodeTransport = 4002,

    // Map provider errors (5xxx)
    /// Generic map provider failure
    MapError = 5000,
    /// The map script or tiles failed to load
    MapLoadFailed = 5001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "Configuration",
            3 => "Geolocation",
            4 => "Geocoding",
            5 => "Map",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// The widget was loaded without an API key
    pub fn missing_api_key() -> Self {
        Self::new(ErrorCode::MissingApiKey, "No API Key")
            .with_suggestion("Reload the widget with an `apiKey` query parameter")
    }

    /// The environment offers no geolocation
    pub fn geolocation_unsupported() -> Self {
        Self::new(
            ErrorCode::GeolocationUnsupported,
            "The current browser environment does not support network positioning",
        )
        .with_suggestion("Open the widget in a browser that exposes the Geolocation API")
    }

    /// A geolocation provider failure
    pub fn geolocation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
            .with_suggestion("Allow location access and use the recenter button to retry")
    }

    /// A reverse geocoding failure
    pub fn geocode(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    /// The map provider failed to load
    pub fn map_load(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MapLoadFailed, message)
            .with_suggestion("Check that the API key is valid for the map provider")
    }
}

/// Serializable error report for logging and the host protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Machine-readable code, serialized by name (`MISSING_API_KEY`)
    pub code: ErrorCode,
    /// Display form of the code (`E2001`)
    pub code_str: String,
    /// Category derived from the code range
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Where the failure happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// What the user can do about it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying error, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::new(ErrorCode::InvalidConfigValue, format!("Invalid widget URL: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
