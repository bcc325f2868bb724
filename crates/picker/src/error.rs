//! Error types for the picker crate.
//!
//! Provider failures are plain enums; [`PickerError`] decides how each one is
//! reported to the host page.

use geopin_core::{Error, ErrorCode, ErrorReport};
use thiserror::Error;

/// Result type alias for picker operations.
pub type Result<T> = std::result::Result<T, PickerError>;

/// Failures of the device geolocation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The user or the platform refused location access
    #[error("Geolocation permission denied: {0}")]
    PermissionDenied(String),

    /// No fix could be obtained
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// The provider gave up waiting for a fix
    #[error("Geolocation timed out: {0}")]
    Timeout(String),

    /// The environment has no geolocation capability at all
    #[error("Geolocation is not supported in this environment")]
    Unsupported,
}

impl GeolocationError {
    /// Build from a platform error code (1 = permission denied,
    /// 2 = position unavailable, 3 = timeout).
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            1 => Self::PermissionDenied(message),
            3 => Self::Timeout(message),
            _ => Self::PositionUnavailable(message),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::PositionUnavailable(_) => ErrorCode::PositionUnavailable,
            Self::Timeout(_) => ErrorCode::GeolocationTimeout,
            Self::Unsupported => ErrorCode::GeolocationUnsupported,
        }
    }
}

/// Failures of the reverse-geocoding provider.
///
/// An empty result is not an error; see [`crate::Resolution`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The provider answered but declined the request (quota, denied key, ...)
    #[error("Geocoder declined the request: {status}")]
    Status {
        /// Provider status string, e.g. `OVER_QUERY_LIMIT`
        status: String,
    },

    /// The request never produced a usable answer
    #[error("Geocoder request failed: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },
}

impl GeocodeError {
    /// Create a status error
    pub fn status(status: impl Into<String>) -> Self {
        Self::Status {
            status: status.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Status { .. } => ErrorCode::GeocodeDeclined,
            Self::Transport { .. } => ErrorCode::GeocodeTransport,
        }
    }
}

/// Failures of the map rendering provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The map script or tiles could not be loaded
    #[error("Map provider failed to load: {message}")]
    Load {
        /// Description of the failure
        message: String,
    },
}

impl MapError {
    /// Create a load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }
}

/// How an error is reported to the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// `fail` message, no payload
    Fail,
    /// `reject` message carrying an [`ErrorReport`]
    Reject,
}

/// Any failure a picker session can run into.
#[derive(Debug, Error)]
pub enum PickerError {
    /// Unusable widget configuration
    #[error(transparent)]
    Config(#[from] Error),

    /// Device geolocation failed
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Reverse geocoding failed
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Map provider failed
    #[error(transparent)]
    Map(#[from] MapError),
}

impl PickerError {
    /// Which protocol message reports this error.
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Config(_)
            | Self::Geolocation(GeolocationError::Unsupported)
            | Self::Geocode(GeocodeError::Status { .. }) => Disposition::Fail,
            Self::Geolocation(_)
            | Self::Geocode(GeocodeError::Transport { .. })
            | Self::Map(_) => Disposition::Reject,
        }
    }

    /// Returns true when the session cannot recover without a reload.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Geolocation(GeolocationError::Unsupported)
        )
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(e) => e.code,
            Self::Geolocation(e) => e.code(),
            Self::Geocode(e) => e.code(),
            Self::Map(_) => ErrorCode::MapLoadFailed,
        }
    }

    /// Structured form of this error.
    pub fn to_error(&self) -> Error {
        match self {
            Self::Config(e) => {
                let mut err = Error::new(e.code, e.message.clone());
                err.context = e.context.clone();
                err.suggestion = e.suggestion.clone();
                err
            }
            Self::Geolocation(GeolocationError::Unsupported) => Error::geolocation_unsupported(),
            Self::Geolocation(e) => Error::geolocation(e.code(), e.to_string()),
            Self::Geocode(e) => Error::geocode(e.code(), e.to_string()),
            Self::Map(e) => Error::map_load(e.to_string()),
        }
    }

    /// Serializable report, the payload of a `reject` message.
    pub fn report(&self) -> ErrorReport {
        self.to_error().to_report()
    }
}
