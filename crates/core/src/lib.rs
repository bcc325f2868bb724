//! Core utilities for the geopin location picker
//!
//! This crate provides shared functionality used by the picker and its tools:
//!
//! - **Error handling**: structured errors with codes, context and recovery suggestions
//! - **Configuration**: query-string loading and TOML-backed view settings
//!
//! # Example
//!
//! ```rust
//! use geopin_core::config::PickerConfig;
//!
//! let config = PickerConfig::from_query("?apiKey=demo&radius=500");
//! assert!(config.validate().is_ok());
//! assert_eq!(config.radius_meters(), 500.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{PickerConfig, ViewSettings};
    pub use crate::error::{Error, ErrorCode, ErrorReport, Result, ResultExt};
}
