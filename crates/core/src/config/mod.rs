//! Widget configuration loading and schema definitions
//!
//! The host page configures the widget through its URL query string; the
//! presentation constants live in [`ViewSettings`].

mod loader;
mod schema;

pub use loader::{API_KEY_PARAM, RADIUS_PARAM};
pub use schema::*;
