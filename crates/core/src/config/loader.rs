//! Configuration loading from the widget URL

use super::schema::{PickerConfig, ViewSettings};
use crate::error::{Error, Result};
use url::form_urlencoded;

/// Query parameter carrying the map provider key
pub const API_KEY_PARAM: &str = "apiKey";

/// Query parameter carrying the tolerance radius in meters
pub const RADIUS_PARAM: &str = "radius";

impl PickerConfig {
    /// Read `apiKey` and `radius` from a query string.
    ///
    /// A leading `?` is tolerated and the first occurrence of each key wins.
    /// Never fails: a missing key leaves `api_key` empty (caught by
    /// [`PickerConfig::validate`]) and an unusable radius becomes 0.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut api_key = None;
        let mut radius = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                API_KEY_PARAM if api_key.is_none() => api_key = Some(value.into_owned()),
                RADIUS_PARAM if radius.is_none() => radius = Some(parse_radius(&value)),
                _ => {}
            }
        }

        Self {
            api_key: api_key.unwrap_or_default(),
            radius: radius.unwrap_or(0),
            view: ViewSettings::default(),
        }
    }

    /// Read the configuration from a full widget URL.
    ///
    /// # Errors
    /// Returns an `InvalidConfigValue` error when `url` does not parse.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url)?;
        Ok(Self::from_query(parsed.query().unwrap_or_default()))
    }

    /// Replace the presentation settings
    pub fn with_view(mut self, view: ViewSettings) -> Self {
        self.view = view;
        self
    }

    /// Check that the widget can start with this configuration.
    ///
    /// # Errors
    /// Returns a `MissingApiKey` error when the key is absent or empty. Any
    /// non-empty value, whitespace included, is passed on to the provider.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::missing_api_key().with_context(format!(
                "`{API_KEY_PARAM}` query parameter is absent or empty"
            )));
        }
        Ok(())
    }
}

impl ViewSettings {
    /// Parse presentation settings from TOML; omitted keys keep their defaults.
    ///
    /// # Errors
    /// Returns a `ConfigParseError` when the document is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Parse a radius the way `parseInt(value, 10) || 0` does, clamped to `u32`.
///
/// Leading whitespace and a sign are accepted, then the longest run of decimal
/// digits; anything after it is ignored. No digits, zero, or a negative value
/// all mean unconstrained.
fn parse_radius(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}
