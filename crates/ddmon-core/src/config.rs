//! API configuration.
//!
//! Credentials and the base URL are resolved once at process start into an
//! immutable [`ApiConfig`] that is handed to the repository client.

use std::fmt;

use crate::error::{MonitorError, Result};

/// Default provider API root.
pub const DEFAULT_API_URL: &str = "https://api.datadoghq.com/api/v1";

/// Long-form variable consulted when no API key was supplied.
pub const FALLBACK_API_KEY_VAR: &str = "DATADOG_API_KEY";

/// Long-form variable consulted when no application key was supplied.
pub const FALLBACK_APP_KEY_VAR: &str = "DATADOG_APP_KEY";

/// Immutable API configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_key: String,
    app_key: String,
    base_url: String,
}

impl ApiConfig {
    /// Creates a configuration from explicit credentials.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Config` if either key is blank.
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        let app_key = app_key.into().trim().to_string();
        if api_key.is_empty() || app_key.is_empty() {
            return Err(missing_credentials());
        }
        Ok(Self {
            api_key,
            app_key,
            base_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Resolves the configuration from supplied values.
    ///
    /// `api_key`, `app_key` and `base_url` are the values already read from
    /// flags or their `DD_*` variables. A missing or blank key falls back to
    /// [`FALLBACK_API_KEY_VAR`] / [`FALLBACK_APP_KEY_VAR`] through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Config` if either key cannot be found.
    pub fn resolve<F>(
        api_key: Option<&str>,
        app_key: Option<&str>,
        base_url: Option<&str>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |explicit: Option<&str>, fallback: &str| -> Option<String> {
            non_blank(explicit.map(str::to_string)).or_else(|| non_blank(lookup(fallback)))
        };

        let api_key = first(api_key, FALLBACK_API_KEY_VAR);
        let app_key = first(app_key, FALLBACK_APP_KEY_VAR);
        let (Some(api_key), Some(app_key)) = (api_key, app_key) else {
            return Err(missing_credentials());
        };

        let mut config = Self::new(api_key, app_key)?;
        if let Some(url) = non_blank(base_url.map(str::to_string)) {
            config = config.with_base_url(url);
        }
        Ok(config)
    }

    /// Overrides the API root.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the application key.
    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Returns the API root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing_credentials() -> MonitorError {
    MonitorError::config(
        "DD_API_KEY and DD_APP_KEY environment variables required\n\n\
         Set them with:\n  export DD_API_KEY='your-api-key'\n  export DD_APP_KEY='your-app-key'",
    )
}
