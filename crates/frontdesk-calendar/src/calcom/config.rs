//! cal.com adapter configuration.

use std::time::Duration;

use chrono_tz::Tz;
use url::Url;

use super::CAL_COM_BASE_URL;

/// Configuration for the cal.com backend.
#[derive(Debug, Clone)]
pub struct CalComConfig {
    /// API credential, sent as a Bearer token.
    pub api_key: String,

    /// Target timezone; used as the attendee `timeZone` in booking
    /// payloads.
    pub timezone: Tz,

    /// Pre-configured event-type identifier. When absent, the event type
    /// is discovered or created by slug during initialization.
    pub event_type_id: Option<i64>,

    /// Base URL of the cal.com v2 API. Overridable for self-hosted
    /// instances.
    pub base_url: Url,

    /// Request timeout applied to every call.
    pub timeout: Duration,
}

impl CalComConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the hosted cal.com API.
    pub fn new(api_key: impl Into<String>, timezone: Tz) -> Self {
        Self {
            api_key: api_key.into(),
            timezone,
            event_type_id: None,
            base_url: Url::parse(CAL_COM_BASE_URL).expect("valid default base URL"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets a pre-configured event-type identifier.
    pub fn with_event_type_id(mut self, event_type_id: i64) -> Self {
        self.event_type_id = Some(event_type_id);
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns `true` if an API key is present.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }
}
