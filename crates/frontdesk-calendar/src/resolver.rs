//! Backend selection and initialization fallback.
//!
//! The resolver guarantees the caller always ends up with an initialized,
//! usable backend: a configured cal.com backend when its initialization
//! succeeds, the in-memory stub otherwise. Initialization failures are
//! logged and recovered here, never surfaced to the caller.

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::backend::CalendarBackend;
use crate::calcom::{CalComBackend, CalComConfig};
use crate::stub::StubBackend;

/// Environment variable carrying the legacy single cal.com API key.
pub const LEGACY_API_KEY_ENV: &str = "CALCOM_API_KEY";

/// Per-assistant cal.com settings, as handed over by the external
/// configuration store. Absence of the whole structure means cal.com was
/// never configured for this assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct CalComSettings {
    /// Whether the cal.com integration is enabled for this assistant.
    pub enabled: bool,
    /// API credential.
    pub api_key: String,
    /// Pre-configured event-type identifier, when the assistant was bound
    /// to a specific event type.
    #[serde(default)]
    pub event_type_id: Option<i64>,
}

/// Selects and initializes a calendar backend.
///
/// Selection order: per-assistant settings, then the legacy
/// [`LEGACY_API_KEY_ENV`] key, then the stub. Whatever is selected, the
/// returned backend has already been initialized successfully.
#[derive(Debug, Clone)]
pub struct BackendResolver {
    timezone: Tz,
    settings: Option<CalComSettings>,
    legacy_api_key: Option<String>,
    base_url: Option<Url>,
}

impl BackendResolver {
    /// Creates a resolver for the given target timezone.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            settings: None,
            legacy_api_key: None,
            base_url: None,
        }
    }

    /// Supplies the per-assistant settings fetched from the configuration
    /// store.
    #[must_use]
    pub fn with_settings(mut self, settings: CalComSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Supplies a legacy single API key.
    #[must_use]
    pub fn with_legacy_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.legacy_api_key = Some(api_key.into());
        self
    }

    /// Reads the legacy API key from [`LEGACY_API_KEY_ENV`], if set.
    #[must_use]
    pub fn legacy_api_key_from_env(mut self) -> Self {
        self.legacy_api_key = std::env::var(LEGACY_API_KEY_ENV).ok();
        self
    }

    /// Overrides the cal.com base URL (self-hosted instances).
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Builds the remote config the selection rules point at, if any.
    fn select_remote(&self) -> Option<CalComConfig> {
        if let Some(settings) = &self.settings
            && settings.enabled
            && !settings.api_key.is_empty()
        {
            let mut config = CalComConfig::new(settings.api_key.clone(), self.timezone);
            if let Some(event_type_id) = settings.event_type_id {
                config = config.with_event_type_id(event_type_id);
            }
            return Some(self.apply_base_url(config));
        }

        if let Some(api_key) = &self.legacy_api_key
            && !api_key.is_empty()
        {
            return Some(self.apply_base_url(CalComConfig::new(api_key.clone(), self.timezone)));
        }

        None
    }

    fn apply_base_url(&self, config: CalComConfig) -> CalComConfig {
        match &self.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        }
    }

    /// Selects a backend, initializes it, and falls back to the stub on
    /// any initialization failure.
    ///
    /// The returned backend is always initialized; this method never
    /// fails.
    pub async fn resolve(&self) -> Box<dyn CalendarBackend> {
        match self.select_remote() {
            Some(config) => {
                let backend = CalComBackend::new(config);
                match backend.initialize().await {
                    Ok(()) => {
                        info!(backend = backend.name(), "calendar backend initialized");
                        return Box::new(backend);
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            "calendar backend failed to initialize, falling back to stub"
                        );
                    }
                }
            }
            None => {
                info!("no cal.com credentials configured, using stub calendar");
            }
        }

        let stub = StubBackend::new(self.timezone);
        if let Err(err) = stub.initialize().await {
            // The stub's initialize is infallible; this branch documents
            // the contract rather than a reachable state.
            warn!(error = %err, "stub backend reported an initialization error");
        }
        Box::new(stub)
    }
}
