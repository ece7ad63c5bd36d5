//! cal.com v2 API adapter.
//!
//! Implements [`CalendarBackend`](crate::CalendarBackend) against the
//! cal.com REST API: identity resolution, event-type resolution/creation,
//! timezone-correct request/response mapping, and provider error
//! classification.

mod client;
mod config;
mod provider;

pub use client::CalComClient;
pub use config::CalComConfig;
pub use provider::CalComBackend;

/// Default base URL of the hosted cal.com v2 API.
pub const CAL_COM_BASE_URL: &str = "https://api.cal.com/v2/";

/// Slug of the event type booked by the front desk. Discovered among the
/// user's event types, or created when absent.
pub const FRONT_DESK_EVENT_SLUG: &str = "livekit-front-desk";

/// Title given to the event type when it has to be created.
pub const FRONT_DESK_EVENT_TITLE: &str = "LiveKit Front-Desk";

/// Fixed duration of the front-desk event type, in minutes.
pub const EVENT_DURATION_MIN: u32 = 30;
