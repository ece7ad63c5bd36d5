//! Calendar backend abstraction for the front-desk agent.
//!
//! This crate lets a conversational front-end discover free appointment
//! slots and book one without knowing which scheduling backend is active:
//!
//! - [`CalendarBackend`] - The capability trait every backend implements
//! - [`StubBackend`] - In-memory backend with synthetic business-hours
//!   slots, for tests, demos, and as the guaranteed fallback
//! - [`CalComBackend`] - HTTP adapter for the cal.com v2 API
//! - [`BackendResolver`] - Selects a configured backend and degrades to
//!   the stub when initialization fails
//! - [`CalendarError`] - The error taxonomy shared by all backends
//!
//! # Architecture
//!
//! ```text
//!          ┌─────────────────────┐
//!          │   BackendResolver   │  settings → legacy env key → stub,
//!          └──────────┬──────────┘  falling back on init failure
//!                     │
//!             CalendarBackend
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!   ┌─────────────┐      ┌─────────────┐
//!   │ StubBackend │      │CalComBackend│──► cal.com v2 REST API
//!   └─────────────┘      └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use frontdesk_calendar::BackendResolver;
//! use frontdesk_core::TimeWindow;
//!
//! let backend = BackendResolver::new(chrono_tz::Europe::Paris)
//!     .legacy_api_key_from_env()
//!     .resolve()
//!     .await;
//!
//! let slots = backend
//!     .list_available_slots(TimeWindow::days_from(chrono::Utc::now(), 14))
//!     .await;
//! // Cache slots by slot.identifier(), offer them to the user, then book
//! // the chosen one with backend.schedule_appointment(..).
//! ```

pub mod backend;
pub mod calcom;
pub mod error;
pub mod resolver;
pub mod stub;

// Re-export main types at crate root
pub use backend::{BoxFuture, CalendarBackend};
pub use calcom::{CalComBackend, CalComConfig};
pub use error::{CalendarError, CalendarErrorCode, CalendarResult};
pub use resolver::{BackendResolver, CalComSettings, LEGACY_API_KEY_ENV};
pub use stub::StubBackend;
