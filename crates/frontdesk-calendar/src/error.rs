//! Error types for calendar backend operations.

use std::fmt;
use thiserror::Error;

/// The category of a calendar error.
///
/// The resolver and the conversational layer dispatch on this code: an
/// initialization failure triggers the stub fallback, a slot conflict lets
/// the conversation offer alternatives, and everything else is surfaced as
/// an opaque technical failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarErrorCode {
    /// Backend setup failed: bad credential, missing or inaccessible
    /// configured event type, network failure during setup.
    InitializationFailed,
    /// Fetching or decoding a slot listing failed. This code never crosses
    /// the [`CalendarBackend`](crate::CalendarBackend) boundary: listing is
    /// advisory and the backend absorbs it into an empty result.
    SlotListingFailed,
    /// The provider reports the targeted slot is already booked or no
    /// longer available.
    SlotUnavailable,
    /// Any other booking failure: malformed response, non-2xx status
    /// without a recognizable error envelope, unexpected provider error.
    BookingFailed,
}

impl CalendarErrorCode {
    /// Returns a stable, machine-readable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitializationFailed => "initialization_failed",
            Self::SlotListingFailed => "slot_listing_failed",
            Self::SlotUnavailable => "slot_unavailable",
            Self::BookingFailed => "booking_failed",
        }
    }
}

impl fmt::Display for CalendarErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error produced by a calendar backend operation.
#[derive(Debug, Error)]
pub struct CalendarError {
    /// The code categorizing this error.
    code: CalendarErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The backend that produced this error (e.g. "cal.com", "stub").
    backend: Option<String>,
    /// The underlying cause, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CalendarError {
    /// Creates a new error with the given code and message.
    pub fn new(code: CalendarErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            source: None,
        }
    }

    /// Creates an initialization error.
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::InitializationFailed, message)
    }

    /// Creates a slot-listing error.
    pub fn listing(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::SlotListingFailed, message)
    }

    /// Creates a slot-unavailable error.
    pub fn slot_unavailable(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::SlotUnavailable, message)
    }

    /// Creates a generic booking error.
    pub fn booking(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::BookingFailed, message)
    }

    /// Sets the backend name for this error.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> CalendarErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the backend name, if set.
    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Returns `true` if this error reports a slot conflict, so the caller
    /// can offer alternative slots instead of failing the conversation.
    pub fn is_slot_unavailable(&self) -> bool {
        self.code == CalendarErrorCode::SlotUnavailable
    }
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref backend) = self.backend {
            write!(f, "[{}] ", backend)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized `Result` type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_display() {
        assert_eq!(
            CalendarErrorCode::InitializationFailed.as_str(),
            "initialization_failed"
        );
        assert_eq!(
            CalendarErrorCode::SlotUnavailable.to_string(),
            "slot_unavailable"
        );
    }

    #[test]
    fn error_creation() {
        let err = CalendarError::initialization("invalid API key");
        assert_eq!(err.code(), CalendarErrorCode::InitializationFailed);
        assert_eq!(err.message(), "invalid API key");
        assert!(err.backend().is_none());
        assert!(!err.is_slot_unavailable());
    }

    #[test]
    fn slot_unavailable_is_distinguished() {
        let err = CalendarError::slot_unavailable("already booked");
        assert!(err.is_slot_unavailable());
        assert!(!CalendarError::booking("boom").is_slot_unavailable());
    }

    #[test]
    fn error_display_includes_backend_tag() {
        let err = CalendarError::booking("provider rejected the request").with_backend("cal.com");
        let display = err.to_string();
        assert!(display.contains("[cal.com]"));
        assert!(display.contains("booking_failed"));
        assert!(display.contains("provider rejected the request"));
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("connection reset");
        let err = CalendarError::initialization("identity lookup failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
