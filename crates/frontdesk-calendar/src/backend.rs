//! CalendarBackend trait definition.
//!
//! This module defines the [`CalendarBackend`] trait, the capability
//! interface between the conversational layer and whichever scheduling
//! backend is active (the in-memory stub or the cal.com adapter).

use std::future::Future;
use std::pin::Pin;

use frontdesk_core::{AvailableSlot, BookingRequest, TimeWindow};

use crate::error::CalendarResult;

/// A boxed future for async trait methods.
///
/// Async functions in traits are not object-safe; boxed futures keep the
/// trait usable behind `Box<dyn CalendarBackend>`, which is how the
/// resolver hands a backend to its caller.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The capability interface implemented by every calendar backend.
///
/// All three operations are suspension points (network-bound for the
/// remote backend, synchronous in-memory work for the stub). The caller is
/// expected to call [`initialize`](Self::initialize) exactly once before
/// the other two, and to list slots before booking one, but no ordering is
/// enforced here: apart from state resolved during initialization the
/// backends are stateless across calls.
///
/// Backends must be `Send + Sync`: a single instance (and its HTTP client)
/// may be shared across concurrent conversation sessions. No slot-level
/// locking happens locally; conflict detection for concurrent bookings of
/// the same slot is delegated to the remote provider's response.
pub trait CalendarBackend: Send + Sync {
    /// Returns the name of this backend (e.g. "cal.com", "stub").
    fn name(&self) -> &str;

    /// Performs one-time setup: credential validation, remote identity and
    /// event-type resolution.
    ///
    /// # Errors
    ///
    /// Fails with [`CalendarErrorCode::InitializationFailed`] on any setup
    /// problem. The resolver reacts by falling back to the stub backend;
    /// initialization failures are never surfaced past it.
    ///
    /// [`CalendarErrorCode::InitializationFailed`]: crate::CalendarErrorCode::InitializationFailed
    fn initialize(&self) -> BoxFuture<'_, CalendarResult<()>>;

    /// Lists slots whose start instants lie in the half-open `window`.
    ///
    /// Slots are produced fresh on every call, ordered as the backend
    /// produced them. Listing is advisory: transient fetch or decode
    /// problems are absorbed into an empty result rather than propagated,
    /// so a live conversation degrades to "no slots found" instead of
    /// crashing. Individual malformed entries are skipped without
    /// discarding the rest of the batch.
    fn list_available_slots(&self, window: TimeWindow) -> BoxFuture<'_, Vec<AvailableSlot>>;

    /// Books the slot starting at `request.start_time`.
    ///
    /// On success the booked slot no longer appears in subsequent listings
    /// covering an overlapping range.
    ///
    /// # Errors
    ///
    /// Fails with [`CalendarErrorCode::SlotUnavailable`] when the provider
    /// reports the slot is already booked or gone, and with
    /// [`CalendarErrorCode::BookingFailed`] for any other failure.
    ///
    /// [`CalendarErrorCode::SlotUnavailable`]: crate::CalendarErrorCode::SlotUnavailable
    /// [`CalendarErrorCode::BookingFailed`]: crate::CalendarErrorCode::BookingFailed
    fn schedule_appointment(&self, request: BookingRequest) -> BoxFuture<'_, CalendarResult<()>>;
}
