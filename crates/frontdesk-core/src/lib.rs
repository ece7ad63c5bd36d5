//! Core types: slots, slot identifiers, time windows, tracing setup

pub mod slot;
pub mod time;
pub mod tracing;

pub use slot::{AvailableSlot, BookingRequest, SLOT_ID_PREFIX, slot_identifier};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
