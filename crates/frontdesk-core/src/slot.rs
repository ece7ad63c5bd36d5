//! Bookable slot types and the slot-identifier scheme.
//!
//! A slot is a start instant plus a duration in minutes. A conversational
//! front-end references slots across one listing-to-booking round trip by a
//! short deterministic identifier derived from both fields, so it can hand
//! the user an opaque token instead of a full timestamp.

use chrono::{DateTime, FixedOffset};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};

/// Literal tag prefixing every slot identifier.
pub const SLOT_ID_PREFIX: &str = "ST_";

/// Number of digest bytes kept in a slot identifier.
const SLOT_ID_DIGEST_LEN: usize = 5;

/// A bookable time interval offered by a calendar backend.
///
/// Slots are produced fresh on every listing call; backends do not keep
/// them across calls. Two slots are equal iff their start instants and
/// durations match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    /// Start of the slot, carrying an explicit UTC offset.
    pub start_time: DateTime<FixedOffset>,
    /// Slot length in minutes.
    pub duration_min: u32,
}

impl AvailableSlot {
    /// Creates a new slot.
    pub fn new(start_time: DateTime<FixedOffset>, duration_min: u32) -> Self {
        Self {
            start_time,
            duration_min,
        }
    }

    /// Returns the deterministic identifier for this slot.
    ///
    /// See [`slot_identifier`] for the construction and its collision
    /// policy.
    pub fn identifier(&self) -> String {
        slot_identifier(self.start_time, self.duration_min)
    }
}

/// Computes the short identifier for a slot.
///
/// The identifier hashes the RFC 3339 rendering of `start_time` together
/// with the duration, truncates the digest to 5 bytes and encodes it as
/// lowercase unpadded base-32: the `ST_` tag followed by 8 characters.
/// The offset is part of the hashed text, so the same wall-clock time in
/// two different zones yields two different identifiers. No salt is
/// involved; the mapping is stable across process runs.
///
/// With a 5-byte digest, collisions are overwhelmingly unlikely but not
/// impossible. A caller resolving identifiers back to slots must treat an
/// unknown identifier as a stale slot, never as a hard error.
pub fn slot_identifier(start_time: DateTime<FixedOffset>, duration_min: u32) -> String {
    let raw = format!("{}|{}", start_time.to_rfc3339(), duration_min);
    let digest = blake3::hash(raw.as_bytes());
    let encoded = BASE32_NOPAD.encode(&digest.as_bytes()[..SLOT_ID_DIGEST_LEN]);
    format!("{}{}", SLOT_ID_PREFIX, encoded.to_lowercase())
}

/// A request to book a specific slot.
///
/// Built by the caller from a previously listed [`AvailableSlot`] plus the
/// attendee identity collected during the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Start of the slot to book.
    pub start_time: DateTime<FixedOffset>,
    /// Display name of the attendee.
    pub attendee_name: String,
    /// Contact address of the attendee.
    pub attendee_email: String,
}

impl BookingRequest {
    /// Creates a new booking request.
    pub fn new(
        start_time: DateTime<FixedOffset>,
        attendee_name: impl Into<String>,
        attendee_email: impl Into<String>,
    ) -> Self {
        Self {
            start_time,
            attendee_name: attendee_name.into(),
            attendee_email: attendee_email.into(),
        }
    }

    /// Builds a request targeting a previously listed slot.
    pub fn for_slot(
        slot: &AvailableSlot,
        attendee_name: impl Into<String>,
        attendee_email: impl Into<String>,
    ) -> Self {
        Self::new(slot.start_time, attendee_name, attendee_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot_at(hour: u32, offset_hours: i32) -> AvailableSlot {
        let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let start = offset
            .with_ymd_and_hms(2025, 1, 8, hour, 0, 0)
            .single()
            .unwrap();
        AvailableSlot::new(start, 30)
    }

    #[test]
    fn identifier_is_deterministic() {
        let slot = slot_at(9, 1);
        assert_eq!(slot.identifier(), slot.identifier());
        assert_eq!(
            slot.identifier(),
            slot_identifier(slot.start_time, slot.duration_min)
        );
    }

    #[test]
    fn identifier_format() {
        let id = slot_at(9, 1).identifier();
        assert!(id.starts_with(SLOT_ID_PREFIX));
        let digest = &id[SLOT_ID_PREFIX.len()..];
        assert_eq!(digest.len(), 8);
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn identifier_differs_on_start_time() {
        assert_ne!(slot_at(9, 1).identifier(), slot_at(10, 1).identifier());
    }

    #[test]
    fn identifier_differs_on_duration() {
        let slot = slot_at(9, 1);
        assert_ne!(
            slot_identifier(slot.start_time, 30),
            slot_identifier(slot.start_time, 60)
        );
    }

    #[test]
    fn identifier_differs_on_offset() {
        // Same wall-clock time in two zones is a different slot.
        assert_ne!(slot_at(9, 1).identifier(), slot_at(9, 2).identifier());
    }

    #[test]
    fn identifiers_are_distinct_over_a_year_of_slots() {
        // Every 30-minute boundary over a full year must map to a unique
        // identifier for the caller's lookup cache to be trustworthy.
        let mut seen = std::collections::HashSet::new();
        let offset = FixedOffset::east_opt(0).unwrap();
        let mut start = offset.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        for _ in 0..(365 * 48) {
            assert!(seen.insert(slot_identifier(start, 30)));
            start = start + chrono::Duration::minutes(30);
        }
    }

    #[test]
    fn slots_compare_by_instant() {
        let paris = slot_at(9, 1);
        let utc = slot_at(8, 0);
        assert_eq!(paris, utc);
        // Equal instants rendered in different offsets still hash
        // differently; equality and identity are distinct notions.
        assert_ne!(paris.identifier(), utc.identifier());
    }

    #[test]
    fn booking_request_for_slot() {
        let slot = slot_at(9, 1);
        let request = BookingRequest::for_slot(&slot, "Ada Lovelace", "ada@example.com");
        assert_eq!(request.start_time, slot.start_time);
        assert_eq!(request.attendee_name, "Ada Lovelace");
        assert_eq!(request.attendee_email, "ada@example.com");
    }

    #[test]
    fn slot_serde_round_trip() {
        let slot = slot_at(14, 2);
        let json = serde_json::to_string(&slot).unwrap();
        let back: AvailableSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(slot, back);
        assert_eq!(slot.identifier(), back.identifier());
    }
}
