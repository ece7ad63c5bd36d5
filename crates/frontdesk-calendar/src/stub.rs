//! In-memory stub backend.
//!
//! Generates a sparse, irregular business-hours availability pattern that
//! resembles a partially booked real calendar. Used for tests and demos,
//! and as the guaranteed-available fallback when a configured remote
//! backend fails to initialize.

use std::sync::Mutex;

use chrono::{Datelike, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use frontdesk_core::{AvailableSlot, BookingRequest, TimeWindow};

use crate::backend::{BoxFuture, CalendarBackend};
use crate::error::CalendarResult;

/// Days of availability generated ahead of today.
const GENERATION_HORIZON_DAYS: u64 = 90;

/// Business day bounds, local time. Slots start at or after the opening
/// hour and strictly before the closing hour.
const BUSINESS_DAY_OPEN_HOUR: u32 = 9;
const BUSINESS_DAY_CLOSE_HOUR: u32 = 17;

/// Slot length and start-time alignment, in minutes.
const SLOT_DURATION_MIN: u32 = 30;

/// How many of a day's candidate start times are kept.
const MIN_SLOTS_PER_DAY: usize = 3;
const MAX_SLOTS_PER_DAY: usize = 6;

/// In-memory calendar backend with synthetic availability.
///
/// Booking a slot removes it from the internal set, so listings
/// immediately reflect the booking. Booking a start time with no matching
/// slot is a silent no-op. The slot set sits behind a synchronous lock;
/// none of the operations suspend.
pub struct StubBackend {
    timezone: Tz,
    slots: Mutex<Vec<AvailableSlot>>,
}

impl StubBackend {
    /// Creates a stub with randomly sampled availability.
    pub fn new(timezone: Tz) -> Self {
        Self::with_rng(timezone, &mut rand::rng())
    }

    /// Creates a stub with availability sampled from `rng`.
    ///
    /// Generates slots for the next 90 calendar days starting tomorrow in
    /// `timezone`, skipping weekends. Each
    /// business day offers 16 half-hour start times between 09:00 and
    /// 17:00 local, of which 3 to 6 are kept (uniformly, without
    /// replacement), sorted ascending. Pass a seeded generator for
    /// deterministic tests.
    pub fn with_rng<R: Rng + ?Sized>(timezone: Tz, rng: &mut R) -> Self {
        let today = Utc::now().with_timezone(&timezone).date_naive();
        let candidates_per_day = ((BUSINESS_DAY_CLOSE_HOUR - BUSINESS_DAY_OPEN_HOUR) * 60
            / SLOT_DURATION_MIN) as usize;

        let mut slots = Vec::new();
        for day_offset in 1..=GENERATION_HORIZON_DAYS {
            let day = today + Days::new(day_offset);
            if day.weekday().num_days_from_monday() >= 5 {
                continue;
            }

            let mut candidates = Vec::with_capacity(candidates_per_day);
            for step in 0..candidates_per_day as u32 {
                let minutes = BUSINESS_DAY_OPEN_HOUR * 60 + step * SLOT_DURATION_MIN;
                let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
                    .expect("valid business-hours time");
                // A local time can be skipped by a DST transition; such
                // candidates are simply not offered.
                if let Some(local) = timezone.from_local_datetime(&day.and_time(time)).earliest() {
                    candidates.push(local);
                }
            }

            let keep = rng
                .random_range(MIN_SLOTS_PER_DAY..=MAX_SLOTS_PER_DAY)
                .min(candidates.len());
            let mut chosen: Vec<_> = candidates.choose_multiple(rng, keep).cloned().collect();
            chosen.sort();

            for start in chosen {
                slots.push(AvailableSlot::new(start.fixed_offset(), SLOT_DURATION_MIN));
            }
        }

        debug!(slot_count = slots.len(), timezone = %timezone, "generated stub availability");
        Self {
            timezone,
            slots: Mutex::new(slots),
        }
    }

    /// Creates a stub exposing exactly `slots`, for seeded scenarios.
    pub fn with_slots(timezone: Tz, slots: Vec<AvailableSlot>) -> Self {
        Self {
            timezone,
            slots: Mutex::new(slots),
        }
    }

    /// Returns the timezone availability is generated in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl CalendarBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn initialize(&self) -> BoxFuture<'_, CalendarResult<()>> {
        // Availability is generated at construction time; there is nothing
        // that can fail here, which is what makes the resolver's fallback
        // guarantee total.
        Box::pin(async { Ok(()) })
    }

    fn list_available_slots(&self, window: TimeWindow) -> BoxFuture<'_, Vec<AvailableSlot>> {
        let slots = self
            .slots
            .lock()
            .unwrap()
            .iter()
            .filter(|slot| window.contains(&slot.start_time))
            .cloned()
            .collect();
        Box::pin(async move { slots })
    }

    fn schedule_appointment(&self, request: BookingRequest) -> BoxFuture<'_, CalendarResult<()>> {
        let mut slots = self.slots.lock().unwrap();
        let before = slots.len();
        slots.retain(|slot| slot.start_time != request.start_time);
        if slots.len() == before {
            // No matching slot: a silent no-op, mirroring a calendar that
            // never offered the time in the first place.
            debug!(start_time = %request.start_time, "no stub slot matched booking request");
        }
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Timelike};
    use chrono_tz::Europe::Paris;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded_stub(seed: u64) -> StubBackend {
        StubBackend::with_rng(Paris, &mut StdRng::seed_from_u64(seed))
    }

    fn all_slots(stub: &StubBackend) -> Vec<AvailableSlot> {
        stub.slots.lock().unwrap().clone()
    }

    #[test]
    fn generated_slots_respect_business_hours() {
        let stub = seeded_stub(7);
        let slots = all_slots(&stub);
        assert!(!slots.is_empty());

        for slot in &slots {
            let local = slot.start_time.with_timezone(&Paris);
            assert!(
                local.weekday().num_days_from_monday() < 5,
                "slot on a weekend: {local}"
            );
            assert!(local.hour() >= BUSINESS_DAY_OPEN_HOUR, "too early: {local}");
            assert!(local.hour() < BUSINESS_DAY_CLOSE_HOUR, "too late: {local}");
            assert_eq!(local.minute() % 30, 0, "not aligned: {local}");
            assert_eq!(local.second(), 0);
            assert_eq!(slot.duration_min, SLOT_DURATION_MIN);
        }
    }

    #[test]
    fn generated_days_are_sparse_and_sorted() {
        let stub = seeded_stub(42);
        let slots = all_slots(&stub);

        let mut per_day: std::collections::BTreeMap<chrono::NaiveDate, Vec<AvailableSlot>> =
            std::collections::BTreeMap::new();
        for slot in slots {
            per_day
                .entry(slot.start_time.with_timezone(&Paris).date_naive())
                .or_default()
                .push(slot);
        }

        for (day, day_slots) in per_day {
            assert!(
                (MIN_SLOTS_PER_DAY..=MAX_SLOTS_PER_DAY).contains(&day_slots.len()),
                "{day} has {} slots",
                day_slots.len()
            );
            for pair in day_slots.windows(2) {
                assert!(pair[0].start_time < pair[1].start_time);
            }
        }
    }

    #[test]
    fn same_seed_generates_same_slots() {
        assert_eq!(all_slots(&seeded_stub(3)), all_slots(&seeded_stub(3)));
    }

    fn paris_slot(day: u32, hour: u32) -> AvailableSlot {
        let start = Paris
            .with_ymd_and_hms(2025, 1, day, hour, 0, 0)
            .single()
            .unwrap()
            .fixed_offset();
        AvailableSlot::new(start, SLOT_DURATION_MIN)
    }

    #[tokio::test]
    async fn booking_removes_slot_from_listings() {
        let slot = paris_slot(8, 9);
        let other = paris_slot(9, 14);
        let stub = StubBackend::with_slots(Paris, vec![slot.clone(), other.clone()]);
        stub.initialize().await.unwrap();

        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap(),
        );
        assert_eq!(stub.list_available_slots(window).await.len(), 2);

        stub.schedule_appointment(BookingRequest::for_slot(&slot, "Ada", "ada@example.com"))
            .await
            .unwrap();

        let remaining = stub.list_available_slots(window).await;
        assert_eq!(remaining, vec![other]);
    }

    #[tokio::test]
    async fn booking_matches_by_instant_not_offset() {
        let slot = paris_slot(8, 9);
        let stub = StubBackend::with_slots(Paris, vec![slot.clone()]);

        // The same instant expressed in UTC still books the slot.
        let as_utc = slot.start_time.with_timezone(&FixedOffset::east_opt(0).unwrap());
        stub.schedule_appointment(BookingRequest::new(as_utc, "Ada", "ada@example.com"))
            .await
            .unwrap();

        assert!(all_slots(&stub).is_empty());
    }

    #[tokio::test]
    async fn booking_unknown_start_is_a_silent_noop() {
        let slot = paris_slot(8, 9);
        let stub = StubBackend::with_slots(Paris, vec![slot.clone()]);

        let unknown = slot.start_time + Duration::minutes(30);
        stub.schedule_appointment(BookingRequest::new(unknown, "Ada", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(all_slots(&stub), vec![slot]);
    }

    #[tokio::test]
    async fn listing_respects_half_open_window() {
        let inside = paris_slot(8, 9);
        let at_end = AvailableSlot::new(
            Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap().fixed_offset(),
            SLOT_DURATION_MIN,
        );
        let stub = StubBackend::with_slots(Paris, vec![inside.clone(), at_end]);

        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
        );
        assert_eq!(stub.list_available_slots(window).await, vec![inside]);
    }
}
