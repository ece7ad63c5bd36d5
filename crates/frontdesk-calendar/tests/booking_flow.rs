//! End-to-end listing-to-booking round trip against the stub backend,
//! driving it through the trait object the way the conversational layer
//! does: list, cache by identifier, resolve the chosen identifier back to
//! a slot, book it.

use std::collections::HashMap;

use chrono::{FixedOffset, TimeZone, Utc};
use chrono_tz::Europe::Paris;

use frontdesk_calendar::{CalendarBackend, StubBackend};
use frontdesk_core::{AvailableSlot, BookingRequest, TimeWindow, slot_identifier};

#[tokio::test]
async fn list_then_book_through_identifier_cache() {
    let start = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 8, 9, 0, 0)
        .unwrap();
    let seeded = AvailableSlot::new(start, 30);

    let backend: Box<dyn CalendarBackend> =
        Box::new(StubBackend::with_slots(Paris, vec![seeded.clone()]));
    backend.initialize().await.expect("stub initialization cannot fail");

    let window = TimeWindow::new(
        Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap(),
    );

    let listed = backend.list_available_slots(window).await;
    assert_eq!(listed, vec![seeded.clone()]);

    // The caller-side cache is rebuilt on every listing call and lives for
    // one listing-to-booking round trip.
    let cache: HashMap<String, AvailableSlot> = listed
        .into_iter()
        .map(|slot| (slot.identifier(), slot))
        .collect();

    let wanted = slot_identifier(start, 30);
    let resolved = cache.get(&wanted).expect("identifier resolves to the seeded slot");
    assert_eq!(resolved, &seeded);

    backend
        .schedule_appointment(BookingRequest::for_slot(resolved, "Ada Lovelace", "ada@example.com"))
        .await
        .expect("booking failed");

    assert!(backend.list_available_slots(window).await.is_empty());
}
