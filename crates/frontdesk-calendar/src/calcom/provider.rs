//! cal.com backend implementation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use frontdesk_core::{AvailableSlot, BookingRequest, TimeWindow};

use crate::backend::{BoxFuture, CalendarBackend};
use crate::error::{CalendarError, CalendarResult};

use super::client::{BookingAttendee, BookingPayload, CalComClient};
use super::config::CalComConfig;
use super::{EVENT_DURATION_MIN, FRONT_DESK_EVENT_SLUG, FRONT_DESK_EVENT_TITLE};

/// Calendar backend over the cal.com v2 API.
///
/// Initialization resolves the authenticated identity and the event type
/// to book against; the resolved event-type id is written once and read
/// without further synchronization by the other operations.
pub struct CalComBackend {
    config: CalComConfig,
    client: CalComClient,
    event_type_id: OnceLock<i64>,
}

impl CalComBackend {
    /// Creates a backend from `config`. No network traffic happens until
    /// [`initialize`](CalendarBackend::initialize).
    pub fn new(config: CalComConfig) -> Self {
        let client = CalComClient::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.timeout,
        );
        Self {
            config,
            client,
            event_type_id: OnceLock::new(),
        }
    }

    async fn initialize_inner(&self) -> CalendarResult<()> {
        let username = self.client.fetch_username().await?;
        debug!(username = %username, "resolved cal.com identity");

        let event_type_id = match self.config.event_type_id {
            Some(configured) => {
                self.client.validate_event_type(configured).await?;
                info!(event_type_id = configured, "using configured cal.com event type");
                configured
            }
            None => match self.find_event_type_by_slug(&username).await? {
                Some(existing) => {
                    info!(
                        event_type_id = existing,
                        slug = FRONT_DESK_EVENT_SLUG,
                        "found existing cal.com event type"
                    );
                    existing
                }
                None => {
                    let created = self
                        .client
                        .create_event_type(
                            EVENT_DURATION_MIN,
                            FRONT_DESK_EVENT_TITLE,
                            FRONT_DESK_EVENT_SLUG,
                        )
                        .await?;
                    info!(
                        event_type_id = created,
                        slug = FRONT_DESK_EVENT_SLUG,
                        "created cal.com event type"
                    );
                    created
                }
            },
        };

        // A repeated initialize keeps the first resolved id.
        let _ = self.event_type_id.set(event_type_id);
        Ok(())
    }

    async fn find_event_type_by_slug(&self, username: &str) -> CalendarResult<Option<i64>> {
        let event_types = self.client.list_event_types(username).await?;
        Ok(event_types
            .into_iter()
            .find(|entry| entry.slug.as_deref() == Some(FRONT_DESK_EVENT_SLUG))
            .map(|entry| entry.id))
    }

    fn resolved_event_type_id(&self) -> Option<i64> {
        self.event_type_id.get().copied()
    }
}

impl CalendarBackend for CalComBackend {
    fn name(&self) -> &str {
        "cal.com"
    }

    fn initialize(&self) -> BoxFuture<'_, CalendarResult<()>> {
        Box::pin(async move {
            self.initialize_inner()
                .await
                .map_err(|err| err.with_backend(self.name()))
        })
    }

    fn list_available_slots(&self, window: TimeWindow) -> BoxFuture<'_, Vec<AvailableSlot>> {
        Box::pin(async move {
            let Some(event_type_id) = self.resolved_event_type_id() else {
                warn!("slot listing before initialization, returning no slots");
                return Vec::new();
            };

            match self
                .client
                .list_slots(event_type_id, window.start, window.end)
                .await
            {
                Ok(day_groups) => {
                    let slots: Vec<AvailableSlot> = flatten_day_groups(day_groups)
                        .into_iter()
                        .filter(|slot| window.contains(&slot.start_time))
                        .collect();
                    debug!(slot_count = slots.len(), "fetched cal.com availability");
                    slots
                }
                // Listing is advisory: degrade to "no slots found" instead
                // of failing the conversation.
                Err(err) => {
                    warn!(error = %err, "failed to fetch available slots");
                    Vec::new()
                }
            }
        })
    }

    fn schedule_appointment(&self, request: BookingRequest) -> BoxFuture<'_, CalendarResult<()>> {
        Box::pin(async move {
            let Some(event_type_id) = self.resolved_event_type_id() else {
                return Err(CalendarError::booking("backend not initialized")
                    .with_backend(self.name()));
            };

            let start_utc = request.start_time.with_timezone(&Utc);
            let payload = BookingPayload {
                start: start_utc.to_rfc3339(),
                attendee: BookingAttendee {
                    name: request.attendee_name,
                    email: request.attendee_email,
                    time_zone: self.config.timezone.name().to_string(),
                },
                event_type_id,
            };

            debug!(start = %payload.start, event_type_id, "creating cal.com booking");
            self.client
                .create_booking(&payload)
                .await
                .map_err(|err| err.with_backend(self.name()))?;

            info!(start = %payload.start, "cal.com booking created");
            Ok(())
        })
    }
}

/// Flattens the day-keyed slot groups into slots, in group order.
///
/// Entries that are not objects, lack a `start` field, or carry an
/// unparsable timestamp are skipped individually; the rest of the batch is
/// kept. The provider renders starts as `Z`-suffixed UTC timestamps, which
/// are normalized to an explicit UTC offset before parsing.
fn flatten_day_groups(day_groups: std::collections::BTreeMap<String, Value>) -> Vec<AvailableSlot> {
    let mut slots = Vec::new();
    for (day, group) in day_groups {
        let Some(entries) = group.as_array() else {
            warn!(day = %day, "skipping non-list slot group");
            continue;
        };

        for entry in entries {
            let Some(start) = entry.get("start").and_then(Value::as_str) else {
                warn!(day = %day, "skipping slot entry without start time");
                continue;
            };

            let normalized = start.replace('Z', "+00:00");
            match DateTime::parse_from_rfc3339(&normalized) {
                Ok(start_time) => slots.push(AvailableSlot::new(start_time, EVENT_DURATION_MIN)),
                Err(err) => {
                    warn!(day = %day, start, error = %err, "skipping unparsable slot start time");
                }
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day_groups(value: Value) -> std::collections::BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flatten_preserves_group_order_and_duration() {
        let groups = day_groups(json!({
            "2025-01-07": [{"start": "2025-01-07T14:00:00.000Z"}],
            "2025-01-06": [
                {"start": "2025-01-06T09:00:00.000Z"},
                {"start": "2025-01-06T10:30:00.000Z"}
            ]
        }));

        let slots = flatten_day_groups(groups);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|slot| slot.duration_min == 30));
        assert!(slots.windows(2).all(|w| w[0].start_time < w[1].start_time));
        assert_eq!(slots[0].start_time.to_rfc3339(), "2025-01-06T09:00:00+00:00");
    }

    #[test]
    fn flatten_skips_malformed_entries() {
        let groups = day_groups(json!({
            "2025-01-06": [
                {"start": "2025-01-06T09:00:00.000Z"},
                {"end": "2025-01-06T10:00:00.000Z"},
                {"start": "not-a-timestamp"},
                "just a string"
            ],
            "2025-01-07": "not a list"
        }));

        let slots = flatten_day_groups(groups);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_time.to_rfc3339(), "2025-01-06T09:00:00+00:00");
    }
}
