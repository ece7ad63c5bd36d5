//! Low-level cal.com v2 API client.
//!
//! One method per endpoint, per-endpoint `cal-api-version` headers, and
//! response decoding into the narrow shapes the backend needs. Error
//! classification into the calendar taxonomy happens here, close to the
//! wire.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{CalendarError, CalendarResult};

/// Header carrying the per-endpoint API version.
const API_VERSION_HEADER: &str = "cal-api-version";

/// API version for identity and event-type endpoints.
const IDENTITY_API_VERSION: &str = "2024-06-14";

/// API version for the slots endpoint.
const SLOTS_API_VERSION: &str = "2024-09-04";

/// API version for the bookings endpoint.
const BOOKINGS_API_VERSION: &str = "2024-08-13";

/// Known fragments of the provider message reporting a booking conflict.
///
/// cal.com's v2 booking error envelope carries only free text; matching on
/// these fragments is a documented heuristic, not a contract. An error
/// message matching neither fragment is treated as a generic booking
/// failure.
const CONFLICT_MESSAGE_FRAGMENTS: [&str; 2] = ["already has booking", "is not available"];

/// cal.com v2 HTTP client.
///
/// Holds a single reusable [`reqwest::Client`]; the transport layer is
/// safe for concurrent use, so one client instance serves all operations
/// and sessions.
#[derive(Debug)]
pub struct CalComClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl CalComClient {
    /// Creates a new client against `base_url`.
    pub fn new(api_key: impl Into<String>, base_url: Url, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn get(&self, path: &str, api_version: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .header(API_VERSION_HEADER, api_version)
    }

    fn post(&self, path: &str, api_version: &str) -> reqwest::RequestBuilder {
        self.http_client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .header(API_VERSION_HEADER, api_version)
    }

    /// Fetches the authenticated user's profile and returns the username.
    pub async fn fetch_username(&self) -> CalendarResult<String> {
        let response = self
            .get("me/", IDENTITY_API_VERSION)
            .send()
            .await
            .map_err(|e| {
                CalendarError::initialization(format!("identity lookup failed: {}", transport(&e)))
                    .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::initialization(format!(
                "identity lookup failed with status {status}"
            )));
        }

        let profile: UserResponse = response.json().await.map_err(|e| {
            CalendarError::initialization("identity response missing username").with_source(e)
        })?;

        Ok(profile.data.username)
    }

    /// Validates that the given event type exists and is accessible.
    pub async fn validate_event_type(&self, event_type_id: i64) -> CalendarResult<()> {
        let response = self
            .get(&format!("event-types/{event_type_id}"), IDENTITY_API_VERSION)
            .send()
            .await
            .map_err(|e| {
                CalendarError::initialization(format!(
                    "event type lookup failed: {}",
                    transport(&e)
                ))
                .with_source(e)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CalendarError::initialization(format!(
                "configured event type {event_type_id} not found or not accessible"
            )));
        }
        if !status.is_success() {
            return Err(CalendarError::initialization(format!(
                "event type lookup failed with status {status}"
            )));
        }

        Ok(())
    }

    /// Lists the event types owned by `username`.
    pub async fn list_event_types(&self, username: &str) -> CalendarResult<Vec<EventTypeEntry>> {
        let response = self
            .get("event-types/", IDENTITY_API_VERSION)
            .query(&[("username", username)])
            .send()
            .await
            .map_err(|e| {
                CalendarError::initialization(format!(
                    "event type listing failed: {}",
                    transport(&e)
                ))
                .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::initialization(format!(
                "event type listing failed with status {status}"
            )));
        }

        let listing: EventTypesResponse = response.json().await.map_err(|e| {
            CalendarError::initialization("unexpected event type listing format").with_source(e)
        })?;

        Ok(listing.data)
    }

    /// Creates a new event type and returns its identifier.
    pub async fn create_event_type(
        &self,
        length_in_minutes: u32,
        title: &str,
        slug: &str,
    ) -> CalendarResult<i64> {
        let payload = CreateEventTypeRequest {
            length_in_minutes,
            title,
            slug,
        };

        let response = self
            .post("event-types", IDENTITY_API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                CalendarError::initialization(format!(
                    "event type creation failed: {}",
                    transport(&e)
                ))
                .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::initialization(format!(
                "event type creation failed with status {status}"
            )));
        }

        let created: CreatedEventTypeResponse = response.json().await.map_err(|e| {
            CalendarError::initialization("event type creation response missing id").with_source(e)
        })?;

        debug!(event_type_id = created.data.id, slug, "created cal.com event type");
        Ok(created.data.id)
    }

    /// Fetches available slots for an event type in `[start, end)`.
    ///
    /// Returns the raw day-keyed groups; the backend flattens and parses
    /// them so individual malformed entries can be skipped. Day keys are
    /// ISO dates, so the map's ordering is chronological.
    pub async fn list_slots(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarResult<BTreeMap<String, Value>> {
        let response = self
            .get("slots/", SLOTS_API_VERSION)
            .query(&[
                ("eventTypeId", event_type_id.to_string()),
                ("start", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await
            .map_err(|e| {
                CalendarError::listing(format!("slot fetch failed: {}", transport(&e)))
                    .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::listing(format!(
                "slot fetch failed with status {status}"
            )));
        }

        let listing: SlotsResponse = response.json().await.map_err(|e| {
            CalendarError::listing("slot response missing data field").with_source(e)
        })?;

        Ok(listing.data)
    }

    /// Creates a booking.
    ///
    /// The response body is parsed leniently: an empty body counts as an
    /// empty object, and a provider-level `error.message` envelope takes
    /// precedence over the HTTP status when classifying the failure.
    pub async fn create_booking(&self, payload: &BookingPayload) -> CalendarResult<()> {
        let response = self
            .post("bookings", BOOKINGS_API_VERSION)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                CalendarError::booking(format!("booking request failed: {}", transport(&e)))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CalendarError::booking("failed to read booking response").with_source(e)
        })?;

        let data: Value = if body.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&body).map_err(|e| {
                CalendarError::booking("unparsable booking response body").with_source(e)
            })?
        };

        if let Some(message) = data
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
        {
            return Err(classify_booking_error(message));
        }

        if status.as_u16() >= 400 {
            return Err(CalendarError::booking(format!(
                "booking failed with status {status}"
            )));
        }

        Ok(())
    }
}

/// Classifies a provider error message into the booking taxonomy.
fn classify_booking_error(message: &str) -> CalendarError {
    if CONFLICT_MESSAGE_FRAGMENTS
        .iter()
        .any(|fragment| message.contains(fragment))
    {
        CalendarError::slot_unavailable(message)
    } else {
        CalendarError::booking(format!("cal.com API error: {message}"))
    }
}

/// Short description of a transport-level failure.
fn transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timeout".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

/// Request body for `POST event-types`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventTypeRequest<'a> {
    length_in_minutes: u32,
    title: &'a str,
    slug: &'a str,
}

/// Booking payload for `POST bookings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    /// Slot start, ISO-8601 in UTC.
    pub start: String,
    /// The attendee being booked.
    pub attendee: BookingAttendee,
    /// Identifier of the event type to book against.
    pub event_type_id: i64,
}

/// Attendee block of a booking payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAttendee {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// IANA name of the attendee's timezone.
    pub time_zone: String,
}

/// An entry from the event type listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeEntry {
    /// Event type identifier.
    pub id: i64,
    /// URL slug, when present.
    pub slug: Option<String>,
}

/// Response from `GET me/`.
#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    username: String,
}

/// Response from `GET event-types/`.
#[derive(Debug, Deserialize)]
struct EventTypesResponse {
    #[serde(default)]
    data: Vec<EventTypeEntry>,
}

/// Response from `POST event-types`.
#[derive(Debug, Deserialize)]
struct CreatedEventTypeResponse {
    data: CreatedEventType,
}

#[derive(Debug, Deserialize)]
struct CreatedEventType {
    id: i64,
}

/// Response from `GET slots/`: `data` maps day to a list of slot entries.
#[derive(Debug, Deserialize)]
struct SlotsResponse {
    data: BTreeMap<String, Value>,
}
