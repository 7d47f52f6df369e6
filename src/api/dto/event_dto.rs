//! Event DTOs for create, list, details and stats.
//!
//! Event fields keep the column names clients already use (`date_time`),
//! while envelope fields are camelCase (`eventId`, `totalRegistrations`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Capacity, Event, EventId, EventStats, EventWithRoster, NewEvent, RosterEntry, UserId,
};
use crate::error::RegistryError;

/// Request body for `POST /api/events`.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event title.
    #[serde(default)]
    pub title: Option<String>,
    /// ISO-8601 start time, e.g. `2030-05-01T18:00:00Z`.
    #[serde(default)]
    pub date_time: Option<String>,
    /// Venue.
    #[serde(default)]
    pub location: Option<String>,
    /// Seat limit, 1 to 1000.
    #[serde(default)]
    pub capacity: Option<i64>,
}

impl CreateEventRequest {
    /// Checks presence, format and range of every field.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`] naming the first bad field.
    pub fn validate(self) -> Result<NewEvent, RegistryError> {
        let title = required_text(self.title, "title")?;
        let location = required_text(self.location, "location")?;

        let raw_date = self
            .date_time
            .ok_or_else(|| invalid("\"date_time\" is required"))?;
        let date_time = parse_iso_datetime(&raw_date).ok_or_else(|| {
            invalid(&format!(
                "\"date_time\" must be a valid ISO 8601 date, got {raw_date:?}"
            ))
        })?;

        let raw_capacity = self
            .capacity
            .ok_or_else(|| invalid("\"capacity\" is required"))?;
        let capacity = Capacity::try_from(raw_capacity).map_err(|v| {
            invalid(&format!(
                "\"capacity\" must be between {} and {}, got {v}",
                Capacity::MIN,
                Capacity::MAX
            ))
        })?;

        Ok(NewEvent {
            title,
            date_time,
            location,
            capacity,
        })
    }
}

fn invalid(message: &str) -> RegistryError {
    RegistryError::InvalidRequest(message.to_string())
}

fn required_text(value: Option<String>, field: &str) -> Result<String, RegistryError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(invalid(&format!("\"{field}\" must not be empty"))),
        None => Err(invalid(&format!("\"{field}\" is required"))),
    }
}

/// Extended ISO-8601 forms carrying an offset (`Z`, `+02:00` or `+0200`).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Extended ISO-8601 forms without an offset; seconds are optional.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an ISO-8601 timestamp. Values without an offset are taken as
/// UTC; a bare date means midnight UTC.
fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Response body for `POST /api/events` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    /// Identifier of the new event.
    pub event_id: EventId,
}

/// An event as returned by list and details endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDto {
    /// Event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Start time (RFC 3339, UTC).
    pub date_time: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Seat limit.
    pub capacity: u32,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            capacity: event.capacity.get(),
        }
    }
}

/// A registered user on an event roster.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterEntryDto {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl From<RosterEntry> for RosterEntryDto {
    fn from(entry: RosterEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
        }
    }
}

/// Response body for `GET /api/events/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDetailsResponse {
    /// Event fields.
    #[serde(flatten)]
    pub event: EventDto,
    /// Users currently registered, oldest registration first.
    pub registrations: Vec<RosterEntryDto>,
}

impl From<EventWithRoster> for EventDetailsResponse {
    fn from(details: EventWithRoster) -> Self {
        Self {
            event: details.event.into(),
            registrations: details
                .registrations
                .into_iter()
                .map(RosterEntryDto::from)
                .collect(),
        }
    }
}

/// Response body for `GET /api/events/{id}/stats`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventStatsResponse {
    /// Number of active registrations.
    pub total_registrations: u32,
    /// Seats still available.
    pub remaining_capacity: u32,
    /// Share of capacity in use, formatted like `"66.67%"`.
    pub capacity_used_percentage: String,
}

impl From<EventStats> for EventStatsResponse {
    fn from(stats: EventStats) -> Self {
        Self {
            total_registrations: stats.registration_count,
            remaining_capacity: stats.remaining_capacity,
            capacity_used_percentage: stats.used_percentage(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn request(date_time: &str, capacity: i64) -> CreateEventRequest {
        CreateEventRequest {
            title: Some("RustFest".to_string()),
            date_time: Some(date_time.to_string()),
            location: Some("Rome".to_string()),
            capacity: Some(capacity),
        }
    }

    #[test]
    fn valid_request_produces_new_event() {
        let Ok(event) = request("2031-06-01T10:30:00+02:00", 100).validate() else {
            panic!("expected valid request");
        };
        assert_eq!(event.capacity.get(), 100);
        assert_eq!(event.date_time.hour(), 8);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let Ok(event) = request("2031-06-01", 1).validate() else {
            panic!("expected valid request");
        };
        assert_eq!(event.date_time.day(), 1);
        assert_eq!(event.date_time.hour(), 0);
    }

    fn parsed(raw: &str) -> DateTime<Utc> {
        let Some(dt) = parse_iso_datetime(raw) else {
            panic!("{raw} should parse");
        };
        dt
    }

    fn utc(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        let Some(dt) =
            NaiveDate::from_ymd_opt(2031, 6, 1).and_then(|d| d.and_hms_opt(hour, minute, second))
        else {
            panic!("valid instant");
        };
        dt.and_utc()
    }

    #[test]
    fn naive_minutes_without_seconds_is_utc() {
        assert_eq!(parsed("2031-06-01T10:30"), utc(10, 30, 0));
    }

    #[test]
    fn naive_with_seconds_and_fraction_is_utc() {
        assert_eq!(parsed("2031-06-01T10:30:15"), utc(10, 30, 15));
        assert_eq!(parsed("2031-06-01T10:30:15.250").timestamp_subsec_millis(), 250);
    }

    #[test]
    fn zulu_minutes_without_seconds() {
        assert_eq!(parsed("2031-06-01T10:30Z"), utc(10, 30, 0));
    }

    #[test]
    fn basic_offset_without_colon() {
        assert_eq!(parsed("2031-06-01T10:30:00+0200"), utc(8, 30, 0));
        assert_eq!(parsed("2031-06-01T10:30-0130"), utc(12, 0, 0));
    }

    #[test]
    fn extended_offset_and_fractional_zulu() {
        assert_eq!(parsed("2031-06-01T10:30:00+02:00"), utc(8, 30, 0));
        assert_eq!(parsed("2031-06-01T10:30:00.000Z"), utc(10, 30, 0));
    }

    #[test]
    fn trailing_garbage_is_not_a_timestamp() {
        assert!(parse_iso_datetime("2031-06-01T10:30 tomorrow").is_none());
        assert!(parse_iso_datetime("2031-06-01T25:00").is_none());
    }

    #[test]
    fn capacity_out_of_range_is_rejected() {
        for capacity in [0, -1, 1001] {
            assert!(matches!(
                request("2031-06-01T10:00:00Z", capacity).validate(),
                Err(RegistryError::InvalidRequest(msg)) if msg.contains("capacity")
            ));
        }
    }

    #[test]
    fn missing_and_blank_fields_are_rejected() {
        let mut req = request("2031-06-01T10:00:00Z", 10);
        req.title = None;
        assert!(matches!(
            req.validate(),
            Err(RegistryError::InvalidRequest(msg)) if msg.contains("title")
        ));

        let mut req = request("2031-06-01T10:00:00Z", 10);
        req.location = Some("   ".to_string());
        assert!(matches!(
            req.validate(),
            Err(RegistryError::InvalidRequest(msg)) if msg.contains("location")
        ));
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(matches!(
            request("next tuesday", 10).validate(),
            Err(RegistryError::InvalidRequest(msg)) if msg.contains("date_time")
        ));
    }

    #[test]
    fn stats_response_uses_camel_case() {
        let Some(capacity) = Capacity::new(2) else {
            panic!("valid capacity");
        };
        let body = EventStatsResponse::from(EventStats::compute(2, capacity));
        let Ok(json) = serde_json::to_value(&body) else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("totalRegistrations"), Some(&serde_json::json!(2)));
        assert_eq!(json.get("remainingCapacity"), Some(&serde_json::json!(0)));
        assert_eq!(
            json.get("capacityUsedPercentage"),
            Some(&serde_json::json!("100.00%"))
        );
    }

    #[test]
    fn details_response_flattens_event_and_lists_roster() {
        let Some(capacity) = Capacity::new(3) else {
            panic!("valid capacity");
        };
        let details = EventWithRoster {
            event: Event {
                id: EventId::new(5),
                title: "RustFest".to_string(),
                date_time: parsed("2031-06-01T10:30Z"),
                location: "Rome".to_string(),
                capacity,
            },
            registrations: vec![RosterEntry {
                id: UserId::new(9),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            }],
        };

        let Ok(json) = serde_json::to_value(EventDetailsResponse::from(details)) else {
            panic!("serialization failed");
        };
        assert_eq!(
            json,
            serde_json::json!({
                "id": 5,
                "title": "RustFest",
                "date_time": "2031-06-01T10:30:00Z",
                "location": "Rome",
                "capacity": 3,
                "registrations": [
                    { "id": 9, "name": "Ada", "email": "ada@example.com" }
                ],
            })
        );
    }
}
