//! Database row models for events, users and roster joins.

use chrono::{DateTime, Utc};

use crate::domain::{Capacity, Event, EventId, RosterEntry, UserId};
use crate::persistence::StoreError;

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Event title.
    pub title: String,
    /// Event start.
    pub date_time: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Seat limit, constrained to 1..=1000 by the schema.
    pub capacity: i32,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let capacity = Capacity::try_from(i64::from(row.capacity)).map_err(|v| {
            StoreError::Database(format!("event {} has out-of-range capacity {v}", row.id))
        })?;
        Ok(Self {
            id: EventId::new(row.id),
            title: row.title,
            date_time: row.date_time,
            location: row.location,
            capacity,
        })
    }
}

/// A row from `users`, also produced by the roster join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl From<UserRow> for RosterEntry {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(capacity: i32) -> EventRow {
        EventRow {
            id: 3,
            title: "Meetup".to_string(),
            date_time: Utc::now(),
            location: "Berlin".to_string(),
            capacity,
        }
    }

    #[test]
    fn valid_row_converts() {
        let event = Event::try_from(row(40));
        assert!(matches!(event, Ok(ref e) if e.capacity.get() == 40 && e.id == EventId::new(3)));
    }

    #[test]
    fn corrupt_capacity_is_database_error() {
        assert!(matches!(
            Event::try_from(row(0)),
            Err(StoreError::Database(_))
        ));
    }
}
