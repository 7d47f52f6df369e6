//! Events and their rosters.

use chrono::{DateTime, Utc};

use super::{Capacity, EventId, User, UserId};

/// A published event with a fixed capacity.
///
/// Immutable once stored: this service never edits or deletes events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// When the event takes place.
    pub date_time: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Maximum number of registrations.
    pub capacity: Capacity,
}

impl Event {
    /// Returns `true` if the event starts strictly after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date_time > now
    }
}

/// Fields for an event that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Display title.
    pub title: String,
    /// When the event takes place.
    pub date_time: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Maximum number of registrations.
    pub capacity: Capacity,
}

impl NewEvent {
    /// Attaches a store-assigned id, producing the stored [`Event`].
    #[must_use]
    pub fn with_id(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            date_time: self.date_time,
            location: self.location,
            capacity: self.capacity,
        }
    }
}

/// One registered user as shown on an event roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// User identifier.
    pub id: UserId,
    /// User display name.
    pub name: String,
    /// User email address.
    pub email: String,
}

impl From<User> for RosterEntry {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// An event together with everyone currently registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWithRoster {
    /// The event itself.
    pub event: Event,
    /// Registered users, oldest registration first.
    pub registrations: Vec<RosterEntry>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn sample(date_time: DateTime<Utc>) -> Event {
        let Some(capacity) = Capacity::new(10) else {
            panic!("valid capacity");
        };
        NewEvent {
            title: "RustConf".to_string(),
            date_time,
            location: "Montreal".to_string(),
            capacity,
        }
        .with_id(EventId::new(1))
    }

    #[test]
    fn upcoming_is_strictly_after_now() {
        let now = Utc::now();
        assert!(sample(now + Duration::minutes(1)).is_upcoming(now));
        assert!(!sample(now).is_upcoming(now));
        assert!(!sample(now - Duration::days(1)).is_upcoming(now));
    }

    #[test]
    fn with_id_keeps_fields() {
        let event = sample(Utc::now());
        assert_eq!(event.id, EventId::new(1));
        assert_eq!(event.title, "RustConf");
        assert_eq!(event.capacity.get(), 10);
    }
}
