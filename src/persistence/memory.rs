//! In-memory implementation of the registration store.
//!
//! The whole dataset sits behind one [`tokio::sync::Mutex`], so every
//! operation, [`RegistrationStore::admit_registration`] included, runs as a
//! single critical section. That gives the same all-or-nothing semantics the
//! Postgres adapter gets from its row lock, but only within one process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{Admission, RegistrationStore, StoreResult};
use crate::domain::{Event, EventId, EventWithRoster, NewEvent, RosterEntry, User, UserId};

#[derive(Debug, Default)]
struct Tables {
    events: BTreeMap<EventId, Event>,
    users: HashMap<UserId, User>,
    /// Registration pairs mapped to an insertion sequence number.
    registrations: BTreeMap<(EventId, UserId), u64>,
    next_event_id: i64,
    next_sequence: u64,
}

impl Tables {
    fn count_for(&self, event_id: EventId) -> usize {
        self.registrations
            .range((event_id, UserId::new(i64::MIN))..=(event_id, UserId::new(i64::MAX)))
            .count()
    }
}

/// In-memory [`RegistrationStore`].
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user account.
    ///
    /// Users are owned outside the registration service, so this exists for
    /// seeding only.
    pub async fn add_user(&self, user: User) {
        let mut tables = self.tables.lock().await;
        tables.users.insert(user.id, user);
    }

    /// Returns the total number of registrations across all events.
    pub async fn registration_total(&self) -> usize {
        self.tables.lock().await.registrations.len()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.lock().await;
        tables.next_event_id += 1;
        let event = event.with_id(EventId::new(tables.next_event_id));
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn get_event_with_roster(&self, id: EventId) -> StoreResult<Option<EventWithRoster>> {
        let tables = self.tables.lock().await;
        let Some(event) = tables.events.get(&id).cloned() else {
            return Ok(None);
        };

        let mut entries: Vec<(u64, RosterEntry)> = tables
            .registrations
            .range((id, UserId::new(i64::MIN))..=(id, UserId::new(i64::MAX)))
            .filter_map(|(&(_, user_id), &seq)| {
                tables
                    .users
                    .get(&user_id)
                    .map(|u| (seq, RosterEntry::from(u.clone())))
            })
            .collect();
        entries.sort_by_key(|(seq, entry)| (*seq, entry.id));

        Ok(Some(EventWithRoster {
            event,
            registrations: entries.into_iter().map(|(_, entry)| entry).collect(),
        }))
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> StoreResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        let mut upcoming: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.is_upcoming(now))
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| {
            a.date_time
                .cmp(&b.date_time)
                .then_with(|| a.location.cmp(&b.location))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(upcoming)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn registration_exists(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .registrations
            .contains_key(&(event_id, user_id)))
    }

    async fn count_registrations(&self, event_id: EventId) -> StoreResult<u32> {
        let count = self.tables.lock().await.count_for(event_id);
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn admit_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Admission> {
        let mut tables = self.tables.lock().await;

        let Some(capacity) = tables.events.get(&event_id).map(|e| e.capacity.get()) else {
            return Ok(Admission::EventMissing);
        };
        if tables.registrations.contains_key(&(event_id, user_id)) {
            return Ok(Admission::Duplicate);
        }
        if tables.count_for(event_id) >= capacity as usize {
            return Ok(Admission::Full);
        }

        tables.next_sequence += 1;
        let seq = tables.next_sequence;
        tables.registrations.insert((event_id, user_id), seq);
        Ok(Admission::Admitted)
    }

    async fn delete_registration(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .registrations
            .remove(&(event_id, user_id))
            .is_some())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::Capacity;

    fn new_event(title: &str, location: &str, date_time: DateTime<Utc>, cap: u32) -> NewEvent {
        let Some(capacity) = Capacity::new(cap) else {
            panic!("valid capacity");
        };
        NewEvent {
            title: title.to_string(),
            date_time,
            location: location.to_string(),
            capacity,
        }
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let when = Utc::now() + Duration::days(1);
        let Ok(a) = store.create_event(new_event("A", "X", when, 5)).await else {
            panic!("create failed");
        };
        let Ok(b) = store.create_event(new_event("B", "X", when, 5)).await else {
            panic!("create failed");
        };
        assert_eq!(a.id, EventId::new(1));
        assert_eq!(b.id, EventId::new(2));
    }

    #[tokio::test]
    async fn admit_respects_capacity_and_uniqueness() {
        let store = InMemoryStore::new();
        let Ok(event) = store
            .create_event(new_event("A", "X", Utc::now() + Duration::days(1), 1))
            .await
        else {
            panic!("create failed");
        };

        assert_eq!(
            store.admit_registration(event.id, UserId::new(1)).await,
            Ok(Admission::Admitted)
        );
        assert_eq!(
            store.admit_registration(event.id, UserId::new(1)).await,
            Ok(Admission::Duplicate)
        );
        assert_eq!(
            store.admit_registration(event.id, UserId::new(2)).await,
            Ok(Admission::Full)
        );
        assert_eq!(
            store.admit_registration(EventId::new(99), UserId::new(2)).await,
            Ok(Admission::EventMissing)
        );
        assert_eq!(store.count_registrations(event.id).await, Ok(1));
    }

    #[tokio::test]
    async fn counts_are_per_event() {
        let store = InMemoryStore::new();
        let when = Utc::now() + Duration::days(1);
        let Ok(a) = store.create_event(new_event("A", "X", when, 5)).await else {
            panic!("create failed");
        };
        let Ok(b) = store.create_event(new_event("B", "X", when, 5)).await else {
            panic!("create failed");
        };
        let _ = store.admit_registration(a.id, UserId::new(1)).await;
        let _ = store.admit_registration(a.id, UserId::new(2)).await;
        let _ = store.admit_registration(b.id, UserId::new(1)).await;

        assert_eq!(store.count_registrations(a.id).await, Ok(2));
        assert_eq!(store.count_registrations(b.id).await, Ok(1));
        assert_eq!(store.registration_total().await, 3);
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let store = InMemoryStore::new();
        let Ok(event) = store
            .create_event(new_event("A", "X", Utc::now() + Duration::days(1), 3))
            .await
        else {
            panic!("create failed");
        };
        let _ = store.admit_registration(event.id, UserId::new(4)).await;

        assert_eq!(store.delete_registration(event.id, UserId::new(4)).await, Ok(true));
        assert_eq!(store.delete_registration(event.id, UserId::new(4)).await, Ok(false));
        assert_eq!(store.registration_exists(event.id, UserId::new(4)).await, Ok(false));
    }

    #[tokio::test]
    async fn roster_is_in_registration_order() {
        let store = InMemoryStore::new();
        store.add_user(user(1, "Ada")).await;
        store.add_user(user(2, "Grace")).await;
        store.add_user(user(3, "Linus")).await;
        let Ok(event) = store
            .create_event(new_event("A", "X", Utc::now() + Duration::days(1), 5))
            .await
        else {
            panic!("create failed");
        };

        let _ = store.admit_registration(event.id, UserId::new(3)).await;
        let _ = store.admit_registration(event.id, UserId::new(1)).await;
        let _ = store.admit_registration(event.id, UserId::new(2)).await;

        let Ok(Some(roster)) = store.get_event_with_roster(event.id).await else {
            panic!("event missing");
        };
        let names: Vec<&str> = roster
            .registrations
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["Linus", "Ada", "Grace"]);
    }

    #[tokio::test]
    async fn list_upcoming_orders_by_date_then_location() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let soon = now + Duration::hours(1);
        let later = now + Duration::days(2);

        let _ = store.create_event(new_event("past", "A", now - Duration::hours(1), 5)).await;
        let _ = store.create_event(new_event("late", "A", later, 5)).await;
        let _ = store.create_event(new_event("soon-z", "Zurich", soon, 5)).await;
        let _ = store.create_event(new_event("soon-a", "Amsterdam", soon, 5)).await;

        let Ok(upcoming) = store.list_upcoming(now).await else {
            panic!("list failed");
        };
        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["soon-a", "soon-z", "late"]);
    }
}
