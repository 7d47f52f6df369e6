//! Persistence layer: the registration store port and its adapters.
//!
//! [`RegistrationStore`] is the only way the services touch state. Two
//! adapters implement it: [`postgres::PostgresStore`] backed by
//! `sqlx::PgPool`, and [`memory::InMemoryStore`] used when persistence is
//! disabled and in tests.
//!
//! The capacity and uniqueness guarantees rest on
//! [`RegistrationStore::admit_registration`], which must check and insert
//! as one atomic unit. Everything else is a plain read or delete.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, EventWithRoster, NewEvent, User, UserId};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection, timeout or contention failure. Retrying may succeed.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an atomic conditional registration insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The registration row was inserted.
    Admitted,
    /// The event does not exist.
    EventMissing,
    /// The event had no free seat; nothing was inserted.
    Full,
    /// The pair was already registered; nothing was inserted.
    Duplicate,
}

/// Durable storage for events, users and registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync + fmt::Debug {
    /// Stores a new event and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn create_event(&self, event: NewEvent) -> StoreResult<Event>;

    /// Gets an event by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Gets an event with its roster, oldest registration first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn get_event_with_roster(&self, id: EventId) -> StoreResult<Option<EventWithRoster>>;

    /// Lists events strictly after `now`, ordered by date then location.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn list_upcoming(&self, now: DateTime<Utc>) -> StoreResult<Vec<Event>>;

    /// Gets a user by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Returns `true` if the user holds a registration for the event.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn registration_exists(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool>;

    /// Counts registrations for the event.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn count_registrations(&self, event_id: EventId) -> StoreResult<u32>;

    /// Inserts a registration only if the event exists, has a free seat and
    /// the pair is not yet registered, all evaluated atomically against
    /// every concurrent writer.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure. Constraint violations
    /// are reported through [`Admission`], not as errors.
    async fn admit_registration(&self, event_id: EventId, user_id: UserId)
    -> StoreResult<Admission>;

    /// Deletes the registration for the pair. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on storage failure.
    async fn delete_registration(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool>;
}
