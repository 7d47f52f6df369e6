//! Query service: event creation and read-only views.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, EventStats, EventWithRoster, NewEvent};
use crate::error::RegistryError;
use crate::persistence::RegistrationStore;

/// Event creation plus roster, listing and statistics reads.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<dyn RegistrationStore>,
}

impl QueryService {
    /// Creates a new `QueryService`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Publishes a new event. Input is assumed already validated.
    ///
    /// # Errors
    ///
    /// Returns a store error if the event cannot be saved.
    pub async fn create_event(&self, event: NewEvent) -> Result<EventId, RegistryError> {
        let event = self.store.create_event(event).await?;
        tracing::info!(event_id = %event.id, capacity = %event.capacity, "event created");
        Ok(event.id)
    }

    /// Returns an event with the users currently registered for it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if the event does not exist.
    pub async fn event_with_roster(&self, id: EventId) -> Result<EventWithRoster, RegistryError> {
        self.store
            .get_event_with_roster(id)
            .await?
            .ok_or(RegistryError::EventNotFound(id))
    }

    /// Lists events that have not started yet.
    ///
    /// # Errors
    ///
    /// Returns a store error on failure.
    pub async fn list_upcoming(&self) -> Result<Vec<Event>, RegistryError> {
        self.list_upcoming_at(Utc::now()).await
    }

    /// Lists events starting strictly after `now`, earliest first, ties
    /// broken by location.
    ///
    /// # Errors
    ///
    /// Returns a store error on failure.
    pub async fn list_upcoming_at(&self, now: DateTime<Utc>) -> Result<Vec<Event>, RegistryError> {
        Ok(self.store.list_upcoming(now).await?)
    }

    /// Returns registration totals for an event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if the event does not exist.
    pub async fn stats(&self, id: EventId) -> Result<EventStats, RegistryError> {
        let event = self
            .store
            .get_event(id)
            .await?
            .ok_or(RegistryError::EventNotFound(id))?;
        let count = self.store.count_registrations(id).await?;
        Ok(EventStats::compute(count, event.capacity))
    }
}
