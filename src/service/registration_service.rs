//! Registration service: decides whether a registration or cancellation
//! is accepted and applies it through the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{EventId, UserId};
use crate::error::RegistryError;
use crate::persistence::{Admission, RegistrationStore};

/// Business rules for registering and cancelling.
///
/// Stateless apart from the store handle: no in-process lock is held, so
/// any number of instances may run against the same database. Capacity and
/// uniqueness are ultimately enforced by
/// [`RegistrationStore::admit_registration`]; the pre-checks here only give
/// each rejection its specific reason in a fixed order.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
}

impl RegistrationService {
    /// Creates a new `RegistrationService`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Registers `user_id` for `event_id`, evaluated at the current instant.
    ///
    /// # Errors
    ///
    /// See [`RegistrationService::register_at`].
    pub async fn register(&self, event_id: EventId, user_id: UserId) -> Result<(), RegistryError> {
        self.register_at(event_id, user_id, Utc::now()).await
    }

    /// Registers `user_id` for `event_id`, treating `now` as the evaluation
    /// instant.
    ///
    /// Checks run in this order and the first failure wins:
    /// event exists, event is in the future, user exists, user not yet
    /// registered, a seat is free. The insert itself re-checks capacity and
    /// uniqueness atomically; a conflict found there is reported with the
    /// same variant the pre-check would have returned.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EventNotFound`]
    /// - [`RegistryError::EventAlreadyOccurred`]
    /// - [`RegistryError::UserNotFound`]
    /// - [`RegistryError::AlreadyRegistered`]
    /// - [`RegistryError::EventFull`]
    /// - [`RegistryError::StoreUnavailable`] / [`RegistryError::Persistence`]
    ///   on store failure
    pub async fn register_at(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let result = self.try_register(event_id, user_id, now).await;
        match &result {
            Ok(()) => tracing::info!(%event_id, %user_id, "registration accepted"),
            Err(e) => tracing::debug!(%event_id, %user_id, error = %e, "registration refused"),
        }
        result
    }

    async fn try_register(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(RegistryError::EventNotFound(event_id))?;

        if !event.is_upcoming(now) {
            return Err(RegistryError::EventAlreadyOccurred(event_id));
        }

        if self.store.get_user(user_id).await?.is_none() {
            return Err(RegistryError::UserNotFound(user_id));
        }

        if self.store.registration_exists(event_id, user_id).await? {
            return Err(RegistryError::AlreadyRegistered { event_id, user_id });
        }

        let count = self.store.count_registrations(event_id).await?;
        if count >= event.capacity.get() {
            return Err(RegistryError::EventFull(event_id));
        }

        match self.store.admit_registration(event_id, user_id).await? {
            Admission::Admitted => Ok(()),
            Admission::Full => Err(RegistryError::EventFull(event_id)),
            Admission::Duplicate => Err(RegistryError::AlreadyRegistered { event_id, user_id }),
            Admission::EventMissing => Err(RegistryError::EventNotFound(event_id)),
        }
    }

    /// Cancels the registration of `user_id` for `event_id`.
    ///
    /// Repeating a cancellation yields [`RegistryError::NotRegistered`]
    /// every time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] if no registration exists
    /// for the pair, or a store error.
    pub async fn cancel(&self, event_id: EventId, user_id: UserId) -> Result<(), RegistryError> {
        if self.store.delete_registration(event_id, user_id).await? {
            tracing::info!(%event_id, %user_id, "registration cancelled");
            Ok(())
        } else {
            tracing::debug!(%event_id, %user_id, "cancellation for unregistered user");
            Err(RegistryError::NotRegistered { event_id, user_id })
        }
    }
}
