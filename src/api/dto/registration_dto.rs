//! Registration DTOs for register and cancel.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::error::RegistryError;

/// Request body for `POST` and `DELETE /api/events/{id}/register`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// User to register or cancel.
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl RegistrationRequest {
    /// Returns the user id, rejecting a missing one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`] when `userId` is absent.
    pub fn user_id(&self) -> Result<UserId, RegistryError> {
        self.user_id
            .map(UserId::new)
            .ok_or_else(|| RegistryError::InvalidRequest("user ID required".to_string()))
    }
}

/// Confirmation returned by register and cancel.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Creates a confirmation message.
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
