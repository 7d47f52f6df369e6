//! Service error types with HTTP status code mapping.
//!
//! [`RegistryError`] is the single error type returned by the services and
//! handlers. Business rejections are ordinary variants so that a rejection
//! detected at commit time surfaces exactly like the same rejection detected
//! by a pre-check.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventId, UserId};
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "event 12 is full"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Broad classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete input.
    Validation,
    /// Missing or wrong API key.
    Auth,
    /// Referenced event, user or route does not exist.
    NotFound,
    /// Well-defined refusal the caller can act on. Never retried.
    BusinessRejection,
    /// Store unreachable or timed out. Safe to retry.
    Transient,
    /// Unexpected failure.
    Server,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status               |
/// |-----------|---------------------|---------------------------|
/// | 1000–1099 | Validation          | 400 Bad Request           |
/// | 1100–1199 | API key             | 401 / 403                 |
/// | 2000–2999 | Not Found           | 404 Not Found             |
/// | 3000–3999 | Server / Store      | 500 / 503                 |
/// | 4000–4999 | Business rejection  | 409 Conflict              |
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No `x-api-key` header on the request.
    #[error("API key required")]
    MissingApiKey,

    /// `x-api-key` header does not match the configured key.
    #[error("invalid API key")]
    InvalidApiKey,

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No route matches the request path.
    #[error("route not found")]
    RouteNotFound,

    /// The event has already started or finished.
    #[error("cannot register for past event {0}")]
    EventAlreadyOccurred(EventId),

    /// Every seat of the event is taken.
    #[error("event {0} is full")]
    EventFull(EventId),

    /// The user already holds a registration for the event.
    #[error("user {user_id} is already registered for event {event_id}")]
    AlreadyRegistered {
        /// Event the user tried to register for.
        event_id: EventId,
        /// User that is already registered.
        user_id: UserId,
    },

    /// Cancellation for a user who holds no registration.
    #[error("user {user_id} was not registered for event {event_id}")]
    NotRegistered {
        /// Event named in the cancellation.
        event_id: EventId,
        /// User named in the cancellation.
        user_id: UserId,
    },

    /// The store could not be reached or timed out; the request may be retried.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RegistryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MissingApiKey => 1101,
            Self::InvalidApiKey => 1102,
            Self::EventNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::RouteNotFound => 2003,
            Self::Persistence(_) => 3001,
            Self::StoreUnavailable(_) => 3002,
            Self::EventAlreadyOccurred(_) => 4001,
            Self::EventFull(_) => 4002,
            Self::AlreadyRegistered { .. } => 4003,
            Self::NotRegistered { .. } => 4004,
        }
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::MissingApiKey | Self::InvalidApiKey => ErrorKind::Auth,
            Self::EventNotFound(_) | Self::UserNotFound(_) | Self::RouteNotFound => {
                ErrorKind::NotFound
            }
            Self::EventAlreadyOccurred(_)
            | Self::EventFull(_)
            | Self::AlreadyRegistered { .. }
            | Self::NotRegistered { .. } => ErrorKind::BusinessRejection,
            Self::StoreUnavailable(_) => ErrorKind::Transient,
            Self::Persistence(_) => ErrorKind::Server,
        }
    }

    /// Returns `true` if repeating the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingApiKey => StatusCode::UNAUTHORIZED,
            Self::InvalidApiKey => StatusCode::FORBIDDEN,
            Self::EventNotFound(_) | Self::UserNotFound(_) | Self::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::EventAlreadyOccurred(_)
            | Self::EventFull(_)
            | Self::AlreadyRegistered { .. }
            | Self::NotRegistered { .. } => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transient(msg) => Self::StoreUnavailable(msg),
            StoreError::Database(msg) => Self::Persistence(msg),
        }
    }
}

impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for RegistryError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::Server => tracing::error!(error = %self, "request failed"),
            ErrorKind::Transient => tracing::warn!(error = %self, "store unavailable"),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_are_conflicts_and_not_retryable() {
        let errors = [
            RegistryError::EventAlreadyOccurred(EventId::new(1)),
            RegistryError::EventFull(EventId::new(1)),
            RegistryError::AlreadyRegistered {
                event_id: EventId::new(1),
                user_id: UserId::new(2),
            },
            RegistryError::NotRegistered {
                event_id: EventId::new(1),
                user_id: UserId::new(2),
            },
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::BusinessRejection);
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn transient_store_failure_is_retryable() {
        let err = RegistryError::from(StoreError::Transient("pool timed out".to_string()));
        assert!(matches!(err, RegistryError::StoreUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn database_failure_is_server_error() {
        let err = RegistryError::from(StoreError::Database("syntax".to_string()));
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn api_key_errors_map_to_401_and_403() {
        assert_eq!(
            RegistryError::MissingApiKey.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RegistryError::InvalidApiKey.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn into_response_sets_status() {
        let response = RegistryError::EventNotFound(EventId::new(9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
