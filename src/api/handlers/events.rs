//! Event handlers: create, list, details, register, cancel, stats.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateEventRequest, CreateEventResponse, EventDetailsResponse, EventDto, EventStatsResponse,
    MessageResponse, RegistrationRequest,
};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, RegistryError};

/// `POST /events`: Publish a new event.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidRequest`] on a missing or malformed field.
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    summary = "Create an event",
    description = "Publishes an event with a title, ISO-8601 start time, location and a capacity between 1 and 1000.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreateEventResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Json(req) = payload?;
    let new_event = req.validate()?;
    let event_id = state.queries.create_event(new_event).await?;
    Ok((StatusCode::CREATED, Json(CreateEventResponse { event_id })))
}

/// `GET /events`: List upcoming events.
///
/// # Errors
///
/// Returns a store error on failure.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    summary = "List upcoming events",
    description = "Returns events that have not started yet, earliest first; events starting at the same time are ordered by location.",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventDto>),
    ),
    security(("api_key" = []))
)]
pub async fn list_upcoming_events(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RegistryError> {
    let events = state.queries.list_upcoming().await?;
    let data: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
    Ok(Json(data))
}

/// `GET /events/{id}`: Event details with roster.
///
/// # Errors
///
/// Returns [`RegistryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Get event details",
    description = "Returns the event and the users currently registered for it.",
    params(
        ("id" = i64, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDetailsResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Path(id) = id?;
    let details = state.queries.event_with_roster(EventId::new(id)).await?;
    Ok(Json(EventDetailsResponse::from(details)))
}

/// `POST /events/{id}/register`: Register a user.
///
/// # Errors
///
/// Returns the specific rejection: event or user not found, event already
/// occurred, event full, or already registered.
#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    tag = "Registrations",
    summary = "Register for an event",
    description = "Registers a user if the event is in the future, has a free seat and the user is not already registered.",
    params(
        ("id" = i64, Path, description = "Event id"),
    ),
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Registration successful", body = MessageResponse),
        (status = 400, description = "Missing user id", body = ErrorResponse),
        (status = 404, description = "Event or user not found", body = ErrorResponse),
        (status = 409, description = "Past event, event full or already registered", body = ErrorResponse),
        (status = 503, description = "Store temporarily unavailable; safe to retry", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn register_for_event(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let user_id = req.user_id()?;

    state
        .registrations
        .register(EventId::new(id), user_id)
        .await?;

    Ok(Json(MessageResponse::new("Registration successful")))
}

/// `DELETE /events/{id}/register`: Cancel a registration.
///
/// # Errors
///
/// Returns [`RegistryError::NotRegistered`] if the user holds no
/// registration for the event.
#[utoipa::path(
    delete,
    path = "/api/events/{id}/register",
    tag = "Registrations",
    summary = "Cancel a registration",
    description = "Removes the user's registration, freeing a seat.",
    params(
        ("id" = i64, Path, description = "Event id"),
    ),
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Registration cancelled", body = MessageResponse),
        (status = 400, description = "Missing user id", body = ErrorResponse),
        (status = 409, description = "User was not registered", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn cancel_registration(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let user_id = req.user_id()?;

    state
        .registrations
        .cancel(EventId::new(id), user_id)
        .await?;

    Ok(Json(MessageResponse::new("Registration cancelled")))
}

/// `GET /events/{id}/stats`: Capacity statistics.
///
/// # Errors
///
/// Returns [`RegistryError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/events/{id}/stats",
    tag = "Events",
    summary = "Get event statistics",
    description = "Returns the registration count, remaining seats and the share of capacity in use.",
    params(
        ("id" = i64, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event statistics", body = EventStatsResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("api_key" = []))
)]
pub async fn event_stats(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Path(id) = id?;
    let stats = state.queries.stats(EventId::new(id)).await?;
    Ok(Json(EventStatsResponse::from(stats)))
}

/// Event and registration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_upcoming_events))
        .route("/events/{id}", get(get_event))
        .route(
            "/events/{id}/register",
            post(register_for_event).delete(cancel_registration),
        )
        .route("/events/{id}/stats", get(event_stats))
}
