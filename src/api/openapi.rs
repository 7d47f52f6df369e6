//! OpenAPI document for the REST API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto::{
    CreateEventRequest, CreateEventResponse, EventDetailsResponse, EventDto, EventStatsResponse,
    MessageResponse, RegistrationRequest, RosterEntryDto,
};
use crate::api::handlers::{events, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "event-registry",
        description = "Capacity-constrained event registration API"
    ),
    paths(
        events::create_event,
        events::list_upcoming_events,
        events::get_event,
        events::register_for_event,
        events::cancel_registration,
        events::event_stats,
        system::health_handler,
    ),
    components(schemas(
        CreateEventRequest,
        CreateEventResponse,
        EventDto,
        RosterEntryDto,
        EventDetailsResponse,
        EventStatsResponse,
        RegistrationRequest,
        MessageResponse,
        ErrorResponse,
        ErrorBody,
    )),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "Events", description = "Event publication and reads"),
        (name = "Registrations", description = "Register and cancel"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the `x-api-key` header as the `api_key` security scheme.
#[derive(Debug)]
struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    super::auth::API_KEY_HEADER,
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/events",
            "/api/events/{id}",
            "/api/events/{id}/register",
            "/api/events/{id}/stats",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn api_key_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let has_scheme = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("api_key"));
        assert!(has_scheme);
    }
}
